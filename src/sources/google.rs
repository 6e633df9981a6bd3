use async_trait::async_trait;
use tracing::{debug, warn};

use super::{NewsSource, RateLimitError, SearchRequest, SourceConfig};
use crate::model::time::{now_ist, to_ist};
use crate::model::{ArticleRef, Language, SourceKind};

const SEARCH_URL: &str = "https://news.google.com/rss/search";

/// Google News RSS search.
///
/// Keyless; article links are aggregator-redirect URLs that the resolver
/// unwraps later in the pipeline.
pub struct GoogleNewsSource {
    client: reqwest::Client,
    config: SourceConfig,
}

impl GoogleNewsSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            config: SourceConfig::google(),
        }
    }
}

/// `hl` parameter: English gets the regional variant, the rest use the bare
/// language code.
fn hl_param(language: Language) -> String {
    match language {
        Language::English => "en-IN".to_string(),
        other => other.as_code().to_string(),
    }
}

/// Google News titles end with ` - Publisher`; the suffix names the outlet.
fn publisher_from_title(title: &str) -> Option<&str> {
    title
        .rsplit_once(" - ")
        .map(|(_, publisher)| publisher.trim())
        .filter(|p| !p.is_empty())
}

fn refs_from_feed(feed: feed_rs::model::Feed, req: &SearchRequest<'_>) -> Vec<ArticleRef> {
    let mut refs = Vec::with_capacity(feed.entries.len());
    for entry in feed.entries {
        let Some(title) = entry.title.map(|t| t.content) else {
            continue;
        };
        if title.trim().is_empty() {
            continue;
        }
        let Some(url) = entry.links.first().map(|l| l.href.clone()) else {
            continue;
        };
        let source = publisher_from_title(&title).unwrap_or("Unknown").to_string();
        let date = entry.published.map(to_ist).unwrap_or_else(now_ist);
        refs.push(ArticleRef::new(
            title,
            url,
            source,
            date,
            req.language,
            req.state,
            req.search_term,
        ));
    }
    refs
}

#[async_trait]
impl NewsSource for GoogleNewsSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Google
    }

    fn config(&self) -> &SourceConfig {
        &self.config
    }

    async fn search(&self, req: SearchRequest<'_>) -> Result<Vec<ArticleRef>, RateLimitError> {
        let hl = hl_param(req.language);
        let ceid = format!("{}:{}", req.country, req.language.as_code());
        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("q", req.query),
                ("hl", hl.as_str()),
                ("gl", req.country),
                ("ceid", ceid.as_str()),
            ])
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!(source = "google", error = %e, "search request failed");
                return Ok(Vec::new());
            }
        };

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(RateLimitError {
                source: SourceKind::Google,
            });
        }
        if !response.status().is_success() {
            warn!(source = "google", status = %response.status(), "search returned non-success");
            return Ok(Vec::new());
        }

        let bytes = match response.bytes().await {
            Ok(b) => b,
            Err(e) => {
                warn!(source = "google", error = %e, "failed reading feed body");
                return Ok(Vec::new());
            }
        };

        match feed_rs::parser::parse(bytes.as_ref()) {
            Ok(feed) => {
                let refs = refs_from_feed(feed, &req);
                debug!(source = "google", query = req.query, found = refs.len(), "search complete");
                Ok(refs)
            }
            Err(e) => {
                warn!(source = "google", error = %e, "feed parse failed");
                Ok(Vec::new())
            }
        }
    }
}
