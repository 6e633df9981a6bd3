use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{NewsSource, RateLimitError, SearchRequest, SourceConfig};
use crate::model::time::{now_ist, parse_source_date};
use crate::model::{ArticleRef, SourceKind};

const SEARCH_URL: &str = "https://gnews.io/api/v4/search";

/// GNews JSON API.
///
/// GNews signals daily-quota exhaustion with HTTP 403, not 429. That is a
/// terminal condition for the run, so the adapter marks itself exhausted and
/// answers every later call with an empty result instead of burning budget.
pub struct GnewsSource {
    client: reqwest::Client,
    config: SourceConfig,
    api_key: Option<String>,
    quota_exhausted: AtomicBool,
}

impl GnewsSource {
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            client,
            config: SourceConfig::gnews(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            quota_exhausted: AtomicBool::new(false),
        }
    }

    pub fn from_env(client: reqwest::Client) -> Self {
        Self::new(client, std::env::var("GNEWS_API_KEY").ok())
    }
}

#[derive(Debug, Deserialize)]
struct GnewsResponse {
    #[serde(default)]
    articles: Vec<GnewsArticle>,
}

#[derive(Debug, Deserialize)]
struct GnewsArticle {
    title: Option<String>,
    url: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    source: Option<GnewsOutlet>,
}

#[derive(Debug, Deserialize)]
struct GnewsOutlet {
    name: Option<String>,
}

fn refs_from_response(body: &str, req: &SearchRequest<'_>) -> Vec<ArticleRef> {
    let parsed: GnewsResponse = match serde_json::from_str(body) {
        Ok(p) => p,
        Err(e) => {
            warn!(source = "gnews", error = %e, "response parse failed");
            return Vec::new();
        }
    };
    let mut refs = Vec::with_capacity(parsed.articles.len());
    for item in parsed.articles {
        let (Some(title), Some(url)) = (item.title, item.url) else {
            continue;
        };
        if title.trim().is_empty() {
            continue;
        }
        let source = item
            .source
            .and_then(|s| s.name)
            .unwrap_or_else(|| "Unknown".to_string());
        let date = item
            .published_at
            .as_deref()
            .and_then(parse_source_date)
            .unwrap_or_else(now_ist);
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
impl NewsSource for GnewsSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Gnews
    }

    fn config(&self) -> &SourceConfig {
        &self.config
    }

    async fn search(&self, req: SearchRequest<'_>) -> Result<Vec<ArticleRef>, RateLimitError> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!(source = "gnews", "no API key, returning empty");
            return Ok(Vec::new());
        };
        if self.quota_exhausted.load(Ordering::Relaxed) {
            debug!(source = "gnews", "quota exhausted earlier in the run");
            return Ok(Vec::new());
        }

        let country = req.country.to_lowercase();
        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("q", req.query),
                ("lang", req.language.as_code()),
                ("country", country.as_str()),
                ("apikey", api_key),
            ])
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!(source = "gnews", error = %e, "search request failed");
                return Ok(Vec::new());
            }
        };

        match response.status() {
            reqwest::StatusCode::TOO_MANY_REQUESTS => {
                return Err(RateLimitError {
                    source: SourceKind::Gnews,
                });
            }
            // 403 is quota exhaustion, not an auth failure
            reqwest::StatusCode::FORBIDDEN => {
                warn!(source = "gnews", "daily quota exhausted, disabling for this run");
                self.quota_exhausted.store(true, Ordering::Relaxed);
                return Ok(Vec::new());
            }
            status if !status.is_success() => {
                warn!(source = "gnews", status = %status, "search returned non-success");
                return Ok(Vec::new());
            }
            _ => {}
        }

        match response.text().await {
            Ok(body) => {
                let refs = refs_from_response(&body, &req);
                debug!(source = "gnews", query = req.query, found = refs.len(), "search complete");
                Ok(refs)
            }
            Err(e) => {
                warn!(source = "gnews", error = %e, "failed reading response body");
                Ok(Vec::new())
            }
        }
    }
}
