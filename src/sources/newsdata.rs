use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{NewsSource, RateLimitError, SearchRequest, SourceConfig};
use crate::model::time::{now_ist, parse_source_date};
use crate::model::{ArticleRef, SourceKind};

const SEARCH_URL: &str = "https://newsdata.io/api/1/latest";

/// NewsData.io JSON API.
///
/// Constructed with an optional key; without one the adapter degrades to an
/// always-empty source and never touches the network.
pub struct NewsDataSource {
    client: reqwest::Client,
    config: SourceConfig,
    api_key: Option<String>,
}

impl NewsDataSource {
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            client,
            config: SourceConfig::newsdata(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn from_env(client: reqwest::Client) -> Self {
        Self::new(client, std::env::var("NEWSDATA_API_KEY").ok())
    }
}

#[derive(Debug, Deserialize)]
struct NewsDataResponse {
    #[serde(default)]
    results: Vec<NewsDataItem>,
}

#[derive(Debug, Deserialize)]
struct NewsDataItem {
    title: Option<String>,
    link: Option<String>,
    source_name: Option<String>,
    source_id: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

fn refs_from_response(body: &str, req: &SearchRequest<'_>) -> Vec<ArticleRef> {
    let parsed: NewsDataResponse = match serde_json::from_str(body) {
        Ok(p) => p,
        Err(e) => {
            warn!(source = "newsdata", error = %e, "response parse failed");
            return Vec::new();
        }
    };
    let mut refs = Vec::with_capacity(parsed.results.len());
    for item in parsed.results {
        let (Some(title), Some(link)) = (item.title, item.link) else {
            continue;
        };
        if title.trim().is_empty() {
            continue;
        }
        let source = item
            .source_name
            .or(item.source_id)
            .unwrap_or_else(|| "Unknown".to_string());
        let date = item
            .pub_date
            .as_deref()
            .and_then(parse_source_date)
            .unwrap_or_else(now_ist);
        refs.push(ArticleRef::new(
            title,
            link,
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
impl NewsSource for NewsDataSource {
    fn kind(&self) -> SourceKind {
        SourceKind::NewsData
    }

    fn config(&self) -> &SourceConfig {
        &self.config
    }

    async fn search(&self, req: SearchRequest<'_>) -> Result<Vec<ArticleRef>, RateLimitError> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!(source = "newsdata", "no API key, returning empty");
            return Ok(Vec::new());
        };

        let country = req.country.to_lowercase();
        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("apikey", api_key),
                ("q", req.query),
                ("language", req.language.as_code()),
                ("country", country.as_str()),
            ])
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!(source = "newsdata", error = %e, "search request failed");
                return Ok(Vec::new());
            }
        };

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(RateLimitError {
                source: SourceKind::NewsData,
            });
        }
        if !response.status().is_success() {
            warn!(source = "newsdata", status = %response.status(), "search returned non-success");
            return Ok(Vec::new());
        }

        match response.text().await {
            Ok(body) => {
                let refs = refs_from_response(&body, &req);
                debug!(source = "newsdata", query = req.query, found = refs.len(), "search complete");
                Ok(refs)
            }
            Err(e) => {
                warn!(source = "newsdata", error = %e, "failed reading response body");
                Ok(Vec::new())
            }
        }
    }
}
