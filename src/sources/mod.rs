pub mod gnews;
pub mod google;
pub mod newsdata;
#[cfg(test)]
pub mod testing;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{ArticleRef, Language, SourceKind};

pub use gnews::GnewsSource;
pub use google::GoogleNewsSource;
pub use newsdata::NewsDataSource;

/// The one error kind a source adapter may surface.
///
/// Every other upstream failure (auth, parse, timeout, non-429 HTTP) is
/// swallowed by the adapter, which returns an empty result instead, so that
/// only the retryable condition escapes to the retry wrapper.
#[derive(Debug, Clone, Error)]
#[error("rate limited by {source}")]
pub struct RateLimitError {
    pub source: SourceKind,
}

/// One search call against an upstream source.
#[derive(Debug, Clone, Copy)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    pub language: Language,
    pub country: &'a str,
    /// Human-readable region name carried onto returned articles.
    pub state: &'a str,
    /// Heat term carried onto returned articles.
    pub search_term: &'a str,
}

/// Static per-source constants the generator and scheduler consume.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub daily_budget: u32,
    /// Token-bucket size; 1 models plain minimum-interval pacing.
    pub burst: u32,
    /// Time to earn one token back.
    pub refill_interval: Duration,
    pub query_char_limit: usize,
    /// One query per heat-term category instead of one broad query.
    pub category_fanout: bool,
    pub supported_languages: Vec<Language>,
}

impl SourceConfig {
    pub fn google() -> SourceConfig {
        SourceConfig {
            kind: SourceKind::Google,
            daily_budget: 600,
            burst: 1,
            refill_interval: Duration::from_millis(1500),
            query_char_limit: 2048,
            category_fanout: true,
            supported_languages: Language::ALL.to_vec(),
        }
    }

    pub fn newsdata() -> SourceConfig {
        SourceConfig {
            kind: SourceKind::NewsData,
            daily_budget: 200,
            // 30 requests per 15-minute window
            burst: 30,
            refill_interval: Duration::from_secs(30),
            query_char_limit: 100,
            category_fanout: false,
            supported_languages: Language::ALL.to_vec(),
        }
    }

    pub fn gnews() -> SourceConfig {
        SourceConfig {
            kind: SourceKind::Gnews,
            daily_budget: 100,
            burst: 1,
            refill_interval: Duration::from_secs(1),
            query_char_limit: 200,
            category_fanout: false,
            supported_languages: vec![
                Language::English,
                Language::Hindi,
                Language::Bengali,
                Language::Tamil,
                Language::Telugu,
                Language::Marathi,
                Language::Malayalam,
                Language::Punjabi,
            ],
        }
    }

    pub fn for_kind(kind: SourceKind) -> SourceConfig {
        match kind {
            SourceKind::Google => Self::google(),
            SourceKind::NewsData => Self::newsdata(),
            SourceKind::Gnews => Self::gnews(),
        }
    }

    pub fn supports_language(&self, language: Language) -> bool {
        self.supported_languages.contains(&language)
    }
}

/// A search upstream. Implementations must be idempotent and must never
/// fail for transport, HTTP, parse, or auth reasons — those yield `Ok(vec![])`.
#[async_trait]
pub trait NewsSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    fn config(&self) -> &SourceConfig;

    async fn search(&self, req: SearchRequest<'_>) -> Result<Vec<ArticleRef>, RateLimitError>;
}
