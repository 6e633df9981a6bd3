use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{ArticleRef, Language};

/// The adapter a query is destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceKind {
    #[serde(rename = "google")]
    Google,
    #[serde(rename = "newsdata")]
    NewsData,
    #[serde(rename = "gnews")]
    Gnews,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [SourceKind::Google, SourceKind::NewsData, SourceKind::Gnews];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Google => "google",
            SourceKind::NewsData => "newsdata",
            SourceKind::Gnews => "gnews",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for SourceKind {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryLevel {
    #[serde(rename = "state")]
    State,
    #[serde(rename = "district")]
    District,
}

impl QueryLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryLevel::State => "state",
            QueryLevel::District => "district",
        }
    }
}

/// A single search to issue against one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// OR-group of terms plus a location suffix,
    /// e.g. `(heatwave OR "heat stroke") Nagpur`.
    pub query_string: String,
    pub source_hint: SourceKind,
    pub language: Language,
    pub state_slug: String,
    pub level: QueryLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district_slug: Option<String>,
    /// Representative heat term carried onto found articles.
    pub search_term: String,
    /// Human-readable region name carried onto found articles.
    pub state_name: String,
}

impl Query {
    /// Stable 16-hex-char identity used for crash-resume bookkeeping.
    ///
    /// Hashes the full identifying tuple so the same plan item maps to the
    /// same key across runs.
    pub fn checkpoint_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.source_hint.as_str());
        hasher.update(b"|");
        hasher.update(&self.state_slug);
        hasher.update(b"|");
        hasher.update(self.language.as_code());
        hasher.update(b"|");
        hasher.update(self.level.as_str());
        hasher.update(b"|");
        hasher.update(&self.query_string);
        let digest = hasher.finalize();
        digest[..8].iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Why a query was skipped (or failed) without producing articles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    BudgetExhausted,
    CircuitBreakerOpen,
    UnsupportedLanguage,
    CheckpointSkip,
    RateLimitExhausted,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::BudgetExhausted => "budget_exhausted",
            SkipReason::CircuitBreakerOpen => "circuit_breaker_open",
            SkipReason::UnsupportedLanguage => "unsupported_language",
            SkipReason::CheckpointSkip => "checkpoint_skip",
            SkipReason::RateLimitExhausted => "rate_limit_exhausted",
        }
    }
}

/// Outcome of pushing one [`Query`] through a source scheduler.
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub query: Query,
    pub articles: Vec<ArticleRef>,
    pub success: bool,
    /// Reason string when the query was skipped by policy or failed.
    pub error: Option<String>,
}

impl QueryResult {
    pub fn ok(query: Query, articles: Vec<ArticleRef>) -> Self {
        Self {
            query,
            articles,
            success: true,
            error: None,
        }
    }

    /// Expected non-failure: the query was gated off, not attempted and lost.
    pub fn skipped(query: Query, reason: SkipReason) -> Self {
        Self {
            query,
            articles: Vec::new(),
            success: true,
            error: Some(reason.as_str().to_string()),
        }
    }

    pub fn failed(query: Query, reason: SkipReason) -> Self {
        Self {
            query,
            articles: Vec::new(),
            success: false,
            error: Some(reason.as_str().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_query(source: SourceKind, state_slug: &str, qs: &str) -> Query {
        Query {
            query_string: qs.to_string(),
            source_hint: source,
            language: Language::English,
            state_slug: state_slug.to_string(),
            level: QueryLevel::State,
            district_slug: None,
            search_term: "heatwave".to_string(),
            state_name: "Maharashtra".to_string(),
        }
    }

    #[test]
    fn checkpoint_key_is_16_hex_chars() {
        let key = make_query(SourceKind::Google, "maharashtra", "(heatwave) Mumbai").checkpoint_key();
        assert_eq!(key.len(), 16);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn checkpoint_key_is_stable() {
        let a = make_query(SourceKind::Google, "maharashtra", "(heatwave) Mumbai");
        let b = make_query(SourceKind::Google, "maharashtra", "(heatwave) Mumbai");
        assert_eq!(a.checkpoint_key(), b.checkpoint_key());
    }

    #[test]
    fn checkpoint_key_varies_with_tuple_members() {
        let base = make_query(SourceKind::Google, "maharashtra", "(heatwave) Mumbai");
        let other_source = make_query(SourceKind::Gnews, "maharashtra", "(heatwave) Mumbai");
        let other_string = make_query(SourceKind::Google, "maharashtra", "(heatwave) Pune");
        assert_ne!(base.checkpoint_key(), other_source.checkpoint_key());
        assert_ne!(base.checkpoint_key(), other_string.checkpoint_key());
    }

    #[test]
    fn skipped_result_is_success_with_reason() {
        let q = make_query(SourceKind::NewsData, "bihar", "(heatwave) Bihar");
        let r = QueryResult::skipped(q, SkipReason::BudgetExhausted);
        assert!(r.success);
        assert_eq!(r.error.as_deref(), Some("budget_exhausted"));
        assert!(r.articles.is_empty());
    }

    #[test]
    fn failed_result_is_not_success() {
        let q = make_query(SourceKind::Gnews, "bihar", "(heatwave) Bihar");
        let r = QueryResult::failed(q, SkipReason::RateLimitExhausted);
        assert!(!r.success);
        assert_eq!(r.error.as_deref(), Some("rate_limit_exhausted"));
    }
}
