use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::Language;

/// Metadata envelope for an article discovered by a search.
///
/// Produced by source adapters; does not carry body text. Treated as
/// immutable — "updates" go through the consuming `with_*` constructors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRef {
    pub title: String,
    pub url: String,
    pub source: String,
    /// Publication time, always normalized to IST (+05:30).
    pub date: DateTime<FixedOffset>,
    pub language: Language,
    /// Human-readable region name, as supplied by the querying caller.
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    /// The heat term that originated the query which found this article.
    pub search_term: String,
}

impl ArticleRef {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
        date: DateTime<FixedOffset>,
        language: Language,
        state: impl Into<String>,
        search_term: impl Into<String>,
    ) -> Self {
        let source = source.into();
        Self {
            title: title.into(),
            url: url.into(),
            source: if source.trim().is_empty() {
                "Unknown".to_string()
            } else {
                source
            },
            date,
            language,
            state: state.into(),
            district: None,
            search_term: search_term.into(),
        }
    }

    pub fn with_district(mut self, district: impl Into<String>) -> Self {
        self.district = Some(district.into());
        self
    }

    /// Replace the URL, e.g. after an indirect aggregator URL was resolved
    /// to the publisher URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// An [`ArticleRef`] plus extracted body text and a relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(flatten)]
    pub envelope: ArticleRef,
    /// None when extraction failed — never a blocker downstream.
    pub full_text: Option<String>,
    /// Assigned during relevance filtering; 0.0 until then.
    pub relevance_score: f64,
}

impl Article {
    pub fn from_ref(envelope: ArticleRef, full_text: Option<String>) -> Self {
        Self {
            envelope,
            full_text,
            relevance_score: 0.0,
        }
    }

    /// New article with the score replaced; the original is consumed, not
    /// mutated.
    pub fn with_score(mut self, score: f64) -> Self {
        self.relevance_score = score.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::time::parse_source_date;

    fn make_ref() -> ArticleRef {
        ArticleRef::new(
            "Heatwave alert in Nagpur",
            "https://example.com/a",
            "Example Daily",
            parse_source_date("2026-05-10T10:00:00Z").unwrap(),
            Language::English,
            "Maharashtra",
            "heatwave",
        )
    }

    #[test]
    fn empty_source_defaults_to_unknown() {
        let r = ArticleRef::new(
            "t",
            "https://x.example/a",
            "  ",
            parse_source_date("2026-05-10T10:00:00Z").unwrap(),
            Language::Hindi,
            "Bihar",
            "lu",
        );
        assert_eq!(r.source, "Unknown");
    }

    #[test]
    fn date_is_stored_in_ist() {
        let r = make_ref();
        assert_eq!(r.date.offset().local_minus_utc(), 19800);
    }

    #[test]
    fn with_district_builds_new_value() {
        let r = make_ref().with_district("Nagpur");
        assert_eq!(r.district.as_deref(), Some("Nagpur"));
    }

    #[test]
    fn with_score_clamps_to_unit_interval() {
        let a = Article::from_ref(make_ref(), None);
        assert_eq!(a.relevance_score, 0.0);
        assert_eq!(a.clone().with_score(1.7).relevance_score, 1.0);
        assert_eq!(a.with_score(-0.2).relevance_score, 0.0);
    }

    #[test]
    fn article_json_round_trip_preserves_non_ascii() {
        let envelope = ArticleRef::new(
            "दिल्ली में भीषण गर्मी",
            "https://example.com/hindi",
            "दैनिक समाचार",
            parse_source_date("2026-05-10T10:00:00Z").unwrap(),
            Language::Hindi,
            "Delhi",
            "गर्मी",
        );
        let article = Article::from_ref(envelope, Some("लू से तीन लोग बीमार".to_string()));
        let json = serde_json::to_string_pretty(&article).unwrap();
        assert!(json.contains("दिल्ली"), "non-ASCII must not be escaped");
        let back: Article = serde_json::from_str(&json).unwrap();
        assert_eq!(back, article);
    }

    #[test]
    fn envelope_flattens_in_json() {
        let a = Article::from_ref(make_ref(), None);
        let v: serde_json::Value = serde_json::to_value(&a).unwrap();
        assert!(v.get("title").is_some());
        assert!(v.get("envelope").is_none());
    }
}
