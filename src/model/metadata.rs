use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionCounts {
    pub articles_found: usize,
    pub articles_extracted: usize,
    pub articles_filtered: usize,
}

/// Per-run manifest written alongside the state directories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionMetadata {
    pub collection_timestamp: DateTime<FixedOffset>,
    pub sources_queried: Vec<String>,
    /// Sorted, unique set of heat terms actually issued.
    pub query_terms_used: Vec<String>,
    pub counts: CollectionCounts,
}

impl CollectionMetadata {
    pub fn new(
        collection_timestamp: DateTime<FixedOffset>,
        sources_queried: Vec<String>,
        mut query_terms_used: Vec<String>,
        counts: CollectionCounts,
    ) -> Self {
        query_terms_used.sort_unstable();
        query_terms_used.dedup();
        Self {
            collection_timestamp,
            sources_queried,
            query_terms_used,
            counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::time::now_ist;

    #[test]
    fn query_terms_are_sorted_and_unique() {
        let meta = CollectionMetadata::new(
            now_ist(),
            vec!["google".into()],
            vec!["lu".into(), "heatwave".into(), "lu".into()],
            CollectionCounts::default(),
        );
        assert_eq!(meta.query_terms_used, vec!["heatwave", "lu"]);
    }

    #[test]
    fn metadata_round_trips_through_json() {
        let meta = CollectionMetadata::new(
            now_ist(),
            vec!["google".into(), "gnews".into()],
            vec!["गर्मी".into()],
            CollectionCounts {
                articles_found: 12,
                articles_extracted: 10,
                articles_filtered: 8,
            },
        );
        let json = serde_json::to_string_pretty(&meta).unwrap();
        assert!(json.contains("गर्मी"));
        let back: CollectionMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }
}
