pub mod dedup;
pub mod relevance;
pub mod url_norm;

pub use dedup::{dedup_articles, quality_score};
pub use relevance::RelevanceFilter;
pub use url_norm::normalize_url;
