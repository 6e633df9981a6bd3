use thiserror::Error;

#[derive(Debug, Error)]
pub enum HeatwireError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Feed parse error: {0}")]
    Feed(#[from] feed_rs::parser::ParseFeedError),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Invalid language code: {0}")]
    InvalidLanguage(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Collection run failed: {0}")]
    Pipeline(String),

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_display() {
        let err = HeatwireError::Catalog("missing districts for bihar".to_string());
        let msg = format!("{err}");
        assert!(msg.contains("Catalog"));
        assert!(msg.contains("bihar"));
    }

    #[test]
    fn test_invalid_language_display() {
        let err = HeatwireError::InvalidLanguage("xx".to_string());
        assert!(format!("{err}").contains("xx"));
    }

    #[test]
    fn test_pipeline_error_display() {
        let err = HeatwireError::Pipeline("2 source tasks failed".to_string());
        let msg = format!("{err}");
        assert!(msg.contains("Collection run failed"));
        assert!(msg.contains("2 source tasks"));
    }

    #[test]
    fn test_other_error_display() {
        let err = HeatwireError::Other("custom error".to_string());
        assert_eq!(format!("{err}"), "custom error");
    }
}
