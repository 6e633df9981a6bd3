use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use futures_util::future::join_all;
use tracing::info;

use crate::catalog::slugify;
use crate::error::HeatwireError;
use crate::model::{Article, CollectionMetadata};

const CSV_HEADER: [&str; 10] = [
    "title",
    "url",
    "source",
    "date",
    "language",
    "state",
    "district",
    "search_term",
    "full_text",
    "relevance_score",
];

/// State-partitioned JSON+CSV writer.
///
/// Produces `root/<YYYY-MM-DD>/<state-slug>/articles.{json,csv}` per state
/// plus a single `_metadata.json` manifest, creating directories on write.
/// State buckets are written concurrently; the manifest lands after all of
/// them.
pub struct OutputWriter {
    root: PathBuf,
    date: NaiveDate,
}

impl OutputWriter {
    pub fn new(root: impl Into<PathBuf>, date: NaiveDate) -> Self {
        Self {
            root: root.into(),
            date,
        }
    }

    pub fn run_dir(&self) -> PathBuf {
        self.root.join(self.date.format("%Y-%m-%d").to_string())
    }

    /// Write every state bucket and the run manifest.
    ///
    /// `states` is the full set of region names in scope for the run;
    /// states without articles still get a bucket with a zero count.
    pub async fn write_all(
        &self,
        states: &[String],
        articles: Vec<Article>,
        metadata: &CollectionMetadata,
    ) -> Result<(), HeatwireError> {
        let mut buckets: BTreeMap<String, (String, Vec<Article>)> = states
            .iter()
            .map(|name| (slugify(name), (name.clone(), Vec::new())))
            .collect();
        for article in articles {
            let slug = slugify(&article.envelope.state);
            buckets
                .entry(slug)
                .or_insert_with(|| (article.envelope.state.clone(), Vec::new()))
                .1
                .push(article);
        }

        let run_dir = self.run_dir();
        let date = self.date.format("%Y-%m-%d").to_string();
        let bucket_count = buckets.len();
        let writes = buckets.into_iter().map(|(slug, (state, bucket))| {
            let dir = run_dir.join(&slug);
            let date = date.clone();
            async move { write_state_bucket(&dir, &state, &date, &bucket).await }
        });

        let failures: Vec<String> = join_all(writes)
            .await
            .into_iter()
            .filter_map(|result| result.err().map(|e| e.to_string()))
            .collect();
        if !failures.is_empty() {
            return Err(HeatwireError::Pipeline(format!(
                "{} state bucket(s) failed to write: {}",
                failures.len(),
                failures.join("; ")
            )));
        }

        let manifest = serde_json::to_string_pretty(metadata)?;
        tokio::fs::write(run_dir.join("_metadata.json"), manifest).await?;

        info!(
            dir = %run_dir.display(),
            states = bucket_count,
            "output written"
        );
        Ok(())
    }
}

async fn write_state_bucket(
    dir: &Path,
    state: &str,
    date: &str,
    articles: &[Article],
) -> Result<(), HeatwireError> {
    tokio::fs::create_dir_all(dir).await?;

    let payload = serde_json::json!({
        "state": state,
        "date": date,
        "article_count": articles.len(),
        "articles": articles,
    });
    tokio::fs::write(
        dir.join("articles.json"),
        serde_json::to_string_pretty(&payload)?,
    )
    .await?;

    tokio::fs::write(dir.join("articles.csv"), csv_bytes(articles)?).await?;
    Ok(())
}

/// Header plus one row per article, minimal quoting. A state with no
/// articles gets an empty file, not a lone header.
fn csv_bytes(articles: &[Article]) -> Result<Vec<u8>, HeatwireError> {
    if articles.is_empty() {
        return Ok(Vec::new());
    }
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for article in articles {
        let date = article.envelope.date.to_rfc3339();
        let score = article.relevance_score.to_string();
        writer.write_record([
            article.envelope.title.as_str(),
            article.envelope.url.as_str(),
            article.envelope.source.as_str(),
            date.as_str(),
            article.envelope.language.as_code(),
            article.envelope.state.as_str(),
            article.envelope.district.as_deref().unwrap_or(""),
            article.envelope.search_term.as_str(),
            article.full_text.as_deref().unwrap_or(""),
            score.as_str(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| HeatwireError::Other(format!("csv flush failed: {e}")))
}
