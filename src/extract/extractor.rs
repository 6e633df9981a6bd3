use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

use super::readability;
use super::resolver::UrlResolver;
use crate::model::{Article, ArticleRef};

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_MAX_CONCURRENT: usize = 10;

/// Turns [`ArticleRef`]s into [`Article`]s by fetching and extracting body
/// text, with bounded concurrency.
///
/// Extraction never fails a run: every error path yields an article with
/// `full_text: None` and a logged warning. Output order is unspecified.
pub struct ArticleExtractor {
    client: reqwest::Client,
    resolver: UrlResolver,
    max_concurrent: usize,
}

impl ArticleExtractor {
    pub fn new(client: reqwest::Client, max_concurrent: usize) -> Self {
        let resolver = UrlResolver::new(client.clone());
        Self {
            client,
            resolver,
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub async fn extract_all(&self, refs: Vec<ArticleRef>) -> Vec<Article> {
        if refs.is_empty() {
            return Vec::new();
        }

        let bar = ProgressBar::new(refs.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")
                .unwrap()
                .progress_chars("=> "),
        );
        bar.set_message("Extracting");

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks: JoinSet<Article> = JoinSet::new();
        for article_ref in refs {
            let semaphore = semaphore.clone();
            let client = self.client.clone();
            let resolver = self.resolver.clone();
            let bar = bar.clone();
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let article = extract_one(&client, &resolver, article_ref).await;
                bar.inc(1);
                article
            });
        }

        let mut articles = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(article) => articles.push(article),
                Err(e) => warn!(error = %e, "extraction task failed"),
            }
        }
        bar.finish_with_message("Extracted");
        articles
    }
}

async fn extract_one(
    client: &reqwest::Client,
    resolver: &UrlResolver,
    article_ref: ArticleRef,
) -> Article {
    // Persist the publisher URL onto the article so URL dedup sees through
    // aggregator redirects.
    let resolved = resolver.resolve(&article_ref.url).await;
    let article_ref = if resolved == article_ref.url {
        article_ref
    } else {
        article_ref.with_url(resolved)
    };

    let html = match fetch_html(client, &article_ref.url).await {
        Ok(html) => html,
        Err(e) => {
            warn!(url = %article_ref.url, error = %e, "fetch failed, keeping metadata only");
            return Article::from_ref(article_ref, None);
        }
    };

    // Boilerplate removal is CPU-bound; keep it off the I/O scheduler.
    let full_text = match tokio::task::spawn_blocking(move || readability::extract_text(&html)).await
    {
        Ok(text) => text,
        Err(e) => {
            warn!(url = %article_ref.url, error = %e, "extraction worker failed");
            None
        }
    };
    if full_text.is_none() {
        warn!(url = %article_ref.url, "no body text extracted");
    }
    Article::from_ref(article_ref, full_text)
}

/// Charset-negotiated fetch so non-Latin scripts survive decoding.
async fn fetch_html(client: &reqwest::Client, url: &str) -> Result<String, reqwest::Error> {
    client
        .get(url)
        .timeout(FETCH_TIMEOUT)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await
}
