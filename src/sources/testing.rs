//! Scripted in-memory source for scheduler and executor tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{NewsSource, RateLimitError, SearchRequest, SourceConfig};
use crate::model::time::now_ist;
use crate::model::{ArticleRef, SourceKind};

/// What a scripted source does on one call.
#[derive(Debug, Clone)]
pub enum ScriptedCall {
    /// Return this many synthetic articles.
    Articles(usize),
    RateLimit,
}

/// A [`NewsSource`] that replays a script and counts invocations.
///
/// When the script runs out, further calls return empty results.
pub struct ScriptedSource {
    config: SourceConfig,
    script: Mutex<VecDeque<ScriptedCall>>,
    calls: Arc<AtomicU32>,
    default_articles: Option<usize>,
}

impl ScriptedSource {
    pub fn new(config: SourceConfig, script: Vec<ScriptedCall>) -> Self {
        Self {
            config,
            script: Mutex::new(script.into()),
            calls: Arc::new(AtomicU32::new(0)),
            default_articles: None,
        }
    }

    /// A source that always answers with `count` articles.
    pub fn always(config: SourceConfig, count: usize) -> Self {
        let mut source = Self::new(config, Vec::new());
        source.default_articles = Some(count);
        source
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Shared handle onto the invocation counter, usable after the source
    /// has been boxed and moved.
    pub fn call_counter(&self) -> Arc<AtomicU32> {
        self.calls.clone()
    }
}

#[async_trait]
impl NewsSource for ScriptedSource {
    fn kind(&self) -> SourceKind {
        self.config.kind
    }

    fn config(&self) -> &SourceConfig {
        &self.config
    }

    async fn search(&self, req: SearchRequest<'_>) -> Result<Vec<ArticleRef>, RateLimitError> {
        let call_index = self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        let count = match next {
            Some(ScriptedCall::RateLimit) => {
                return Err(RateLimitError {
                    source: self.config.kind,
                });
            }
            Some(ScriptedCall::Articles(n)) => n,
            None => self.default_articles.unwrap_or(0),
        };
        Ok((0..count)
            .map(|i| {
                ArticleRef::new(
                    format!("{} article {call_index}-{i}", req.state),
                    format!(
                        "https://{}.example/{}/{call_index}/{i}",
                        self.config.kind,
                        req.state.to_lowercase().replace(' ', "-")
                    ),
                    "Scripted Outlet",
                    now_ist(),
                    req.language,
                    req.state,
                    req.search_term,
                )
            })
            .collect())
    }
}
