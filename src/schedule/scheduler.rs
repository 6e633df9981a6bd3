use tracing::debug;

use super::breaker::CircuitBreaker;
use super::budget::DailyBudget;
use super::rate_limit::TokenBucket;
use super::retry::with_rate_limit_retry;
use crate::model::{Query, QueryResult, SkipReason, SourceKind};
use crate::sources::{NewsSource, SearchRequest};

/// Policy wrapper around one source adapter.
///
/// Gates every query through circuit breaker, daily budget, language
/// support, and the token bucket before the retry-wrapped upstream call.
/// One scheduler serves one source and executes its queries sequentially;
/// the executor owns the cross-source concurrency.
pub struct SourceScheduler {
    source: Box<dyn NewsSource>,
    breaker: CircuitBreaker,
    budget: DailyBudget,
    bucket: TokenBucket,
}

impl SourceScheduler {
    pub fn new(source: Box<dyn NewsSource>) -> Self {
        let config = source.config();
        let breaker = CircuitBreaker::with_defaults(config.kind);
        let budget = DailyBudget::new(config.daily_budget);
        let bucket = TokenBucket::new(config.burst, config.refill_interval);
        Self {
            source,
            breaker,
            budget,
            bucket,
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.source.kind()
    }

    pub fn config(&self) -> &crate::sources::SourceConfig {
        self.source.config()
    }

    pub fn has_budget(&self) -> bool {
        !self.budget.is_exhausted()
    }

    pub fn budget_remaining(&self) -> u32 {
        self.budget.remaining()
    }

    /// Run one query through the policy gates and the adapter.
    ///
    /// The breaker is consulted before any waiting so an unhealthy source is
    /// fast-failed; the budget is charged after the upstream call was
    /// attempted, whether or not it produced articles.
    pub async fn execute(&mut self, query: &Query) -> QueryResult {
        if !self.breaker.check() {
            return QueryResult::skipped(query.clone(), SkipReason::CircuitBreakerOpen);
        }
        if self.budget.is_exhausted() {
            return QueryResult::skipped(query.clone(), SkipReason::BudgetExhausted);
        }
        if !self.source.config().supports_language(query.language) {
            return QueryResult::skipped(query.clone(), SkipReason::UnsupportedLanguage);
        }

        self.bucket.acquire().await;

        let request = SearchRequest {
            query: &query.query_string,
            language: query.language,
            country: "IN",
            state: &query.state_name,
            search_term: &query.search_term,
        };
        let outcome = with_rate_limit_retry(|| self.source.search(request)).await;
        self.budget.spend();

        match outcome {
            Ok(articles) => {
                self.breaker.record_success();
                debug!(
                    source = %self.kind(),
                    state = %query.state_slug,
                    found = articles.len(),
                    "query complete"
                );
                QueryResult::ok(query.clone(), articles)
            }
            Err(_) => {
                self.breaker.record_failure();
                QueryResult::failed(query.clone(), SkipReason::RateLimitExhausted)
            }
        }
    }
}
