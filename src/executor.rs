use std::collections::{BTreeMap, BTreeSet};

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::catalog::{Catalog, TermDictionary};
use crate::checkpoint::CheckpointStore;
use crate::error::HeatwireError;
use crate::model::{ArticleRef, Query, QueryResult, SkipReason, SourceKind};
use crate::query::QueryGenerator;
use crate::schedule::SourceScheduler;

/// Per-source tally for the run report.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceTally {
    pub executed: usize,
    pub articles: usize,
    pub policy_skips: usize,
    pub failures: usize,
}

/// Metrics for one collection run.
#[derive(Debug, Clone, Default)]
pub struct ExecutorReport {
    pub queries_executed: usize,
    pub skipped_checkpoint: usize,
    pub policy_skips: usize,
    pub failures: usize,
    pub by_source: BTreeMap<SourceKind, SourceTally>,
}

/// Everything a finished run hands back to the pipeline.
pub struct RunOutcome {
    /// Flat article stream from all sources and both phases.
    pub articles: Vec<ArticleRef>,
    pub report: ExecutorReport,
    /// Heat terms of queries that actually reached an adapter.
    pub terms_used: Vec<String>,
    /// Returned so the caller can delete the file once outputs are written.
    pub checkpoint: CheckpointStore,
}

/// Orchestrates the two-phase hierarchical collection.
///
/// Each source runs its query list sequentially inside its own task;
/// sources run concurrently under a `JoinSet`. Per-query completion events
/// flow back over an mpsc channel to this orchestration loop, which is the
/// sole owner of the checkpoint store — updates are serialized by the
/// channel, not by a lock. All state-phase work joins before any district
/// query is generated.
pub struct QueryExecutor<'a> {
    generator: QueryGenerator<'a>,
    schedulers: Vec<SourceScheduler>,
    checkpoint: CheckpointStore,
}

struct QueryEvent {
    key: String,
    result: QueryResult,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(
        catalog: &'a Catalog,
        terms: &'a TermDictionary,
        schedulers: Vec<SourceScheduler>,
        checkpoint: CheckpointStore,
    ) -> Self {
        Self {
            generator: QueryGenerator::new(catalog, terms),
            schedulers,
            checkpoint,
        }
    }

    pub async fn run(mut self) -> Result<RunOutcome, HeatwireError> {
        let mut articles = Vec::new();
        let mut report = ExecutorReport::default();
        let mut terms_used = Vec::new();
        let mut active_regions = BTreeSet::new();
        let mut task_errors = Vec::new();

        // Phase 1: state-level queries for every source.
        let mut plans: Vec<(SourceScheduler, Vec<Query>)> = Vec::new();
        for scheduler in self.schedulers.drain(..) {
            let queries = self.generator.state_queries(scheduler.config());
            plans.push((scheduler, queries));
        }
        info!(
            sources = plans.len(),
            queries = plans.iter().map(|(_, q)| q.len()).sum::<usize>(),
            "state phase starting"
        );
        let schedulers = run_phase(
            plans,
            &mut self.checkpoint,
            &mut articles,
            &mut report,
            &mut terms_used,
            &mut active_regions,
            &mut task_errors,
        )
        .await;

        info!(
            active_regions = active_regions.len(),
            articles = articles.len(),
            "state phase complete"
        );

        // Phase 2: district queries, only for regions that produced results
        // and only for sources with budget left.
        let mut plans: Vec<(SourceScheduler, Vec<Query>)> = Vec::new();
        for scheduler in schedulers {
            if !scheduler.has_budget() {
                info!(source = %scheduler.kind(), "budget exhausted, skipping district phase");
                continue;
            }
            let queries = self.generator.district_queries(scheduler.config(), &active_regions);
            plans.push((scheduler, queries));
        }
        info!(
            sources = plans.len(),
            queries = plans.iter().map(|(_, q)| q.len()).sum::<usize>(),
            "district phase starting"
        );
        let mut district_active = BTreeSet::new();
        let schedulers = run_phase(
            plans,
            &mut self.checkpoint,
            &mut articles,
            &mut report,
            &mut terms_used,
            &mut district_active,
            &mut task_errors,
        )
        .await;
        drop(schedulers);

        if !task_errors.is_empty() {
            return Err(HeatwireError::Pipeline(format!(
                "{} source task(s) failed: {}",
                task_errors.len(),
                task_errors.join("; ")
            )));
        }

        info!(
            articles = articles.len(),
            executed = report.queries_executed,
            skipped_checkpoint = report.skipped_checkpoint,
            "collection complete"
        );
        Ok(RunOutcome {
            articles,
            report,
            terms_used,
            checkpoint: self.checkpoint,
        })
    }
}

/// Run one phase: fan sources out, drain completion events sequentially,
/// fan back in. Returns the schedulers so budgets and breakers carry into
/// the next phase.
async fn run_phase(
    plans: Vec<(SourceScheduler, Vec<Query>)>,
    checkpoint: &mut CheckpointStore,
    articles: &mut Vec<ArticleRef>,
    report: &mut ExecutorReport,
    terms_used: &mut Vec<String>,
    active_regions: &mut BTreeSet<String>,
    task_errors: &mut Vec<String>,
) -> Vec<SourceScheduler> {
    let (tx, mut rx) = mpsc::channel::<QueryEvent>(64);
    let mut tasks: JoinSet<SourceScheduler> = JoinSet::new();

    for (mut scheduler, queries) in plans {
        // Consult the checkpoint on the orchestration side, before dispatch.
        let mut to_run = Vec::with_capacity(queries.len());
        for query in queries {
            if checkpoint.contains(&query.checkpoint_key()) {
                report.skipped_checkpoint += 1;
            } else {
                to_run.push(query);
            }
        }
        let tx = tx.clone();
        tasks.spawn(async move {
            for query in to_run {
                let key = query.checkpoint_key();
                let result = scheduler.execute(&query).await;
                if tx.send(QueryEvent { key, result }).await.is_err() {
                    // orchestrator went away; stop issuing calls
                    break;
                }
            }
            scheduler
        });
    }
    drop(tx);

    // Sole consumer: checkpoint mutation and persistence stay single-owner.
    while let Some(event) = rx.recv().await {
        let QueryEvent { key, result } = event;
        let source = result.query.source_hint;
        let tally = report.by_source.entry(source).or_default();
        match (&result.error, result.success) {
            (None, _) => {
                report.queries_executed += 1;
                tally.executed += 1;
                tally.articles += result.articles.len();
                terms_used.push(result.query.search_term.clone());
                if !result.articles.is_empty() {
                    active_regions.insert(result.query.state_slug.clone());
                }
                articles.extend(result.articles);
            }
            (Some(_), true) => {
                report.policy_skips += 1;
                tally.policy_skips += 1;
            }
            (Some(reason), false) => {
                report.failures += 1;
                tally.failures += 1;
                if reason.as_str() == SkipReason::RateLimitExhausted.as_str() {
                    terms_used.push(result.query.search_term.clone());
                }
            }
        }
        // Completions and skips are checkpointed; failures re-run next time.
        if result.success {
            checkpoint.insert(key);
            if let Err(e) = checkpoint.persist().await {
                warn!(error = %e, "checkpoint persist failed");
            }
        }
    }

    let mut schedulers = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(scheduler) => schedulers.push(scheduler),
            Err(e) => task_errors.push(e.to_string()),
        }
    }
    schedulers
}
