//! # heatwire
//!
//! A daily batch pipeline that collects, extracts, deduplicates, filters,
//! and emits heat/disaster news covering India's 36 states and union
//! territories across 14 Indian languages.
//!
//! The pipeline runs once per day on a constrained shared runner with a
//! strict wall-clock budget, producing per-state JSON+CSV outputs organized
//! by date, with crash-resume semantics via an on-disk checkpoint.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                        heatwire run                            │
//! │                                                                │
//! │  catalog ──► generate ──► execute ──► extract ──► dedup ──►    │
//! │     │           │            │           │          │  output  │
//! │  36 regions  per-source   budget +    bounded    URL + title   │
//! │  × 14 langs  query lists  breaker +   fetch +    + relevance   │
//! │  × 8 cats    char-fitted  rate limit  body text  scoring       │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Collection is hierarchical: a state-level pass over every region first,
//! then a district-level pass restricted to regions that produced results.
//! Sources run concurrently; within a source, queries run sequentially under
//! that source's budget, token bucket, and circuit breaker. Every completed
//! query is checkpointed so an interrupted run resumes instead of repeating
//! work.
//!
//! ## CLI Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `heatwire run` | Run the full daily collection pipeline |
//! | `heatwire plan` | Print the generated query plan without any network calls |
//! | `heatwire catalog` | Inspect the bundled region and heat-term catalogs |
//!
//! ## Quick Start (CLI)
//!
//! ```bash
//! # Full daily run into ./output/<YYYY-MM-DD>/
//! heatwire run
//!
//! # Partial run for two regions, with more extraction parallelism
//! heatwire run --regions maharashtra,rajasthan --max-concurrent-extractions 20
//!
//! # Inspect what would be queried
//! heatwire plan --regions kerala --json
//! ```
//!
//! `NEWSDATA_API_KEY` and `GNEWS_API_KEY` are optional; when unset (or set
//! to an empty string) the corresponding source degrades to an always-empty
//! adapter and the pipeline carries on with the remaining sources.
//!
//! ## Library Usage
//!
//! The crate can also be used as a library. The main entry points are:
//!
//! ```rust,no_run
//! use heatwire::catalog::{Catalog, TermDictionary};
//! use heatwire::checkpoint::CheckpointStore;
//! use heatwire::executor::QueryExecutor;
//! use heatwire::schedule::SourceScheduler;
//! use heatwire::sources::GoogleNewsSource;
//!
//! # async fn run() -> Result<(), heatwire::error::HeatwireError> {
//! let catalog = Catalog::builtin();
//! let terms = TermDictionary::builtin();
//! let client = reqwest::Client::new();
//!
//! let schedulers = vec![SourceScheduler::new(Box::new(GoogleNewsSource::new(client)))];
//! let checkpoint = CheckpointStore::load_or_new("output/2026-05-10/.checkpoint.json");
//!
//! let executor = QueryExecutor::new(&catalog, &terms, schedulers, checkpoint);
//! let outcome = executor.run().await?;
//! println!("collected {} article refs", outcome.articles.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`catalog`] | Read-only geography and heat-term master data with embedded defaults |
//! | [`checkpoint`] | [`CheckpointStore`](checkpoint::CheckpointStore) — content-hashed resume set with atomic persistence |
//! | [`cli`] | CLI argument definitions (clap derive) |
//! | [`dedup`] | URL normalization, duplicate collapse, relevance scoring, exclusion gate |
//! | [`error`] | [`HeatwireError`](error::HeatwireError) enum covering HTTP, I/O, JSON, CSV, and pipeline errors |
//! | [`executor`] | Two-phase hierarchical query orchestration across sources |
//! | [`extract`] | Indirect-URL resolution and bounded-concurrency body-text extraction |
//! | [`model`] | Value objects: articles, queries, results, run metadata, IST time helpers |
//! | [`output`] | State-partitioned JSON+CSV writer plus the run manifest |
//! | [`query`] | Catalog → per-source query list generation |
//! | [`schedule`] | Budget, token bucket, circuit breaker, retry, and the per-source scheduler |
//! | [`sources`] | The [`NewsSource`](sources::NewsSource) adapter contract and the three upstream adapters |
//!
//! ## Output Layout
//!
//! ```text
//! output/
//!   2026-05-10/
//!     _metadata.json
//!     maharashtra/
//!       articles.json
//!       articles.csv
//!     tamil-nadu/
//!       ...
//!     .checkpoint.json   (only while a run is in progress or after a failure)
//! ```
//!
//! The pipeline deliberately favors recall over precision: borderline
//! articles are kept, and the exclusion filter only removes low-scoring
//! items that also match a known-irrelevant pattern.

pub mod catalog;
pub mod checkpoint;
pub mod cli;
pub mod dedup;
pub mod error;
pub mod executor;
pub mod extract;
pub mod model;
pub mod output;
pub mod query;
pub mod schedule;
pub mod sources;
