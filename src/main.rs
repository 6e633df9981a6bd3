use std::time::Duration;

use chrono::NaiveDate;
use clap::Parser;

use heatwire::catalog::{Catalog, TermDictionary};
use heatwire::checkpoint::CheckpointStore;
use heatwire::cli::*;
use heatwire::dedup::{RelevanceFilter, dedup_articles};
use heatwire::error::HeatwireError;
use heatwire::executor::QueryExecutor;
use heatwire::extract::ArticleExtractor;
use heatwire::model::time::now_ist;
use heatwire::model::{CollectionCounts, CollectionMetadata};
use heatwire::output::OutputWriter;
use heatwire::query::QueryGenerator;
use heatwire::schedule::SourceScheduler;
use heatwire::sources::{GnewsSource, GoogleNewsSource, NewsDataSource, SourceConfig};

#[tokio::main]
async fn main() -> Result<(), HeatwireError> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Run(args) => cmd_run(args).await,
        Command::Plan(args) => cmd_plan(args),
        Command::Catalog(args) => cmd_catalog(args),
    }
}

async fn cmd_run(args: RunArgs) -> Result<(), HeatwireError> {
    let catalog = load_catalog(&args.regions)?;
    let terms = TermDictionary::builtin();
    let run_date = resolve_run_date(args.date.as_deref())?;

    let client = reqwest::Client::builder()
        .user_agent(concat!("heatwire/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .build()?;

    let schedulers = build_schedulers(&client);
    let sources_queried: Vec<String> = schedulers.iter().map(|s| s.kind().to_string()).collect();

    let writer = OutputWriter::new(&args.output, run_date);
    let checkpoint = CheckpointStore::load_or_new(writer.run_dir().join(".checkpoint.json"));
    if !checkpoint.is_empty() {
        eprintln!("Resuming: {} queries already completed", checkpoint.len());
    }

    eprintln!(
        "Collecting {} for {} regions across {} sources",
        run_date,
        catalog.regions().len(),
        sources_queried.len()
    );

    let executor = QueryExecutor::new(&catalog, &terms, schedulers, checkpoint);
    let deadline = Duration::from_secs(args.deadline_mins * 60);
    let outcome = match tokio::time::timeout(deadline, executor.run()).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(HeatwireError::Pipeline(format!(
                "run exceeded the {} minute deadline; checkpoint preserved for resume",
                args.deadline_mins
            )));
        }
    };
    let articles_found = outcome.articles.len();
    eprintln!(
        "Found {articles_found} articles ({} queries, {} resumed from checkpoint)",
        outcome.report.queries_executed, outcome.report.skipped_checkpoint
    );

    let extractor = ArticleExtractor::new(client.clone(), args.max_concurrent_extractions);
    let extracted = extractor.extract_all(outcome.articles).await;
    let articles_extracted = extracted.iter().filter(|a| a.full_text.is_some()).count();

    let deduped = dedup_articles(extracted);
    let kept = RelevanceFilter::builtin().apply(&terms, deduped);
    eprintln!("Kept {} articles after dedup and relevance filtering", kept.len());

    let metadata = CollectionMetadata::new(
        now_ist(),
        sources_queried,
        outcome.terms_used,
        CollectionCounts {
            articles_found,
            articles_extracted,
            articles_filtered: kept.len(),
        },
    );
    let states: Vec<String> = catalog.regions().iter().map(|r| r.name.clone()).collect();
    writer.write_all(&states, kept, &metadata).await?;

    if args.keep_checkpoint {
        eprintln!("Checkpoint kept: {}", outcome.checkpoint.path().display());
    } else {
        outcome.checkpoint.remove().await?;
    }
    eprintln!("Done: {}", writer.run_dir().display());
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> Result<(), HeatwireError> {
    let catalog = load_catalog(&args.regions)?;
    let terms = TermDictionary::builtin();
    let generator = QueryGenerator::new(&catalog, &terms);
    let configs = [
        SourceConfig::google(),
        SourceConfig::newsdata(),
        SourceConfig::gnews(),
    ];
    let plan = generator.plan(&configs);

    if args.json {
        let mut stdout = std::io::stdout();
        serde_json::to_writer_pretty(&mut stdout, &plan)?;
        println!();
        return Ok(());
    }

    for (source, queries) in &plan {
        let config = SourceConfig::for_kind(*source);
        println!(
            "{source}: {} state queries (daily budget {})",
            queries.len(),
            config.daily_budget
        );
        for query in queries {
            println!("  [{}/{}] {}", query.state_slug, query.language, query.query_string);
        }
    }
    Ok(())
}

fn cmd_catalog(args: CatalogArgs) -> Result<(), HeatwireError> {
    let catalog = Catalog::builtin();
    let terms = TermDictionary::builtin();

    // default to the region listing when no flag is given
    if args.regions || !args.terms {
        for region in catalog.regions() {
            let languages: Vec<&str> = region.languages.iter().map(|l| l.as_code()).collect();
            println!(
                "{:<42} {:<10} languages: {:<20} districts: {}",
                region.name,
                region.slug,
                languages.join(","),
                region.districts.len()
            );
        }
    }
    if args.terms {
        for language in heatwire::model::Language::ALL {
            let count = terms.by_language(language).len();
            let categories = terms.categories_for(language).len();
            println!("{language}: {count} terms across {categories} categories");
        }
    }
    Ok(())
}

fn load_catalog(region_slugs: &[String]) -> Result<Catalog, HeatwireError> {
    let catalog = Catalog::builtin();
    if region_slugs.is_empty() {
        Ok(catalog)
    } else {
        catalog.restricted_to(region_slugs)
    }
}

fn resolve_run_date(raw: Option<&str>) -> Result<NaiveDate, HeatwireError> {
    match raw {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| HeatwireError::InvalidDate(raw.to_string())),
        None => Ok(now_ist().date_naive()),
    }
}

fn build_schedulers(client: &reqwest::Client) -> Vec<SourceScheduler> {
    let google = GoogleNewsSource::new(client.clone());
    let newsdata = NewsDataSource::from_env(client.clone());
    let gnews = GnewsSource::from_env(client.clone());
    vec![
        SourceScheduler::new(Box::new(google)),
        SourceScheduler::new(Box::new(newsdata)),
        SourceScheduler::new(Box::new(gnews)),
    ]
}
