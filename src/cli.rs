use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "heatwire", about = "Collect heat and disaster news across India's states in 14 languages")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the daily collection pipeline end to end
    Run(RunArgs),

    /// Print the state-phase query plan without issuing any source calls
    Plan(PlanArgs),

    /// Inspect the bundled geography and heat-term catalogs
    Catalog(CatalogArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Output root directory
    #[arg(short, long, default_value = "./output")]
    pub output: PathBuf,

    /// Run date (YYYY-MM-DD); defaults to today in IST
    #[arg(long)]
    pub date: Option<String>,

    /// Wall-clock budget for the whole run, in minutes
    #[arg(long, default_value_t = 45)]
    pub deadline_mins: u64,

    /// Maximum in-flight article extractions
    #[arg(long, default_value_t = 10)]
    pub max_concurrent_extractions: usize,

    /// Restrict the run to these region slugs (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub regions: Vec<String>,

    /// Keep the checkpoint file even after a successful run
    #[arg(long)]
    pub keep_checkpoint: bool,
}

#[derive(Args)]
pub struct PlanArgs {
    /// Restrict the plan to these region slugs (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub regions: Vec<String>,

    /// Emit the full plan as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CatalogArgs {
    /// List regions with languages and district counts
    #[arg(long)]
    pub regions: bool,

    /// Summarize the heat-term dictionary per language
    #[arg(long)]
    pub terms: bool,
}
