//! Chart options CLI
//!
//! Loads an execution response, its full result and definition from JSON
//! files, pages the result through an in-memory page source and prints the
//! chart options as pretty JSON.

use anyhow::Context;
use bi_chart_options::chart::predicates::HeaderPredicate;
use bi_chart_options::execution::pager::DEFAULT_LIMIT;
use bi_chart_options::execution::{
    ExecutionDefinition, ExecutionResponse, ExecutionResult, InMemoryResultSource, ResultPager,
};
use bi_chart_options::{get_chart_options, logging, ChartConfig, DataView};
use clap::Parser;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

#[cfg(feature = "jemalloc")]
use tikv_jemallocator::Jemalloc;

#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(Parser)]
#[command(name = "bi-chart-options")]
#[command(about = "Derive chart options from an execution result", long_about = None)]
struct Args {
    /// Execution response (dimension descriptors)
    #[arg(long)]
    response: PathBuf,

    /// Complete execution result
    #[arg(long)]
    result: PathBuf,

    /// Execution definition (measures, attributes, buckets)
    #[arg(long)]
    definition: PathBuf,

    /// Chart configuration; defaults to a column chart
    #[arg(long)]
    config: Option<PathBuf>,

    /// Drillable predicates (JSON array)
    #[arg(long)]
    drill: Option<PathBuf>,

    /// Page size per dimension
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    page_limit: usize,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(&args.log_level)?;

    let response: ExecutionResponse = load_json(&args.response)?;
    let full: ExecutionResult = load_json(&args.result)?;
    let definition: ExecutionDefinition = load_json(&args.definition)?;
    let config = match &args.config {
        Some(path) => ChartConfig::from_file(path)?,
        None => ChartConfig::new("column"),
    };
    let drillable_items: Vec<HeaderPredicate> = match &args.drill {
        Some(path) => load_json(path)?,
        None => Vec::new(),
    };

    let uri = format!(
        "/executionResults/local?dimensions={}",
        response.dimensions.len()
    );
    let source = InMemoryResultSource::new(full);
    let pager = ResultPager::new(&source).with_limit(args.page_limit);
    let result = pager
        .get_execution_result(&uri)
        .await
        .context("Failed to page execution result")?
        .context("Execution result has no content")?;
    tracing::info!("Merged result with paging {:?}", result.paging.total);

    let dv = DataView::new(response, result, definition).context("Invalid execution result")?;
    let options = get_chart_options(&dv, &config, &drillable_items)?;
    println!("{}", serde_json::to_string_pretty(&options)?);
    Ok(())
}
