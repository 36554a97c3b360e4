//! Harvestman main entry point
//!
//! Command-line surface for the scrape/crawl orchestrator: load a TOML run
//! file, crawl, and write the serialized records to stdout or a file.

use anyhow::Context;
use clap::Parser;
use harvestman::config::{build_suites, compute_run_hash, load_run_file};
use harvestman::state::{NullStateStore, SqliteStateStore, StateStore};
use harvestman::{output, HttpDriver, Orchestrator};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Harvestman: scrape and crawl web pages into structured records
#[derive(Parser, Debug)]
#[command(name = "harvestman")]
#[command(version)]
#[command(about = "Scrape and crawl web pages into structured records", long_about = None)]
struct Cli {
    /// Path to the TOML run file
    #[arg(value_name = "RUNFILE")]
    run_file: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Discard persisted crawl state before running
    #[arg(long)]
    fresh: bool,

    /// Write output here, overriding the run file's output path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Validate the run file and print the plan without visiting any page
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading run file: {}", cli.run_file.display());
    let run = load_run_file(&cli.run_file).context("failed to load run file")?;
    let hash = compute_run_hash(&cli.run_file)?;
    tracing::info!("Run file loaded (hash: {})", hash);

    let suites = build_suites(&run)?;
    if suites.is_empty() {
        anyhow::bail!("no suites configured in {}", cli.run_file.display());
    }

    if cli.dry_run {
        print_plan(&run, &suites);
        return Ok(());
    }

    let store: Box<dyn StateStore> = match &run.state {
        Some(settings) => {
            let mut store = SqliteStateStore::open(Path::new(&settings.path))
                .context("failed to open state database")?;
            if cli.fresh {
                store.clear_all()?;
            }
            Box::new(store)
        }
        None => Box::new(NullStateStore),
    };

    let driver = HttpDriver::new().context("failed to build HTTP client")?;

    let mut orchestrator = Orchestrator::new(suites, run.config.clone(), driver, store);
    let records = orchestrator.run().await?;

    let output_config = orchestrator.output_config()?;
    let bytes = output::serialize(&records, &output_config)?;

    let output_path = cli
        .output
        .or_else(|| {
            run.output
                .as_ref()
                .and_then(|o| o.path.as_ref().map(PathBuf::from))
        });
    output::write_to(&bytes, output_path.as_deref())?;

    tracing::info!("Saved {} items", records.len());
    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("harvestman=info,warn"),
            1 => EnvFilter::new("harvestman=debug,info"),
            2 => EnvFilter::new("harvestman=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Prints what a run would do without doing it
fn print_plan(run: &harvestman::config::RunFile, suites: &[harvestman::Suite]) {
    println!("=== Harvestman Dry Run ===\n");

    println!("Output format: {}", run.config.format.as_deref().unwrap_or("json"));
    match run.output.as_ref().and_then(|o| o.path.as_deref()) {
        Some(path) => println!("Output path: {}", path),
        None => println!("Output path: stdout"),
    }
    match &run.state {
        Some(settings) => println!("State database: {}", settings.path),
        None => println!("State database: none (crawls never resume)"),
    }

    println!("\nSuites ({}):", suites.len());
    for suite in suites {
        println!("  {} ({} scrapers)", suite.title, suite.scrapers.len());
        for scraper in &suite.scrapers {
            println!("    - {} ({} seed urls)", scraper.name, scraper.urls.len());
            for url in &scraper.urls {
                println!("      * {}", url);
            }
        }
    }

    println!("\n✓ Run file is valid");
}
