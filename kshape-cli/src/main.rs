//! K-Shape CLI: build the K-shaped economy indices and manage offline data.
//!
//! Commands:
//! - `build`: run the pipeline (from FRED, or offline from a CSV directory)
//! - `fetch`: download every configured series as fredgraph CSV
//! - `config`: print the default configuration as TOML

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kshape_core::data::{save_series, FredProvider, LocalCsvProvider, SeriesCache, SeriesProvider};
use kshape_core::export::write_table;
use kshape_core::fingerprint::RunFingerprint;
use kshape_core::pipeline::{K_LOWER, K_LOWER_NOMINAL_WAGE, K_UPPER};
use kshape_core::{run_pipeline, Outcome, PipelineConfig, PipelineOutput};
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "kshape",
    about = "K-Shape CLI: K-shaped economy composite indices from FRED data"
)]
struct Cli {
    /// Log at debug level.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline and print a summary.
    Build {
        /// Path to a TOML config file. Defaults to the built-in configuration.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Offline mode: read `<SERIES_ID>.csv` files from this directory instead of FRED.
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Write the final table here (`.csv` or `.parquet`).
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Download every configured series as fredgraph CSV for offline builds.
    Fetch {
        /// Directory to write `<SERIES_ID>.csv` files into.
        #[arg(long, default_value = "data")]
        out_dir: PathBuf,

        /// Path to a TOML config file. Defaults to the built-in configuration.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the default configuration as TOML.
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Build {
            config,
            data_dir,
            output,
        } => run_build(config.as_deref(), data_dir, output.as_deref()),
        Commands::Fetch { out_dir, config } => run_fetch(&out_dir, config.as_deref()),
        Commands::Config => {
            print!("{}", PipelineConfig::default().to_toml()?);
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn remote_or_local(config: &PipelineConfig, data_dir: Option<PathBuf>) -> Result<Box<dyn SeriesProvider>> {
    Ok(match data_dir {
        Some(dir) => Box::new(LocalCsvProvider::new(dir)),
        None => Box::new(FredProvider::new(config.http_timeout())?),
    })
}

fn run_build(config_path: Option<&Path>, data_dir: Option<PathBuf>, output: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let provider = remote_or_local(&config, data_dir)?;
    let mut cache = SeriesCache::new();

    info!(provider = provider.name(), series = config.series.len(), "building indices");
    let outcome = run_pipeline(provider.as_ref(), &mut cache, &config);

    print_summary(&outcome);

    let fingerprint = RunFingerprint::new(&config, provider.name(), &outcome);
    println!();
    println!("--- Fingerprint ---");
    println!("{}", serde_json::to_string_pretty(&fingerprint)?);

    if let Some(path) = output {
        write_table(&outcome.value().table, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Table saved to: {}", path.display());
    }

    Ok(())
}

fn run_fetch(out_dir: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let provider = FredProvider::new(config.http_timeout())?;

    let mut failed = 0;
    for spec in &config.series {
        match provider.fetch(&spec.series_id) {
            Ok(observations) => {
                let path = save_series(out_dir, &spec.series_id, &observations)?;
                println!(
                    "{:<16} {:<16} {:>6} obs -> {}",
                    spec.name,
                    spec.series_id,
                    observations.len(),
                    path.display()
                );
            }
            Err(e) => {
                error!(series_id = %spec.series_id, error = %e, "fetch failed");
                eprintln!("Error for {} ({}): {e}", spec.name, spec.series_id);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        eprintln!("{failed} of {} series failed", config.series.len());
        std::process::exit(1);
    }

    Ok(())
}

fn last_value(output: &PipelineOutput, column: &str) -> String {
    output
        .table
        .column(column)
        .and_then(|values| values.last())
        .filter(|v| !v.is_nan())
        .map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

fn print_summary(outcome: &Outcome<PipelineOutput>) {
    let output = outcome.value();
    let table = &output.table;

    println!();
    println!("=== K-Shape Indices ===");
    match (table.first_date(), table.last_date()) {
        (Some(first), Some(last)) => println!("Period:         {first} to {last}"),
        _ => println!("Period:         (no data)"),
    }
    println!("Rows:           {}", table.height());
    println!("Columns:        {}", table.width());
    match output.baseline_row {
        Some(row) => println!("Baseline row:   {row}"),
        None => println!("Baseline row:   n/a"),
    }
    println!();
    println!("--- Latest ---");
    println!("K_UPPER:        {}", last_value(output, K_UPPER));
    println!("K_LOWER:        {}", last_value(output, K_LOWER));
    if table
        .column(K_LOWER_NOMINAL_WAGE)
        .is_some_and(|flag| flag.first() == Some(&1.0))
    {
        println!("                (K_LOWER uses the nominal wage)");
    }
    for warn in outcome.warnings() {
        println!("WARNING: {warn}");
    }
}
