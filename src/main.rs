use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tradesheet::{
    config::{DEFAULT_TOP_N, ReportConfig},
    prelude::*,
};

/// Ranks companies in a folder of trading files by asset value, volume,
/// market value and net long activity.
#[derive(Debug, Parser)]
#[command(name = "tradesheet", version, about)]
struct Cli {
    /// Folder holding `marks.txt` and the `xa*` trading files [default: <cwd>/test_data]
    #[arg(long, value_name = "DIR")]
    folder: Option<PathBuf>,

    /// Maximum number of rows per report
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top_n: usize,

    /// Also write every report into this directory
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// File format used with `--out`
    #[arg(long, default_value = "csv")]
    format: ReportFormat,
}

impl From<Cli> for ReportConfig {
    fn from(cli: Cli) -> Self {
        let defaults = ReportConfig::default();
        Self {
            folder: cli.folder.unwrap_or(defaults.folder),
            top_n: cli.top_n,
            out_dir: cli.out,
            format: cli.format,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();

    let config = ReportConfig::from(Cli::parse());
    info!(folder = %config.folder.display(), top_n = config.top_n, "Starting report run");

    let engine = ReportEngine::new(config.source());
    let Some(set) = engine
        .report_set(config.top_n)
        .context("Failed to build reports")?
    else {
        for title in TITLES {
            println!("{title}\nno result\n");
        }
        return Ok(());
    };

    println!("{}\n{}\n", TITLES[0], set.long_short);
    println!("{}\n{}\n", TITLES[1], set.market);
    println!("{}\n{}\n", TITLES[2], set.volume);
    println!("{}\n{}\n", TITLES[3], set.asset);

    if let Some(dir) = &config.out_dir {
        set.write_to(dir, config.format)
            .with_context(|| format!("Failed to write reports to {}", dir.display()))?;
    }

    Ok(())
}

const TITLES: [&str; 4] = [
    "Net long companies by long count",
    "Top companies by market value",
    "Top companies by volume",
    "Top companies by asset value",
];

// ================================================================================================
// Tracing Configuration
// ================================================================================================

/// Logs go to stderr so stdout only carries the reports.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
