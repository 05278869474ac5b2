use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use parsemark::config::{HarnessSettings, default_config_path};
use parsemark::env::{self, Profile};
use parsemark::fixtures::Suite;

#[derive(Parser, Debug)]
#[command(name = "parsemark", version, about = "Parsing throughput benchmark harness", long_about = None)]
struct Cli {
    /// Suite to run in batch mode (implies --batch; defaults to full).
    #[arg(value_enum)]
    suite: Option<Suite>,

    /// Force the batch profile even on a terminal.
    #[arg(long, action = ArgAction::SetTrue)]
    batch: bool,

    /// Increase logging verbosity.
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,

    /// Custom config path.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the HTTP base URL fixtures are fetched from.
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Override the directory fixtures are read from in batch mode.
    #[arg(long, value_name = "DIR")]
    fixture_dir: Option<PathBuf>,

    /// Override the number of timed trials per fixture.
    #[arg(long, value_name = "COUNT")]
    trials: Option<u32>,
}

fn init_tracing(verbose: bool, profile: Profile) {
    // In the interactive profile the live table owns the terminal; stray
    // log lines would shift the cursor, so only errors get through unless
    // RUST_LOG overrides.
    let level = match (profile, verbose) {
        (Profile::Interactive, _) => "parsemark=error",
        (Profile::Batch, true) => "parsemark=debug",
        (Profile::Batch, false) => "parsemark=info",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let force_batch = cli.batch || cli.suite.is_some();
    let profile = env::detect_profile(force_batch);
    init_tracing(cli.verbose, profile);

    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    let mut settings = HarnessSettings::load_or_default(&config_path)?;
    if let Some(base_url) = cli.base_url {
        settings.base_url = base_url;
    }
    if let Some(fixture_dir) = cli.fixture_dir {
        settings.fixture_dir = fixture_dir;
    }
    if let Some(trials) = cli.trials {
        settings.trials = trials;
    }

    match profile {
        Profile::Batch => {
            env::run_batch(&settings, cli.suite.unwrap_or(Suite::Full))?;
        }
        Profile::Interactive => env::run_interactive(&settings)?,
    }
    Ok(())
}
