use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use dialoguer::Select;
use tracing::info;

use crate::Harness;
use crate::config::HarnessSettings;
use crate::engine::TrialEngine;
use crate::fixtures::Suite;
use crate::loader::{DirSource, FailurePolicy, HttpSource};
use crate::parser::OxcParser;
use crate::report::{LogReporter, TableReporter};
use crate::runner::RunStatistics;

/// Behavioral profile picked once at launch and final for the process
/// lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Terminal session with a live table and a run menu.
    Interactive,
    /// Headless run writing log lines.
    Batch,
}

/// Choose the profile: batch when forced or when stdout is not a terminal.
pub fn detect_profile(force_batch: bool) -> Profile {
    if force_batch || !io::stdout().is_terminal() {
        Profile::Batch
    } else {
        Profile::Interactive
    }
}

fn build_harness(settings: &HarnessSettings) -> Harness {
    Harness::new(
        Box::new(OxcParser),
        Box::new(TrialEngine::new(settings.trials)),
    )
}

/// Headless profile: load the requested suite from the local fixture
/// directory (a read failure is fatal) and run it immediately.
pub fn run_batch(settings: &HarnessSettings, suite: Suite) -> Result<RunStatistics> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        suite = %suite,
        fixture_dir = %settings.fixture_dir.display(),
        "starting batch benchmark run"
    );
    let source = DirSource::new(settings.fixture_dir.clone());
    let mut reporter = LogReporter::new(io::stdout().lock());
    let mut harness = build_harness(settings);
    harness.load(
        suite.fixtures(),
        &source,
        &mut reporter,
        std::time::Duration::ZERO,
        FailurePolicy::Abort,
    )?;
    harness.run(suite.fixtures(), &mut reporter, std::time::Duration::ZERO)
}

/// Interactive profile: draw the table, load the full corpus over HTTP
/// (per-fixture failures are recorded, not fatal), then offer the two run
/// actions until the user quits. The menu only appears between runs, so
/// both actions are naturally unavailable while a load or run is in
/// progress.
pub fn run_interactive(settings: &HarnessSettings) -> Result<()> {
    let source = HttpSource::new(&settings.base_url, settings.fetch_timeout())?;
    let mut reporter = TableReporter::new()?;
    let mut harness = build_harness(settings);
    harness.load(
        Suite::Full.fixtures(),
        &source,
        &mut reporter,
        settings.load_pacing(),
        FailurePolicy::Continue,
    )?;

    loop {
        // The table repaints relative to the cursor, so the menu must
        // clear itself without leaving a report line behind.
        let choice = Select::new()
            .with_prompt("Benchmarks")
            .items(&["Run quick suite", "Run full suite", "Quit"])
            .default(0)
            .report(false)
            .interact()
            .context("Benchmark menu interaction failed")?;
        let suite = match choice {
            0 => Suite::Quick,
            1 => Suite::Full,
            _ => return Ok(()),
        };
        harness.run(suite.fixtures(), &mut reporter, settings.run_pacing())?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forced_batch_wins_over_terminal_detection() {
        assert_eq!(detect_profile(true), Profile::Batch);
    }

    #[test]
    fn unforced_detection_follows_the_terminal() {
        let expected = if io::stdout().is_terminal() {
            Profile::Interactive
        } else {
            Profile::Batch
        };
        assert_eq!(detect_profile(false), expected);
    }
}
