//! Benchmark harness measuring the parsing throughput of a script parser
//! against a fixed corpus of real-world sources, in either an interactive
//! terminal session or a headless batch run. The parser and the timing
//! engine are collaborators behind trait seams; the harness only
//! orchestrates loading, measurement and reporting.

pub mod config;
pub mod engine;
pub mod env;
pub mod fixtures;
pub mod loader;
pub mod parser;
pub mod report;
pub mod runner;

use std::time::Duration;

use anyhow::{Result, bail};
use tracing::info_span;

use crate::engine::BenchEngine;
use crate::fixtures::slug;
use crate::loader::{FailurePolicy, FixtureSource, SourceTable};
use crate::parser::ScriptParser;
use crate::report::Reporter;
use crate::runner::RunStatistics;

/// Lifecycle of one harness instance. Loading always completes (or fails)
/// before any benchmark runs; the two phases never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Running,
}

/// Orchestrator owning the parser and timing-engine collaborators and the
/// loaded source table. `load` must succeed before `run` is permitted;
/// the table is written only while loading and read-only while running.
pub struct Harness {
    parser: Box<dyn ScriptParser>,
    engine: Box<dyn BenchEngine>,
    phase: Phase,
    table: SourceTable,
}

impl Harness {
    pub fn new(parser: Box<dyn ScriptParser>, engine: Box<dyn BenchEngine>) -> Self {
        Self {
            parser,
            engine,
            phase: Phase::Idle,
            table: SourceTable::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn table(&self) -> &SourceTable {
        &self.table
    }

    /// Load every fixture in the suite through the given source, replacing
    /// any previously loaded table.
    pub fn load(
        &mut self,
        suite: &[&str],
        source: &dyn FixtureSource,
        reporter: &mut dyn Reporter,
        pacing: Duration,
        policy: FailurePolicy,
    ) -> Result<()> {
        if !matches!(self.phase, Phase::Idle | Phase::Ready) {
            bail!("cannot load fixtures while the harness is {:?}", self.phase);
        }
        let span = info_span!("harness.load", fixtures = suite.len());
        let _span_guard = span.enter();
        self.phase = Phase::Loading;
        match loader::load_all(suite, source, reporter, pacing, policy) {
            Ok(table) => {
                self.table = table;
                self.phase = Phase::Ready;
                Ok(())
            }
            Err(err) => {
                self.phase = Phase::Idle;
                Err(err)
            }
        }
    }

    /// Benchmark every fixture in the suite against the loaded table.
    /// Refuses to start unless loading has completed and each requested
    /// fixture has at least had a load attempt.
    pub fn run(
        &mut self,
        suite: &[&str],
        reporter: &mut dyn Reporter,
        pacing: Duration,
    ) -> Result<RunStatistics> {
        if self.phase != Phase::Ready {
            bail!(
                "benchmarks need a loaded source table; harness is {:?}",
                self.phase
            );
        }
        for name in suite {
            if !self.table.attempted(&slug(name)) {
                bail!("fixture {name} was never loaded");
            }
        }
        let span = info_span!("harness.run", fixtures = suite.len());
        let _span_guard = span.enter();
        self.phase = Phase::Running;
        let result = runner::run_suite(
            suite,
            &self.table,
            self.parser.as_ref(),
            self.engine.as_ref(),
            reporter,
            pacing,
        );
        self.phase = Phase::Ready;
        result
    }
}
