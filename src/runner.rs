use std::thread;
use std::time::Duration;

use anyhow::Result;
use tracing::warn;

use crate::engine::BenchEngine;
use crate::fixtures::slug;
use crate::loader::SourceTable;
use crate::parser::ScriptParser;
use crate::report::{ReportEvent, Reporter, Timing, TimingUpdate};

/// Outcome of one fixture's benchmark; `None` timing means the benchmark
/// could not run (its source never loaded).
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureRun {
    pub fixture: String,
    pub timing: Option<Timing>,
}

/// Accumulated results for one suite run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunStatistics {
    pub fixtures: Vec<FixtureRun>,
    pub total_ms: f64,
}

/// Benchmark every fixture in the suite, one at a time and in suite order.
/// True parallel timing would contend for the execution resource and
/// corrupt the measurements. Pacing between fixtures is cosmetic and may
/// be zero.
pub fn run_suite(
    suite: &[&str],
    table: &SourceTable,
    parser: &dyn ScriptParser,
    engine: &dyn BenchEngine,
    reporter: &mut dyn Reporter,
    pacing: Duration,
) -> Result<RunStatistics> {
    reporter.begin_run()?;
    reporter.report(ReportEvent::StatusChanged {
        text: "Please wait. Running benchmarks...".into(),
    })?;

    let mut stats = RunStatistics::default();
    // Statement counts recorded per trial so the optimizer cannot discard
    // the parse; consumed only by black_box below.
    let mut artifacts: Vec<usize> = Vec::new();
    for (index, name) in suite.iter().enumerate() {
        if index > 0 && !pacing.is_zero() {
            thread::sleep(pacing);
        }
        let key = slug(name);
        let Some(source) = table.get(&key) else {
            warn!(fixture = %name, "source never loaded; skipping benchmark");
            reporter.report(ReportEvent::TimeMeasured {
                fixture: name.to_string(),
                update: TimingUpdate::Errored,
            })?;
            stats.fixtures.push(FixtureRun {
                fixture: name.to_string(),
                timing: None,
            });
            continue;
        };

        reporter.report(ReportEvent::TimeMeasured {
            fixture: name.to_string(),
            update: TimingUpdate::Running,
        })?;
        let mut trial = || artifacts.push(parser.parse(source));
        let measured = engine.bench(&key, &mut trial);
        let timing = Timing {
            mean_ms: measured.mean * 1000.0,
            variance_ms: measured.variance * 1000.0,
        };
        stats.total_ms += timing.mean_ms;
        stats.fixtures.push(FixtureRun {
            fixture: name.to_string(),
            timing: Some(timing),
        });
        reporter.report(ReportEvent::TimeMeasured {
            fixture: name.to_string(),
            update: TimingUpdate::Measured(timing),
        })?;
    }
    std::hint::black_box(&artifacts);

    reporter.report(ReportEvent::TotalTimeMeasured {
        total_ms: stats.total_ms,
    })?;
    reporter.report(ReportEvent::StatusChanged {
        text: "Ready.".into(),
    })?;
    Ok(stats)
}
