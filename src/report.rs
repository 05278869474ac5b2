use std::collections::HashMap;
use std::io::{self, Write};

use anyhow::Result;
use console::Term;
use tracing::{debug, info, warn};

use crate::fixtures::{FULL_SUITE, size_label};

/// Per-fixture timing in milliseconds, converted from the engine's seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub mean_ms: f64,
    pub variance_ms: f64,
}

/// State of a fixture's timing cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimingUpdate {
    /// The benchmark for this fixture is about to run.
    Running,
    /// No measurement could be taken (for example the load failed).
    Errored,
    Measured(Timing),
}

/// Incremental progress notifications emitted by the loader and runner.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportEvent {
    /// A fixture finished loading; `None` marks a failed load.
    SizeLoaded { fixture: String, bytes: Option<u64> },
    TotalSizeLoaded { bytes: u64 },
    TimeMeasured { fixture: String, update: TimingUpdate },
    TotalTimeMeasured { total_ms: f64 },
    StatusChanged { text: String },
}

/// Presentation sink for harness progress. Implementations must surface
/// every event; failed measurements render an explicit error marker rather
/// than a blank cell.
pub trait Reporter {
    fn report(&mut self, event: ReportEvent) -> Result<()>;

    /// Called once before a run starts so displays can drop stale timings.
    fn begin_run(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Batch reporter writing one line per completed fixture to a sink, in the
/// classic `<name> size <KiB> time <ms> variance <ms>` shape, followed by a
/// single totals line. Load sizes are remembered and folded into the
/// measurement line; status changes go to the tracing log.
pub struct LogReporter<W: Write> {
    sink: W,
    sizes: HashMap<String, u64>,
    total_bytes: Option<u64>,
}

impl<W: Write> LogReporter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            sizes: HashMap::new(),
            total_bytes: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    fn size_cell(&self, fixture: &str) -> String {
        self.sizes
            .get(fixture)
            .map(|bytes| size_label(*bytes))
            .unwrap_or_else(|| "Error".into())
    }
}

impl<W: Write> Reporter for LogReporter<W> {
    fn report(&mut self, event: ReportEvent) -> Result<()> {
        match event {
            ReportEvent::SizeLoaded { fixture, bytes } => {
                if let Some(bytes) = bytes {
                    self.sizes.insert(fixture.clone(), bytes);
                }
                debug!(fixture = %fixture, bytes = ?bytes, "fixture loaded");
            }
            ReportEvent::TotalSizeLoaded { bytes } => {
                self.total_bytes = Some(bytes);
                debug!(total_bytes = bytes, "load phase complete");
            }
            ReportEvent::TimeMeasured { fixture, update } => match update {
                TimingUpdate::Running => debug!(fixture = %fixture, "benchmarking"),
                TimingUpdate::Errored => {
                    writeln!(self.sink, "{fixture} size Error time Error variance Error")?;
                }
                TimingUpdate::Measured(timing) => {
                    let size = self.size_cell(&fixture);
                    writeln!(
                        self.sink,
                        "{fixture} size {size} time {:.1} variance {:.1}",
                        timing.mean_ms, timing.variance_ms
                    )?;
                }
            },
            ReportEvent::TotalTimeMeasured { total_ms } => {
                let size = self
                    .total_bytes
                    .map(size_label)
                    .unwrap_or_else(|| "Error".into());
                writeln!(self.sink, "Total size {size} time {total_ms:.1}")?;
                self.sink.flush()?;
            }
            ReportEvent::StatusChanged { text } => info!("{text}"),
        }
        Ok(())
    }
}

const NAME_WIDTH: usize = 20;
const CELL_WIDTH: usize = 10;

struct Row {
    name: &'static str,
    size: String,
    time: String,
    variance: String,
}

/// Interactive reporter rendering a live table on the terminal. The table
/// is drawn once and individual lines are repainted as events arrive.
pub struct TableReporter {
    term: Term,
    rows: Vec<Row>,
    total_size: String,
    total_time: String,
    status: String,
}

impl TableReporter {
    /// Draw the empty table (one row per full-suite fixture, a totals row
    /// and a status line) and return the reporter tracking it.
    pub fn new() -> Result<Self> {
        let reporter = Self {
            term: Term::stdout(),
            rows: FULL_SUITE
                .iter()
                .map(|&name| Row {
                    name,
                    size: String::new(),
                    time: String::new(),
                    variance: String::new(),
                })
                .collect(),
            total_size: String::new(),
            total_time: String::new(),
            status: String::new(),
        };
        reporter.term.write_line(&format!(
            "parsemark {} — parsing throughput harness",
            env!("CARGO_PKG_VERSION")
        ))?;
        reporter.term.write_line(&format!(
            "{:<NAME_WIDTH$} {:>CELL_WIDTH$} {:>CELL_WIDTH$} {:>CELL_WIDTH$}",
            "Source", "Size (KiB)", "Time (ms)", "Variance"
        ))?;
        for row in &reporter.rows {
            reporter.term.write_line(&Self::render_row(row))?;
        }
        reporter.term.write_line(&reporter.render_total())?;
        reporter.term.write_line("")?;
        Ok(reporter)
    }

    fn render_row(row: &Row) -> String {
        format!(
            "{:<NAME_WIDTH$} {:>CELL_WIDTH$} {:>CELL_WIDTH$} {:>CELL_WIDTH$}",
            row.name, row.size, row.time, row.variance
        )
    }

    fn render_total(&self) -> String {
        format!(
            "{:<NAME_WIDTH$} {:>CELL_WIDTH$} {:>CELL_WIDTH$} {:>CELL_WIDTH$}",
            "Total", self.total_size, self.total_time, ""
        )
    }

    // Tracked block layout, top to bottom: header, one line per fixture
    // row, totals row, status line. Repaints count lines upward from the
    // cursor, which must rest on the line directly below the status line
    // between events; anything else printed to the terminal in the
    // meantime would shift every subsequent repaint.
    fn block_height(&self) -> usize {
        self.rows.len() + 3
    }

    fn status_offset(&self) -> usize {
        1
    }

    fn total_offset(&self) -> usize {
        2
    }

    fn row_offset(&self, index: usize) -> usize {
        self.block_height() - 1 - index
    }

    fn repaint(&self, from_bottom: usize, text: &str) -> io::Result<()> {
        self.term.move_cursor_up(from_bottom)?;
        self.term.clear_line()?;
        self.term.write_str(text)?;
        self.term.move_cursor_down(from_bottom)?;
        self.term.write_str("\r")?;
        Ok(())
    }

    fn repaint_row(&self, index: usize) -> io::Result<()> {
        self.repaint(self.row_offset(index), &Self::render_row(&self.rows[index]))
    }

    fn repaint_total(&self) -> io::Result<()> {
        self.repaint(self.total_offset(), &self.render_total())
    }

    fn repaint_status(&self) -> io::Result<()> {
        self.repaint(self.status_offset(), &self.status)
    }

    fn row_index(&self, fixture: &str) -> Option<usize> {
        self.rows.iter().position(|row| row.name == fixture)
    }
}

impl Reporter for TableReporter {
    fn report(&mut self, event: ReportEvent) -> Result<()> {
        match event {
            ReportEvent::SizeLoaded { fixture, bytes } => {
                let Some(index) = self.row_index(&fixture) else {
                    warn!(fixture = %fixture, "size event for unknown fixture");
                    return Ok(());
                };
                self.rows[index].size = match bytes {
                    Some(bytes) => size_label(bytes),
                    None => "Error".into(),
                };
                self.repaint_row(index)?;
            }
            ReportEvent::TotalSizeLoaded { bytes } => {
                self.total_size = size_label(bytes);
                self.repaint_total()?;
            }
            ReportEvent::TimeMeasured { fixture, update } => {
                let Some(index) = self.row_index(&fixture) else {
                    warn!(fixture = %fixture, "timing event for unknown fixture");
                    return Ok(());
                };
                let row = &mut self.rows[index];
                match update {
                    TimingUpdate::Running => {
                        row.time = "Running...".into();
                        row.variance = String::new();
                    }
                    TimingUpdate::Errored => {
                        row.time = "Error".into();
                        row.variance = "Error".into();
                    }
                    TimingUpdate::Measured(timing) => {
                        row.time = format!("{:.1}", timing.mean_ms);
                        row.variance = format!("{:.1}", timing.variance_ms);
                    }
                }
                self.repaint_row(index)?;
            }
            ReportEvent::TotalTimeMeasured { total_ms } => {
                self.total_time = format!("{total_ms:.1}");
                self.repaint_total()?;
            }
            ReportEvent::StatusChanged { text } => {
                self.status = text;
                self.repaint_status()?;
            }
        }
        Ok(())
    }

    fn begin_run(&mut self) -> Result<()> {
        for index in 0..self.rows.len() {
            self.rows[index].time = String::new();
            self.rows[index].variance = String::new();
            self.repaint_row(index)?;
        }
        self.total_time = String::new();
        self.repaint_total()?;
        Ok(())
    }
}

/// Event-recording reporter used by orchestration tests.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingReporter {
    pub events: Vec<ReportEvent>,
}

#[cfg(test)]
impl Reporter for RecordingReporter {
    fn report(&mut self, event: ReportEvent) -> Result<()> {
        self.events.push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measured(mean_ms: f64, variance_ms: f64) -> TimingUpdate {
        TimingUpdate::Measured(Timing {
            mean_ms,
            variance_ms,
        })
    }

    #[test]
    fn log_reporter_folds_sizes_into_measurement_lines() {
        let mut reporter = LogReporter::new(Vec::new());
        reporter
            .report(ReportEvent::SizeLoaded {
                fixture: "Backbone 0.9.2".into(),
                bytes: Some(1024),
            })
            .unwrap();
        reporter
            .report(ReportEvent::TotalSizeLoaded { bytes: 1024 })
            .unwrap();
        reporter
            .report(ReportEvent::TimeMeasured {
                fixture: "Backbone 0.9.2".into(),
                update: measured(12.34, 0.56),
            })
            .unwrap();
        reporter
            .report(ReportEvent::TotalTimeMeasured { total_ms: 12.34 })
            .unwrap();

        let output = String::from_utf8(reporter.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            [
                "Backbone 0.9.2 size 1.0 time 12.3 variance 0.6",
                "Total size 1.0 time 12.3",
            ]
        );
    }

    #[test]
    fn log_reporter_marks_failures_explicitly() {
        let mut reporter = LogReporter::new(Vec::new());
        reporter
            .report(ReportEvent::SizeLoaded {
                fixture: "Angular 1.0.2".into(),
                bytes: None,
            })
            .unwrap();
        reporter
            .report(ReportEvent::TimeMeasured {
                fixture: "Angular 1.0.2".into(),
                update: TimingUpdate::Errored,
            })
            .unwrap();

        let output = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(
            output.lines().collect::<Vec<_>>(),
            ["Angular 1.0.2 size Error time Error variance Error"]
        );
    }

    #[test]
    fn table_repaint_offsets_map_each_tracked_line_once() {
        // Offsets are counted from the line below the status line; the
        // menu between runs must leave the cursor there untouched.
        let reporter = TableReporter::new().unwrap();
        assert_eq!(reporter.status_offset(), 1);
        assert_eq!(reporter.total_offset(), 2);
        assert_eq!(reporter.row_offset(reporter.rows.len() - 1), 3);
        assert_eq!(reporter.row_offset(0), reporter.block_height() - 1);

        let mut offsets = vec![reporter.status_offset(), reporter.total_offset()];
        offsets.extend((0..reporter.rows.len()).map(|index| reporter.row_offset(index)));
        offsets.sort_unstable();
        offsets.dedup();
        // Every line except the header is addressable, and no two targets
        // collide.
        assert_eq!(offsets.len(), reporter.rows.len() + 2);
        assert!(offsets.iter().all(|&o| o < reporter.block_height()));
    }

    #[test]
    fn log_reporter_running_marker_emits_no_line() {
        let mut reporter = LogReporter::new(Vec::new());
        reporter
            .report(ReportEvent::TimeMeasured {
                fixture: "jQuery 1.8.2".into(),
                update: TimingUpdate::Running,
            })
            .unwrap();
        assert!(reporter.into_inner().is_empty());
    }
}
