use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use tracing::{debug, warn};

use crate::fixtures::{fixture_path, slug};
use crate::report::{ReportEvent, Reporter};

/// Why a fixture fetch failed. Timeouts get their own status wording.
#[derive(Debug)]
pub enum FetchError {
    Timeout,
    Failed(anyhow::Error),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Timeout => write!(f, "fetch timed out"),
            FetchError::Failed(err) => write!(f, "{err:#}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Retrieval backend for raw fixture source text.
pub trait FixtureSource {
    fn fetch(&self, slug: &str) -> Result<String, FetchError>;

    /// Human-readable location of a fixture, for status messages.
    fn describe(&self, slug: &str) -> String;
}

/// HTTP backend used by the interactive profile. Each fixture is fetched
/// from `<base_url>/3rdparty/<slug>.js` with a per-request timeout.
pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("parsemark/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl FixtureSource for HttpSource {
    fn fetch(&self, slug: &str) -> Result<String, FetchError> {
        let url = self.describe(slug);
        let response = self.client.get(&url).send().map_err(|err| {
            if err.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Failed(anyhow!(err).context(format!("Failed to reach {url}")))
            }
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Failed(anyhow!(
                "fixture endpoint {url} returned status {status}"
            )));
        }
        response.text().map_err(|err| {
            if err.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Failed(anyhow!(err).context(format!("Failed to read body of {url}")))
            }
        })
    }

    fn describe(&self, slug: &str) -> String {
        format!("{}/{}", self.base_url, fixture_path(slug))
    }
}

/// Local filesystem backend used by the batch profile.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl FixtureSource for DirSource {
    fn fetch(&self, slug: &str) -> Result<String, FetchError> {
        let path = self.root.join(fixture_path(slug));
        std::fs::read_to_string(&path).map_err(|err| {
            FetchError::Failed(anyhow!(err).context(format!(
                "Failed to read fixture at {}",
                path.display()
            )))
        })
    }

    fn describe(&self, slug: &str) -> String {
        self.root.join(fixture_path(slug)).display().to_string()
    }
}

/// What to do when a single fixture fails to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Record an error marker and keep loading the rest of the suite.
    Continue,
    /// Treat the failure as fatal for the whole run.
    Abort,
}

/// Loaded fixture sources keyed by slug. Written only during the load
/// phase; read-only while benchmarks run.
#[derive(Debug, Default)]
pub struct SourceTable {
    sources: BTreeMap<String, String>,
    attempted: BTreeSet<String>,
    total_bytes: u64,
}

impl SourceTable {
    pub fn get(&self, slug: &str) -> Option<&str> {
        self.sources.get(slug).map(String::as_str)
    }

    /// Whether a load was attempted for this slug, successful or not.
    pub fn attempted(&self, slug: &str) -> bool {
        self.attempted.contains(slug)
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    fn insert(&mut self, slug: String, text: String) {
        self.total_bytes += text.len() as u64;
        self.attempted.insert(slug.clone());
        self.sources.insert(slug, text);
    }

    fn record_failure(&mut self, slug: String) {
        self.attempted.insert(slug);
    }
}

/// Load every fixture in the suite, strictly one at a time and in suite
/// order. Under [`FailurePolicy::Continue`] a failed fixture is reported
/// with an error marker and loading moves on; under
/// [`FailurePolicy::Abort`] the first failure aborts the load phase.
/// Pacing is cosmetic and may be zero.
pub fn load_all(
    suite: &[&str],
    source: &dyn FixtureSource,
    reporter: &mut dyn Reporter,
    pacing: Duration,
    policy: FailurePolicy,
) -> Result<SourceTable> {
    let mut table = SourceTable::default();
    let count = suite.len();
    for (index, name) in suite.iter().enumerate() {
        reporter.report(ReportEvent::StatusChanged {
            text: format!("Please wait. Loading {name} ({} of {count})", index + 1),
        })?;
        if index > 0 && !pacing.is_zero() {
            thread::sleep(pacing);
        }
        let key = slug(name);
        match source.fetch(&key) {
            Ok(text) => {
                let bytes = text.len() as u64;
                debug!(fixture = %name, bytes, "loaded fixture");
                table.insert(key, text);
                reporter.report(ReportEvent::SizeLoaded {
                    fixture: name.to_string(),
                    bytes: Some(bytes),
                })?;
            }
            Err(err) => {
                table.record_failure(key.clone());
                if policy == FailurePolicy::Abort {
                    return Err(anyhow!(err).context(format!("Failed to load fixture {name}")));
                }
                warn!(fixture = %name, error = %err, "fixture load failed");
                let text = match err {
                    FetchError::Timeout => format!("Error: time out while loading {name}"),
                    FetchError::Failed(_) => {
                        format!("Please wait. Error loading {}", source.describe(&key))
                    }
                };
                reporter.report(ReportEvent::StatusChanged { text })?;
                reporter.report(ReportEvent::SizeLoaded {
                    fixture: name.to_string(),
                    bytes: None,
                })?;
            }
        }
    }
    reporter.report(ReportEvent::TotalSizeLoaded {
        bytes: table.total_bytes(),
    })?;
    reporter.report(ReportEvent::StatusChanged {
        text: "Ready.".into(),
    })?;
    Ok(table)
}
