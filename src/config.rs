use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Tunable harness settings. Pacing values smooth the interactive display
/// and are not correctness requirements; zero disables them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessSettings {
    /// Base URL fixtures are fetched from in the interactive profile.
    pub base_url: String,
    /// Directory fixtures are read from in the batch profile.
    pub fixture_dir: PathBuf,
    /// Per-request fetch deadline, in seconds.
    pub fetch_timeout_secs: u64,
    /// Delay between fixture fetches, in milliseconds.
    pub load_pacing_ms: u64,
    /// Delay between fixture benchmarks, in milliseconds.
    pub run_pacing_ms: u64,
    /// Timed trials per fixture.
    pub trials: u32,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            fixture_dir: PathBuf::from("."),
            fetch_timeout_secs: 30,
            load_pacing_ms: 100,
            run_pacing_ms: 200,
            trials: 20,
        }
    }
}

impl HarnessSettings {
    /// Load settings from disk, writing defaults if missing.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Unable to read config at {}", path.display()))?;
            let parsed: Self = serde_json::from_str(&raw)
                .with_context(|| format!("Malformed config at {}", path.display()))?;
            Ok(parsed)
        } else {
            let settings = Self::default();
            settings.save(path)?;
            Ok(settings)
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory {}", parent.display())
            })?;
        }
        let serialised = serde_json::to_string_pretty(self)?;
        fs::write(path, serialised)
            .with_context(|| format!("Failed to persist config to {}", path.display()))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn load_pacing(&self) -> Duration {
        Duration::from_millis(self.load_pacing_ms)
    }

    pub fn run_pacing(&self) -> Duration {
        Duration::from_millis(self.run_pacing_ms)
    }
}

/// Platform config file used when no `--config` override is given.
pub fn default_config_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("dev", "parsemark", "parsemark")
        .context("Unable to resolve platform config directory")?;
    Ok(dirs.config_dir().join("parsemark.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_config_writes_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("conf").join("parsemark.json");
        let settings = HarnessSettings::load_or_default(&path).unwrap();
        assert!(path.exists());
        assert_eq!(settings.fetch_timeout_secs, 30);
        assert_eq!(settings.trials, 20);
    }

    #[test]
    fn saved_settings_round_trip() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("parsemark.json");
        let mut settings = HarnessSettings::default();
        settings.trials = 5;
        settings.base_url = "http://fixtures.local".into();
        settings.save(&path).unwrap();

        let loaded = HarnessSettings::load_or_default(&path).unwrap();
        assert_eq!(loaded.trials, 5);
        assert_eq!(loaded.base_url, "http://fixtures.local");
        assert_eq!(loaded.load_pacing(), Duration::from_millis(100));
    }

    #[test]
    fn default_config_path_names_the_harness_file() {
        let path = default_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "parsemark.json");
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("parsemark.json");
        fs::write(&path, r#"{ "trials": 3 }"#).unwrap();
        let loaded = HarnessSettings::load_or_default(&path).unwrap();
        assert_eq!(loaded.trials, 3);
        assert_eq!(loaded.fetch_timeout_secs, 30);
    }
}
