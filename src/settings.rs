use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

const ENABLE_LOGS: bool = true;

use crate::log_warn;

pub const SETTINGS_PATH_ENV: &str = "DEEPFAKE_DETECTIVE_SETTINGS";
pub const DEBUG_ENV: &str = "DEEPFAKE_DETECTIVE_DEBUG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerSettings {
    /// How long the simulated analyzer waits before answering.
    pub simulated_delay_ms: u64,
    /// Upper bound on a single analysis call.
    pub analysis_timeout_ms: u64,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            simulated_delay_ms: 3_000,
            analysis_timeout_ms: 30_000,
        }
    }
}

impl AnalyzerSettings {
    pub fn simulated_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_delay_ms)
    }

    pub fn analysis_timeout(&self) -> Duration {
        Duration::from_millis(self.analysis_timeout_ms)
    }

    /// `DEEPFAKE_DETECTIVE_DEBUG=1` drops the simulated delay.
    pub fn with_env_overrides(mut self) -> Self {
        let debug_mode = std::env::var(DEBUG_ENV)
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if debug_mode {
            self.simulated_delay_ms = 0;
        }
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct UserSettings {
    analyzer: AnalyzerSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: UserSettings,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log_warn!(
                    "Ignoring unreadable settings at {}: {err}",
                    path.display()
                );
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self { path, data })
    }

    /// `$DEEPFAKE_DETECTIVE_SETTINGS`, else `<config dir>/deepfake-detective/settings.json`.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(SETTINGS_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        dirs::config_dir()
            .map(|dir| dir.join("deepfake-detective").join("settings.json"))
            .ok_or_else(|| anyhow!("no configuration directory available"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn analyzer(&self) -> AnalyzerSettings {
        self.data.analyzer.clone()
    }

    /// Writes the current settings if no file exists yet, so there is
    /// something to edit. Returns whether a file was written.
    pub fn save_if_missing(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        self.persist(&self.data)?;
        Ok(true)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
