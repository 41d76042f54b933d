use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

/// Controls how pytest is invoked.
#[derive(Debug, Deserialize)]
pub struct RunnerConfig {
    /// Binary name or path to invoke instead of `pytest`.
    #[serde(default = "default_command")]
    pub command: String,
    /// Extra arguments appended to every invocation, split shell-style.
    /// Example: "--maxfail=20 -p no:cacheprovider"
    #[serde(default)]
    pub args: Option<String>,
    /// Fixed directory for the JSON report file. When unset, a fresh
    /// temporary directory is used so parallel dashboards don't collide.
    #[serde(default)]
    pub report_dir: Option<PathBuf>,
    /// Adds `-s --maxfail=1 --disable-warnings` for close-up debugging.
    #[serde(default)]
    pub debug: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: None,
            report_dir: None,
            debug: false,
        }
    }
}

fn default_command() -> String {
    "pytest".to_string()
}

/// Controls which files are excluded during test discovery.
#[derive(Debug, Default, Deserialize)]
pub struct DiscoveryConfig {
    /// Glob patterns (relative to the project root) of files to skip.
    /// Example: ["integration/**", "**/test_slow_*.py"]
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl Config {
    /// Load `pytest-dash.toml` from the project root, falling back to
    /// defaults if absent or invalid.
    pub fn load(project: &Path) -> Self {
        let path = project.join("pytest-dash.toml");
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        toml::from_str(&content).unwrap_or_default()
    }
}
