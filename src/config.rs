use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::BoardLensError;
use crate::output::RetryPolicy;
use crate::providers::zenhub::Repository;

/// Configuration file structure for BoardLens.
///
/// Every field has a default matching the boards BoardLens was written for, so a run
/// without any configuration file still exports the stock repositories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// ZenHub API settings
    #[serde(default)]
    pub zenhub: ZenHubConfig,

    /// Export tuning
    #[serde(default)]
    pub export: ExportConfig,

    /// Repositories to export, processed in order
    #[serde(default = "default_repositories")]
    pub repositories: Vec<Repository>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ZenHubConfig {
    /// ZenHub GraphQL endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Workspace whose pipelines are exported
    #[serde(default = "default_workspace_id")]
    pub workspace_id: String,

    /// ZenHub personal API key (the `zenhub_token` environment variable wins over this)
    pub token: Option<String>,

    /// Issues requested per pipeline per batch
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExportConfig {
    /// Directory receiving `raw_*.json` and `data_*.csv`
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Upper bound on pagination rounds per repository
    #[serde(default = "default_max_batches")]
    pub max_batches: usize,

    /// Attempts per output file before giving up on it
    #[serde(default = "default_write_attempts")]
    pub write_attempts: usize,

    /// Pause between failed write attempts
    #[serde(default = "default_write_retry_delay_secs")]
    pub write_retry_delay_secs: u64,

    /// Pretty-print the raw JSON dump
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

/// Command-line values that take precedence over the configuration file.
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub workspace_id: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub max_batches: Option<usize>,
    pub repositories: Vec<Repository>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            zenhub: ZenHubConfig::default(),
            export: ExportConfig::default(),
            repositories: default_repositories(),
        }
    }
}

impl Default for ZenHubConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            workspace_id: default_workspace_id(),
            token: None,
            page_size: default_page_size(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            max_batches: default_max_batches(),
            write_attempts: default_write_attempts(),
            write_retry_delay_secs: default_write_retry_delay_secs(),
            pretty: default_pretty(),
        }
    }
}

fn default_endpoint() -> String {
    "https://api.zenhub.com/public/graphql".to_string()
}

fn default_workspace_id() -> String {
    "5c9d18415648dd20c601ea26".to_string()
}

fn default_page_size() -> usize {
    100
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_max_batches() -> usize {
    5
}

fn default_write_attempts() -> usize {
    20
}

fn default_write_retry_delay_secs() -> u64 {
    2
}

fn default_pretty() -> bool {
    true
}

// GitHub ids come from https://api.github.com/repos/ORNL-AMO/<repository name>
fn default_repositories() -> Vec<Repository> {
    vec![
        Repository::new("MEASUR", 80_439_269),
        Repository::new("VERIFI", 252_534_096),
        Repository::new("AMO-Tools-Suite", 75_637_129),
    ]
}

impl ExportConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.write_attempts,
            Duration::from_secs(self.write_retry_delay_secs),
        )
    }
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./boardlens.toml
    /// 3. ./boardlens.json
    /// 4. ./boardlens.yaml
    /// 5. ./boardlens.yml
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = [
            "boardlens.toml",
            "boardlens.json",
            "boardlens.yaml",
            "boardlens.yml",
        ];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        Ok(Self::default())
    }

    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }

    /// Save configuration to a file, picking the format from its extension.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("yaml") | Some("yml") => serde_yaml::to_string(self)?,
            _ => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(endpoint) = overrides.endpoint {
            self.zenhub.endpoint = endpoint;
        }
        if let Some(workspace_id) = overrides.workspace_id {
            self.zenhub.workspace_id = workspace_id;
        }
        if let Some(output_dir) = overrides.output_dir {
            self.export.output_dir = output_dir;
        }
        if let Some(max_batches) = overrides.max_batches {
            self.export.max_batches = max_batches;
        }
        if !overrides.repositories.is_empty() {
            self.repositories = overrides.repositories;
        }
    }

    /// Rejects settings that would make a run meaningless or unbounded.
    pub fn validate(&self) -> std::result::Result<(), BoardLensError> {
        Url::parse(&self.zenhub.endpoint).map_err(|e| {
            BoardLensError::Config(format!("Invalid endpoint '{}': {e}", self.zenhub.endpoint))
        })?;

        if self.zenhub.workspace_id.trim().is_empty() {
            return Err(BoardLensError::Config("workspace-id must not be empty".into()));
        }
        if !(1..=100).contains(&self.zenhub.page_size) {
            return Err(BoardLensError::Config(format!(
                "page-size must be between 1 and 100, got {}",
                self.zenhub.page_size
            )));
        }
        if self.export.max_batches == 0 {
            return Err(BoardLensError::Config("max-batches must be at least 1".into()));
        }
        if self.export.write_attempts == 0 {
            return Err(BoardLensError::Config("write-attempts must be at least 1".into()));
        }
        if self.repositories.is_empty() {
            return Err(BoardLensError::Config("no repositories configured".into()));
        }

        Ok(())
    }
}
