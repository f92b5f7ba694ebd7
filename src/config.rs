use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Path to the machine-readable results file the analyzer always writes
pub const DEFAULT_INTERNAL_OUTFILE: &str = "SalesforceCodeAnalyzerResults.json";
/// Lowest accepted version of the Code Analyzer plugin
pub const MIN_SCANNER_VERSION_REQUIRED: &str = "4.1.0";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub provision: ProvisionConfig,
    #[serde(default)]
    pub artifact: ArtifactConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Salesforce CLI executable
    #[serde(default = "default_executable")]
    pub executable: String,
    /// Topic under which the plugin registers its commands
    #[serde(default = "default_topic")]
    pub topic: String,
    /// Machine-readable results file written on every run
    #[serde(default = "default_internal_outfile")]
    pub internal_outfile: String,
    /// Extra environment variables for the analyzer process
    #[serde(default)]
    pub env: HashMap<String, String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ProvisionConfig {
    /// Command used to install the Salesforce CLI
    #[serde(default = "default_cli_install_command")]
    pub cli_install_command: String,
    /// Plugin package name as reported by `sf plugins`
    #[serde(default = "default_plugin_name")]
    pub plugin_name: String,
    #[serde(default = "default_min_plugin_version")]
    pub min_plugin_version: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ArtifactConfig {
    /// Directory under which named artifacts are stored
    #[serde(default = "default_artifact_directory")]
    pub directory: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SummaryConfig {
    /// Maximum violation rows rendered in the summary table
    #[serde(default = "default_max_violation_rows")]
    pub max_violation_rows: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            topic: default_topic(),
            internal_outfile: default_internal_outfile(),
            env: HashMap::new(),
        }
    }
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            cli_install_command: default_cli_install_command(),
            plugin_name: default_plugin_name(),
            min_plugin_version: default_min_plugin_version(),
        }
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            directory: default_artifact_directory(),
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_violation_rows: default_max_violation_rows(),
        }
    }
}

fn default_executable() -> String {
    "sf".into()
}

fn default_topic() -> String {
    "scanner".into()
}

fn default_internal_outfile() -> String {
    DEFAULT_INTERNAL_OUTFILE.into()
}

fn default_cli_install_command() -> String {
    "npm install -g @salesforce/cli@latest".into()
}

fn default_plugin_name() -> String {
    "@salesforce/sfdx-scanner".into()
}

fn default_min_plugin_version() -> String {
    MIN_SCANNER_VERSION_REQUIRED.into()
}

fn default_artifact_directory() -> String {
    std::env::var("RUNNER_TEMP")
        .map(|tmp| format!("{}/code-analyzer-artifacts", tmp))
        .unwrap_or_else(|_| ".code-analyzer/artifacts".into())
}

fn default_max_violation_rows() -> usize {
    1000
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
        let config = toml::from_str(&content).with_context(|| format!("Invalid config {}", path))?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &str) -> anyhow::Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            debug!("No config at {}, using defaults", path);
            Ok(Self::default())
        }
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
