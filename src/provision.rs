use crate::config::{AnalyzerConfig, ProvisionConfig};
use crate::exec::{CommandLine, CommandRunner};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Checks for and installs the Salesforce CLI and the Code Analyzer plugin.
///
/// Every method reports failure as `false`, leaving the failure message to the caller.
#[async_trait]
pub trait ToolProvisioner: Send + Sync {
    async fn is_cli_installed(&self) -> bool;
    async fn install_cli(&self) -> bool;
    async fn is_plugin_at_least(&self, min_version: &str) -> bool;
    async fn install_plugin(&self) -> bool;
}

/// A `major.minor.patch` version compared field by field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PluginVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl FromStr for PluginVersion {
    type Err = String;

    /// Missing fields count as 0; pre-release and build suffixes are ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let core = s
            .trim()
            .trim_start_matches('v')
            .split(['-', '+'])
            .next()
            .unwrap_or_default();
        if core.is_empty() {
            return Err(format!("Empty version '{}'", s));
        }

        let mut fields = [0u64; 3];
        for (i, part) in core.split('.').enumerate() {
            if i >= fields.len() {
                return Err(format!("Too many version fields in '{}'", s));
            }
            fields[i] = part
                .parse()
                .map_err(|_| format!("Invalid version field '{}' in '{}'", part, s))?;
        }

        Ok(Self {
            major: fields[0],
            minor: fields[1],
            patch: fields[2],
        })
    }
}

impl fmt::Display for PluginVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Find the installed version of `plugin_name` in `sf plugins --json` output.
///
/// Accepts a bare JSON array or an object wrapping it under `result`.
pub fn find_plugin_version(plugins_json: &str, plugin_name: &str) -> Option<PluginVersion> {
    let value: Value = serde_json::from_str(plugins_json).ok()?;
    let plugins = match &value {
        Value::Array(items) => items,
        Value::Object(map) => map.get("result")?.as_array()?,
        _ => return None,
    };

    plugins
        .iter()
        .find(|p| p.get("name").and_then(Value::as_str) == Some(plugin_name))
        .and_then(|p| p.get("version"))
        .and_then(Value::as_str)
        .and_then(|v| v.parse().ok())
}

/// Provisions tools by shelling out to `sf` and the configured installer
pub struct SfProvisioner<R> {
    runner: R,
    executable: String,
    settings: ProvisionConfig,
}

impl<R: CommandRunner> SfProvisioner<R> {
    pub fn new(runner: R, analyzer: &AnalyzerConfig, settings: ProvisionConfig) -> Self {
        Self {
            runner,
            executable: analyzer.executable.clone(),
            settings,
        }
    }

    fn sf(&self) -> CommandLine {
        CommandLine::new(&self.executable)
    }
}

#[async_trait]
impl<R: CommandRunner> ToolProvisioner for SfProvisioner<R> {
    async fn is_cli_installed(&self) -> bool {
        let output = self.runner.exec(&self.sf().arg("--version"), true).await;
        debug!("CLI version check exited with {}", output.exit_code);
        output.succeeded()
    }

    async fn install_cli(&self) -> bool {
        let Some(command) = CommandLine::parse(&self.settings.cli_install_command) else {
            warn!("CLI install command is empty");
            return false;
        };
        info!("Installing Salesforce CLI: {}", command);
        self.runner.exec(&command, false).await.succeeded()
    }

    async fn is_plugin_at_least(&self, min_version: &str) -> bool {
        let min: PluginVersion = match min_version.parse() {
            Ok(v) => v,
            Err(e) => {
                warn!("Invalid minimum plugin version: {}", e);
                return false;
            }
        };

        let output = self
            .runner
            .exec(&self.sf().arg("plugins").arg("--json"), true)
            .await;
        if !output.succeeded() {
            debug!("Listing plugins failed: {}", output.stderr.trim());
            return false;
        }

        match find_plugin_version(&output.stdout, &self.settings.plugin_name) {
            Some(installed) => {
                debug!(
                    "Installed {} version {}, minimum {}",
                    self.settings.plugin_name, installed, min
                );
                installed >= min
            }
            None => {
                debug!("Plugin {} not installed", self.settings.plugin_name);
                false
            }
        }
    }

    async fn install_plugin(&self) -> bool {
        let command = self
            .sf()
            .arg("plugins")
            .arg("install")
            .arg(format!("{}@latest", self.settings.plugin_name));
        info!("Installing plugin: {}", command);
        self.runner.exec(&command, false).await.succeeded()
    }
}
