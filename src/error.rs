use thiserror::Error;

use crate::messages;

/// Failures that abort the pipeline.
///
/// A non-zero analyzer exit code is deliberately absent: it is reported as
/// an output, not raised.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("{}", messages::MISSING_NORMALIZE_SEVERITY)]
    MissingNormalizeSeverity,

    #[error("Invalid input '{name}': {reason}")]
    InvalidInput { name: String, reason: String },

    #[error("{}", messages::SF_CLI_INSTALL_FAILED)]
    CliInstallFailed,

    #[error("{}", messages::SCANNER_PLUGIN_INSTALL_FAILED)]
    PluginInstallFailed,

    #[error("{}", messages::file_not_found(.0))]
    FileNotFound(String),

    #[error("Failed to parse results file '{path}': {reason}")]
    Parse { path: String, reason: String },

    /// Failure inside a hosting-environment collaborator (upload, outputs, summary)
    #[error("{0}")]
    Environment(String),
}

impl PipelineError {
    pub fn parse(path: &str, reason: impl ToString) -> Self {
        Self::Parse {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}
