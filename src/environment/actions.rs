use super::Environment;
use crate::error::PipelineError;
use crate::types::Inputs;
use async_trait::async_trait;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

/// File the runner reads step outputs from
const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";
/// File the runner renders as the job summary
const GITHUB_STEP_SUMMARY_ENV: &str = "GITHUB_STEP_SUMMARY";

/// Characters the artifact service rejects in artifact names
const INVALID_ARTIFACT_NAME_CHARS: [char; 11] =
    ['"', ':', '<', '>', '|', '*', '?', '\r', '\n', '\\', '/'];

/// GitHub Actions host: workflow commands on stdout, outputs and summary
/// through the runner's files, artifacts stored under a local directory
pub struct ActionsEnvironment {
    inputs: Inputs,
    artifact_dir: PathBuf,
    output_file: Option<PathBuf>,
    summary_file: Option<PathBuf>,
    failed: AtomicBool,
}

impl ActionsEnvironment {
    pub fn new(inputs: Inputs, artifact_dir: impl Into<PathBuf>) -> Self {
        Self {
            inputs,
            artifact_dir: artifact_dir.into(),
            output_file: None,
            summary_file: None,
            failed: AtomicBool::new(false),
        }
    }

    /// Pick up the runner's output and summary files from the process environment
    pub fn from_env(inputs: Inputs, artifact_dir: impl Into<PathBuf>) -> Self {
        let env_path = |name: &str| {
            std::env::var_os(name)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        let mut env = Self::new(inputs, artifact_dir);
        env.output_file = env_path(GITHUB_OUTPUT_ENV);
        env.summary_file = env_path(GITHUB_STEP_SUMMARY_ENV);
        env
    }

    #[cfg(test)]
    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    #[cfg(test)]
    pub fn with_summary_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.summary_file = Some(path.into());
        self
    }

    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    fn artifact_destination(&self, artifact_name: &str, file: &str) -> PathBuf {
        let source = Path::new(file);
        let relative = source.is_relative()
            && source
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        let target = if relative {
            source.to_path_buf()
        } else {
            source
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(file))
        };
        self.artifact_dir.join(artifact_name).join(target)
    }
}

/// Escape data for a workflow command so it stays on one line
pub fn escape_data(text: &str) -> String {
    text.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[async_trait]
impl Environment for ActionsEnvironment {
    fn start_group(&self, name: &str) {
        println!("::group::{}", escape_data(name));
    }

    fn end_group(&self) {
        println!("::endgroup::");
    }

    fn get_inputs(&self) -> Result<Inputs, PipelineError> {
        let name = self.inputs.results_artifact_name.trim();
        if name.is_empty() {
            return Err(PipelineError::InvalidInput {
                name: "results-artifact-name".into(),
                reason: "must not be empty".into(),
            });
        }
        if let Some(c) = name.chars().find(|c| INVALID_ARTIFACT_NAME_CHARS.contains(c)) {
            return Err(PipelineError::InvalidInput {
                name: "results-artifact-name".into(),
                reason: format!("contains invalid character {:?}", c),
            });
        }

        Ok(Inputs {
            run_command: self.inputs.run_command.trim().to_string(),
            run_args: self.inputs.run_args.trim().to_string(),
            results_artifact_name: name.to_string(),
        })
    }

    async fn upload_artifact(
        &self,
        artifact_name: &str,
        artifact_files: &[String],
    ) -> Result<(), PipelineError> {
        for file in artifact_files {
            let destination = self.artifact_destination(artifact_name, file);
            if let Some(parent) = destination.parent() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    PipelineError::Environment(format!(
                        "Failed to create artifact directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
            tokio::fs::copy(file, &destination).await.map_err(|e| {
                PipelineError::Environment(format!(
                    "Failed to upload '{}' to artifact '{}': {}",
                    file, artifact_name, e
                ))
            })?;
            debug!("Stored {} at {}", file, destination.display());
        }
        info!(
            "Uploaded artifact '{}' ({} file(s)) to {}",
            artifact_name,
            artifact_files.len(),
            self.artifact_dir.join(artifact_name).display()
        );
        Ok(())
    }

    fn set_output(&self, name: &str, value: &str) -> Result<(), PipelineError> {
        let Some(path) = &self.output_file else {
            info!("Output {}={}", name, value);
            return Ok(());
        };

        let delimiter = format!(
            "ghadelimiter_{}",
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        );
        if name.contains(&delimiter) || value.contains(&delimiter) {
            return Err(PipelineError::Environment(format!(
                "Output '{}' contains the delimiter {}",
                name, delimiter
            )));
        }

        let append = || -> std::io::Result<()> {
            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            write!(file, "{}<<{}\n{}\n{}\n", name, delimiter, value, delimiter)
        };
        append().map_err(|e| {
            PipelineError::Environment(format!("Failed to set output '{}': {}", name, e))
        })?;
        debug!("Set output {}={}", name, value);
        Ok(())
    }

    fn info(&self, message: &str) {
        info!("{}", message);
    }

    fn warn(&self, message: &str) {
        warn!("{}", message);
        println!("::warning::{}", escape_data(message));
    }

    fn error(&self, message: &str) {
        error!("{}", message);
        println!("::error::{}", escape_data(message));
    }

    fn fail(&self, message: &str) {
        self.failed.store(true, Ordering::SeqCst);
        self.error(message);
    }

    fn file_exists(&self, file: &str) -> bool {
        Path::new(file).exists()
    }

    async fn write_summary(&self, summary_markdown: &str) -> Result<(), PipelineError> {
        let Some(path) = &self.summary_file else {
            println!("{}", summary_markdown);
            return Ok(());
        };

        let result: std::io::Result<()> = async {
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .await?;
            file.write_all(summary_markdown.as_bytes()).await?;
            file.write_all(b"\n").await?;
            file.flush().await
        }
        .await;
        result.map_err(|e| {
            PipelineError::Environment(format!(
                "Failed to write summary to {}: {}",
                path.display(),
                e
            ))
        })?;
        info!("Summary written to {}", path.display());
        Ok(())
    }
}
