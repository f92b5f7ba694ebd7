mod actions;

pub use actions::ActionsEnvironment;

use crate::error::PipelineError;
use crate::types::Inputs;
use async_trait::async_trait;

/// Capabilities of the CI host the pipeline runs in
#[async_trait]
pub trait Environment: Send + Sync {
    fn start_group(&self, name: &str);

    fn end_group(&self);

    fn get_inputs(&self) -> Result<Inputs, PipelineError>;

    /// Persist `artifact_files` as a retrievable bundle named `artifact_name`
    async fn upload_artifact(
        &self,
        artifact_name: &str,
        artifact_files: &[String],
    ) -> Result<(), PipelineError>;

    fn set_output(&self, name: &str, value: &str) -> Result<(), PipelineError>;

    fn info(&self, message: &str);

    fn warn(&self, message: &str);

    fn error(&self, message: &str);

    /// Record the run as failed; the only place failure text is emitted
    fn fail(&self, message: &str);

    fn file_exists(&self, file: &str) -> bool;

    async fn write_summary(&self, summary_markdown: &str) -> Result<(), PipelineError>;
}
