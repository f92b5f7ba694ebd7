/// Default sub-command passed to `sf scanner`
pub const DEFAULT_RUN_COMMAND: &str = "run";
/// Default run arguments, the minimum accepted by validation
pub const DEFAULT_RUN_ARGS: &str = "--normalize-severity";
/// Default name of the uploaded results artifact
pub const DEFAULT_RESULTS_ARTIFACT_NAME: &str = "code-analyzer-results";

/// Action inputs, read once per invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inputs {
    /// Scanner sub-command (e.g. "run" or "run dfa")
    pub run_command: String,
    /// Free-form flags appended after the sub-command
    pub run_args: String,
    /// Name under which the results file is uploaded
    pub results_artifact_name: String,
}

impl Default for Inputs {
    fn default() -> Self {
        Self {
            run_command: DEFAULT_RUN_COMMAND.into(),
            run_args: DEFAULT_RUN_ARGS.into(),
            results_artifact_name: DEFAULT_RESULTS_ARTIFACT_NAME.into(),
        }
    }
}

/// Captured result of an external process
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}
