//! Recording test doubles for each capability trait.

use crate::analyzer::AnalyzerRunner;
use crate::environment::Environment;
use crate::error::PipelineError;
use crate::exec::{CommandLine, CommandRunner};
use crate::provision::ToolProvisioner;
use crate::results::{Results, ResultsFactory};
use crate::summary::Summarizer;
use crate::types::{CommandOutput, Inputs};
use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

/// Calls recorded in order
pub struct CallHistory<T>(Mutex<Vec<T>>);

impl<T> Default for CallHistory<T> {
    fn default() -> Self {
        Self(Mutex::new(Vec::new()))
    }
}

impl<T: Clone> CallHistory<T> {
    pub fn record(&self, call: T) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<T> {
        self.0.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

/// Replays queued outputs; exits 0 with empty streams once the queue is drained
#[derive(Default)]
pub struct FakeCommandRunner {
    outputs: Mutex<VecDeque<CommandOutput>>,
    pub exec_calls: CallHistory<(CommandLine, bool)>,
}

impl FakeCommandRunner {
    pub fn push_output(&self, output: CommandOutput) {
        self.outputs.lock().unwrap().push_back(output);
    }

    pub fn commands(&self) -> Vec<String> {
        self.exec_calls
            .calls()
            .iter()
            .map(|(cmd, _)| cmd.to_string())
            .collect()
    }
}

#[async_trait]
impl CommandRunner for FakeCommandRunner {
    async fn exec(&self, command: &CommandLine, silent: bool) -> CommandOutput {
        self.exec_calls.record((command.clone(), silent));
        self.outputs.lock().unwrap().pop_front().unwrap_or_default()
    }
}

pub struct FakeEnvironment {
    pub get_inputs_return_value: Result<Inputs, PipelineError>,
    pub file_exists_return_value: bool,
    /// Files reported missing regardless of `file_exists_return_value`
    pub missing_files: HashSet<String>,
    pub upload_artifact_return_value: Result<(), PipelineError>,
    pub write_summary_return_value: Result<(), PipelineError>,

    pub start_group_calls: CallHistory<String>,
    pub end_group_calls: CallHistory<()>,
    pub get_inputs_calls: CallHistory<()>,
    pub upload_artifact_calls: CallHistory<(String, Vec<String>)>,
    pub set_output_calls: CallHistory<(String, String)>,
    pub info_calls: CallHistory<String>,
    pub warn_calls: CallHistory<String>,
    pub error_calls: CallHistory<String>,
    pub fail_calls: CallHistory<String>,
    pub file_exists_calls: CallHistory<String>,
    pub write_summary_calls: CallHistory<String>,
}

impl Default for FakeEnvironment {
    fn default() -> Self {
        Self {
            get_inputs_return_value: Ok(Inputs::default()),
            file_exists_return_value: true,
            missing_files: HashSet::new(),
            upload_artifact_return_value: Ok(()),
            write_summary_return_value: Ok(()),
            start_group_calls: CallHistory::default(),
            end_group_calls: CallHistory::default(),
            get_inputs_calls: CallHistory::default(),
            upload_artifact_calls: CallHistory::default(),
            set_output_calls: CallHistory::default(),
            info_calls: CallHistory::default(),
            warn_calls: CallHistory::default(),
            error_calls: CallHistory::default(),
            fail_calls: CallHistory::default(),
            file_exists_calls: CallHistory::default(),
            write_summary_calls: CallHistory::default(),
        }
    }
}

impl FakeEnvironment {
    pub fn output(&self, name: &str) -> Option<String> {
        self.set_output_calls
            .calls()
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

#[async_trait]
impl Environment for FakeEnvironment {
    fn start_group(&self, name: &str) {
        self.start_group_calls.record(name.to_string());
    }

    fn end_group(&self) {
        self.end_group_calls.record(());
    }

    fn get_inputs(&self) -> Result<Inputs, PipelineError> {
        self.get_inputs_calls.record(());
        self.get_inputs_return_value.clone()
    }

    async fn upload_artifact(
        &self,
        artifact_name: &str,
        artifact_files: &[String],
    ) -> Result<(), PipelineError> {
        self.upload_artifact_calls
            .record((artifact_name.to_string(), artifact_files.to_vec()));
        self.upload_artifact_return_value.clone()
    }

    fn set_output(&self, name: &str, value: &str) -> Result<(), PipelineError> {
        self.set_output_calls
            .record((name.to_string(), value.to_string()));
        Ok(())
    }

    fn info(&self, message: &str) {
        self.info_calls.record(message.to_string());
    }

    fn warn(&self, message: &str) {
        self.warn_calls.record(message.to_string());
    }

    fn error(&self, message: &str) {
        self.error_calls.record(message.to_string());
    }

    fn fail(&self, message: &str) {
        self.fail_calls.record(message.to_string());
    }

    fn file_exists(&self, file: &str) -> bool {
        self.file_exists_calls.record(file.to_string());
        self.file_exists_return_value && !self.missing_files.contains(file)
    }

    async fn write_summary(&self, summary_markdown: &str) -> Result<(), PipelineError> {
        self.write_summary_calls.record(summary_markdown.to_string());
        self.write_summary_return_value.clone()
    }
}

pub struct FakeProvisioner {
    pub is_cli_installed_return_value: bool,
    pub install_cli_return_value: bool,
    pub is_plugin_at_least_return_value: bool,
    pub install_plugin_return_value: bool,

    pub is_cli_installed_calls: CallHistory<()>,
    pub install_cli_calls: CallHistory<()>,
    pub is_plugin_at_least_calls: CallHistory<String>,
    pub install_plugin_calls: CallHistory<()>,
}

impl Default for FakeProvisioner {
    fn default() -> Self {
        Self {
            is_cli_installed_return_value: true,
            install_cli_return_value: true,
            is_plugin_at_least_return_value: true,
            install_plugin_return_value: true,
            is_cli_installed_calls: CallHistory::default(),
            install_cli_calls: CallHistory::default(),
            is_plugin_at_least_calls: CallHistory::default(),
            install_plugin_calls: CallHistory::default(),
        }
    }
}

#[async_trait]
impl ToolProvisioner for FakeProvisioner {
    async fn is_cli_installed(&self) -> bool {
        self.is_cli_installed_calls.record(());
        self.is_cli_installed_return_value
    }

    async fn install_cli(&self) -> bool {
        self.install_cli_calls.record(());
        self.install_cli_return_value
    }

    async fn is_plugin_at_least(&self, min_version: &str) -> bool {
        self.is_plugin_at_least_calls.record(min_version.to_string());
        self.is_plugin_at_least_return_value
    }

    async fn install_plugin(&self) -> bool {
        self.install_plugin_calls.record(());
        self.install_plugin_return_value
    }
}

#[derive(Default)]
pub struct FakeAnalyzerRunner {
    pub run_return_value: CommandOutput,
    /// (run_command, run_args, internal_outfile)
    pub run_calls: CallHistory<(String, String, String)>,
}

#[async_trait]
impl AnalyzerRunner for FakeAnalyzerRunner {
    async fn run(
        &self,
        run_command: &str,
        run_args: &str,
        internal_outfile: &str,
    ) -> CommandOutput {
        self.run_calls.record((
            run_command.to_string(),
            run_args.to_string(),
            internal_outfile.to_string(),
        ));
        self.run_return_value.clone()
    }
}

pub struct FakeResultsFactory {
    pub create_results_return_value: Result<Results, PipelineError>,
    pub create_results_calls: CallHistory<String>,
}

impl Default for FakeResultsFactory {
    fn default() -> Self {
        Self {
            create_results_return_value: Ok(Results::default()),
            create_results_calls: CallHistory::default(),
        }
    }
}

impl ResultsFactory for FakeResultsFactory {
    fn create_results(&self, results_file: &str) -> Result<Results, PipelineError> {
        self.create_results_calls.record(results_file.to_string());
        self.create_results_return_value.clone()
    }
}

pub struct FakeSummarizer {
    pub create_summary_markdown_return_value: String,
    pub create_summary_markdown_calls: CallHistory<Results>,
}

impl Default for FakeSummarizer {
    fn default() -> Self {
        Self {
            create_summary_markdown_return_value: "someSummaryMarkdown".into(),
            create_summary_markdown_calls: CallHistory::default(),
        }
    }
}

impl Summarizer for FakeSummarizer {
    fn create_summary_markdown(&self, results: &Results) -> String {
        self.create_summary_markdown_calls.record(results.clone());
        self.create_summary_markdown_return_value.clone()
    }
}
