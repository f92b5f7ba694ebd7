use crate::analyzer::AnalyzerRunner;
use crate::args;
use crate::config::{DEFAULT_INTERNAL_OUTFILE, MIN_SCANNER_VERSION_REQUIRED};
use crate::environment::Environment;
use crate::error::PipelineError;
use crate::exec::COMMAND_NOT_FOUND_EXIT_CODE;
use crate::messages::{self, step_labels};
use crate::provision::ToolProvisioner;
use crate::results::{Results, ResultsFactory, Severity};
use crate::summary::Summarizer;
use crate::types::Inputs;
use tracing::{debug, error, info};

pub const EXIT_CODE_OUTPUT: &str = "exit-code";
pub const NUM_VIOLATIONS_OUTPUT: &str = "num-violations";

/// Name of the output holding the count for one severity, e.g. `num-sev1-violations`
pub fn severity_output_name(severity: Severity) -> String {
    format!("num-sev{}-violations", severity)
}

/// Pipeline phases, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    PreparingEnvironment,
    RunningAnalyzer,
    UploadingArtifact,
    AnalyzingResults,
    CreatingSummary,
    Done,
    Failed,
}

impl Phase {
    /// Log group label; `None` for terminal phases
    pub fn label(self) -> Option<&'static str> {
        match self {
            Phase::PreparingEnvironment => Some(step_labels::PREPARING_ENVIRONMENT),
            Phase::RunningAnalyzer => Some(step_labels::RUNNING_CODE_ANALYZER),
            Phase::UploadingArtifact => Some(step_labels::UPLOADING_ARTIFACT),
            Phase::AnalyzingResults => Some(step_labels::ANALYZING_RESULTS),
            Phase::CreatingSummary => Some(step_labels::CREATING_SUMMARY),
            Phase::Done | Phase::Failed => None,
        }
    }
}

/// Phase plus the data handed from one phase to the next
enum State {
    PreparingEnvironment,
    RunningAnalyzer(Inputs),
    UploadingArtifact(Inputs),
    AnalyzingResults,
    CreatingSummary(Results),
    Done,
}

impl State {
    fn phase(&self) -> Phase {
        match self {
            State::PreparingEnvironment => Phase::PreparingEnvironment,
            State::RunningAnalyzer(_) => Phase::RunningAnalyzer,
            State::UploadingArtifact(_) => Phase::UploadingArtifact,
            State::AnalyzingResults => Phase::AnalyzingResults,
            State::CreatingSummary(_) => Phase::CreatingSummary,
            State::Done => Phase::Done,
        }
    }
}

/// Provision, run, upload, analyze and summarize one Code Analyzer invocation
pub struct Pipeline<'a> {
    environment: &'a dyn Environment,
    provisioner: &'a dyn ToolProvisioner,
    analyzer: &'a dyn AnalyzerRunner,
    results_factory: &'a dyn ResultsFactory,
    summarizer: &'a dyn Summarizer,
    internal_outfile: String,
    min_plugin_version: String,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        environment: &'a dyn Environment,
        provisioner: &'a dyn ToolProvisioner,
        analyzer: &'a dyn AnalyzerRunner,
        results_factory: &'a dyn ResultsFactory,
        summarizer: &'a dyn Summarizer,
    ) -> Self {
        Self {
            environment,
            provisioner,
            analyzer,
            results_factory,
            summarizer,
            internal_outfile: DEFAULT_INTERNAL_OUTFILE.into(),
            min_plugin_version: MIN_SCANNER_VERSION_REQUIRED.into(),
        }
    }

    pub fn internal_outfile(mut self, path: impl Into<String>) -> Self {
        self.internal_outfile = path.into();
        self
    }

    pub fn min_plugin_version(mut self, version: impl Into<String>) -> Self {
        self.min_plugin_version = version.into();
        self
    }

    /// Run every phase in order and return the terminal phase.
    ///
    /// The first error ends the run: it is reported once through
    /// [`Environment::fail`] and the remaining phases are skipped. Outputs set
    /// before the failure stay visible.
    pub async fn run(&self) -> Phase {
        let mut state = State::PreparingEnvironment;
        loop {
            let phase = state.phase();
            let Some(label) = phase.label() else {
                info!("Pipeline finished");
                return phase;
            };

            debug!("Entering phase {:?}", phase);
            self.environment.start_group(label);
            let next = self.step(state).await;
            self.environment.end_group();

            state = match next {
                Ok(next) => next,
                Err(e) => {
                    error!("Phase {:?} failed: {}", phase, e);
                    self.environment.fail(&e.to_string());
                    return Phase::Failed;
                }
            };
        }
    }

    async fn step(&self, state: State) -> Result<State, PipelineError> {
        match state {
            State::PreparingEnvironment => self.prepare_environment().await,
            State::RunningAnalyzer(inputs) => self.run_analyzer(inputs).await,
            State::UploadingArtifact(inputs) => self.upload_artifact(inputs).await,
            State::AnalyzingResults => self.analyze_results(),
            State::CreatingSummary(results) => self.create_summary(results).await,
            State::Done => Ok(State::Done),
        }
    }

    async fn prepare_environment(&self) -> Result<State, PipelineError> {
        let inputs = self.environment.get_inputs()?;
        debug!("Inputs: {:?}", inputs);
        args::validate(&inputs.run_args)?;
        self.install_cli_if_needed().await?;
        self.install_plugin_if_needed().await?;
        Ok(State::RunningAnalyzer(inputs))
    }

    async fn install_cli_if_needed(&self) -> Result<(), PipelineError> {
        if self.provisioner.is_cli_installed().await {
            return Ok(());
        }
        self.environment.warn(messages::SF_CLI_NOT_INSTALLED);
        if !self.provisioner.install_cli().await {
            return Err(PipelineError::CliInstallFailed);
        }
        Ok(())
    }

    async fn install_plugin_if_needed(&self) -> Result<(), PipelineError> {
        if self
            .provisioner
            .is_plugin_at_least(&self.min_plugin_version)
            .await
        {
            return Ok(());
        }
        self.environment
            .warn(messages::MINIMUM_SCANNER_PLUGIN_NOT_INSTALLED);
        if !self.provisioner.install_plugin().await {
            return Err(PipelineError::PluginInstallFailed);
        }
        Ok(())
    }

    async fn run_analyzer(&self, inputs: Inputs) -> Result<State, PipelineError> {
        let output = self
            .analyzer
            .run(&inputs.run_command, &inputs.run_args, &self.internal_outfile)
            .await;

        if output.exit_code == COMMAND_NOT_FOUND_EXIT_CODE && !output.stderr.is_empty() {
            self.environment.error(&format!(
                "Code Analyzer could not be run: {}",
                output.stderr.trim()
            ));
        } else if !output.succeeded() {
            self.environment.info(&format!(
                "Code Analyzer exited with code {}",
                output.exit_code
            ));
        }

        self.environment
            .set_output(EXIT_CODE_OUTPUT, &output.exit_code.to_string())?;
        Ok(State::UploadingArtifact(inputs))
    }

    async fn upload_artifact(&self, inputs: Inputs) -> Result<State, PipelineError> {
        let user_outfile = args::extract_outfile(&inputs.run_args);
        let artifact_file = if user_outfile.is_empty() {
            self.internal_outfile.clone()
        } else {
            user_outfile
        };

        self.assert_file_exists(&artifact_file)?;
        self.environment
            .upload_artifact(&inputs.results_artifact_name, &[artifact_file])
            .await?;
        Ok(State::AnalyzingResults)
    }

    fn analyze_results(&self) -> Result<State, PipelineError> {
        self.assert_file_exists(&self.internal_outfile)?;
        let results = self.results_factory.create_results(&self.internal_outfile)?;

        self.environment.set_output(
            NUM_VIOLATIONS_OUTPUT,
            &results.total_violation_count().to_string(),
        )?;
        for severity in Severity::ALL {
            self.environment.set_output(
                &severity_output_name(severity),
                &results.violation_count(severity).to_string(),
            )?;
        }
        Ok(State::CreatingSummary(results))
    }

    async fn create_summary(&self, results: Results) -> Result<State, PipelineError> {
        let markdown = self.summarizer.create_summary_markdown(&results);
        self.environment.write_summary(&markdown).await?;
        Ok(State::Done)
    }

    fn assert_file_exists(&self, file: &str) -> Result<(), PipelineError> {
        if self.environment.file_exists(file) {
            Ok(())
        } else {
            Err(PipelineError::FileNotFound(file.to_string()))
        }
    }
}
