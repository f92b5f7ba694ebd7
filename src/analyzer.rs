use crate::config::AnalyzerConfig;
use crate::exec::{CommandLine, CommandRunner};
use crate::types::CommandOutput;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::info;

/// Scanner variable (plugin 4.1.0+) naming an extra JSON results file, written
/// alongside any output the user asked for with `-o`/`--outfile`
pub const INTERNAL_OUTFILE_ENV: &str = "SCANNER_INTERNAL_OUTFILE";

/// Invokes the analyzer and reports its outcome as data
#[async_trait]
pub trait AnalyzerRunner: Send + Sync {
    /// Run `<run_command> <run_args>`, additionally writing machine-readable
    /// results to `internal_outfile`
    async fn run(
        &self,
        run_command: &str,
        run_args: &str,
        internal_outfile: &str,
    ) -> CommandOutput;
}

/// Runs `sf scanner ...` through a [`CommandRunner`]
pub struct SfAnalyzerRunner<R> {
    runner: R,
    executable: String,
    topic: String,
    env: HashMap<String, String>,
}

impl<R: CommandRunner> SfAnalyzerRunner<R> {
    pub fn new(runner: R, config: &AnalyzerConfig) -> Self {
        Self {
            runner,
            executable: config.executable.clone(),
            topic: config.topic.clone(),
            env: config.env.clone(),
        }
    }

    pub fn command_line(
        &self,
        run_command: &str,
        run_args: &str,
        internal_outfile: &str,
    ) -> CommandLine {
        CommandLine::new(&self.executable)
            .arg(&self.topic)
            .split_args(run_command)
            .split_args(run_args)
            .envs(&self.env)
            .env(INTERNAL_OUTFILE_ENV, internal_outfile)
    }
}

#[async_trait]
impl<R: CommandRunner> AnalyzerRunner for SfAnalyzerRunner<R> {
    async fn run(
        &self,
        run_command: &str,
        run_args: &str,
        internal_outfile: &str,
    ) -> CommandOutput {
        let command = self.command_line(run_command, run_args, internal_outfile);
        info!("Running: {}", command);
        let output = self.runner.exec(&command, false).await;
        info!("Code Analyzer exited with code {}", output.exit_code);
        output
    }
}
