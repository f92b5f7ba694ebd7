use crate::types::{DEFAULT_RESULTS_ARTIFACT_NAME, DEFAULT_RUN_ARGS, DEFAULT_RUN_COMMAND, Inputs};
use clap::{Parser, Subcommand};

// Display order for log level option (placed at end of help text)
const LOG_LEVEL_DISPLAY_ORDER: usize = 100;

/// Default config file path
pub const DEFAULT_CONFIG_PATH: &str = "code-analyzer.toml";

/// CLI arguments
#[derive(Parser)]
#[command(
    name = "code-analyzer-action",
    version,
    about = "Provision, run and summarize Salesforce Code Analyzer in CI",
    long_about = None
)]
pub struct Cli {
    /// Log level (see https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html)
    /// [env: CODE_ANALYZER_ACTION_LOG=] [default: info]
    #[arg(
        long,
        env = "CODE_ANALYZER_ACTION_LOG",
        default_value = "info",
        global = true,
        hide_default_value = true,
        hide_env = true,
        display_order = LOG_LEVEL_DISPLAY_ORDER,
        verbatim_doc_comment
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Write a default code-analyzer.toml config file
    Init(InitArgs),
    /// Provision the CLI and plugin, run Code Analyzer, upload and summarize results
    Run(RunArgs),
    /// Render the summary of an existing results file
    Summarize(SummarizeArgs),
}

/// Arguments for the init command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Path to config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Override existing config file
    #[arg(long)]
    pub r#override: bool,
}

/// Arguments for the run command.
///
/// Inputs fall back to the `INPUT_*` variables the Actions runner sets.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to config file (optional; defaults apply when missing)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Code Analyzer sub-command, e.g. "run" or "run dfa"
    #[arg(long, env = "INPUT_RUN-COMMAND", default_value = DEFAULT_RUN_COMMAND)]
    pub run_command: String,

    /// Arguments passed to the sub-command; must include --normalize-severity
    #[arg(
        long,
        env = "INPUT_RUN-ARGUMENTS",
        default_value = DEFAULT_RUN_ARGS,
        allow_hyphen_values = true
    )]
    pub run_args: String,

    /// Name of the uploaded results artifact
    #[arg(
        long,
        env = "INPUT_RESULTS-ARTIFACT-NAME",
        default_value = DEFAULT_RESULTS_ARTIFACT_NAME
    )]
    pub results_artifact_name: String,
}

impl RunArgs {
    pub fn inputs(&self) -> Inputs {
        Inputs {
            run_command: self.run_command.clone(),
            run_args: self.run_args.clone(),
            results_artifact_name: self.results_artifact_name.clone(),
        }
    }
}

/// Arguments for the summarize command
#[derive(Parser, Debug)]
pub struct SummarizeArgs {
    /// Results file written with `--format json --normalize-severity`
    pub results_file: String,

    /// Path to config file (optional; defaults apply when missing)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Output file path (.md or .json); printed to stdout when omitted
    #[arg(long)]
    pub output: Option<String>,
}
