mod analyzer;
mod args;
mod cli;
mod config;
mod environment;
mod error;
mod exec;
#[cfg(test)]
mod fakes;
mod messages;
mod pipeline;
mod provision;
mod results;
mod summary;
mod types;

use analyzer::SfAnalyzerRunner;
use anyhow::bail;
use clap::Parser;
use cli::{Cli, Commands, InitArgs, RunArgs, SummarizeArgs};
use config::Config;
use environment::ActionsEnvironment;
use exec::ProcessRunner;
use pipeline::{Phase, Pipeline};
use provision::SfProvisioner;
use results::{JsonResultsFactory, ResultsFactory};
use std::path::Path;
use summary::{MarkdownSummarizer, Summarizer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries workflow commands
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Init(args) => init(args).map(|_| EXIT_SUCCESS),
        Commands::Run(args) => run(args).await,
        Commands::Summarize(args) => summarize(args).map(|_| EXIT_SUCCESS),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(EXIT_FAILURE);
        }
    }
}

fn init(args: &InitArgs) -> anyhow::Result<()> {
    if Path::new(&args.config).exists() && !args.r#override {
        bail!(
            "Config file {} already exists. Use --override to replace it",
            args.config
        );
    }
    std::fs::write(&args.config, Config::default().to_toml()?)?;
    info!("Config written to {}", args.config);
    Ok(())
}

async fn run(args: &RunArgs) -> anyhow::Result<i32> {
    let config = Config::load_or_default(&args.config)?;

    let environment = ActionsEnvironment::from_env(args.inputs(), &config.artifact.directory);
    let provisioner = SfProvisioner::new(ProcessRunner, &config.analyzer, config.provision.clone());
    let analyzer = SfAnalyzerRunner::new(ProcessRunner, &config.analyzer);
    let summarizer = MarkdownSummarizer::new(config.summary.max_violation_rows);

    let phase = Pipeline::new(
        &environment,
        &provisioner,
        &analyzer,
        &JsonResultsFactory,
        &summarizer,
    )
    .internal_outfile(&config.analyzer.internal_outfile)
    .min_plugin_version(&config.provision.min_plugin_version)
    .run()
    .await;

    if phase == Phase::Failed || environment.has_failed() {
        Ok(EXIT_FAILURE)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

fn summarize(args: &SummarizeArgs) -> anyhow::Result<()> {
    let config = Config::load_or_default(&args.config)?;
    let results = JsonResultsFactory.create_results(&args.results_file)?;
    let summarizer = MarkdownSummarizer::new(config.summary.max_violation_rows);

    match args.output.as_deref() {
        Some(path) => summary::write_output(path, &results, &summarizer),
        None => {
            println!("{}", summarizer.create_summary_markdown(&results));
            Ok(())
        }
    }
}
