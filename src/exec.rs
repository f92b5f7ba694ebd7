use crate::types::CommandOutput;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Exit code reported when a process could not be launched at all
pub const COMMAND_NOT_FOUND_EXIT_CODE: i32 = 127;

/// A program, its already-tokenized arguments and extra environment variables
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append every whitespace-separated token of `text` as its own argument
    pub fn split_args(mut self, text: &str) -> Self {
        self.args.extend(text.split_whitespace().map(String::from));
        self
    }

    pub fn envs(mut self, env: &HashMap<String, String>) -> Self {
        self.env.extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Build from a single whitespace-separated string (e.g. a configured install command)
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let mut command = Self::new(parts.next()?);
        command.args.extend(parts.map(String::from));
        Some(command)
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Raw process execution
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion and capture exit code, stdout and stderr.
    ///
    /// Never fails: a launch error is reported as [`COMMAND_NOT_FOUND_EXIT_CODE`]
    /// with the error text in `stderr`.
    async fn exec(&self, command: &CommandLine, silent: bool) -> CommandOutput;
}

/// Runs commands as child processes of this one
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn exec(&self, command: &CommandLine, silent: bool) -> CommandOutput {
        debug!("Executing: {}", command);

        let spawned = Command::new(&command.program)
            .args(&command.args)
            .envs(&command.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                warn!("Failed to launch '{}': {}", command.program, e);
                return launch_failure(e.to_string());
            }
        };

        // Drain both pipes while waiting so a chatty child cannot block on a full pipe
        let mut stdout_pipe = child.stdout.take();
        let mut stderr_pipe = child.stderr.take();
        let read_stdout = async {
            let mut buf = Vec::new();
            if let Some(out) = stdout_pipe.as_mut() {
                if let Err(e) = out.read_to_end(&mut buf).await {
                    warn!("Failed to read stdout of '{}': {}", command.program, e);
                }
            }
            String::from_utf8_lossy(&buf).into_owned()
        };
        let read_stderr = async {
            let mut buf = Vec::new();
            if let Some(err) = stderr_pipe.as_mut() {
                if let Err(e) = err.read_to_end(&mut buf).await {
                    warn!("Failed to read stderr of '{}': {}", command.program, e);
                }
            }
            String::from_utf8_lossy(&buf).into_owned()
        };
        let (stdout, stderr, status) = tokio::join!(read_stdout, read_stderr, child.wait());

        let exit_code = match status {
            // Killed by a signal: no code available
            Ok(status) => status.code().unwrap_or(1),
            Err(e) => return launch_failure(format!("Failed to wait for command: {}", e)),
        };

        if !silent {
            for line in stdout.lines() {
                info!("{}", line);
            }
            for line in stderr.lines() {
                warn!("{}", line);
            }
        }
        debug!("'{}' exited with code {}", command.program, exit_code);

        CommandOutput {
            exit_code,
            stdout,
            stderr,
        }
    }
}

fn launch_failure(message: String) -> CommandOutput {
    CommandOutput {
        exit_code: COMMAND_NOT_FOUND_EXIT_CODE,
        stdout: String::new(),
        stderr: message,
    }
}
