// src/system/executor.rs

use std::io::{IsTerminal, Read};
use std::path::Path;
use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("no command specified to run")]
    EmptyCommand,
    #[error("command '{command}' could not be executed: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("command '{command}' exited with code {code}")]
    NonZeroExit { command: String, code: i32 },
    #[error("command '{command}' produced output that was not valid UTF-8")]
    InvalidUtf8Output {
        command: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// The process/filesystem capability consumed by the core.
///
/// One real implementation talks to the operating system; tests substitute a
/// recording fake. Constructed once in `main` and handed to the workspace,
/// never reached through global state.
pub trait Platform: std::fmt::Debug {
    /// Runs a command with inherited stdio, blocking until it finishes.
    /// `env` pairs are appended to the parent environment. Returns the exit
    /// code; spawn failures are errors, non-zero exits are not.
    fn exec_interactive(
        &self,
        command: &[String],
        env: &[(String, String)],
    ) -> Result<i32, ExecutionError>;

    /// Runs a command capturing stdout; stderr passes through to the
    /// terminal. Returns the exit code and captured text.
    fn exec_capture(
        &self,
        command: &[String],
        env: &[(String, String)],
    ) -> Result<(i32, String), ExecutionError>;

    /// Whether stdout is an interactive terminal.
    fn is_terminal(&self) -> bool;

    fn file_exists(&self, path: &Path) -> bool;

    fn read_file(&self, path: &Path) -> std::io::Result<String>;
}

/// The production `Platform`, backed by `std::process` and the local
/// filesystem.
#[derive(Debug, Default)]
pub struct RealPlatform;

fn build_command(
    command: &[String],
    env: &[(String, String)],
) -> Result<StdCommand, ExecutionError> {
    let (program, args) = command.split_first().ok_or(ExecutionError::EmptyCommand)?;
    let mut cmd = StdCommand::new(program);
    cmd.args(args);
    for (name, value) in env {
        cmd.env(name, value);
    }
    Ok(cmd)
}

fn exit_code(status: std::process::ExitStatus) -> i32 {
    // A missing code means the process died from a signal; report failure.
    status.code().unwrap_or(1)
}

impl Platform for RealPlatform {
    fn exec_interactive(
        &self,
        command: &[String],
        env: &[(String, String)],
    ) -> Result<i32, ExecutionError> {
        let mut cmd = build_command(command, env)?;
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let status = cmd.status().map_err(|source| ExecutionError::Launch {
            command: command.join(" "),
            source,
        })?;

        Ok(exit_code(status))
    }

    fn exec_capture(
        &self,
        command: &[String],
        env: &[(String, String)],
    ) -> Result<(i32, String), ExecutionError> {
        let mut cmd = build_command(command, env)?;
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        let output = cmd.output().map_err(|source| ExecutionError::Launch {
            command: command.join(" "),
            source,
        })?;

        let stdout = String::from_utf8(output.stdout).map_err(|source| {
            ExecutionError::InvalidUtf8Output {
                command: command.join(" "),
                source,
            }
        })?;

        Ok((exit_code(output.status), stdout))
    }

    fn is_terminal(&self) -> bool {
        std::io::stdout().is_terminal()
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_file(&self, path: &Path) -> std::io::Result<String> {
        let mut text = String::new();
        std::fs::File::open(path)?.read_to_string(&mut text)?;
        Ok(text)
    }
}
