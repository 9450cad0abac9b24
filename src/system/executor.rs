// src/system/executor.rs

//! Spawning external processes.

use crate::constants::REDACTED;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;

/// Failures while running an external command.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Command could not be parsed: {0}")]
    CommandParse(String),
    #[error("No command specified to run.")]
    EmptyCommand,
    #[error("Command '{0}' was not found. Is it installed and on PATH?")]
    ProgramNotFound(String),
    #[error("Command '{0}' could not be executed: {1}")]
    CommandFailed(String, #[source] std::io::Error),
    #[error("Command '{command}' exited with {status}.{}", format_stderr(.stderr))]
    NonZeroExitStatus {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("Command '{command}' produced output that was not valid UTF-8")]
    InvalidUtf8Output {
        command: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("\n{}", trimmed)
    }
}

#[derive(Debug, Clone)]
enum Arg {
    Plain(String),
    Secret(String),
}

impl Arg {
    fn value(&self) -> &str {
        match self {
            Arg::Plain(v) | Arg::Secret(v) => v,
        }
    }
}

/// An external command with its arguments and working directory.
///
/// Arguments added with [`ExternalCommand::secret_arg`] are passed to the process as-is but
/// masked whenever the command line is logged or put into an error message.
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    program: String,
    args: Vec<Arg>,
    cwd: PathBuf,
}

impl ExternalCommand {
    /// Creates a command that runs `program` in `cwd`.
    pub fn new(program: impl Into<String>, cwd: &Path) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.to_path_buf(),
        }
    }

    /// Builds a command from a user-supplied command line such as `npx slate-tools deploy`.
    pub fn from_command_line(command_line: &str, cwd: &Path) -> Result<Self, ExecutionError> {
        let trimmed = command_line.trim();
        let parts =
            shlex::split(trimmed).ok_or_else(|| ExecutionError::CommandParse(trimmed.to_string()))?;
        let mut parts = parts.into_iter();
        let program = parts.next().ok_or(ExecutionError::EmptyCommand)?;

        let mut command = Self::new(program, cwd);
        command.args.extend(parts.map(Arg::Plain));
        Ok(command)
    }

    /// Appends a plain argument.
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(Arg::Plain(value.into()));
        self
    }

    /// Appends an argument that must never be printed.
    pub fn secret_arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(Arg::Secret(value.into()));
        self
    }

    /// The directory the command runs in.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// The program followed by its raw argument values, secrets included.
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(Arg::value))
            .collect()
    }

    /// The command line with secrets masked, quoted for copy-pasting into a shell.
    pub fn display(&self) -> String {
        let words: Vec<&str> = std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(|arg| match arg {
                Arg::Plain(v) => v.as_str(),
                Arg::Secret(_) => REDACTED,
            }))
            .collect();
        shlex::try_join(words.iter().copied()).unwrap_or_else(|_| words.join(" "))
    }

    fn to_tokio(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(self.args.iter().map(Arg::value))
            .current_dir(dunce::simplified(&self.cwd))
            .stdin(Stdio::null());
        command
    }

    fn spawn_error(&self, e: std::io::Error) -> ExecutionError {
        if e.kind() == ErrorKind::NotFound {
            ExecutionError::ProgramNotFound(self.program.clone())
        } else {
            ExecutionError::CommandFailed(self.display(), e)
        }
    }
}

/// Runs a command to completion with its output streamed to the user's terminal.
pub async fn execute_command(command: &ExternalCommand) -> Result<(), ExecutionError> {
    log::debug!(
        "Executing '{}' in {}",
        command.display(),
        command.cwd.display()
    );

    let status = command
        .to_tokio()
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| command.spawn_error(e))?;

    if !status.success() {
        return Err(ExecutionError::NonZeroExitStatus {
            command: command.display(),
            status,
            stderr: String::new(),
        });
    }
    Ok(())
}

/// Runs a command and captures its standard output.
/// Stderr is captured as well so that it can be attached to the error on failure.
pub async fn execute_and_capture_output(command: &ExternalCommand) -> Result<String, ExecutionError> {
    log::debug!(
        "Capturing output of '{}' in {}",
        command.display(),
        command.cwd.display()
    );

    let output = command
        .to_tokio()
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| command.spawn_error(e))?;

    if !output.status.success() {
        return Err(ExecutionError::NonZeroExitStatus {
            command: command.display(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    String::from_utf8(output.stdout).map_err(|e| ExecutionError::InvalidUtf8Output {
        command: command.display(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_masks_secrets() {
        let cmd = ExternalCommand::new("theme", Path::new("."))
            .arg("download")
            .arg("--password")
            .secret_arg("shppa_123")
            .arg("--store")
            .arg("shop.myshopify.com");
        let shown = cmd.display();
        assert!(!shown.contains("shppa_123"));
        assert!(shown.contains(REDACTED));
        assert!(shown.contains("--store shop.myshopify.com"));
        assert_eq!(cmd.argv()[3], "shppa_123");
    }

    #[test]
    fn test_from_command_line_splits_like_a_shell() {
        let cmd = ExternalCommand::from_command_line("npx 'slate tools' deploy", Path::new(".")).unwrap();
        assert_eq!(cmd.argv(), vec!["npx", "slate tools", "deploy"]);
    }

    #[test]
    fn test_from_command_line_rejects_empty_and_unbalanced() {
        assert!(matches!(
            ExternalCommand::from_command_line("   ", Path::new(".")),
            Err(ExecutionError::EmptyCommand)
        ));
        assert!(matches!(
            ExternalCommand::from_command_line("npx 'unterminated", Path::new(".")),
            Err(ExecutionError::CommandParse(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_capture_output_success() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = ExternalCommand::new("echo", dir.path()).arg("hello");
        let out = execute_and_capture_output(&cmd).await.unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_capture_output_non_zero_includes_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = ExternalCommand::new("sh", dir.path())
            .arg("-c")
            .arg("echo boom >&2; exit 3");
        let err = execute_and_capture_output(&cmd).await.unwrap_err();
        match err {
            ExecutionError::NonZeroExitStatus { stderr, status, .. } => {
                assert_eq!(stderr.trim(), "boom");
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("Expected NonZeroExitStatus, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = ExternalCommand::new("definitely-not-a-real-binary-4f2a", dir.path());
        let err = execute_command(&cmd).await.unwrap_err();
        assert!(matches!(err, ExecutionError::ProgramNotFound(_)));
    }
}
