//! External command execution

use std::{fmt, str::FromStr};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{Result, ZkError};

/// A program plus leading arguments, e.g. `sudo /usr/sbin/service`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }
}

impl FromStr for CommandLine {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| "command must not be empty".to_string())?;
        Ok(Self::new(program).args(parts))
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

/// Captured result of a finished command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Run a command to completion and capture its output.
///
/// Only a failure to spawn is an error; a non-zero exit is reported through
/// [`CommandOutput::success`].
pub async fn run(cmd: &CommandLine) -> Result<CommandOutput> {
    debug!("Running `{}`", cmd);

    let output = Command::new(&cmd.program)
        .args(&cmd.args)
        .output()
        .await
        .map_err(|e| ZkError::CommandFailed {
            command: cmd.to_string(),
            message: format!("failed to execute: {}", e),
        })?;

    Ok(CommandOutput {
        success: output.status.success(),
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Run a command, log what happened and carry on regardless of the outcome
pub async fn run_logged(cmd: &CommandLine) -> Option<CommandOutput> {
    match run(cmd).await {
        Ok(output) => {
            if output.success {
                debug!("`{}` succeeded: {}", cmd, output.stdout.trim_end());
            } else {
                warn!(
                    "`{}` exited with code {}: {}",
                    cmd,
                    output.code.unwrap_or(-1),
                    output.stderr.trim_end()
                );
            }
            Some(output)
        }
        Err(e) => {
            warn!("{}", e);
            None
        }
    }
}

/// Run a command and turn a non-zero exit into [`ZkError::CommandFailed`]
pub async fn run_checked(cmd: &CommandLine) -> Result<CommandOutput> {
    let output = run(cmd).await?;
    if !output.success {
        return Err(ZkError::CommandFailed {
            command: cmd.to_string(),
            message: format!(
                "exit code {}: {}",
                output.code.unwrap_or(-1),
                output.stderr.trim_end()
            ),
        });
    }
    Ok(output)
}
