//! External diagnostic command execution.

use std::process::{Command, Stdio};
use std::time::Duration;
use thiserror::Error;
use wait_timeout::ChildExt;

pub(crate) struct CmdOutput {
    pub stdout: String,
    pub exit_code: i32,
}

#[derive(Debug, Error)]
pub(crate) enum CmdError {
    #[error("command `{0}` not found")]
    NotFound(String),
    #[error("command `{0}` timed out after {1:?}")]
    TimedOut(String, Duration),
    #[error("command `{program}` failed to run: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

fn spawn_error(program: &str, e: std::io::Error) -> CmdError {
    if e.kind() == std::io::ErrorKind::NotFound {
        CmdError::NotFound(program.to_string())
    } else {
        CmdError::Io {
            program: program.to_string(),
            source: e,
        }
    }
}

/// Run a command to completion and capture stdout.
pub(crate) fn run(program: &str, args: &[&str]) -> Result<CmdOutput, CmdError> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| spawn_error(program, e))?;
    Ok(CmdOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        exit_code: output.status.code().unwrap_or(-1),
    })
}

/// Run a command with an upper bound on wall-clock time; the child is killed
/// when the bound expires.
pub(crate) fn run_with_timeout(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<CmdOutput, CmdError> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| spawn_error(program, e))?;

    let status = child.wait_timeout(timeout).map_err(|e| CmdError::Io {
        program: program.to_string(),
        source: e,
    })?;

    match status {
        Some(status) => {
            let output = child.wait_with_output().map_err(|e| CmdError::Io {
                program: program.to_string(),
                source: e,
            })?;
            Ok(CmdOutput {
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                exit_code: status.code().unwrap_or(-1),
            })
        }
        None => {
            let _ = child.kill();
            let _ = child.wait();
            Err(CmdError::TimedOut(program.to_string(), timeout))
        }
    }
}
