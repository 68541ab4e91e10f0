//! Subprocess execution for package-manager tools
//!
//! Every command runs in an explicit working directory and is killed once
//! its timeout expires. Output is drained on reader threads while waiting,
//! so chatty tools cannot block on a full pipe. The deadline also covers
//! collecting that output, since a background process left behind by the
//! tool can hold the pipes open after the tool itself exits.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;
use wait_timeout::ChildExt;

use crate::error::{self, Result};

/// Captured result of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Program names and limits used to invoke external tools
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub npm: String,
    pub python: String,
    pub timeout: Duration,
}

impl Toolchain {
    pub fn new(npm: impl Into<String>, python: impl Into<String>, timeout: Duration) -> Self {
        Self {
            npm: npm.into(),
            python: python.into(),
            timeout,
        }
    }

    /// Run npm and fail unless it exits successfully
    pub fn npm(&self, args: &[&str], cwd: &Path) -> Result<CommandOutput> {
        run_checked(&self.npm, args, cwd, self.timeout)
    }

    /// Run npm and return its output whatever the exit status
    pub fn npm_output(&self, args: &[&str], cwd: &Path) -> Result<CommandOutput> {
        run(&self.npm, args, cwd, self.timeout)
    }

    pub fn python(&self, args: &[&str], cwd: &Path) -> Result<CommandOutput> {
        run_checked(&self.python, args, cwd, self.timeout)
    }
}

/// Render a command line for messages
pub fn display_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// npm and friends are batch scripts on Windows and need the shell
#[cfg(windows)]
fn command(program: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", program]);
    cmd
}

#[cfg(not(windows))]
fn command(program: &str) -> Command {
    Command::new(program)
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });
    rx
}

/// Output of a reader thread, or `None` if the pipe is still open at `deadline`
fn collect(output: &Receiver<String>, deadline: Instant) -> Option<String> {
    match output.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(text) => Some(text),
        Err(RecvTimeoutError::Disconnected) => Some(String::new()),
        Err(RecvTimeoutError::Timeout) => None,
    }
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Run `program` with `args` in `cwd`, capturing its output
pub fn run(program: &str, args: &[&str], cwd: &Path, timeout: Duration) -> Result<CommandOutput> {
    let command_line = display_command(program, args);
    debug!(command = %command_line, cwd = %cwd.display(), "running");
    let deadline = Instant::now() + timeout;

    let mut child = command(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| error::package::command_failed(&command_line, e.to_string()))?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = match child.wait_timeout(timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            kill(&mut child);
            return Err(error::package::command_timed_out(command_line, timeout.as_secs()));
        }
        Err(e) => {
            kill(&mut child);
            return Err(error::package::command_failed(command_line, e.to_string()));
        }
    };

    let (Some(stdout), Some(stderr)) = (collect(&stdout, deadline), collect(&stderr, deadline))
    else {
        debug!(command = %command_line, "output still open after exit");
        return Err(error::package::command_timed_out(command_line, timeout.as_secs()));
    };

    Ok(CommandOutput {
        success: status.success(),
        code: status.code(),
        stdout,
        stderr,
    })
}

/// Like [`run`], but a non-zero exit is an error carrying the tail of stderr
pub fn run_checked(
    program: &str,
    args: &[&str],
    cwd: &Path,
    timeout: Duration,
) -> Result<CommandOutput> {
    let output = run(program, args, cwd, timeout)?;
    if output.success {
        return Ok(output);
    }
    Err(error::package::command_failed(
        display_command(program, args),
        failure_reason(&output),
    ))
}

fn failure_reason(output: &CommandOutput) -> String {
    let status = output
        .code
        .map_or_else(|| "terminated by signal".to_string(), |c| format!("exit code {c}"));
    let tail: Vec<&str> = output.stderr.lines().rev().take(5).collect();
    if tail.is_empty() {
        status
    } else {
        let tail: Vec<&str> = tail.into_iter().rev().collect();
        format!("{status}: {}", tail.join("\n"))
    }
}
