use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

use serde::Serialize;
use tracing::{debug, info};

use crate::connection::Connection;
use crate::error::P4Error;

/// Captured output of one invocation. The exit status is never interpreted
/// here; see [`CommandResult::check`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub status: i32,
}

impl CommandResult {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>, status: i32) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            status,
        }
    }

    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// Turns a non-zero exit status into [`P4Error::Operation`].
    ///
    /// Best-effort operations hand back the raw result and leave this call to
    /// the caller; must-succeed operations call it themselves.
    pub fn check(self, message: impl Into<String>) -> Result<Self, P4Error> {
        if self.success() {
            Ok(self)
        } else {
            Err(P4Error::operation(message, &self.stderr))
        }
    }
}

/// Runs one command to completion. `args` excludes the binary itself.
pub trait CommandRunner {
    fn run(&self, args: &[String], stdin: Option<&str>) -> Result<CommandResult, P4Error>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, args: &[String], stdin: Option<&str>) -> Result<CommandResult, P4Error> {
        (**self).run(args, stdin)
    }
}

impl CommandRunner for Connection {
    fn run(&self, args: &[String], stdin: Option<&str>) -> Result<CommandResult, P4Error> {
        let mut words = Vec::with_capacity(args.len() + 1);
        words.push(self.binary.to_string_lossy().to_string());
        words.extend(args.iter().cloned());
        let command_line = shell_words::join(&words);
        if self.verbose {
            info!(command = %command_line, "running p4");
        } else {
            debug!(command = %command_line, "running p4");
        }

        let mut process = Command::new(&self.binary)
            .args(args)
            .envs(&self.env)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let (Some(input), Some(mut pipe)) = (stdin, process.stdin.take()) {
            // The tool may reject the form and exit before reading all of it;
            // its stderr is still worth collecting.
            match pipe.write_all(input.as_bytes()) {
                Err(err) if err.kind() != ErrorKind::BrokenPipe => return Err(err.into()),
                _ => {}
            }
        }

        let output = process.wait_with_output()?;
        let status = output.status.code().unwrap_or(-1);
        debug!(command = %command_line, status, "p4 finished");
        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status,
        })
    }
}
