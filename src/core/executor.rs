// Local command execution behind a trait so step logic can be tested
// with a scripted runner instead of spawning real processes.

use crate::ssh::CommandOutput;
use std::process::Command;

/// Runs a local program with an argv, capturing output.
///
/// This is the execution collaborator for commands that run on the
/// workstation side (e.g. rsync for the artifact mirror). Retry and
/// fatality policy belong to the caller; the runner only reports.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[String]) -> CommandOutput;
}

/// Production runner backed by std::process.
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[String]) -> CommandOutput {
        match Command::new(program).args(args).output() {
            Ok(out) => CommandOutput {
                stdout: String::from_utf8_lossy(&out.stdout).to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).to_string(),
                success: out.status.success(),
                exit_code: out.status.code().unwrap_or(-1),
            },
            Err(e) => CommandOutput {
                stdout: String::new(),
                stderr: format!("Command error: {}", e),
                success: false,
                exit_code: -1,
            },
        }
    }
}
