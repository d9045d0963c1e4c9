// quick-io/src/process.rs
use std::ffi::OsStr;
use std::process::{Command, Output, Stdio};

use quick_common::error::Result;
use tracing::{debug, error};

/// Runs an external command to completion and captures its output.
///
/// A non-zero exit is not an error here; callers inspect `status`.
pub fn run_command(program: &str, args: &[&OsStr]) -> Result<Output> {
    debug!("Running command: {} {:?}", program, args);
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.stdin(Stdio::null());

    match cmd.output() {
        Ok(output) => {
            if !output.status.success() {
                debug!("Command failed with status: {}", output.status);
                let stderr = String::from_utf8_lossy(&output.stderr);
                if !stderr.trim().is_empty() {
                    debug!("Stderr:\n{}", stderr.trim());
                }
            } else {
                debug!("Command finished successfully.");
            }
            Ok(output)
        }
        Err(e) => {
            error!("Failed to execute {}: {}", program, e);
            Err(e.into())
        }
    }
}
