use std::env;
use std::error::Error;
use std::fmt;
use std::path::Path;
use std::process::Command;

use xshell::{Cmd, Shell};

/// Environment variable to control output verbosity.
/// Set to "quiet" to suppress informational messages and command echoes.
/// Any other value (or unset) defaults to verbose mode.
const LOG_LEVEL_ENV_VAR: &str = "DOCTASKS_LOG_LEVEL";

/// Path to the configuration file relative to the working directory.
pub const CONFIG_FILE_PATH: &str = "doctasks.toml";

/// Check if we're in quiet mode via environment variable.
pub fn is_quiet_mode() -> bool { env::var(LOG_LEVEL_ENV_VAR).is_ok_and(|v| v == "quiet") }

/// Print a message unless in quiet mode.
pub fn quiet_println(msg: &str) {
    if !is_quiet_mode() {
        println!("{}", msg);
    }
}

/// Change to the directory the tasks should run in.
///
/// # Errors
///
/// Returns an error if `dir` is not an existing directory.
pub fn change_to_directory(sh: &Shell, dir: &Path) -> Result<(), Box<dyn Error>> {
    let dir = sh.current_dir().join(dir);
    if !dir.is_dir() {
        return Err(format!("Not a directory: {}", dir.display()).into());
    }
    sh.change_dir(dir);
    Ok(())
}

/// An external step exited unsuccessfully.
#[derive(Debug)]
pub struct StepFailed {
    /// The command line that was run.
    pub command: String,
    /// Exit code of the child, `None` if it was killed by a signal.
    pub code: Option<i32>,
}

impl fmt::Display for StepFailed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "`{}` exited with code {}", self.command, code),
            None => write!(f, "`{}` was terminated by a signal", self.command),
        }
    }
}

impl Error for StepFailed {}

/// Run one external step with inherited stdio, echoing it unless in quiet mode.
///
/// # Errors
///
/// * The program could not be started.
/// * The program exited non-zero, reported as [`StepFailed`] carrying its exit code.
pub fn run_step(cmd: Cmd<'_>) -> Result<(), Box<dyn Error>> {
    let command = cmd.to_string();
    if !is_quiet_mode() {
        eprintln!("$ {}", command);
    }

    // Converting keeps the shell's working directory and environment, but
    // unlike `Cmd::run` the exit status stays available to the caller.
    let status = Command::from(cmd)
        .status()
        .map_err(|e| format!("Failed to start `{}`: {}", command, e))?;

    if status.success() {
        return Ok(());
    }

    Err(StepFailed { command, code: status.code() }.into())
}

/// Process exit code for a failed target.
///
/// A failed step passes its own exit code through untouched, anything else is `1`.
pub fn exit_code(err: &(dyn Error + 'static)) -> i32 {
    err.downcast_ref::<StepFailed>().and_then(|failed| failed.code).unwrap_or(1)
}
