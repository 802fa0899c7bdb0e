use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use hatch_core::error::{HatchError, Result};

/// Where to get git if it is missing.
pub(crate) const GIT_INSTALL: &str = "https://git-scm.com/downloads";

/// Run `program args...` and return its stdout.
///
/// Prompts are disabled so a credential request fails instead of hanging.
/// The child is killed if it outlives `timeout` or if the returned future
/// is dropped.
pub(crate) async fn run_git<I, S>(
    program: &Path,
    args: I,
    cwd: Option<&Path>,
    timeout: Duration,
    operation: &'static str,
) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    tracing::trace!("running {:?}", cmd.as_std());

    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(HatchError::MissingTool {
                name: "git".into(),
                install: GIT_INSTALL.into(),
            })
        }
        Ok(Err(e)) => return Err(HatchError::git(operation, e.to_string())),
        Err(_) => {
            return Err(HatchError::git(
                operation,
                format!("operation timed out after {} seconds", timeout.as_secs()),
            ))
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = match stderr.trim() {
            "" => format!("git exited with {}", output.status),
            trimmed => trimmed.to_owned(),
        };
        return Err(HatchError::git(operation, message));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
