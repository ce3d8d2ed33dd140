//! Running the external analysis tool.

use crate::error::DebtError;
use anyhow::{Context, Result, anyhow};
use std::fs::File;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::Duration;
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

/// Run `args` in `cwd` with stdout and stderr redirected into the given files.
///
/// The exit status is returned but not judged: analysis tools exit non-zero
/// whenever they find something. With a `timeout`, a child still running when
/// it elapses is killed and `DebtError::ToolTimedOut` is returned. On unix the
/// tool leads its own process group and the whole group is killed, so helpers
/// started by wrapper scripts (node shims, `sh -c`) go down with it.
#[instrument(skip_all, fields(program = args.first().map(String::as_str), cwd = %cwd.display()))]
pub fn run_to_files(
    args: &[String],
    cwd: &Path,
    stdout: &File,
    stderr: &File,
    timeout: Option<Duration>,
) -> Result<ExitStatus> {
    let (program, rest) = args
        .split_first()
        .ok_or_else(|| anyhow!("Tool command is empty"))?;

    let mut cmd = Command::new(program);
    cmd.args(rest)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout.try_clone().context("Failed to share report file")?))
        .stderr(Stdio::from(stderr.try_clone().context("Failed to share log file")?));
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    debug!("spawning analysis tool");
    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            error!(err = %e, "failed to spawn analysis tool");
            return Err(e).with_context(|| format!("Failed to launch `{}`", program));
        }
    };

    let status = match timeout {
        None => child.wait().context("Failed to wait for analysis tool")?,
        Some(limit) => match child
            .wait_timeout(limit)
            .context("Failed to wait for analysis tool")?
        {
            Some(status) => status,
            None => {
                warn!(timeout_secs = limit.as_secs(), "analysis tool timed out, killing");
                kill_tool(&mut child)?;
                child.wait().context("Failed to reap analysis tool")?;
                return Err(DebtError::ToolTimedOut {
                    tool: program.clone(),
                    secs: limit.as_secs(),
                }
                .into());
            }
        },
    };

    debug!(exit_code = ?status.code(), "analysis tool finished");
    Ok(status)
}

/// Kill the tool's process group, or the tool alone when that is not possible
fn kill_tool(child: &mut Child) -> Result<()> {
    #[cfg(unix)]
    {
        let group = format!("-{}", child.id());
        let killed = Command::new("sh")
            .args(["-c", "kill -KILL \"$0\"", group.as_str()])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match killed {
            Ok(status) if status.success() => return Ok(()),
            Ok(status) => debug!(exit_code = ?status.code(), "process group kill failed"),
            Err(e) => debug!(err = %e, "process group kill failed"),
        }
    }

    child.kill().context("Failed to kill analysis tool")
}
