use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::error::AttemptError;

/// Runs `program` to completion and returns its stdout. A non-zero exit is a failure.
pub(crate) async fn output(program: &Path, args: &[String]) -> Result<String, AttemptError> {
    let command = render(program, args);
    tracing::debug!(%command, "spawn");

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| AttemptError::Spawn {
            command: command.clone(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::debug!(%command, stderr = %stderr.trim(), "non-zero exit");
        return Err(AttemptError::Exit {
            command,
            status: output.status.to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn render(program: &Path, args: &[String]) -> String {
    let mut command = program.display().to_string();
    for arg in args {
        command.push(' ');
        command.push_str(arg);
    }
    command
}
