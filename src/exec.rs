//! Local process execution with exit-code-preserving errors.
use std::path::Path;
use std::process::Command;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

/// Failure from running a local command. `Failed` keeps the exit status
/// so callers can pattern-match expected non-zero exits (`git diff
/// --exit-code` returns 1 when a diff exists).
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("command `{command}` exited with status {status}: {output}")]
    Failed {
        command: String,
        status: i32,
        output: String,
    },
    #[error("failed to launch `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Runs a command in a working directory and captures its combined
/// output. No retries; recovery policy belongs to the caller.
#[cfg_attr(test, automock)]
pub trait CommandRunner: Send + Sync {
    fn run(
        &self,
        dir: &Path,
        program: &str,
        args: &[String],
    ) -> std::result::Result<String, ExecError>;
}

/// `CommandRunner` backed by `std::process::Command`.
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(
        &self,
        dir: &Path,
        program: &str,
        args: &[String],
    ) -> std::result::Result<String, ExecError> {
        let rendered = format!("{program} {}", args.join(" "));

        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|source| ExecError::Launch {
                command: rendered.clone(),
                source,
            })?;

        let mut combined =
            String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            Ok(combined)
        } else {
            Err(ExecError::Failed {
                command: rendered,
                status: output.status.code().unwrap_or(-1),
                output: combined,
            })
        }
    }
}
