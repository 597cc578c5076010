use std::{io, process::Stdio};

use crate::command::Invocation;

#[derive(Debug, thiserror::Error)]
pub(crate) enum RunError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// What the tool left behind. Only `stderr` carries the report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Captured {
    pub(crate) code: Option<i32>,
    pub(crate) stderr: String,
}

impl Captured {
    pub(crate) fn success(&self) -> bool {
        self.code == Some(0)
    }
}

#[tower_lsp::async_trait]
pub(crate) trait Runner: Send + Sync + 'static {
    async fn run(&self, invocation: &Invocation) -> Result<Captured, RunError>;
}

/// Spawns the real tool. There is no timeout.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ProcessRunner;

#[tower_lsp::async_trait]
impl Runner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<Captured, RunError> {
        let output = tokio::process::Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| RunError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;
        Ok(Captured {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
