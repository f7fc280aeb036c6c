use crate::error::PeerError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::{Child, Command};
use tracing::info;

/// Raw endpoints of an engine connection: a write half for commands, a read
/// half for response/event frames, and the child handle when the engine was
/// launched as a process.
pub struct EngineLink {
    pub writer: Box<dyn AsyncWrite + Send + Unpin>,
    pub reader: Box<dyn AsyncRead + Send + Unpin>,
    pub child: Option<Child>,
}

impl EngineLink {
    /// Wrap an arbitrary I/O pair, e.g. an in-memory duplex in tests.
    pub fn from_io(
        writer: impl AsyncWrite + Send + Unpin + 'static,
        reader: impl AsyncRead + Send + Unpin + 'static,
    ) -> Self {
        Self {
            writer: Box::new(writer),
            reader: Box::new(reader),
            child: None,
        }
    }
}

/// How a [`RequestChannel`](crate::RequestChannel) acquires its engine
/// connection. The production impl spawns the native engine binary;
/// tests inject in-memory pipes.
#[async_trait]
pub trait EngineLauncher: Send + Sync {
    async fn launch(&self) -> Result<EngineLink, PeerError>;
}

/// Launches the engine as a child process and talks newline-delimited JSON
/// over its stdio.
pub struct ProcessLauncher {
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessLauncher {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

#[async_trait]
impl EngineLauncher for ProcessLauncher {
    async fn launch(&self) -> Result<EngineLink, PeerError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                PeerError::Transport(format!(
                    "failed to spawn engine {}: {e}",
                    self.program.display()
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| PeerError::Transport("engine stdin unavailable".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| PeerError::Transport("engine stdout unavailable".into()))?;

        info!("engine process {} started", self.program.display());

        Ok(EngineLink {
            writer: Box::new(stdin),
            reader: Box::new(stdout),
            child: Some(child),
        })
    }
}
