use crate::channel::launcher::EngineLauncher;
use crate::error::PeerError;
use ndi_peer_core::{CommandFrame, InboundFrame};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::io::AsyncBufReadExt;
use tokio::process::Child;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Owns the connection to the engine: spawns it, writes command frames,
/// decodes inbound frames into a stream, and tears the link down.
///
/// The channel only handles envelope framing; payload contents pass through
/// untouched.
pub struct RequestChannel {
    launcher: Arc<dyn EngineLauncher>,
    writer: Mutex<Option<Box<dyn AsyncWrite + Send + Unpin>>>,
    child: Mutex<Option<Child>>,
    frames: Mutex<Option<mpsc::Receiver<InboundFrame>>>,
    reader_task: Mutex<Option<JoinHandle<()>>>,
    spawned: AtomicBool,
    destroyed: AtomicBool,
}

impl RequestChannel {
    pub fn new(launcher: Arc<dyn EngineLauncher>) -> Self {
        Self {
            launcher,
            writer: Mutex::new(None),
            child: Mutex::new(None),
            frames: Mutex::new(None),
            reader_task: Mutex::new(None),
            spawned: AtomicBool::new(false),
            destroyed: AtomicBool::new(false),
        }
    }

    /// Acquire the engine link. Calling this twice on one channel is a
    /// programming error and fails with [`PeerError::AlreadySpawned`].
    pub async fn spawn(&self) -> Result<(), PeerError> {
        if self.spawned.swap(true, Ordering::SeqCst) {
            return Err(PeerError::AlreadySpawned);
        }

        let link = self.launcher.launch().await?;

        let (frame_tx, frame_rx) = mpsc::channel(256);
        let handle = tokio::spawn(read_frames(link.reader, frame_tx));

        *self.writer.lock().await = Some(link.writer);
        *self.child.lock().await = link.child;
        *self.frames.lock().await = Some(frame_rx);
        *self.reader_task.lock().await = Some(handle);

        info!("engine link spawned");
        Ok(())
    }

    /// Write one command frame. Fails with [`PeerError::Transport`] when the
    /// link is not open. The writer lock serializes concurrent senders, so
    /// commands hit the wire in call order.
    pub async fn send(&self, frame: &CommandFrame) -> Result<(), PeerError> {
        let mut guard = self.writer.lock().await;
        let Some(writer) = guard.as_mut() else {
            return Err(PeerError::Transport("engine link is not open".into()));
        };

        let mut line = serde_json::to_vec(frame)
            .map_err(|e| PeerError::Transport(format!("failed to encode command: {e}")))?;
        line.push(b'\n');

        writer
            .write_all(&line)
            .await
            .map_err(|e| PeerError::Transport(e.to_string()))?;
        writer
            .flush()
            .await
            .map_err(|e| PeerError::Transport(e.to_string()))?;
        Ok(())
    }

    /// The inbound frame stream. Taken exactly once (by the correlator);
    /// ends when the channel is destroyed or the engine hangs up.
    pub async fn take_frames(&self) -> Option<mpsc::Receiver<InboundFrame>> {
        self.frames.lock().await.take()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// Release the link: close the transport, kill a process-launched
    /// engine, and end the frame stream. Idempotent.
    pub async fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("destroying engine link");

        // Dropping the writer closes the engine's stdin.
        self.writer.lock().await.take();

        if let Some(mut child) = self.child.lock().await.take() {
            if let Err(e) = child.start_kill() {
                warn!("failed to kill engine process: {e}");
            }
        }

        if let Some(task) = self.reader_task.lock().await.take() {
            task.abort();
        }
    }
}

async fn read_frames(
    reader: Box<dyn AsyncRead + Send + Unpin>,
    frame_tx: mpsc::Sender<InboundFrame>,
) {
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<InboundFrame>(line) {
                    Ok(frame) => {
                        if frame_tx.send(frame).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("discarding malformed engine frame: {e}"),
                }
            }
            Ok(None) => {
                debug!("engine stream ended");
                break;
            }
            Err(e) => {
                warn!("engine read failed: {e}");
                break;
            }
        }
    }
}
