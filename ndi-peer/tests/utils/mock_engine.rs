use async_trait::async_trait;
use ndi_peer::{EngineLauncher, EngineLink, PeerError};
use ndi_peer_core::{CommandFrame, CommandName, CorrelationId, EventFrame, EventKind};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, WriteHalf, duplex, split};
use tokio::sync::{Mutex, mpsc};

/// Timeout for waiting on a command from the facade (ms).
pub const COMMAND_TIMEOUT_MS: u64 = 5000;

/// In-memory stand-in for the native engine process: reads command frames
/// from its end of a duplex pipe and lets tests script responses and
/// events.
pub struct MockEngine {
    command_rx: Mutex<mpsc::UnboundedReceiver<CommandFrame>>,
    seen: Arc<Mutex<Vec<CommandFrame>>>,
    writer: Mutex<WriteHalf<DuplexStream>>,
}

/// Hands the facade the other end of the pipe, exactly once.
pub struct MockLauncher {
    link: Mutex<Option<EngineLink>>,
}

#[async_trait]
impl EngineLauncher for MockLauncher {
    async fn launch(&self) -> Result<EngineLink, PeerError> {
        self.link
            .lock()
            .await
            .take()
            .ok_or_else(|| PeerError::Transport("mock link already taken".into()))
    }
}

impl MockEngine {
    pub fn new() -> (Arc<MockLauncher>, Arc<MockEngine>) {
        let (facade_io, engine_io) = duplex(64 * 1024);
        let (facade_read, facade_write) = split(facade_io);
        let (engine_read, engine_write) = split(engine_io);

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let seen: Arc<Mutex<Vec<CommandFrame>>> = Arc::new(Mutex::new(Vec::new()));

        let seen_task = seen.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(engine_read).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if line.trim().is_empty() {
                    continue;
                }
                let frame: CommandFrame =
                    serde_json::from_str(&line).expect("facade sent a malformed command frame");
                seen_task.lock().await.push(frame.clone());
                if command_tx.send(frame).is_err() {
                    break;
                }
            }
        });

        let launcher = Arc::new(MockLauncher {
            link: Mutex::new(Some(EngineLink::from_io(facade_write, facade_read))),
        });
        let engine = Arc::new(MockEngine {
            command_rx: Mutex::new(command_rx),
            seen,
            writer: Mutex::new(engine_write),
        });
        (launcher, engine)
    }

    /// Next command sent by the facade, panicking after a timeout.
    pub async fn next_command(&self) -> CommandFrame {
        let mut rx = self.command_rx.lock().await;
        tokio::time::timeout(
            std::time::Duration::from_millis(COMMAND_TIMEOUT_MS),
            rx.recv(),
        )
        .await
        .expect("timed out waiting for a command")
        .expect("facade side of the pipe closed")
    }

    /// Next command, asserting its name.
    pub async fn expect_command(&self, name: CommandName) -> CommandFrame {
        let frame = self.next_command().await;
        assert_eq!(frame.name, name, "unexpected command: {frame:?}");
        frame
    }

    /// Every command observed so far, in arrival order.
    pub async fn commands(&self) -> Vec<CommandFrame> {
        self.seen.lock().await.clone()
    }

    pub async fn command_count(&self) -> usize {
        self.seen.lock().await.len()
    }

    pub async fn respond_ok(&self, id: CorrelationId, result: Value) {
        self.write_frame(serde_json::json!({"id": id, "result": result}))
            .await;
    }

    pub async fn respond_err(&self, id: CorrelationId, message: &str) {
        self.write_frame(serde_json::json!({"id": id, "error": message}))
            .await;
    }

    /// Write an arbitrary inbound frame, e.g. a response with an unknown id.
    pub async fn respond_raw(&self, frame: Value) {
        self.write_frame(frame).await;
    }

    pub async fn emit_event(&self, kind: EventKind, payload: Value) {
        let frame = serde_json::to_value(EventFrame::new(kind, payload))
            .expect("event frame serializes");
        self.write_frame(frame).await;
    }

    async fn write_frame(&self, frame: Value) {
        let mut line = serde_json::to_vec(&frame).expect("frame serializes");
        line.push(b'\n');
        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await.expect("engine pipe open");
        writer.flush().await.expect("engine pipe open");
    }
}
