use crate::channel::request_channel::RequestChannel;
use crate::error::PeerError;
use dashmap::DashMap;
use ndi_peer_core::{CommandFrame, CommandName, CorrelationId, EngineEvent, InboundFrame};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

type PendingSender = oneshot::Sender<Result<Value, PeerError>>;

/// Matches commands to their responses by correlation id.
///
/// One demux task per channel: response frames settle the pending entry
/// registered by [`request`](Self::request); event frames are forwarded to
/// the peer's event stream. Responses with an unknown id (including
/// duplicates, which find their entry already removed) are logged and
/// dropped, never surfaced to a caller.
pub struct CallCorrelator {
    channel: Arc<RequestChannel>,
    pending: Arc<DashMap<CorrelationId, PendingSender>>,
}

impl CallCorrelator {
    /// Take over the channel's frame stream and start demultiplexing.
    /// Returns the correlator plus the receiver of decoded engine events.
    pub async fn start(
        channel: Arc<RequestChannel>,
    ) -> Result<(Arc<Self>, mpsc::Receiver<EngineEvent>), PeerError> {
        let frames = channel
            .take_frames()
            .await
            .ok_or_else(|| PeerError::Transport("frame stream already taken".into()))?;

        let pending: Arc<DashMap<CorrelationId, PendingSender>> = Arc::new(DashMap::new());
        let (event_tx, event_rx) = mpsc::channel(256);

        tokio::spawn(demux(frames, pending.clone(), event_tx));

        Ok((Arc::new(Self { channel, pending }), event_rx))
    }

    /// Send a command and await its response. Settles with the engine's
    /// result, its error verbatim, or [`PeerError::ChannelClosed`] when the
    /// channel is torn down first.
    pub async fn request(&self, name: CommandName, payload: Value) -> Result<Value, PeerError> {
        let id = CorrelationId::new();
        let (tx, rx) = oneshot::channel();
        self.pending.insert(id, tx);
        debug!(command = ?name, %id, "sending command");

        let frame = CommandFrame { id, name, payload };
        if let Err(e) = self.channel.send(&frame).await {
            self.pending.remove(&id);
            return Err(e);
        }

        match rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(PeerError::ChannelClosed),
        }
    }

    /// Destroy the channel and force-reject every pending operation with
    /// [`PeerError::ChannelClosed`] in the same teardown step, so no caller
    /// can await past teardown.
    pub async fn shutdown(&self) {
        self.channel.destroy().await;
        reject_all(&self.pending);
    }
}

async fn demux(
    mut frames: mpsc::Receiver<InboundFrame>,
    pending: Arc<DashMap<CorrelationId, PendingSender>>,
    events: mpsc::Sender<EngineEvent>,
) {
    while let Some(frame) = frames.recv().await {
        match frame {
            InboundFrame::Response(response) => {
                let Some((_, tx)) = pending.remove(&response.id) else {
                    warn!(id = %response.id, "response for unknown correlation id dropped");
                    continue;
                };
                let outcome = match response.error {
                    Some(message) => Err(PeerError::Remote(message)),
                    None => Ok(response.result.unwrap_or(Value::Null)),
                };
                if tx.send(outcome).is_err() {
                    debug!(id = %response.id, "caller went away before settlement");
                }
            }
            InboundFrame::Event(frame) => match EngineEvent::decode(frame) {
                Ok(event) => {
                    // Nobody listening for events (e.g. a discovery-only
                    // channel) is fine; keep draining responses.
                    let _ = events.send(event).await;
                }
                Err(e) => warn!("discarding undecodable engine event: {e}"),
            },
        }
    }
    reject_all(&pending);
}

fn reject_all(pending: &DashMap<CorrelationId, PendingSender>) {
    let ids: Vec<CorrelationId> = pending.iter().map(|entry| *entry.key()).collect();
    for id in ids {
        if let Some((_, tx)) = pending.remove(&id) {
            let _ = tx.send(Err(PeerError::ChannelClosed));
        }
    }
}
