use crate::error::PeerError;
use async_trait::async_trait;
use ndi_peer_core::{NdiConfig, PreviewConfig};

/// External preview pipeline re-encoding a subset of incoming media for
/// local monitoring. The facade only drives its lifecycle; the actual
/// re-encoding lives elsewhere.
///
/// `spawn` is called again on every track arrival, so implementations must
/// treat a repeated spawn as a no-op while already running.
#[async_trait]
pub trait PreviewStreamer: Send + Sync {
    async fn spawn(&self) -> Result<(), PeerError>;

    async fn destroy(&self);

    /// Preview settings to merge into the `createPeer` payload, derived
    /// from the main NDI configuration.
    fn ndi_config(&self, ndi: Option<&NdiConfig>) -> PreviewConfig;
}
