use thiserror::Error;

/// Failures surfaced to facade callers. Cloneable because the `createPeer`
/// outcome is shared by every request gated behind it.
#[derive(Debug, Clone, Error)]
pub enum PeerError {
    /// `spawn()` was called on a channel that already holds an engine link.
    #[error("engine link already spawned")]
    AlreadySpawned,

    /// The transport could not be reached or written.
    #[error("transport error: {0}")]
    Transport(String),

    /// The channel was torn down while the operation was still pending.
    #[error("channel closed before the response arrived")]
    ChannelClosed,

    /// The engine answered with an error; carries its message verbatim.
    #[error("engine error: {0}")]
    Remote(String),

    /// The peer connection was closed before the operation was issued.
    #[error("peer connection is closed")]
    Closed,

    /// A payload could not be encoded for, or decoded from, the engine.
    #[error("payload error: {0}")]
    Payload(String),
}

impl PeerError {
    pub(crate) fn payload(err: impl std::fmt::Display) -> Self {
        Self::Payload(err.to_string())
    }
}
