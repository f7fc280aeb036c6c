pub mod channel;
mod error;
mod ndi;
pub mod peer;
mod preview;

pub use channel::{CallCorrelator, EngineLauncher, EngineLink, ProcessLauncher, RequestChannel};
pub use error::PeerError;
pub use ndi::find_ndi_sources;
pub use peer::{DataChannel, PeerConnection, StreamLifecycleTracker};
pub use preview::PreviewStreamer;

pub use ndi_peer_core as core;
