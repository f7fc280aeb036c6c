mod config;
mod correlation;
mod description;
mod event;
mod frame;
mod source;
mod state;
mod track;

pub use config::{NdiConfig, NdiPeerConfig, PreviewConfig};
pub use correlation::CorrelationId;
pub use description::{IceCandidate, SessionDescription};
pub use event::{EngineEvent, EventDecodeError};
pub use frame::{CommandFrame, CommandName, EventFrame, EventKind, InboundFrame, ResponseFrame};
pub use source::NdiSource;
pub use state::{IceConnectionState, IceGatheringState, SignalingState};
pub use track::{StreamInfo, TrackInfo};
