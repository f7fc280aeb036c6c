pub mod model;

pub use model::{
    CommandFrame, CommandName, CorrelationId, EngineEvent, EventDecodeError, EventFrame,
    EventKind, IceCandidate, IceConnectionState, IceGatheringState, InboundFrame, NdiConfig,
    NdiPeerConfig, NdiSource, PreviewConfig, ResponseFrame, SessionDescription, SignalingState,
    StreamInfo, TrackInfo,
};
