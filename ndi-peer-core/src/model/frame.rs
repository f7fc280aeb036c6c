use crate::model::correlation::CorrelationId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Command names understood by the native engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandName {
    CreatePeer,
    SetLocalDescription,
    SetRemoteDescription,
    CreateOffer,
    CreateAnswer,
    AddIceCandidate,
    CreateDataChannel,
    GetStats,
    GetStatsOld,
    GetSenders,
    GetReceivers,
    AddTrack,
    RemoveTrack,
    ReplaceTrack,
    #[serde(rename = "findNDISources")]
    FindNdiSources,
}

/// Outbound frame: one command addressed to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandFrame {
    pub id: CorrelationId,
    pub name: CommandName,
    pub payload: Value,
}

/// Inbound reply to a specific command. Carries either `result` or `error`;
/// a frame with neither settles as a null result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseFrame {
    pub id: CorrelationId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Kinds of unsolicited notifications pushed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    IceConnectionState,
    IceGatheringState,
    SignalingState,
    Track,
    RemoveTrack,
    #[serde(rename = "datachannel")]
    DataChannel,
    Error,
}

/// Inbound frame without a correlation id: an asynchronous engine event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventFrame {
    /// Marker distinguishing events from responses on the wire.
    pub event: bool,
    pub kind: EventKind,
    #[serde(default)]
    pub payload: Value,
}

impl EventFrame {
    pub fn new(kind: EventKind, payload: Value) -> Self {
        Self {
            event: true,
            kind,
            payload,
        }
    }
}

/// Everything the engine may write to us. Responses carry an `id`, events
/// carry the `event` marker instead, so the untagged match is unambiguous.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InboundFrame {
    Response(ResponseFrame),
    Event(EventFrame),
}
