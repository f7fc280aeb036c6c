use crate::model::frame::{EventFrame, EventKind};
use crate::model::state::{IceConnectionState, IceGatheringState, SignalingState};
use crate::model::track::TrackInfo;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("cannot decode {kind:?} event: {reason}")]
pub struct EventDecodeError {
    pub kind: EventKind,
    pub reason: String,
}

/// A decoded engine event. State changes arrive as numeric indices into
/// the standard state orderings; track and channel events carry structured
/// payloads.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    IceConnectionState(IceConnectionState),
    IceGatheringState(IceGatheringState),
    SignalingState(SignalingState),
    Track(TrackInfo),
    TrackRemoved(TrackInfo),
    DataChannel { label: String },
    Error(String),
}

impl EngineEvent {
    pub fn decode(frame: EventFrame) -> Result<Self, EventDecodeError> {
        let kind = frame.kind;
        let fail = |reason: String| EventDecodeError { kind, reason };

        match kind {
            EventKind::IceConnectionState => {
                let state = state_index(&frame.payload)
                    .and_then(IceConnectionState::from_index)
                    .ok_or_else(|| fail(format!("bad state index {}", frame.payload)))?;
                Ok(Self::IceConnectionState(state))
            }
            EventKind::IceGatheringState => {
                let state = state_index(&frame.payload)
                    .and_then(IceGatheringState::from_index)
                    .ok_or_else(|| fail(format!("bad state index {}", frame.payload)))?;
                Ok(Self::IceGatheringState(state))
            }
            EventKind::SignalingState => {
                let state = state_index(&frame.payload)
                    .and_then(SignalingState::from_index)
                    .ok_or_else(|| fail(format!("bad state index {}", frame.payload)))?;
                Ok(Self::SignalingState(state))
            }
            EventKind::Track => {
                let track = serde_json::from_value(frame.payload)
                    .map_err(|e| fail(e.to_string()))?;
                Ok(Self::Track(track))
            }
            EventKind::RemoveTrack => {
                let track = serde_json::from_value(frame.payload)
                    .map_err(|e| fail(e.to_string()))?;
                Ok(Self::TrackRemoved(track))
            }
            EventKind::DataChannel => {
                let label = match &frame.payload {
                    Value::String(name) => Some(name.clone()),
                    other => other
                        .get("name")
                        .and_then(Value::as_str)
                        .map(str::to_owned),
                };
                let label =
                    label.ok_or_else(|| fail(format!("no channel name in {}", frame.payload)))?;
                Ok(Self::DataChannel { label })
            }
            EventKind::Error => {
                let message = match &frame.payload {
                    Value::String(message) => message.clone(),
                    other => other.to_string(),
                };
                Ok(Self::Error(message))
            }
        }
    }
}

fn state_index(payload: &Value) -> Option<u64> {
    payload.as_u64()
}
