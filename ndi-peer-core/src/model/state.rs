use serde::{Deserialize, Serialize};

/// ICE connection state of the remote peer. The engine pushes these as
/// numeric indices into the standard ordering, hence `from_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IceConnectionState {
    New,
    Checking,
    Connected,
    Completed,
    Disconnected,
    Failed,
    Closed,
}

impl IceConnectionState {
    pub fn from_index(index: u64) -> Option<Self> {
        match index {
            0 => Some(Self::New),
            1 => Some(Self::Checking),
            2 => Some(Self::Connected),
            3 => Some(Self::Completed),
            4 => Some(Self::Disconnected),
            5 => Some(Self::Failed),
            6 => Some(Self::Closed),
            _ => None,
        }
    }
}

impl Default for IceConnectionState {
    fn default() -> Self {
        Self::New
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IceGatheringState {
    New,
    Gathering,
    Complete,
}

impl IceGatheringState {
    pub fn from_index(index: u64) -> Option<Self> {
        match index {
            0 => Some(Self::New),
            1 => Some(Self::Gathering),
            2 => Some(Self::Complete),
            _ => None,
        }
    }
}

impl Default for IceGatheringState {
    fn default() -> Self {
        Self::New
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalingState {
    Stable,
    HaveLocalOffer,
    HaveRemoteOffer,
    HaveLocalPranswer,
    HaveRemotePranswer,
    Closed,
}

impl SignalingState {
    pub fn from_index(index: u64) -> Option<Self> {
        match index {
            0 => Some(Self::Stable),
            1 => Some(Self::HaveLocalOffer),
            2 => Some(Self::HaveRemoteOffer),
            3 => Some(Self::HaveLocalPranswer),
            4 => Some(Self::HaveRemotePranswer),
            5 => Some(Self::Closed),
            _ => None,
        }
    }
}

impl Default for SignalingState {
    fn default() -> Self {
        Self::Stable
    }
}
