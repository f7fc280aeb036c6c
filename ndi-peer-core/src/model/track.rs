use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamInfo {
    pub id: String,
}

/// Metadata of a media track known to the engine. The first stream id is
/// the track's stream group for preview lifecycle decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub streams: Vec<StreamInfo>,
}

impl TrackInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: None,
            label: None,
            streams: Vec::new(),
        }
    }

    pub fn with_stream(mut self, stream_id: impl Into<String>) -> Self {
        self.streams.push(StreamInfo {
            id: stream_id.into(),
        });
        self
    }

    pub fn stream_id(&self) -> Option<&str> {
        self.streams.first().map(|s| s.id.as_str())
    }
}
