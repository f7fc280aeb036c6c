use std::collections::HashMap;

/// Registry of incoming tracks and the stream group each belongs to,
/// deciding when the derived preview must exist.
///
/// The preview mirrors exactly one stream group at a time. Any new track is
/// a spawn trigger (deduplication happens at the spawn layer); removal
/// tears the preview down as soon as the remaining tracks no longer share
/// the removed track's stream, or nothing is left.
#[derive(Debug, Default)]
pub struct StreamLifecycleTracker {
    received: HashMap<String, String>,
}

impl StreamLifecycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the track/stream mapping. Always signals "spawn".
    pub fn on_track_arrived(
        &mut self,
        track_id: impl Into<String>,
        stream_id: impl Into<String>,
    ) -> bool {
        self.received.insert(track_id.into(), stream_id.into());
        true
    }

    /// Remove the track and report whether the preview must be torn down:
    /// true when the registry becomes empty, or when any remaining track
    /// belongs to a different stream than the removed one. A track the
    /// registry never saw counts as divergent.
    pub fn on_track_removed(&mut self, track_id: &str) -> bool {
        let removed_stream = self.received.remove(track_id);
        if self.received.is_empty() {
            return true;
        }
        match removed_stream {
            Some(stream) => self.received.values().any(|other| *other != stream),
            None => true,
        }
    }

    pub fn clear(&mut self) {
        self.received.clear();
    }

    pub fn len(&self) -> usize {
        self.received.len()
    }

    pub fn is_empty(&self) -> bool {
        self.received.is_empty()
    }
}
