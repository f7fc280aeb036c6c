use crate::channel::{CallCorrelator, EngineLauncher, ProcessLauncher, RequestChannel};
use crate::error::PeerError;
use crate::peer::data_channel::DataChannel;
use crate::peer::tracker::StreamLifecycleTracker;
use crate::preview::PreviewStreamer;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use ndi_peer_core::{
    CommandName, EngineEvent, IceCandidate, IceConnectionState, IceGatheringState, NdiPeerConfig,
    SessionDescription, SignalingState, TrackInfo,
};
use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

type CreatedGate = Shared<BoxFuture<'static, Result<(), PeerError>>>;

type StateHook<S> = Arc<dyn Fn(S) + Send + Sync>;
type TrackHook = Arc<dyn Fn(TrackInfo) + Send + Sync>;
type DataChannelHook = Arc<dyn Fn(Arc<DataChannel>) + Send + Sync>;

#[derive(Default)]
struct Hooks {
    ice_connection_state: Option<StateHook<IceConnectionState>>,
    ice_gathering_state: Option<StateHook<IceGatheringState>>,
    signaling_state: Option<StateHook<SignalingState>>,
    data_channel: Option<DataChannelHook>,
    track: Option<TrackHook>,
}

struct PeerInner {
    correlator: Arc<CallCorrelator>,
    created: CreatedGate,
    preview: Option<Arc<dyn PreviewStreamer>>,
    closed: AtomicBool,

    ice_connection_state: Mutex<IceConnectionState>,
    ice_gathering_state: Mutex<IceGatheringState>,
    signaling_state: Mutex<SignalingState>,
    local_description: Mutex<Option<SessionDescription>>,
    remote_description: Mutex<Option<SessionDescription>>,
    data_channel: Mutex<Option<Arc<DataChannel>>>,
    tracker: Mutex<StreamLifecycleTracker>,
    hooks: Mutex<Hooks>,
}

/// Peer-connection facade over the remote engine.
///
/// Every mutating operation becomes a command on the engine link; observable
/// state changes only on confirmed responses or pushed events, never on
/// local optimism. Failures never panic — they travel the async `Result`
/// path, and when a data channel proxy exists they are additionally fanned
/// out to its error hook (the documented dual-path reporting of the
/// legacy API).
pub struct PeerConnection {
    inner: Arc<PeerInner>,
}

impl PeerConnection {
    /// Construct the facade: spawn the engine link, spawn the preview
    /// streamer when preview configuration is present, and issue
    /// `createPeer` with the full configuration (preview settings merged
    /// in). Every subsequent request waits behind the `createPeer` outcome,
    /// so the engine is fully initialized before it sees anything else.
    pub async fn connect(
        config: NdiPeerConfig,
        launcher: Arc<dyn EngineLauncher>,
        preview: Option<Arc<dyn PreviewStreamer>>,
    ) -> Result<Self, PeerError> {
        let channel = Arc::new(RequestChannel::new(launcher));
        channel.spawn().await?;
        let (correlator, events) = CallCorrelator::start(channel).await?;

        let preview = match (&config.preview, preview) {
            (Some(_), Some(streamer)) => {
                streamer.spawn().await?;
                Some(streamer)
            }
            (Some(_), None) => {
                warn!("preview configured but no streamer supplied; preview disabled");
                None
            }
            (None, _) => None,
        };

        let mut config = config;
        if let Some(streamer) = &preview {
            config.preview = Some(streamer.ndi_config(config.ndi.as_ref()));
        }
        let payload = serde_json::to_value(&config).map_err(PeerError::payload)?;

        let created: CreatedGate = {
            let correlator = correlator.clone();
            async move {
                correlator
                    .request(CommandName::CreatePeer, payload)
                    .await
                    .map(|_| ())
            }
            .boxed()
            .shared()
        };
        // Drive createPeer even before the first caller awaits the gate.
        tokio::spawn(created.clone());

        let inner = Arc::new(PeerInner {
            correlator,
            created,
            preview,
            closed: AtomicBool::new(false),
            ice_connection_state: Mutex::new(IceConnectionState::default()),
            ice_gathering_state: Mutex::new(IceGatheringState::default()),
            signaling_state: Mutex::new(SignalingState::default()),
            local_description: Mutex::new(None),
            remote_description: Mutex::new(None),
            data_channel: Mutex::new(None),
            tracker: Mutex::new(StreamLifecycleTracker::new()),
            hooks: Mutex::new(Hooks::default()),
        });

        tokio::spawn(run_events(inner.clone(), events));

        Ok(Self { inner })
    }

    /// Convenience constructor launching the engine binary as a child
    /// process.
    pub async fn launch(
        config: NdiPeerConfig,
        program: impl Into<PathBuf>,
    ) -> Result<Self, PeerError> {
        Self::connect(config, Arc::new(ProcessLauncher::new(program)), None).await
    }

    pub async fn set_local_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), PeerError> {
        let payload = serde_json::to_value(&desc).map_err(PeerError::payload)?;
        self.inner
            .request(CommandName::SetLocalDescription, payload)
            .await?;
        *self.inner.local_description.lock() = Some(desc);
        Ok(())
    }

    pub async fn set_remote_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), PeerError> {
        let payload = serde_json::to_value(&desc).map_err(PeerError::payload)?;
        self.inner
            .request(CommandName::SetRemoteDescription, payload)
            .await?;
        *self.inner.remote_description.lock() = Some(desc);
        Ok(())
    }

    pub async fn create_offer(
        &self,
        options: Option<Value>,
    ) -> Result<SessionDescription, PeerError> {
        let result = self
            .inner
            .request(CommandName::CreateOffer, options_payload(options))
            .await?;
        serde_json::from_value(result).map_err(PeerError::payload)
    }

    pub async fn create_answer(
        &self,
        options: Option<Value>,
    ) -> Result<SessionDescription, PeerError> {
        let result = self
            .inner
            .request(CommandName::CreateAnswer, options_payload(options))
            .await?;
        serde_json::from_value(result).map_err(PeerError::payload)
    }

    pub async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), PeerError> {
        let payload = serde_json::to_value(&candidate).map_err(PeerError::payload)?;
        self.inner
            .request(CommandName::AddIceCandidate, payload)
            .await?;
        Ok(())
    }

    /// Get or create the connection's single data channel. The first call
    /// (local or remote side, whichever wins) creates the proxy; later
    /// calls return the same proxy and send nothing. Command failure is
    /// reported through the proxy's error hook, matching the uniform
    /// never-throw contract.
    pub fn create_data_channel(&self, label: &str, config: Option<Value>) -> Arc<DataChannel> {
        let channel = {
            let mut slot = self.inner.data_channel.lock();
            if let Some(existing) = slot.as_ref() {
                return existing.clone();
            }
            let channel = DataChannel::new(label);
            *slot = Some(channel.clone());
            channel
        };

        let inner = self.inner.clone();
        let payload = json!({"name": label, "config": config});
        tokio::spawn(async move {
            // Fan-out inside `request` already reaches the proxy created
            // above; nothing else to do with the outcome.
            let _ = inner.request(CommandName::CreateDataChannel, payload).await;
        });

        channel
    }

    pub async fn get_stats(&self) -> Result<Value, PeerError> {
        self.inner.request(CommandName::GetStats, json!({})).await
    }

    /// Legacy callback-style stats query, kept for parity with the old
    /// engine API.
    pub fn get_stats_with_callback(
        &self,
        on_stats: impl FnOnce(Value) + Send + 'static,
        on_error: impl FnOnce(PeerError) + Send + 'static,
    ) {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            match inner.request(CommandName::GetStatsOld, json!({})).await {
                Ok(stats) => on_stats(stats),
                Err(e) => on_error(e),
            }
        });
    }

    pub async fn get_senders(&self) -> Result<Value, PeerError> {
        self.inner.request(CommandName::GetSenders, json!({})).await
    }

    pub async fn get_receivers(&self) -> Result<Value, PeerError> {
        self.inner
            .request(CommandName::GetReceivers, json!({}))
            .await
    }

    /// Returns the engine's sender payload for the new track.
    pub async fn add_track(&self, track: TrackInfo) -> Result<Value, PeerError> {
        let payload = serde_json::to_value(&track).map_err(PeerError::payload)?;
        let sender = self.inner.request(CommandName::AddTrack, payload).await?;
        info!(track = %track.id, "track added");
        Ok(sender)
    }

    pub async fn remove_track(&self, track_id: &str) -> Result<(), PeerError> {
        self.inner
            .request(CommandName::RemoveTrack, json!({"trackId": track_id}))
            .await?;
        info!(track = %track_id, "track removed");
        Ok(())
    }

    pub async fn replace_track(&self, track: TrackInfo) -> Result<(), PeerError> {
        let payload = serde_json::to_value(&track).map_err(PeerError::payload)?;
        self.inner.request(CommandName::ReplaceTrack, payload).await?;
        info!(track = %track.id, "track replaced");
        Ok(())
    }

    /// Tear the connection down: destroy the engine link (force-rejecting
    /// anything still pending), destroy the preview, clear the track
    /// registry. A second close is a no-op; operations issued afterwards
    /// fail with [`PeerError::Closed`].
    pub async fn close(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("closing peer connection");

        self.inner.correlator.shutdown().await;
        if let Some(preview) = &self.inner.preview {
            preview.destroy().await;
        }
        self.inner.tracker.lock().clear();
    }

    pub fn ice_connection_state(&self) -> IceConnectionState {
        *self.inner.ice_connection_state.lock()
    }

    pub fn ice_gathering_state(&self) -> IceGatheringState {
        *self.inner.ice_gathering_state.lock()
    }

    pub fn signaling_state(&self) -> SignalingState {
        *self.inner.signaling_state.lock()
    }

    pub fn local_description(&self) -> Option<SessionDescription> {
        self.inner.local_description.lock().clone()
    }

    pub fn remote_description(&self) -> Option<SessionDescription> {
        self.inner.remote_description.lock().clone()
    }

    pub fn data_channel(&self) -> Option<Arc<DataChannel>> {
        self.inner.data_channel.lock().clone()
    }

    pub fn on_ice_connection_state_change(
        &self,
        hook: impl Fn(IceConnectionState) + Send + Sync + 'static,
    ) {
        self.inner.hooks.lock().ice_connection_state = Some(Arc::new(hook));
    }

    pub fn on_ice_gathering_state_change(
        &self,
        hook: impl Fn(IceGatheringState) + Send + Sync + 'static,
    ) {
        self.inner.hooks.lock().ice_gathering_state = Some(Arc::new(hook));
    }

    pub fn on_signaling_state_change(
        &self,
        hook: impl Fn(SignalingState) + Send + Sync + 'static,
    ) {
        self.inner.hooks.lock().signaling_state = Some(Arc::new(hook));
    }

    pub fn on_data_channel(&self, hook: impl Fn(Arc<DataChannel>) + Send + Sync + 'static) {
        self.inner.hooks.lock().data_channel = Some(Arc::new(hook));
    }

    pub fn on_track(&self, hook: impl Fn(TrackInfo) + Send + Sync + 'static) {
        self.inner.hooks.lock().track = Some(Arc::new(hook));
    }
}

impl PeerInner {
    /// Common request path: refuse after close, wait behind the
    /// `createPeer` gate, then go through the correlator. Failures are
    /// fanned out to the data channel hook when a proxy exists.
    async fn request(&self, name: CommandName, payload: Value) -> Result<Value, PeerError> {
        let outcome = async {
            if self.closed.load(Ordering::SeqCst) {
                return Err(PeerError::Closed);
            }
            self.created.clone().await?;
            self.correlator.request(name, payload).await
        }
        .await;

        if let Err(e) = &outcome {
            let channel = self.data_channel.lock().clone();
            match channel {
                Some(channel) => channel.notify_error(e),
                None => warn!(command = ?name, "request failed: {e}"),
            }
        }
        outcome
    }
}

fn options_payload(options: Option<Value>) -> Value {
    options.unwrap_or_else(|| Value::Object(Map::new()))
}

async fn run_events(inner: Arc<PeerInner>, mut events: mpsc::Receiver<EngineEvent>) {
    while let Some(event) = events.recv().await {
        handle_event(&inner, event).await;
    }
    debug!("engine event stream ended");
}

/// Apply one engine event: exactly one state mutation plus at most one
/// hook, in emission order.
async fn handle_event(inner: &Arc<PeerInner>, event: EngineEvent) {
    match event {
        EngineEvent::IceConnectionState(state) => {
            *inner.ice_connection_state.lock() = state;
            let hook = inner.hooks.lock().ice_connection_state.clone();
            if let Some(hook) = hook {
                hook(state);
            }
        }
        EngineEvent::IceGatheringState(state) => {
            *inner.ice_gathering_state.lock() = state;
            let hook = inner.hooks.lock().ice_gathering_state.clone();
            if let Some(hook) = hook {
                hook(state);
            }
        }
        EngineEvent::SignalingState(state) => {
            *inner.signaling_state.lock() = state;
            let hook = inner.hooks.lock().signaling_state.clone();
            if let Some(hook) = hook {
                hook(state);
            }
        }
        EngineEvent::Track(track) => {
            let should_spawn = match track.stream_id() {
                Some(stream) => inner
                    .tracker
                    .lock()
                    .on_track_arrived(track.id.clone(), stream),
                None => {
                    warn!(track = %track.id, "track event without a stream group");
                    false
                }
            };
            if should_spawn {
                if let Some(preview) = &inner.preview {
                    if let Err(e) = preview.spawn().await {
                        warn!("preview spawn failed: {e}");
                    }
                }
            }
            let hook = inner.hooks.lock().track.clone();
            if let Some(hook) = hook {
                hook(track);
            }
        }
        EngineEvent::TrackRemoved(track) => {
            let should_destroy = inner.tracker.lock().on_track_removed(&track.id);
            if should_destroy {
                if let Some(preview) = &inner.preview {
                    preview.destroy().await;
                }
            }
        }
        EngineEvent::DataChannel { label } => {
            let created = {
                let mut slot = inner.data_channel.lock();
                if slot.is_some() {
                    None
                } else {
                    let channel = DataChannel::new(label);
                    *slot = Some(channel.clone());
                    Some(channel)
                }
            };
            if let Some(channel) = created {
                let hook = inner.hooks.lock().data_channel.clone();
                if let Some(hook) = hook {
                    hook(channel);
                }
            }
        }
        EngineEvent::Error(message) => {
            let err = PeerError::Remote(message);
            let channel = inner.data_channel.lock().clone();
            match channel {
                Some(channel) => channel.notify_error(&err),
                None => error!("engine error event: {err}"),
            }
        }
    }
}
