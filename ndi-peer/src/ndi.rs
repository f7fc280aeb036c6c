use crate::channel::{CallCorrelator, EngineLauncher, RequestChannel};
use crate::error::PeerError;
use ndi_peer_core::{CommandName, NdiSource};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Discover NDI sources on the network through a transient engine link:
/// spawn, ask, tear down.
pub async fn find_ndi_sources(
    launcher: Arc<dyn EngineLauncher>,
) -> Result<Vec<NdiSource>, PeerError> {
    let channel = Arc::new(RequestChannel::new(launcher));
    channel.spawn().await?;
    let (correlator, _events) = CallCorrelator::start(channel).await?;

    let result = correlator
        .request(CommandName::FindNdiSources, Value::Object(Map::new()))
        .await;
    correlator.shutdown().await;

    serde_json::from_value(result?).map_err(PeerError::payload)
}
