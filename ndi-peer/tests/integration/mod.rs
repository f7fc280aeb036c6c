
use std::sync::Arc;

use ndi_peer::PeerConnection;
use ndi_peer_core::{CommandName, NdiConfig, NdiPeerConfig};
use serde_json::Value;
use tracing::Level;

use crate::utils::MockEngine;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn default_config() -> NdiPeerConfig {
    NdiPeerConfig {
        ndi: Some(NdiConfig::named("cam1")),
        ..Default::default()
    }
}

/// Connect a peer against a fresh mock engine and resolve `createPeer`, so
/// tests start from a fully initialized facade.
pub async fn connect_ready(
    config: NdiPeerConfig,
) -> (Arc<PeerConnection>, Arc<crate::utils::MockEngine>) {
    let (launcher, engine) = MockEngine::new();
    let peer = PeerConnection::connect(config, launcher, None)
        .await
        .expect("failed to connect peer");

    let create = engine.expect_command(CommandName::CreatePeer).await;
    engine.respond_ok(create.id, Value::Null).await;

    (Arc::new(peer), engine)
}
