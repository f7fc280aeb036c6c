use ndi_peer::PeerError;
use ndi_peer_core::CommandName;
use serde_json::json;

use crate::integration::{connect_ready, default_config, init_tracing};
use crate::utils::recv_hook;

#[tokio::test]
async fn stats_callback_receives_the_result() {
    init_tracing();

    let (peer, engine) = connect_ready(default_config()).await;

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    peer.get_stats_with_callback(
        move |stats| {
            let _ = tx.send(stats);
        },
        |e| panic!("unexpected error: {e}"),
    );

    let cmd = engine.expect_command(CommandName::GetStatsOld).await;
    engine
        .respond_ok(cmd.id, json!({"bytesSent": 1024, "bytesReceived": 4096}))
        .await;

    let stats = recv_hook(&mut rx).await;
    assert_eq!(stats, json!({"bytesSent": 1024, "bytesReceived": 4096}));
}

#[tokio::test]
async fn stats_callback_receives_the_error() {
    init_tracing();

    let (peer, engine) = connect_ready(default_config()).await;

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    peer.get_stats_with_callback(
        |stats| panic!("unexpected stats: {stats}"),
        move |e| {
            let _ = tx.send(e);
        },
    );

    let cmd = engine.expect_command(CommandName::GetStatsOld).await;
    engine.respond_err(cmd.id, "not connected").await;

    let err = recv_hook(&mut rx).await;
    assert!(matches!(err, PeerError::Remote(ref m) if m == "not connected"));
}
