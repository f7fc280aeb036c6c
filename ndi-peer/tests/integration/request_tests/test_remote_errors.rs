use ndi_peer::PeerError;
use ndi_peer_core::{CommandName, TrackInfo};
use serde_json::Value;

use crate::integration::{connect_ready, default_config, init_tracing};
use crate::utils::recv_hook;

#[tokio::test]
async fn engine_errors_carry_the_message_verbatim() {
    init_tracing();

    let (peer, engine) = connect_ready(default_config()).await;

    let task = tokio::spawn({
        let peer = peer.clone();
        async move { peer.get_stats().await }
    });
    let cmd = engine.expect_command(CommandName::GetStats).await;
    engine.respond_err(cmd.id, "stats unavailable").await;

    match task.await.expect("task") {
        Err(PeerError::Remote(message)) => assert_eq!(message, "stats unavailable"),
        other => panic!("expected remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn failures_fan_out_to_the_data_channel_hook() {
    init_tracing();

    let (peer, engine) = connect_ready(default_config()).await;

    let channel = peer.create_data_channel("chat", None);
    let create = engine.expect_command(CommandName::CreateDataChannel).await;
    engine.respond_ok(create.id, Value::Null).await;

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    channel.on_error(move |e| {
        let _ = tx.send(e);
    });

    let task = tokio::spawn({
        let peer = peer.clone();
        async move { peer.add_track(TrackInfo::new("t1").with_stream("s1")).await }
    });
    let cmd = engine.expect_command(CommandName::AddTrack).await;
    engine.respond_err(cmd.id, "no capturer").await;

    // Primary path: the caller's own result.
    let outcome = task.await.expect("task");
    assert!(matches!(outcome, Err(PeerError::Remote(ref m)) if m == "no capturer"));

    // Secondary path: the data channel hook.
    let fanned_out = recv_hook(&mut rx).await;
    assert!(matches!(fanned_out, PeerError::Remote(ref m) if m == "no capturer"));
}

#[tokio::test]
async fn error_events_reach_the_data_channel_hook() {
    init_tracing();

    let (peer, engine) = connect_ready(default_config()).await;

    let channel = peer.create_data_channel("chat", None);
    let create = engine.expect_command(CommandName::CreateDataChannel).await;
    engine.respond_ok(create.id, Value::Null).await;

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    channel.on_error(move |e| {
        let _ = tx.send(e);
    });

    engine
        .emit_event(
            ndi_peer_core::EventKind::Error,
            Value::String("encoder stalled".into()),
        )
        .await;

    let err = recv_hook(&mut rx).await;
    assert!(matches!(err, PeerError::Remote(ref m) if m == "encoder stalled"));
}
