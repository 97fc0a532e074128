//! End-to-end dispatch tests: raw envelopes in, scope deliveries out.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Mutex};

use serde_json::json;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use kai_client::events::Scope;
use kai_client::transport::ChannelTransport;
use kai_client::KaiSdk;
use kai_core::protocol::capability::Capabilities;
use kai_core::protocol::reading::{GestureReading, Reading, ReadingKind};
use kai_core::KaiError;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn sdk() -> (KaiSdk, mpsc::Receiver<String>) {
    init_tracing();
    let (transport, rx) = ChannelTransport::new(8);
    let sdk = KaiSdk::new(Arc::new(transport));
    sdk.initialise("example-module", "example-secret");
    (sdk, rx)
}

fn connected_kai_3(sdk: &KaiSdk) {
    sdk.handle_incoming(
        &json!({
            "success": true,
            "type": "connectedKais",
            "kais": [{"kaiId": 3, "hand": "right"}],
        })
        .to_string(),
    );
}

fn incoming_gesture(kai_id: i64, flags: (bool, bool, bool)) -> String {
    json!({
        "success": true,
        "type": "incomingData",
        "foregroundProcess": "code",
        "kaiId": kai_id,
        "defaultKai": flags.0,
        "defaultLeftKai": flags.1,
        "defaultRightKai": flags.2,
        "data": [{"type": "gestureData", "gesture": "grabBegin"}],
    })
    .to_string()
}

/// Records which scopes delivered, in order.
fn record_all_scopes(sdk: &KaiSdk, kind: ReadingKind) -> Arc<Mutex<Vec<Scope>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    for scope in [
        Scope::Default,
        Scope::DefaultLeft,
        Scope::DefaultRight,
        Scope::Device(3),
        Scope::Any,
    ] {
        let log = Arc::clone(&log);
        sdk.on_reading(scope, kind, move |_| log.lock().unwrap().push(scope));
    }
    log
}

#[tokio::test]
async fn connect_requires_initialise() {
    init_tracing();
    let (transport, _rx) = ChannelTransport::new(1);
    let sdk = KaiSdk::new(Arc::new(transport));
    assert!(matches!(
        sdk.connect().await,
        Err(KaiError::NotInitialised)
    ));
}

#[tokio::test]
async fn auth_and_capability_handshake() {
    let (sdk, mut rx) = sdk();

    sdk.connect().await.unwrap();
    let frame: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(frame["type"], "authentication");
    assert_eq!(frame["moduleId"], "example-module");
    assert_eq!(frame["moduleSecret"], "example-secret");

    // Capabilities are gated on a confirmed authentication.
    let caps = Capabilities::GESTURE | Capabilities::PYR;
    assert!(matches!(
        sdk.set_capabilities(caps).await,
        Err(KaiError::NotAuthenticated)
    ));

    sdk.handle_incoming(r#"{"success":true,"type":"authentication","authenticated":true}"#);
    assert!(sdk.authenticated());

    sdk.set_capabilities(caps).await.unwrap();
    let frame: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(Capabilities::from_message(&frame).unwrap(), caps);
}

#[test]
fn fanout_respects_flags_and_fixed_order() {
    let (sdk, _rx) = sdk();
    connected_kai_3(&sdk);
    let log = record_all_scopes(&sdk, ReadingKind::Gesture);

    sdk.handle_incoming(&incoming_gesture(3, (true, false, true)));

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            Scope::Default,
            Scope::DefaultRight,
            Scope::Device(3),
            Scope::Any
        ]
    );
}

#[test]
fn unregistered_id_still_reaches_alias_and_any_scopes() {
    let (sdk, _rx) = sdk();
    // No connectedKais: id 3 does not resolve, so no device scope.
    let log = record_all_scopes(&sdk, ReadingKind::Gesture);

    sdk.handle_incoming(&incoming_gesture(3, (false, true, false)));

    assert_eq!(*log.lock().unwrap(), vec![Scope::DefaultLeft, Scope::Any]);
}

#[test]
fn bad_fragment_skips_only_itself() {
    let (sdk, _rx) = sdk();
    let readings = Arc::new(Mutex::new(Vec::new()));
    {
        let readings = Arc::clone(&readings);
        sdk.on_reading(Scope::Any, ReadingKind::Quaternion, move |event| {
            readings.lock().unwrap().push(event.reading.clone());
        });
    }

    sdk.handle_incoming(
        &json!({
            "success": true,
            "type": "incomingData",
            "foregroundProcess": "code",
            "kaiId": 0,
            "defaultKai": false,
            "defaultLeftKai": false,
            "defaultRightKai": false,
            "data": [
                {"type": "pYRData", "pitch": "broken"},
                {"type": "quaternionData", "quaternion": {"w": 1.0, "x": 0.0, "y": 0.0, "z": 0.0}},
            ],
        })
        .to_string(),
    );

    let readings = readings.lock().unwrap();
    assert_eq!(readings.len(), 1);
    assert!(matches!(readings[0], Reading::Quaternion(_)));
}

#[test]
fn unknown_fragment_tag_surfaces_outer_envelope() {
    let (sdk, _rx) = sdk();
    let seen = Arc::new(Mutex::new(Vec::new()));
    {
        let seen = Arc::clone(&seen);
        sdk.on_unknown(move |raw| seen.lock().unwrap().push(raw.clone()));
    }

    sdk.handle_incoming(
        &json!({
            "success": true,
            "type": "incomingData",
            "foregroundProcess": "code",
            "kaiId": 2,
            "defaultKai": false,
            "defaultLeftKai": false,
            "defaultRightKai": false,
            "data": [{"type": "hapticsData", "pattern": "pulse"}],
        })
        .to_string(),
    );

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    // The sink receives the whole envelope, not the fragment.
    assert_eq!(seen[0]["type"], "incomingData");
    assert_eq!(seen[0]["kaiId"], 2);
}

#[test]
fn unknown_envelope_tag_reaches_unknown_sink() {
    let (sdk, _rx) = sdk();
    let seen = Arc::new(Mutex::new(Vec::new()));
    {
        let seen = Arc::clone(&seen);
        sdk.on_unknown(move |raw| seen.lock().unwrap().push(raw.clone()));
    }

    sdk.handle_incoming(r#"{"success":true,"type":"batteryStatus","percent":88}"#);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0]["percent"], 88);
}

#[test]
fn service_error_reaches_only_the_error_sink() {
    let (sdk, _rx) = sdk();
    let log = record_all_scopes(&sdk, ReadingKind::Gesture);
    let errors = Arc::new(Mutex::new(Vec::new()));
    {
        let errors = Arc::clone(&errors);
        sdk.on_error(move |err| errors.lock().unwrap().push(err.clone()));
    }

    sdk.handle_incoming(
        r#"{"success":false,"errorCode":7,"error":"NotAuthenticated","message":"authenticate first"}"#,
    );

    assert!(log.lock().unwrap().is_empty());
    let errors = errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, 7);
    assert_eq!(errors[0].name, "NotAuthenticated");
    assert_eq!(errors[0].message, "authenticate first");
}

#[test]
fn malformed_input_leaves_state_untouched() {
    let (sdk, _rx) = sdk();
    sdk.handle_incoming(r#"{"success":true,"type":"authentication","authenticated":true}"#);
    sdk.handle_incoming(&incoming_gesture(0, (false, false, false)));
    connected_kai_3(&sdk);

    for garbage in [
        "}{ not json",
        r#"{"no":"success field"}"#,
        r#"{"success":true}"#,
        "[]",
    ] {
        sdk.handle_incoming(garbage);
    }

    assert!(sdk.authenticated());
    assert_eq!(sdk.foreground_process().as_deref(), Some("code"));
    assert!(sdk.connected_kai(3).is_some());
}

#[test]
fn foreground_process_is_overwritten_unconditionally() {
    let (sdk, _rx) = sdk();
    sdk.handle_incoming(&incoming_gesture(0, (false, false, false)));
    assert_eq!(sdk.foreground_process().as_deref(), Some("code"));

    sdk.handle_incoming(
        &json!({
            "success": true,
            "type": "incomingData",
            "foregroundProcess": "blender",
            "kaiId": 0,
            "defaultKai": false,
            "defaultLeftKai": false,
            "defaultRightKai": false,
            "data": [],
        })
        .to_string(),
    );
    assert_eq!(sdk.foreground_process().as_deref(), Some("blender"));
}

#[test]
fn connected_kais_updates_claimed_aliases_only() {
    let (sdk, _rx) = sdk();
    sdk.handle_incoming(
        &json!({
            "success": true,
            "type": "connectedKais",
            "kais": [
                {"kaiId": 0, "hand": "left", "defaultKai": true, "defaultRightKai": true},
            ],
        })
        .to_string(),
    );
    assert_eq!(sdk.default_kai().map(|h| h.kai_id), Some(0));
    assert_eq!(sdk.default_right_kai().map(|h| h.kai_id), Some(0));
    assert!(sdk.default_left_kai().is_none());

    sdk.handle_incoming(
        &json!({
            "success": true,
            "type": "connectedKais",
            "kais": [{"kaiId": 5, "hand": "left", "defaultLeftKai": true}],
        })
        .to_string(),
    );
    // Only the claimed alias moved; the slot table was still rebuilt.
    assert_eq!(sdk.default_left_kai().map(|h| h.kai_id), Some(5));
    assert_eq!(sdk.default_kai().map(|h| h.kai_id), Some(0));
    assert_eq!(sdk.default_right_kai().map(|h| h.kai_id), Some(0));
    assert!(sdk.connected_kai(0).is_none());
    assert!(sdk.connected_kai(5).is_some());
}

#[test]
fn unknown_gesture_is_delivered_verbatim() {
    let (sdk, _rx) = sdk();
    let readings = Arc::new(Mutex::new(Vec::new()));
    {
        let readings = Arc::clone(&readings);
        sdk.on_reading(Scope::Any, ReadingKind::Gesture, move |event| {
            readings.lock().unwrap().push(event.reading.clone());
        });
    }

    sdk.handle_incoming(
        &json!({
            "success": true,
            "type": "incomingData",
            "foregroundProcess": "code",
            "kaiId": 0,
            "defaultKai": false,
            "defaultLeftKai": false,
            "defaultRightKai": false,
            "data": [{"type": "gestureData", "gesture": "TripleTap"}],
        })
        .to_string(),
    );

    let readings = readings.lock().unwrap();
    assert_eq!(
        *readings,
        vec![Reading::Gesture(GestureReading::Unknown("TripleTap".into()))]
    );
}

#[test]
fn messages_before_initialise_are_ignored() {
    init_tracing();
    let (transport, _rx) = ChannelTransport::new(1);
    let sdk = KaiSdk::new(Arc::new(transport));

    sdk.handle_incoming(r#"{"success":true,"type":"authentication","authenticated":true}"#);
    assert!(!sdk.authenticated());
}
