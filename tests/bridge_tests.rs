// Tests for the cross-document message protocol and host bridge

use anyhow::Result;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use voiceform::{BridgeMessage, HostBridge, HostDocument, MemoryDocument, MemoryNode};

// ============================================================================
// Wire shapes
// ============================================================================

#[test]
fn test_request_user_info_wire_shape() {
    let value = serde_json::to_value(&BridgeMessage::RequestUserInfo).unwrap();
    assert_eq!(value, json!({ "type": "REQUEST_USER_INFO" }));
}

#[test]
fn test_voice_response_ready_wire_shape() {
    let message = BridgeMessage::VoiceResponseReady {
        question_id: "q-7".to_string(),
        transcript: "hello world".to_string(),
        answer_field_id: Some("fld-7".to_string()),
    };

    let value = serde_json::to_value(&message).unwrap();
    assert_eq!(
        value,
        json!({
            "type": "VOICE_RESPONSE_READY",
            "questionId": "q-7",
            "transcript": "hello world",
            "answerFieldId": "fld-7",
        })
    );
}

#[test]
fn test_voice_response_deleted_wire_shape() {
    let message = BridgeMessage::VoiceResponseDeleted {
        question_id: "q-7".to_string(),
    };

    let value = serde_json::to_value(&message).unwrap();
    assert_eq!(
        value,
        json!({ "type": "VOICE_RESPONSE_DELETED", "questionId": "q-7" })
    );
}

#[test]
fn test_user_info_parses_from_host_payload() {
    let message: BridgeMessage = serde_json::from_value(json!({
        "type": "USER_INFO",
        "name": "Alex",
        "email": "alex@example.com",
    }))
    .unwrap();

    assert_eq!(
        message,
        BridgeMessage::UserInfo {
            name: Some("Alex".to_string()),
            email: Some("alex@example.com".to_string()),
        }
    );
}

#[test]
fn test_user_info_fields_are_optional() {
    let message: BridgeMessage = serde_json::from_value(json!({ "type": "USER_INFO" })).unwrap();

    assert_eq!(
        message,
        BridgeMessage::UserInfo {
            name: None,
            email: None,
        }
    );
}

// ============================================================================
// Bridge behavior
// ============================================================================

#[tokio::test]
async fn test_request_user_info_reaches_host_endpoint() {
    let doc: Arc<dyn HostDocument> = Arc::new(MemoryDocument::new());
    let (bridge, mut endpoint) = HostBridge::connect(doc);

    bridge.request_user_info().await;

    let message = endpoint.from_widget.recv().await.unwrap();
    assert_eq!(message, BridgeMessage::RequestUserInfo);
}

#[tokio::test]
async fn test_user_info_updates_bridge_identity() -> Result<()> {
    let doc: Arc<dyn HostDocument> = Arc::new(MemoryDocument::new());
    let (bridge, endpoint) = HostBridge::connect(doc);

    endpoint
        .to_widget
        .send(BridgeMessage::UserInfo {
            name: Some("Alex".to_string()),
            email: Some("alex@example.com".to_string()),
        })
        .await?;

    tokio::time::sleep(Duration::from_millis(50)).await;

    let identity = bridge.identity().await;
    assert_eq!(identity.name.as_deref(), Some("Alex"));
    assert_eq!(identity.email.as_deref(), Some("alex@example.com"));

    Ok(())
}

#[tokio::test]
async fn test_same_origin_host_gets_cooperating_listener() {
    let doc = Arc::new(MemoryDocument::new());
    let answer = doc.add(MemoryNode::default().with_attr("name", "fld-l"));

    let (bridge, mut endpoint) = HostBridge::connect(Arc::clone(&doc) as Arc<dyn HostDocument>);
    assert!(doc.listener_installed());

    bridge
        .announce_ready("q-1", "listener applied this", Some("fld-l"))
        .await;

    // The broadcast goes out on the channel and the injected listener
    // also copies the transcript host-side
    let message = endpoint.from_widget.recv().await.unwrap();
    assert!(matches!(message, BridgeMessage::VoiceResponseReady { .. }));
    assert_eq!(doc.read_value(answer).unwrap(), "listener applied this");
}

#[tokio::test]
async fn test_cross_origin_host_degrades_silently() {
    let doc = Arc::new(MemoryDocument::cross_origin());
    let answer = doc.add(MemoryNode::default().with_attr("name", "fld-x"));

    let (bridge, mut endpoint) = HostBridge::connect(Arc::clone(&doc) as Arc<dyn HostDocument>);
    assert!(!doc.listener_installed());

    bridge.announce_ready("q-1", "transcript", Some("fld-x")).await;

    // The broadcast still goes out; only the host-side copy is missing
    let message = endpoint.from_widget.recv().await.unwrap();
    assert!(matches!(message, BridgeMessage::VoiceResponseReady { .. }));
    assert_eq!(doc.read_value(answer).unwrap(), "");
}

#[tokio::test]
async fn test_announce_after_host_endpoint_gone_is_best_effort() {
    let doc: Arc<dyn HostDocument> = Arc::new(MemoryDocument::cross_origin());
    let (bridge, endpoint) = HostBridge::connect(doc);

    drop(endpoint);
    tokio::time::sleep(Duration::from_millis(20)).await;

    // Nothing to assert beyond not panicking: sends are best-effort
    bridge.announce_deleted("q-1").await;
}
