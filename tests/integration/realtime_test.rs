//! Integration tests for real-time push and the socket event protocol.

mod helpers;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tower::ServiceExt;

use helpers::{TestApp, like};
use notify_entity::SourceTag;
use notify_realtime::ServerEvent;

const OWNER: &str = "owner@example.com";
const FAN: &str = "fan@example.com";

fn drain(rx: &mut mpsc::Receiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_push_reaches_only_connected_recipient() {
    let app = TestApp::new();

    // Offline: persisted, nothing pushed.
    app.assert_created(like(OWNER, FAN, "m1")).await;
    assert!(!app.registry.is_online(OWNER));

    let (session, mut rx) = app.registry.register(OWNER, None);
    app.hub.gateway.on_connected(&session).await;
    match rx.recv().await {
        Some(ServerEvent::UnreadCount { count, source }) => {
            assert_eq!(count, 1);
            assert_eq!(source, SourceTag::Primary);
        }
        other => panic!("expected unread_count, got {other:?}"),
    }

    let n = app.assert_created(like(OWNER, FAN, "m2")).await;
    match rx.recv().await {
        Some(ServerEvent::NewNotification(pushed)) => assert_eq!(pushed.id, n.id),
        other => panic!("expected new_notification, got {other:?}"),
    }

    // Another user's notification never reaches this session.
    app.assert_created(like(FAN, OWNER, "m9")).await;
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_replaced_session_stops_receiving() {
    let app = TestApp::new();
    let (first, mut first_rx) = app.registry.register(OWNER, None);
    let (second, mut second_rx) = app.registry.register(OWNER, Some("Owner".to_string()));

    assert!(!first.is_alive());
    assert!(second.is_alive());

    app.assert_created(like(OWNER, FAN, "m1")).await;
    assert!(drain(&mut first_rx).is_empty());
    assert!(matches!(
        second_rx.recv().await,
        Some(ServerEvent::NewNotification(_))
    ));

    // Late disconnect of the replaced session keeps the new one.
    assert!(!app.registry.unregister(&first));
    assert!(app.registry.is_online(OWNER));
}

#[tokio::test]
async fn test_client_events_round_trip() {
    let app = TestApp::new();
    let n = app.assert_created(like(OWNER, FAN, "m1")).await;
    let (session, mut rx) = app.registry.register(OWNER, None);

    let raw = json!({"event": "get_notifications", "data": {"page": 1, "limit": 10}}).to_string();
    app.hub.gateway.handle_client_text(&session, &raw).await;
    match rx.recv().await {
        Some(ServerEvent::NotificationsList(page)) => {
            assert_eq!(page.total(), 1);
            assert_eq!(page.items()[0].id, n.id);
        }
        other => panic!("expected notifications_list, got {other:?}"),
    }

    let raw = json!({"event": "mark_notification_read", "data": {"notificationId": n.id}}).to_string();
    app.hub.gateway.handle_client_text(&session, &raw).await;
    let events = drain(&mut rx);
    let names: Vec<&str> = events.iter().map(ServerEvent::name).collect();
    assert_eq!(names, vec!["unread_count", "notification_marked_read"]);
    assert!(matches!(events[0], ServerEvent::UnreadCount { count: 0, .. }));

    let raw = json!({"event": "update_notification_preferences", "data": {"like_notifications": false}})
        .to_string();
    app.hub.gateway.handle_client_text(&session, &raw).await;
    match rx.recv().await {
        Some(ServerEvent::NotificationPreferencesUpdated(pref)) => {
            assert!(!pref.like_notifications)
        }
        other => panic!("expected preferences update, got {other:?}"),
    }

    app.hub.gateway.handle_client_text(&session, "{not json").await;
    assert!(matches!(rx.recv().await, Some(ServerEvent::Error { .. })));
}

#[tokio::test]
async fn test_system_broadcast_reaches_everyone() {
    let app = TestApp::new();
    let (_a, mut rx_a) = app.registry.register(OWNER, None);
    let (_b, mut rx_b) = app.registry.register(FAN, None);

    assert_eq!(app.hub.gateway.broadcast_system("Maintenance", "Back soon"), 2);
    for rx in [&mut rx_a, &mut rx_b] {
        let event = serde_json::to_value(rx.recv().await.unwrap()).unwrap();
        assert_eq!(event["event"], "system_notification");
        assert_eq!(event["data"]["title"], "Maintenance");
    }

    app.hub.shutdown();
    assert_eq!(app.registry.connection_count(), 0);
}

async fn ws_status(app: &TestApp, uri: &str, authorization: Option<String>) -> (StatusCode, Value) {
    let mut request = Request::builder().method("GET").uri(uri);
    if let Some(value) = authorization {
        request = request.header(header::AUTHORIZATION, value);
    }
    let response = app
        .router()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_handshake_requires_valid_credential() {
    let app = TestApp::new();

    let (status, body) = ws_status(&app, "/ws", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.to_string().contains("Authentication required"));

    let (status, _) = ws_status(&app, "/ws?token=garbage", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A valid credential gets past authentication; the plain request is
    // then refused only for lacking upgrade headers.
    let token = app.token_for(OWNER);
    let (status, _) = ws_status(&app, "/ws", Some(format!("Bearer {token}"))).await;
    assert!(status.is_client_error());
    assert_ne!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.registry.connection_count(), 0);
}
