//! Integration tests for the notification creation pipeline.

mod helpers;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveTime};

use helpers::{TestApp, at, like, minutes};
use notify_core::AppResult;
use notify_core::error::AppError;
use notify_database::StoreArea;
use notify_entity::{ActionType, Channel, DeliveryStatus, Notification, PreferenceUpdate};
use notify_service::{CreateNotification, DeliverySink, NotificationEngine, SkipReason};

const OWNER: &str = "owner@example.com";
const FAN: &str = "fan@example.com";

#[tokio::test]
async fn test_self_notification_is_skipped() {
    let app = TestApp::new();

    app.assert_skipped(like(OWNER, "Owner@Example.com", "m1"), SkipReason::SelfNotification)
        .await;

    assert!(app.store.all_notifications().await.is_empty());
    assert!(app.store.spam_records().await.is_empty());
}

#[tokio::test]
async fn test_disabled_action_then_reenabled() {
    let app = TestApp::new();
    let off = PreferenceUpdate {
        like_notifications: Some(false),
        ..Default::default()
    };
    app.engine.update_user_preferences(OWNER, &off).await.unwrap();

    app.assert_skipped(like(OWNER, FAN, "m1"), SkipReason::ActionDisabled).await;

    // Other action types are unaffected.
    app.assert_created(
        CreateNotification::new(OWNER, Some(FAN), ActionType::Comment, "fan commented")
            .subject("m1", Some("Sunset")),
    )
    .await;

    let on = PreferenceUpdate {
        like_notifications: Some(true),
        ..Default::default()
    };
    app.engine.update_user_preferences(OWNER, &on).await.unwrap();
    app.assert_created(like(OWNER, FAN, "m1")).await;
}

#[tokio::test]
async fn test_spam_guard_interval_is_strict() {
    let app = TestApp::new();

    app.assert_created(like(OWNER, FAN, "m1")).await;
    app.assert_skipped(like(OWNER, FAN, "m1"), SkipReason::SpamBlocked).await;

    // A different subject or actor is a different key.
    app.assert_created(like(OWNER, FAN, "m2")).await;
    app.assert_created(like(OWNER, "other@example.com", "m1")).await;

    app.clock.advance(minutes(4));
    app.assert_skipped(like(OWNER, FAN, "m1"), SkipReason::SpamBlocked).await;

    // Exactly the default five minutes after the first one.
    app.clock.advance(minutes(1));
    app.assert_created(like(OWNER, FAN, "m1")).await;
}

#[tokio::test]
async fn test_zero_interval_disables_spam_guard() {
    let app = TestApp::new();
    let update = PreferenceUpdate {
        min_interval_minutes: Some(0),
        ..Default::default()
    };
    app.engine.update_user_preferences(OWNER, &update).await.unwrap();

    app.assert_created(like(OWNER, FAN, "m1")).await;
    app.assert_created(like(OWNER, FAN, "m1")).await;
    assert_eq!(app.store.all_notifications().await.len(), 2);
}

#[tokio::test]
async fn test_daily_limit() {
    let app = TestApp::new();
    let update = PreferenceUpdate {
        max_daily_notifications: Some(3),
        ..Default::default()
    };
    app.engine.update_user_preferences(OWNER, &update).await.unwrap();

    for subject in ["m1", "m2", "m3"] {
        app.assert_created(like(OWNER, FAN, subject)).await;
    }
    app.assert_skipped(like(OWNER, FAN, "m4"), SkipReason::DailyLimitReached)
        .await;

    // The count restarts at UTC midnight.
    app.clock.set(at(0, 0) + Duration::days(1));
    app.assert_created(like(OWNER, FAN, "m4")).await;
}

#[tokio::test]
async fn test_zero_daily_limit_blocks_everything() {
    let app = TestApp::new();
    let update = PreferenceUpdate {
        max_daily_notifications: Some(0),
        ..Default::default()
    };
    app.engine.update_user_preferences(OWNER, &update).await.unwrap();

    app.assert_skipped(like(OWNER, FAN, "m1"), SkipReason::DailyLimitReached)
        .await;
}

#[tokio::test]
async fn test_quiet_hours_defer_across_midnight() {
    let app = TestApp::new();
    let update = PreferenceUpdate {
        quiet_hours_start: Some(NaiveTime::from_hms_opt(22, 0, 0)),
        quiet_hours_end: Some(NaiveTime::from_hms_opt(6, 0, 0)),
        ..Default::default()
    };
    app.engine.update_user_preferences(OWNER, &update).await.unwrap();

    app.clock.set(at(23, 0));
    app.assert_skipped(like(OWNER, FAN, "m1"), SkipReason::QuietHoursDeferred)
        .await;

    app.clock.set(at(5, 0));
    app.assert_skipped(like(OWNER, FAN, "m2"), SkipReason::QuietHoursDeferred)
        .await;

    let deferred = app.deferral.taken();
    assert_eq!(deferred.len(), 2);
    assert_eq!(deferred[0].request.subject_id.as_deref(), Some("m1"));
    assert_eq!(deferred[0].quiet_hours_end, NaiveTime::from_hms_opt(6, 0, 0));
    assert!(app.store.all_notifications().await.is_empty());

    app.clock.set(at(12, 0));
    app.assert_created(like(OWNER, FAN, "m1")).await;
}

#[tokio::test]
async fn test_quiet_hours_can_be_cleared() {
    let app = TestApp::new();
    let update = PreferenceUpdate {
        quiet_hours_start: Some(NaiveTime::from_hms_opt(22, 0, 0)),
        quiet_hours_end: Some(NaiveTime::from_hms_opt(6, 0, 0)),
        ..Default::default()
    };
    app.engine.update_user_preferences(OWNER, &update).await.unwrap();

    let clear: PreferenceUpdate = serde_json::from_str(
        r#"{"quiet_hours_start": null, "quiet_hours_end": null}"#,
    )
    .unwrap();
    let pref = app.engine.update_user_preferences(OWNER, &clear).await.unwrap();
    assert_eq!(pref.quiet_hours_start, None);
    assert_eq!(pref.quiet_hours_end, None);

    app.clock.set(at(23, 0));
    app.assert_created(like(OWNER, FAN, "m1")).await;
    assert!(app.deferral.taken().is_empty());
}

#[tokio::test]
async fn test_created_notification_is_complete() {
    let app = TestApp::new();

    let n = app
        .assert_created(
            CreateNotification::new(OWNER, Some(FAN), ActionType::Download, "fan downloaded")
                .subject("m1", Some("Sunset"))
                .meta("size", 42),
        )
        .await;

    assert_eq!(n.user_email, OWNER);
    assert_eq!(n.channel, Channel::Email);
    assert_eq!(n.created_at, at(12, 0));
    assert!(!n.is_read);
    assert!(!n.is_fallback);
    assert_eq!(n.metadata["size"], 42);

    let stored = app.store.all_notifications().await;
    assert_eq!(stored, vec![n.clone()]);

    let history = app.engine.delivery_history(&n.id).await.unwrap();
    let channels: Vec<Channel> = history.iter().map(|d| d.channel).collect();
    assert_eq!(channels, vec![Channel::InApp, Channel::Email]);
    assert!(history.iter().all(|d| d.status == DeliveryStatus::Sent));
}

#[derive(Debug)]
struct RejectingSink;

#[async_trait]
impl DeliverySink for RejectingSink {
    async fn send(&self, _notification: &Notification) -> AppResult<()> {
        Err(AppError::service_unavailable("mail relay down"))
    }
}

#[tokio::test]
async fn test_sink_failure_is_recorded_not_raised() {
    let app = TestApp::new();
    let engine = NotificationEngine::clone(&app.engine)
        .with_sink(Channel::Email, Arc::new(RejectingSink));

    let outcome = engine.create_notification(like(OWNER, FAN, "m1")).await;
    assert!(!outcome.is_failed());
    let n = outcome.value().and_then(|o| o.into_notification()).unwrap();

    let history = engine.delivery_history(&n.id).await.unwrap();
    let email = history.iter().find(|d| d.channel == Channel::Email).unwrap();
    assert_eq!(email.status, DeliveryStatus::Failed);
    assert!(email.error.as_deref().unwrap().contains("mail relay down"));
}

#[tokio::test]
async fn test_store_outages_relax_checks() {
    let app = TestApp::new();
    app.store.set_failing(StoreArea::Preferences, true);
    app.store.set_failing(StoreArea::SpamGuard, true);
    app.store.set_failing(StoreArea::Deliveries, true);

    let first = app.engine.create_notification(like(OWNER, FAN, "m1")).await;
    assert!(first.is_degraded());
    let second = app.engine.create_notification(like(OWNER, FAN, "m1")).await;
    assert!(second.value().unwrap().notification().is_some());
    assert_eq!(app.store.all_notifications().await.len(), 2);
}

#[tokio::test]
async fn test_persist_failure_fails_creation() {
    let app = TestApp::new();
    app.store.set_failing(StoreArea::Notifications, true);

    let outcome = app.engine.create_notification(like(OWNER, FAN, "m1")).await;
    assert!(outcome.is_failed());
    assert!(app.store.spam_records().await.is_empty());
}

#[tokio::test]
async fn test_preference_update_validation() {
    let app = TestApp::new();
    let update = PreferenceUpdate {
        min_interval_minutes: Some(-5),
        ..Default::default()
    };
    let err = app
        .engine
        .update_user_preferences(OWNER, &update)
        .await
        .unwrap_err();
    assert_eq!(err.kind, notify_core::error::ErrorKind::Validation);

    let pref = app.engine.get_user_preferences(OWNER).await.value().unwrap();
    assert_eq!(pref.min_interval_minutes, 5);
}
