//! Integration tests for listing, unread counts, and read state.

mod helpers;

use std::collections::BTreeMap;

use helpers::{TestApp, at, comment, interaction, like, minutes, test_config};
use notify_core::error::ErrorKind;
use notify_database::StoreArea;
use notify_entity::{ActionType, Channel, Notification, Priority, SourceTag};

const OWNER: &str = "owner@example.com";
const FAN: &str = "fan@example.com";

/// Two owned subjects with three interactions and two comments spread over
/// the morning, plus one self-interaction that must never surface.
async fn seed_activity(app: &TestApp) {
    app.store.add_subject("m1", OWNER, "Sunset").await;
    app.store.add_subject("m2", OWNER, "Harbor").await;
    app.store.add_subject("other", "else@example.com", "Elsewhere").await;

    for (id, subject, kind, hour) in [
        ("i1", "m1", ActionType::Like, 8),
        ("i2", "m2", ActionType::Favorite, 10),
        ("i3", "m1", ActionType::Download, 11),
    ] {
        app.store
            .add_interaction(interaction(id, subject, OWNER, FAN, kind, at(hour, 0)))
            .await;
    }
    app.store
        .add_interaction(interaction("i4", "m1", OWNER, OWNER, ActionType::Like, at(11, 30)))
        .await;
    app.store
        .add_interaction(interaction("i5", "other", "else@example.com", FAN, ActionType::Like, at(9, 0)))
        .await;

    app.store.add_comment(comment("c1", "m1", OWNER, FAN, at(9, 0))).await;
    app.store.add_comment(comment("c2", "m2", OWNER, FAN, at(11, 45))).await;
}

fn transactional(id: &str, minutes_ago: i64) -> Notification {
    Notification {
        id: id.to_string(),
        user_email: OWNER.to_string(),
        actor_email: None,
        action_type: ActionType::Other("ORDER_SHIPPED".to_string()),
        subject_id: None,
        subject_title: None,
        message: "Your order has shipped".to_string(),
        channel: Channel::InApp,
        priority: Priority::High,
        metadata: BTreeMap::new(),
        created_at: at(12, 0) - minutes(minutes_ago),
        is_read: false,
        read_at: None,
        read_channels: BTreeMap::new(),
        is_fallback: false,
    }
}

#[tokio::test]
async fn test_primary_page_is_newest_first() {
    let app = TestApp::new();
    for (i, subject) in ["m1", "m2", "m3"].into_iter().enumerate() {
        app.clock.set(at(9 + i as u32, 0));
        app.assert_created(like(OWNER, FAN, subject)).await;
    }

    let request = app.engine.page_request(Some(1), Some(2));
    let page = app.engine.get_user_notifications(OWNER, &request, false).await;

    assert_eq!(page.source, SourceTag::Primary);
    assert_eq!(page.total(), 3);
    let subjects: Vec<_> = page.items().iter().map(|n| n.subject_id.as_deref()).collect();
    assert_eq!(subjects, vec![Some("m3"), Some("m2")]);
    assert!(page.page.has_next);
}

#[tokio::test]
async fn test_huge_page_number_returns_empty_page() {
    let app = TestApp::new();
    app.assert_created(like(OWNER, FAN, "m1")).await;
    app.store.add_transactional(transactional("order-1", 30)).await;

    let request = app.engine.page_request(Some(u64::MAX), Some(20));
    let page = app.engine.get_user_notifications(OWNER, &request, false).await;
    assert_eq!(page.source, SourceTag::Primary);
    assert_eq!(page.total(), 2);
    assert!(page.items().is_empty());
    assert!(!page.page.has_next);

    let mut config = test_config();
    config.engine.include_transactional = false;
    let plain = TestApp::with_config(config);
    plain.assert_created(like(OWNER, FAN, "m1")).await;
    let page = plain.engine.get_user_notifications(OWNER, &request, false).await;
    assert_eq!(page.source, SourceTag::Primary);
    assert!(page.items().is_empty());

    let quiet = TestApp::new();
    seed_activity(&quiet).await;
    let page = quiet.engine.get_user_notifications(OWNER, &request, false).await;
    assert_eq!(page.source, SourceTag::Fallback);
    assert_eq!(page.total(), 5);
    assert!(page.items().is_empty());
}

#[tokio::test]
async fn test_transactional_rows_are_merged() {
    let app = TestApp::new();
    app.clock.set(at(11, 0));
    app.assert_created(like(OWNER, FAN, "m1")).await;
    app.store.add_transactional(transactional("order-1", 30)).await;
    app.store.add_transactional(transactional("order-2", 120)).await;

    let request = app.engine.page_request(None, None);
    let page = app.engine.get_user_notifications(OWNER, &request, false).await;
    let ids: Vec<&str> = page.items().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(page.total(), 3);
    assert_eq!(ids[0], "order-1");
    assert_eq!(ids[2], "order-2");

    let unread = app.engine.get_unread_count(OWNER).await;
    assert_eq!(unread.count, 3);
    assert_eq!(unread.source, SourceTag::Primary);
}

#[tokio::test]
async fn test_transactional_rows_can_be_excluded() {
    let mut config = test_config();
    config.engine.include_transactional = false;
    let app = TestApp::with_config(config);
    app.assert_created(like(OWNER, FAN, "m1")).await;
    app.store.add_transactional(transactional("order-1", 30)).await;

    let unread = app.engine.get_unread_count(OWNER).await;
    assert_eq!(unread.count, 1);
}

#[tokio::test]
async fn test_fallback_synthesizes_sorted_pages() {
    let app = TestApp::new();
    seed_activity(&app).await;

    let request = app.engine.page_request(Some(1), Some(2));
    let page = app.engine.get_user_notifications(OWNER, &request, false).await;

    assert_eq!(page.source, SourceTag::Fallback);
    assert_eq!(page.total(), 5);
    assert!(page.error.is_none());
    let ids: Vec<&str> = page.items().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["fallback_comment_c2", "fallback_interaction_i3"]);
    assert!(page.items().iter().all(|n| n.is_fallback && !n.is_read));
    assert_eq!(page.items()[0].message, "Fan commented on your content \"Sunset\"");
    assert_eq!(page.items()[1].message, "fan@example.com downloaded your content \"Sunset\"");

    let request = app.engine.page_request(Some(3), Some(2));
    let last = app.engine.get_user_notifications(OWNER, &request, false).await;
    let ids: Vec<&str> = last.items().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["fallback_interaction_i1"]);
    assert!(!last.page.has_next);
}

#[tokio::test]
async fn test_fallback_without_subjects_is_empty() {
    let app = TestApp::new();
    let request = app.engine.page_request(None, None);
    let page = app.engine.get_user_notifications(OWNER, &request, false).await;
    assert_eq!(page.source, SourceTag::FallbackEmpty);
    assert_eq!(page.total(), 0);

    let unread = app.engine.get_unread_count(OWNER).await;
    assert_eq!(unread.source, SourceTag::Primary);
    assert_eq!(unread.count, 0);
}

#[tokio::test]
async fn test_fallback_skips_own_activity_in_any_case() {
    let app = TestApp::new();
    seed_activity(&app).await;
    app.store
        .add_interaction(interaction("i6", "m1", OWNER, "Owner@Example.com", ActionType::Like, at(11, 50)))
        .await;
    app.store
        .add_comment(comment("c3", "m2", OWNER, "OWNER@EXAMPLE.COM", at(11, 55)))
        .await;

    let request = app.engine.page_request(None, None);
    let page = app.engine.get_user_notifications(OWNER, &request, false).await;
    assert_eq!(page.total(), 5);
    assert!(page.items().iter().all(|n| !n.id.ends_with("i6") && !n.id.ends_with("c3")));
    assert_eq!(app.engine.get_unread_count(OWNER).await.count, 5);
}

#[tokio::test]
async fn test_primary_outage_uses_fallback() {
    let app = TestApp::new();
    seed_activity(&app).await;
    app.store.set_failing(StoreArea::Notifications, true);

    let request = app.engine.page_request(None, None);
    let page = app.engine.get_user_notifications(OWNER, &request, false).await;
    assert_eq!(page.source, SourceTag::Fallback);
    assert_eq!(page.items().len(), 5);
    assert!(page.error.is_some());

    let unread = app.engine.get_unread_count(OWNER).await;
    assert_eq!(unread.count, 5);
    assert_eq!(unread.source, SourceTag::Fallback);
}

#[tokio::test]
async fn test_total_outage_returns_error_tag() {
    let app = TestApp::new();
    app.store.set_failing(StoreArea::Notifications, true);
    app.store.set_failing(StoreArea::Activity, true);

    let request = app.engine.page_request(None, None);
    let page = app.engine.get_user_notifications(OWNER, &request, false).await;
    assert_eq!(page.source, SourceTag::FallbackError);
    assert!(page.items().is_empty());
    assert!(page.error.is_some());

    let unread = app.engine.get_unread_count(OWNER).await;
    assert_eq!((unread.count, unread.source), (0, SourceTag::FallbackError));
}

#[tokio::test]
async fn test_mark_synthetic_read_is_noop() {
    let app = TestApp::new();
    seed_activity(&app).await;

    let receipt = app
        .engine
        .mark_as_read("fallback_interaction_i1", OWNER, Channel::InApp)
        .await
        .unwrap();
    assert!(receipt.synthetic);
    assert!(receipt.is_read);
    assert!(app.store.all_notifications().await.is_empty());
}

#[tokio::test]
async fn test_mark_read_updates_counts() {
    let app = TestApp::new();
    let first = app.assert_created(like(OWNER, FAN, "m1")).await;
    app.assert_created(like(OWNER, FAN, "m2")).await;
    assert_eq!(app.engine.get_unread_count(OWNER).await.count, 2);

    let receipt = app
        .engine
        .mark_as_read(&first.id, OWNER, Channel::Email)
        .await
        .unwrap();
    assert!(!receipt.synthetic);
    assert_eq!(receipt.channel, Channel::Email);
    assert_eq!(app.engine.get_unread_count(OWNER).await.count, 1);

    let request = app.engine.page_request(None, None);
    let unread = app.engine.get_user_notifications(OWNER, &request, true).await;
    assert_eq!(unread.total(), 1);
    assert_eq!(unread.items()[0].subject_id.as_deref(), Some("m2"));

    assert_eq!(app.engine.mark_all_as_read(OWNER).await.unwrap(), 1);
    assert_eq!(app.engine.get_unread_count(OWNER).await.count, 0);
}

#[tokio::test]
async fn test_mark_read_requires_ownership() {
    let app = TestApp::new();
    let n = app.assert_created(like(OWNER, FAN, "m1")).await;

    let err = app
        .engine
        .mark_as_read(&n.id, FAN, Channel::InApp)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(app.engine.get_unread_count(OWNER).await.count, 1);
}
