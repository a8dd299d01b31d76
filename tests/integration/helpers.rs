//! Shared test helpers for integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use notify_api::{AppState, build_router};
use notify_auth::jwt::{JwtDecoder, JwtEncoder};
use notify_core::Outcome;
use notify_core::config::{AppConfig, StoreBackend};
use notify_database::{MemoryStore, Stores};
use notify_entity::{ActionType, Comment, Interaction, Notification};
use notify_realtime::{ConnectionRegistry, RealtimeHub};
use notify_service::{
    CreateNotification, CreateOutcome, DeferredDelivery, DeferredNotification, FixedClock,
    NotificationEngine, SkipReason,
};

/// Records deferred payloads instead of logging them.
#[derive(Debug, Default)]
pub struct RecordingDeferral {
    deferred: Mutex<Vec<DeferredNotification>>,
}

impl RecordingDeferral {
    pub fn taken(&self) -> Vec<DeferredNotification> {
        self.deferred.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeferredDelivery for RecordingDeferral {
    async fn defer(&self, deferred: DeferredNotification) {
        self.deferred.lock().unwrap().push(deferred);
    }
}

/// Test application context backed by the in-memory store.
pub struct TestApp {
    pub config: AppConfig,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<FixedClock>,
    pub deferral: Arc<RecordingDeferral>,
    pub registry: Arc<ConnectionRegistry>,
    pub engine: Arc<NotificationEngine>,
    pub hub: Arc<RealtimeHub>,
}

impl TestApp {
    /// Engine at 2024-03-10 12:00 UTC with transactional merging enabled.
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(at(12, 0)));
        let deferral = Arc::new(RecordingDeferral::default());
        let registry = Arc::new(ConnectionRegistry::new(config.realtime.channel_buffer_size));

        let engine = Arc::new(
            NotificationEngine::new(Stores::memory(store.clone()), config.engine.clone())
                .with_clock(clock.clone())
                .with_deferral(deferral.clone())
                .with_push(registry.clone()),
        );
        let hub = Arc::new(RealtimeHub::new(
            config.realtime.clone(),
            registry.clone(),
            engine.clone(),
            Arc::new(JwtDecoder::new(&config.auth)),
        ));

        Self {
            config,
            store,
            clock,
            deferral,
            registry,
            engine,
            hub,
        }
    }

    /// Router over this app's state.
    pub fn router(&self) -> axum::Router {
        build_router(AppState {
            config: Arc::new(self.config.clone()),
            db: None,
            engine: self.engine.clone(),
            realtime: self.hub.clone(),
        })
    }

    /// A valid handshake credential for `email`.
    pub fn token_for(&self, email: &str) -> String {
        JwtEncoder::new(&self.config.auth)
            .encode_access_token(email, None)
            .unwrap()
            .0
    }

    /// Run the creation pipeline and unwrap a non-failed outcome.
    pub async fn create(&self, request: CreateNotification) -> CreateOutcome {
        match self.engine.create_notification(request).await {
            Outcome::Ok(v) => v,
            Outcome::Degraded { value, .. } => value,
            Outcome::Failed(e) => panic!("creation failed: {e}"),
        }
    }

    /// Assert the request was skipped for `reason`.
    pub async fn assert_skipped(&self, request: CreateNotification, reason: SkipReason) {
        let outcome = self.create(request).await;
        assert_eq!(outcome.skip_reason(), Some(reason), "outcome: {outcome:?}");
    }

    /// Assert the request produced a notification and return it.
    pub async fn assert_created(&self, request: CreateNotification) -> Notification {
        let outcome = self.create(request).await;
        match outcome {
            CreateOutcome::Created(n) => n,
            CreateOutcome::Skipped(reason) => panic!("expected creation, skipped: {reason}"),
        }
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.engine.store = StoreBackend::Memory;
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config
}

/// 2024-03-10 at `hour:minute` UTC.
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, hour, minute, 0).unwrap()
}

pub fn like(recipient: &str, actor: &str, subject: &str) -> CreateNotification {
    CreateNotification::new(
        recipient,
        Some(actor),
        ActionType::Like,
        format!("{actor} liked your content"),
    )
    .subject(subject, Some("Sunset"))
}

pub fn interaction(
    id: &str,
    subject: &str,
    owner: &str,
    actor: &str,
    kind: ActionType,
    created_at: DateTime<Utc>,
) -> Interaction {
    Interaction {
        id: id.to_string(),
        subject_id: subject.to_string(),
        subject_title: "Sunset".to_string(),
        owner_email: owner.to_string(),
        actor_email: actor.to_string(),
        actor_name: None,
        interaction_type: kind,
        created_at,
    }
}

pub fn comment(
    id: &str,
    subject: &str,
    owner: &str,
    actor: &str,
    created_at: DateTime<Utc>,
) -> Comment {
    Comment {
        id: id.to_string(),
        subject_id: subject.to_string(),
        subject_title: "Sunset".to_string(),
        owner_email: owner.to_string(),
        actor_email: actor.to_string(),
        actor_name: Some("Fan".to_string()),
        content: "nice".to_string(),
        created_at,
    }
}

pub fn minutes(n: i64) -> Duration {
    Duration::minutes(n)
}
