//! Route definitions.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::cors::build_cors_layer;
use crate::state::AppState;

/// Build the Axum router.
pub fn build_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server);

    Router::new()
        .route("/api/health", get(handlers::health::health))
        .route("/ws", get(handlers::ws::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use notify_auth::jwt::JwtDecoder;
    use notify_core::config::AppConfig;
    use notify_database::{MemoryStore, Stores};
    use notify_realtime::{ConnectionRegistry, RealtimeHub};
    use notify_service::NotificationEngine;

    use super::*;

    fn state() -> AppState {
        let config = AppConfig::default();
        let registry = Arc::new(ConnectionRegistry::new(config.realtime.channel_buffer_size));
        let engine = Arc::new(
            NotificationEngine::new(
                Stores::memory(Arc::new(MemoryStore::new())),
                config.engine.clone(),
            )
            .with_push(registry.clone()),
        );
        let realtime = Arc::new(RealtimeHub::new(
            config.realtime.clone(),
            registry,
            engine.clone(),
            Arc::new(JwtDecoder::new(&config.auth)),
        ));
        AppState {
            config: Arc::new(config),
            db: None,
            engine,
            realtime,
        }
    }

    async fn body_text(resp: axum::response::Response) -> String {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let resp = build_router(state())
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("not_configured"));
    }

    #[tokio::test]
    async fn test_ws_without_credential_is_rejected() {
        let resp = build_router(state())
            .oneshot(Request::get("/ws").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(body_text(resp).await.contains("Authentication required"));
    }

    #[tokio::test]
    async fn test_ws_with_bad_credential_is_rejected() {
        let resp = build_router(state())
            .oneshot(
                Request::get("/ws")
                    .header(header::AUTHORIZATION, "Bearer nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(body_text(resp).await.contains("Invalid or expired credential"));
    }
}
