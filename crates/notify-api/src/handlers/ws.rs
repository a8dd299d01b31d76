//! WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{info, warn};

use notify_core::error::AppError;
use notify_realtime::RealtimeHub;
use notify_realtime::connection::AuthenticatedUser;
use notify_realtime::connection::authenticator::extract_bearer;
use notify_realtime::connection::heartbeat::run_heartbeat;

use crate::state::AppState;

/// Query parameters for the handshake.
#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    /// Bearer credential (auth payload).
    pub token: Option<String>,
}

/// GET /ws?token={jwt}: WebSocket upgrade.
///
/// The credential is checked before the upgrade, so a refused handshake
/// never registers a session.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let token = extract_bearer(query.token.as_deref(), authorization);

    let user = match state.realtime.authenticator.authenticate(token.as_deref()) {
        Ok(user) => user,
        Err(e) => {
            warn!(error = %e, "WebSocket handshake rejected");
            return AppError::from(e).into_response();
        }
    };

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return rejection.into_response(),
    };

    let hub = state.realtime.clone();
    ws.on_upgrade(move |socket| handle_ws_connection(hub, user, socket))
}

/// Drives an established connection until either side closes it.
async fn handle_ws_connection(hub: Arc<RealtimeHub>, user: AuthenticatedUser, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (session, mut outbound_rx) = hub.registry.register(&user.email, user.name.clone());
    let session_id = session.id;

    info!(session_id = %session_id, user = %user.email, "WebSocket connection established");

    hub.gateway.on_connected(&session).await;

    let heartbeat = tokio::spawn(run_heartbeat(session.clone(), hub.ping_interval()));

    let outbound_session = session.clone();
    let mut outbound_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                event = outbound_rx.recv() => {
                    let Some(event) = event else { break };
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!(session_id = %outbound_session.id, error = %e, "Failed to encode event");
                            continue;
                        }
                    };
                    if ws_tx.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                _ = outbound_session.closed() => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    let mut shutdown = hub.shutdown_receiver();
    loop {
        tokio::select! {
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    hub.gateway.handle_client_text(&session, text.as_str()).await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(session_id = %session_id, error = %e, "WebSocket error");
                    break;
                }
            },
            _ = &mut outbound_task => break,
            _ = shutdown.recv() => break,
        }
    }

    heartbeat.abort();
    outbound_task.abort();
    hub.registry.unregister(&session);

    info!(session_id = %session_id, user = %user.email, "WebSocket connection closed");
}
