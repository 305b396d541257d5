// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// axum routing for the notification endpoint.

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use serde::Deserialize;
use tracing::info;

use uprint_core::error::{Result, UprintError};

use crate::handler::{HandlerOutcome, WebhookState, handle_notifications, handle_validation};

pub const NOTIFICATIONS_PATH: &str = "/api/notifications";

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    #[serde(rename = "validationToken")]
    pub validation_token: Option<String>,
}

pub fn build_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route(NOTIFICATIONS_PATH, post(notifications))
        .with_state(state)
}

async fn notifications(
    State(state): State<Arc<WebhookState>>,
    Query(query): Query<NotificationQuery>,
    body: Bytes,
) -> Response {
    let outcome = match query.validation_token.filter(|t| !t.is_empty()) {
        Some(token) => handle_validation(token),
        None => handle_notifications(&state, &body).await,
    };
    into_response(outcome)
}

fn into_response(outcome: HandlerOutcome) -> Response {
    match outcome {
        HandlerOutcome::Validation(token) => {
            (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], token).into_response()
        }
        HandlerOutcome::Accepted => StatusCode::ACCEPTED.into_response(),
        HandlerOutcome::Rejected(message) => (StatusCode::BAD_REQUEST, message).into_response(),
        HandlerOutcome::Failed => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// Listen on `bind` until the process is stopped.
pub async fn serve(state: Arc<WebhookState>, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(bind, path = NOTIFICATIONS_PATH, "webhook listening");
    axum::serve(listener, build_router(state))
        .await
        .map_err(|e| UprintError::Transport(format!("webhook server stopped: {e}")))
}
