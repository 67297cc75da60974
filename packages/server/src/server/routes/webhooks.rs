//! Commerce host webhook endpoint.
//!
//! POST /webhooks/commerce
//!
//! Always answers 202 once the envelope is understood, whatever the handler
//! outcome: a bridge failure must never make the host redeliver. Outcomes are
//! logged here, once per notification.
//!
//! The handler runs on its own task. A host that hangs up mid-request drops
//! this future, but not the cycle it started, so a cart snapshot is still
//! written once its events have gone out.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domains::notifications::{handle_event, CommerceEvent, WebhookEnvelope};
use crate::server::app::AppState;

pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

pub async fn webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(envelope): Json<WebhookEnvelope>,
) -> Response {
    if let Some(expected) = state.webhook_secret.as_deref() {
        let presented = headers
            .get(WEBHOOK_SECRET_HEADER)
            .and_then(|value| value.to_str().ok());
        if presented != Some(expected) {
            tracing::warn!(event = %envelope.event, "Rejected webhook with bad secret");
            return StatusCode::UNAUTHORIZED.into_response();
        }
    }

    let event = match CommerceEvent::from_envelope(&envelope) {
        Ok(Some(event)) => event,
        Ok(None) => {
            tracing::debug!(event = %envelope.event, "Ignoring unhandled event");
            return StatusCode::ACCEPTED.into_response();
        }
        Err(e) => {
            tracing::warn!(event = %envelope.event, error = %e, "Malformed webhook envelope");
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };

    let processing = tokio::spawn({
        let deps = state.deps.clone();
        async move {
            let outcome = handle_event(&event, &deps).await;
            outcome.log(event.name(), event.subject_id());
        }
    });

    // Dropping the handle on disconnect detaches the task, it keeps running
    if let Err(e) = processing.await {
        tracing::error!(error = %e, "Webhook processing task panicked");
    }

    StatusCode::ACCEPTED.into_response()
}
