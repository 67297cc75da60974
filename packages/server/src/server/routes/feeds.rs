//! Product feed endpoint.
//!
//! GET /feeds/products/:currency_code

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domains::feeds::product_feed;
use crate::server::app::AppState;

pub async fn product_feed_handler(
    State(state): State<AppState>,
    Path(currency_code): Path<String>,
) -> Response {
    match product_feed(&currency_code, &state.deps).await {
        Ok(feed) => Json(feed).into_response(),
        Err(e) => {
            tracing::error!(
                currency_code = %currency_code,
                error = %format!("{:#}", e),
                "Failed to build product feed"
            );
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": "product catalogue unavailable" })),
            )
                .into_response()
        }
    }
}
