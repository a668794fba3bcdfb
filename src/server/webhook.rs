//! Webhook endpoint handler.
//!
//! Accepts GitHub webhook deliveries, parses pull request events, and runs
//! the pipeline to completion before responding. Events that cannot be
//! processed (clone failure, invalid pattern, even a panic in the pipeline)
//! are logged and dropped; the delivery is still acknowledged with 202, as
//! the bot has no retry path. Only malformed requests are rejected.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, error, info};

use super::AppState;
use crate::pipeline::process_event;
use crate::types::DeliveryId;
use crate::webhooks::{ParseError, parse_webhook};

/// Header name for GitHub event type.
const HEADER_EVENT: &str = "x-github-event";
/// Header name for GitHub delivery ID.
const HEADER_DELIVERY: &str = "x-github-delivery";

/// Errors that reject a webhook request outright.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Missing required header.
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    /// Malformed payload.
    #[error("invalid payload: {0}")]
    Parse(#[from] ParseError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::MissingHeader(_) => StatusCode::BAD_REQUEST,
            WebhookError::Parse(_) => StatusCode::BAD_REQUEST,
        };

        (status, self.to_string()).into_response()
    }
}

/// Webhook handler.
///
/// # Request
///
/// - Method: POST
/// - Required headers:
///   - `X-GitHub-Event`: Event type (only "pull_request" is acted on)
///   - `X-GitHub-Delivery`: Unique delivery ID (UUID format)
/// - Body: JSON webhook payload
///
/// # Response
///
/// - 202 Accepted: event processed, ignored, or dropped after a processing
///   failure (failures are logged; there is no retry or dead-letter path)
/// - 400 Bad Request: missing header or malformed payload
pub async fn webhook_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), WebhookError> {
    let event_type = get_header(&headers, HEADER_EVENT)?;
    let delivery = DeliveryId::new(get_header(&headers, HEADER_DELIVERY)?);

    debug!(
        delivery = %delivery,
        event_type = %event_type,
        "received webhook"
    );

    let event = match parse_webhook(&event_type, delivery.clone(), &body)? {
        Some(event) => event,
        None => {
            debug!(delivery = %delivery, event_type = %event_type, "ignoring event");
            return Ok((StatusCode::ACCEPTED, "Ignored"));
        }
    };

    // One event is fully processed before the next starts: the scratch
    // space is shared across events.
    let _guard = app_state.lock_events().await;

    // The pipeline is synchronous (git subprocesses, filesystem walks), so
    // it runs on the blocking pool. Awaiting the join handle is the
    // supervised boundary: a panic surfaces as a JoinError here instead of
    // taking down the process.
    let config = app_state.pipeline().clone();
    let result = tokio::task::spawn_blocking(move || process_event(&event, &config)).await;

    match result {
        Ok(Ok(outcome)) => {
            info!(delivery = %delivery, ?outcome, "event processed");
            Ok((StatusCode::ACCEPTED, "Accepted"))
        }
        Ok(Err(event_error)) => {
            error!(delivery = %delivery, error = %event_error, "event processing failed; dropping event");
            Ok((StatusCode::ACCEPTED, "Accepted"))
        }
        Err(join_error) => {
            error!(delivery = %delivery, error = %join_error, "event processing panicked; dropping event");
            Ok((StatusCode::ACCEPTED, "Accepted"))
        }
    }
}

/// Extracts a required header value as a string.
fn get_header(headers: &HeaderMap, name: &'static str) -> Result<String, WebhookError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .ok_or(WebhookError::MissingHeader(name))
}
