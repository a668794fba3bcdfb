//! GitHub webhook payload parser.
//!
//! This module parses raw webhook JSON payloads into typed
//! [`PullRequestEvent`] values. The parser is designed to be robust against
//! unknown fields, event types, and actions.
//!
//! # Parsing Strategy
//!
//! 1. The event type is determined from the `X-GitHub-Event` header
//! 2. The payload is parsed according to the event type
//! 3. Unknown event types and unhandled actions return `Ok(None)` (ignored)
//! 4. Malformed payloads return `Err` with details

use serde::Deserialize;
use thiserror::Error;

use crate::types::{DeliveryId, PrNumber, RepoId, Sha};

use super::events::{PrAction, PullRequestEvent};

/// Error type for webhook parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes missing required fields).
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Field has invalid value (e.g., malformed SHA).
    #[error("invalid field value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Parses a webhook payload into a typed event.
///
/// # Arguments
///
/// * `event_type` - The value of the `X-GitHub-Event` header
/// * `delivery` - The value of the `X-GitHub-Delivery` header
/// * `payload` - The raw JSON payload bytes
///
/// # Returns
///
/// * `Ok(Some(event))` - Successfully parsed a `pull_request` event
/// * `Ok(None)` - Unknown event type or unhandled action (ignored, not an error)
/// * `Err(e)` - Malformed payload or missing required fields
pub fn parse_webhook(
    event_type: &str,
    delivery: DeliveryId,
    payload: &[u8],
) -> Result<Option<PullRequestEvent>, ParseError> {
    match event_type {
        "pull_request" => parse_pull_request(delivery, payload),
        // Unknown event types are ignored (not an error)
        _ => Ok(None),
    }
}

// ============================================================================
// Raw payload structures for deserialization
//
// These match GitHub's webhook JSON structure. Optional fields are handled
// gracefully, then required fields are validated explicitly.
// ============================================================================

/// Minimal repository info present in all webhook payloads.
#[derive(Debug, Deserialize)]
struct RawRepository {
    owner: RawOwner,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RawPullRequestPayload {
    action: String,
    pull_request: RawPullRequest,
    repository: RawRepository,
}

#[derive(Debug, Deserialize)]
struct RawPullRequest {
    number: u64,
    head: RawRef,
    base: RawRef,
}

#[derive(Debug, Deserialize)]
struct RawRef {
    sha: String,
    #[serde(rename = "ref")]
    ref_name: String,
}

fn parse_pull_request(
    delivery: DeliveryId,
    payload: &[u8],
) -> Result<Option<PullRequestEvent>, ParseError> {
    let raw: RawPullRequestPayload = serde_json::from_slice(payload)?;

    let action = match raw.action.as_str() {
        "opened" => PrAction::Opened,
        "closed" => PrAction::Closed,
        "edited" => PrAction::Edited,
        "synchronize" => PrAction::Synchronize,
        "reopened" => PrAction::Reopened,
        // Other actions (assigned, labeled, etc.) are not relevant to us
        _ => return Ok(None),
    };

    let head_sha =
        Sha::parse(&raw.pull_request.head.sha).map_err(|_| ParseError::InvalidField {
            field: "pull_request.head.sha",
            value: raw.pull_request.head.sha.clone(),
        })?;

    let base_sha =
        Sha::parse(&raw.pull_request.base.sha).map_err(|_| ParseError::InvalidField {
            field: "pull_request.base.sha",
            value: raw.pull_request.base.sha.clone(),
        })?;

    Ok(Some(PullRequestEvent {
        repo: RepoId::new(raw.repository.owner.login, raw.repository.name),
        action,
        pr_number: PrNumber(raw.pull_request.number),
        base_sha,
        head_sha,
        base_branch: raw.pull_request.base.ref_name,
        delivery,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delivery() -> DeliveryId {
        DeliveryId::new("550e8400-e29b-41d4-a716-446655440000")
    }

    #[test]
    fn parse_pull_request_opened() {
        let payload = r#"{
            "action": "opened",
            "pull_request": {
                "number": 123,
                "head": {
                    "sha": "1234567890abcdef1234567890abcdef12345678",
                    "ref": "feature-branch"
                },
                "base": {
                    "sha": "abcdef1234567890abcdef1234567890abcdef12",
                    "ref": "main"
                }
            },
            "repository": {
                "owner": { "login": "org" },
                "name": "repo"
            }
        }"#;

        let event = parse_webhook("pull_request", delivery(), payload.as_bytes())
            .unwrap()
            .expect("should parse");

        assert_eq!(event.repo, RepoId::new("org", "repo"));
        assert_eq!(event.action, PrAction::Opened);
        assert_eq!(event.pr_number, PrNumber(123));
        assert_eq!(
            event.head_sha,
            Sha::parse("1234567890abcdef1234567890abcdef12345678").unwrap()
        );
        assert_eq!(
            event.base_sha,
            Sha::parse("abcdef1234567890abcdef1234567890abcdef12").unwrap()
        );
        assert_eq!(event.base_branch, "main");
        assert_eq!(event.delivery, delivery());
    }

    #[test]
    fn parse_pull_request_synchronize() {
        let payload = r#"{
            "action": "synchronize",
            "pull_request": {
                "number": 50,
                "head": { "sha": "abcdef1234567890abcdef1234567890abcdef12", "ref": "branch" },
                "base": { "sha": "1234567890abcdef1234567890abcdef12345678", "ref": "main" }
            },
            "repository": {
                "owner": { "login": "org" },
                "name": "repo"
            }
        }"#;

        let event = parse_webhook("pull_request", delivery(), payload.as_bytes())
            .unwrap()
            .expect("should parse");
        assert_eq!(event.action, PrAction::Synchronize);
        assert!(event.action.should_trigger());
    }

    #[test]
    fn parse_pull_request_closed_is_parsed_but_does_not_trigger() {
        let payload = r#"{
            "action": "closed",
            "pull_request": {
                "number": 7,
                "head": { "sha": "abcdef1234567890abcdef1234567890abcdef12", "ref": "branch" },
                "base": { "sha": "1234567890abcdef1234567890abcdef12345678", "ref": "main" }
            },
            "repository": {
                "owner": { "login": "org" },
                "name": "repo"
            }
        }"#;

        let event = parse_webhook("pull_request", delivery(), payload.as_bytes())
            .unwrap()
            .expect("should parse");
        assert_eq!(event.action, PrAction::Closed);
        assert!(!event.action.should_trigger());
    }

    #[test]
    fn unknown_event_type_returns_none() {
        let payload = b"{}";

        assert!(
            parse_webhook("ping", delivery(), payload)
                .unwrap()
                .is_none()
        );
        assert!(
            parse_webhook("push", delivery(), payload)
                .unwrap()
                .is_none()
        );
        assert!(
            parse_webhook("issue_comment", delivery(), payload)
                .unwrap()
                .is_none()
        );
        assert!(
            parse_webhook("check_suite", delivery(), payload)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn unhandled_pr_actions_return_none() {
        for action in ["assigned", "labeled", "review_requested", "locked"] {
            let payload = format!(
                r#"{{
                "action": "{}",
                "pull_request": {{
                    "number": 1,
                    "head": {{ "sha": "1234567890abcdef1234567890abcdef12345678", "ref": "b" }},
                    "base": {{ "sha": "abcdef1234567890abcdef1234567890abcdef12", "ref": "main" }}
                }},
                "repository": {{ "owner": {{ "login": "o" }}, "name": "r" }}
            }}"#,
                action
            );
            let result = parse_webhook("pull_request", delivery(), payload.as_bytes());
            assert!(
                result.unwrap().is_none(),
                "action '{}' should return None",
                action
            );
        }
    }

    #[test]
    fn malformed_json_returns_error() {
        let payload = b"not valid json";
        let result = parse_webhook("pull_request", delivery(), payload);
        assert!(matches!(result, Err(ParseError::JsonError(_))));
    }

    #[test]
    fn missing_repository_returns_error() {
        let payload = r#"{
            "action": "opened",
            "pull_request": {
                "number": 1,
                "head": { "sha": "1234567890abcdef1234567890abcdef12345678", "ref": "b" },
                "base": { "sha": "abcdef1234567890abcdef1234567890abcdef12", "ref": "main" }
            }
        }"#;
        let result = parse_webhook("pull_request", delivery(), payload.as_bytes());
        assert!(result.is_err());
    }

    #[test]
    fn invalid_sha_returns_error() {
        let payload = r#"{
            "action": "opened",
            "pull_request": {
                "number": 1,
                "head": { "sha": "not-a-sha", "ref": "b" },
                "base": { "sha": "abcdef1234567890abcdef1234567890abcdef12", "ref": "main" }
            },
            "repository": { "owner": { "login": "o" }, "name": "r" }
        }"#;
        let result = parse_webhook("pull_request", delivery(), payload.as_bytes());
        assert!(matches!(
            result,
            Err(ParseError::InvalidField {
                field: "pull_request.head.sha",
                ..
            })
        ));
    }
}
