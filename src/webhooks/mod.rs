//! Webhook handling for GitHub pull request events.
//!
//! This module provides:
//! - Typed representation of the `pull_request` webhook event
//! - Payload parsing (raw JSON -> typed event)
//!
//! Signature verification is deliberately absent: this bot runs behind a
//! trusted ingress and does not authenticate deliveries.

pub mod events;
pub mod parser;

pub use events::{PrAction, PullRequestEvent};
pub use parser::{ParseError, parse_webhook};
