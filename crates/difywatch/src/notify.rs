// Copyright (c) 2026 - present The difywatch authors
// SPDX-License-Identifier: MIT

//! Webhook delivery of the rendered report
//!
//! One outbound POST per run carrying the pre-formatted text in the chat
//! webhook's `msg_type: text` envelope. Delivery failure never fails the
//! run; the orchestrator just logs the outcome.

use std::time::Duration;

use serde_json::json;
use thiserror::Error;
use tracing::debug;

/// Timeout for the outbound notification call.
pub const DELIVER_TIMEOUT: Duration = Duration::from_secs(30);

/// Notification delivery errors
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Connection, TLS, or timeout failure
    #[error("Webhook request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// POST `text` to the webhook, returning the response status and body.
///
/// A non-200 status is returned to the caller rather than treated as an
/// error here, so it can be logged with the body.
///
/// # Errors
///
/// Returns an error when the request cannot be built or completed.
pub fn deliver(webhook_url: &str, text: &str) -> Result<(u16, String), NotifyError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(DELIVER_TIMEOUT)
        .build()?;

    let payload = json!({
        "msg_type": "text",
        "content": { "text": text },
    });

    debug!(url = webhook_url, bytes = text.len(), "posting report");
    let response = client.post(webhook_url).json(&payload).send()?;

    let status = response.status().as_u16();
    let body = response.text().unwrap_or_default();
    Ok((status, body))
}
