use reqwest::StatusCode;
use tracing::debug;

use crate::error::{FastPushError, Result};

/// Largest error body echoed back to the operator.
const MAX_ERROR_BODY_CHARS: usize = 512;

fn truncate_body(body: &str) -> &str {
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

fn describe_status(status: StatusCode, body: &str) -> String {
    let body = truncate_body(body.trim());
    if body.is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("HTTP {}: {}", status, body)
    }
}

/// Send a request once and return the response body text.
///
/// No retries: a failed call is fatal to the invocation. Connection
/// failures and timeouts are transport errors; a non-2xx answer is a
/// protocol error carrying the status and body.
pub(super) async fn send(request: reqwest::RequestBuilder, url: &str) -> Result<String> {
    let response = request
        .send()
        .await
        .map_err(|source| FastPushError::Transport {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    debug!("{} -> {}", url, status);

    let body = response
        .text()
        .await
        .map_err(|source| FastPushError::Transport {
            url: url.to_string(),
            source,
        })?;

    if !status.is_success() {
        return Err(FastPushError::protocol(url, describe_status(status, &body)));
    }

    Ok(body)
}
