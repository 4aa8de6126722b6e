use thiserror::Error;

/// Errors surfaced by the client core.
///
/// The first three variants are the ones UI code is expected to match on:
/// `Unauthenticated` and `SessionExpired` route to the login screen,
/// `Api`/`Request` are shown to the user as-is. `MalformedEvent` and
/// `ConnectionLost` never escape the event channel; they exist so its
/// internals can log a typed reason.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No access token was available for an authenticated call.
    #[error("not authenticated")]
    Unauthenticated,

    /// The refresh handshake failed; the session cannot be recovered.
    #[error("session expired")]
    SessionExpired,

    /// The service answered with a non-success status.
    #[error("request failed ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure before any response status existed.
    #[error("transport error: {0}")]
    Request(#[from] reqwest::Error),

    /// The credential store could not be read or written.
    #[error("credential store error: {reason}")]
    Credentials { reason: String },

    /// An inbound frame could not be parsed.
    #[error("malformed event: {reason}")]
    MalformedEvent { reason: String },

    /// The event channel closed.
    #[error("connection lost: {reason}")]
    ConnectionLost { reason: String },
}

/// Error body shapes the service is known to produce. Login and validation
/// failures come back as `{"message": ...}`; a few older endpoints use
/// `{"error": ...}`.
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ClientError {
    /// Build an `Api` error from a non-success response body.
    pub fn api(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    format!("HTTP {status}")
                } else {
                    trimmed.to_string()
                }
            });
        Self::Api { status, message }
    }

    /// True when the service rejected the access token itself (expired or
    /// invalid), which is signalled with 403 and nothing else. 401 and other
    /// statuses are ordinary request failures and must not trigger a refresh.
    pub fn is_auth_rejected(&self) -> bool {
        matches!(self, Self::Api { status: 403, .. })
    }
}
