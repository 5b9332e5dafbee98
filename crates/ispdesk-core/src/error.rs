// ── Core error types ──
//
// User-facing errors from ispdesk-core. Consumers never see HTTP status
// codes or JSON parse failures directly; `From<ispdesk_api::Error>`
// translates transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the back office at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Session errors ───────────────────────────────────────────────
    #[error("No active session -- sign in first")]
    NotSignedIn,

    #[error("Role '{role}' may not {action}")]
    PermissionDenied { action: String, role: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Client not found: {identifier}")]
    ClientNotFound { identifier: String },

    // ── Operation errors ─────────────────────────────────────────────
    /// A bulk action had neither a selection nor a default target set.
    #[error("No clients to act on for '{action}'")]
    NoTargets { action: String },

    /// Some backend writes of a bulk action went through before one
    /// failed. Only the committed clients changed locally.
    #[error("'{action}' stopped after {} client(s): {reason}", committed.len())]
    PartialBulk {
        action: String,
        committed: Vec<String>,
        reason: String,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Failures of background loads that the next refresh may fix.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. }
                | Self::Timeout { .. }
                | Self::Api {
                    status: Some(500..=599) | None,
                    ..
                }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<ispdesk_api::Error> for CoreError {
    fn from(err: ispdesk_api::Error) -> Self {
        match err {
            ispdesk_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            ispdesk_api::Error::Forbidden { message } => CoreError::PermissionDenied {
                action: message,
                role: "current".into(),
            },
            ispdesk_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            ispdesk_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            ispdesk_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            ispdesk_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            ispdesk_api::Error::NotFound { path } => CoreError::ClientNotFound { identifier: path },
            ispdesk_api::Error::InvalidId { id } => CoreError::ClientNotFound { identifier: id },
            ispdesk_api::Error::Http { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            ispdesk_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_errors_keep_status() {
        let err = CoreError::from(ispdesk_api::Error::Http {
            status: 503,
            message: "maintenance".into(),
        });
        assert!(matches!(err, CoreError::Api { status: Some(503), .. }));
        assert!(err.is_transient());
    }

    #[test]
    fn validation_is_not_transient() {
        let err = CoreError::NoTargets {
            action: "reminder".into(),
        };
        assert!(!err.is_transient());
        assert_eq!(err.to_string(), "No clients to act on for 'reminder'");
    }
}
