//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use ispdesk_config::ConfigError;
use ispdesk_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the back office at {url}")]
    #[diagnostic(
        code(ispdesk::connection_failed),
        help(
            "Check that the back-office API is up and the URL is right.\n\
             Self-signed certificate? Retry with --insecure (-k)."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(ispdesk::timeout),
        help("Increase the timeout with --timeout or check the back office.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(ispdesk::auth_failed),
        help(
            "The token was rejected. Store a fresh one with:\n  \
             ispdesk config set-token"
        )
    )]
    AuthFailed { message: String },

    #[error("No token configured for profile '{profile}'")]
    #[diagnostic(
        code(ispdesk::no_credentials),
        help(
            "Configure one with: ispdesk config init\n\
             Or set the ISPDESK_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    #[error("Role '{role}' may not {action}")]
    #[diagnostic(
        code(ispdesk::permission_denied),
        help("Client management needs a company or platform administrator token.")
    )]
    PermissionDenied { action: String, role: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(ispdesk::not_found),
        help("Run: ispdesk {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Nothing to {action}")]
    #[diagnostic(
        code(ispdesk::no_targets),
        help("Pass explicit clients with --ids, or relax the filters.")
    )]
    NoTargets { action: String },

    #[error("'{action}' stopped after {count} client(s): {reason}")]
    #[diagnostic(
        code(ispdesk::partial_bulk),
        help(
            "Already applied to: {committed}\n\
             Check the back office, then re-run for the remaining clients."
        )
    )]
    PartialBulk {
        action: String,
        count: usize,
        committed: String,
        reason: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error{}: {message}", .status.map_or_else(String::new, |s| format!(" ({s})")))]
    #[diagnostic(code(ispdesk::api_error))]
    ApiError { status: Option<u16>, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ispdesk::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(ispdesk::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: ispdesk config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No back office configured")]
    #[diagnostic(
        code(ispdesk::no_config),
        help(
            "Create a profile with: ispdesk config init\n\
             Expected at: {path}\n\
             Or pass --url and --token."
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(ispdesk::config))]
    Config { message: String },

    #[error("Keyring error: {message}")]
    #[diagnostic(
        code(ispdesk::keyring),
        help("Set ISPDESK_TOKEN or a plaintext token in the profile instead.")
    )]
    Keyring { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(ispdesk::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(ispdesk::io))]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(ispdesk::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(ispdesk::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(ispdesk::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } | Self::Keyring { .. } => {
                exit_code::AUTH
            }
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } | Self::NoTargets { .. } | Self::ProfileNotFound { .. } => {
                exit_code::NOT_FOUND
            }
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::NotSignedIn => CliError::AuthFailed {
                message: "no active session".into(),
            },
            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            CoreError::PermissionDenied { action, role } => {
                CliError::PermissionDenied { action, role }
            }
            CoreError::ClientNotFound { identifier } => CliError::NotFound {
                resource_type: "client".into(),
                identifier,
                list_command: "clients list".into(),
            },
            CoreError::NoTargets { action } => CliError::NoTargets { action },
            CoreError::PartialBulk {
                action,
                committed,
                reason,
            } => CliError::PartialBulk {
                action,
                count: committed.len(),
                committed: committed.join(", "),
                reason,
            },
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Api { message, status } => CliError::ApiError { status, message },
            CoreError::Config { message } => CliError::Config { message },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { profile } => CliError::ProfileNotFound {
                name: profile,
                available: "(see: ispdesk config profiles)".into(),
            },
            ConfigError::Keyring(e) => CliError::Keyring {
                message: e.to_string(),
            },
            ConfigError::Serialization(e) => CliError::Config {
                message: format!("failed to serialize config: {e}"),
            },
            ConfigError::Figment(e) => CliError::Config {
                message: e.to_string(),
            },
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_keep_their_exit_codes() {
        let cases = [
            (CoreError::NotSignedIn, exit_code::AUTH),
            (
                CoreError::NoTargets {
                    action: "suspend".into(),
                },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::PermissionDenied {
                    action: "suspend".into(),
                    role: "technician".into(),
                },
                exit_code::PERMISSION,
            ),
            (
                CoreError::ValidationFailed {
                    message: "name".into(),
                },
                exit_code::USAGE,
            ),
            (CoreError::Timeout { timeout_secs: 5 }, exit_code::TIMEOUT),
        ];
        for (core, code) in cases {
            assert_eq!(CliError::from(core).exit_code(), code);
        }
    }

    #[test]
    fn api_error_shows_status_when_known() {
        let err = CliError::ApiError {
            status: Some(503),
            message: "maintenance".into(),
        };
        assert_eq!(err.to_string(), "API error (503): maintenance");

        let err = CliError::ApiError {
            status: None,
            message: "bad body".into(),
        };
        assert_eq!(err.to_string(), "API error: bad body");
    }

    #[test]
    fn partial_bulk_lists_committed_clients() {
        let err = CliError::from(CoreError::PartialBulk {
            action: "suspend".into(),
            committed: vec!["c1".into(), "c2".into()],
            reason: "API error: boom".into(),
        });
        assert_eq!(err.exit_code(), exit_code::GENERAL);
        assert_eq!(err.to_string(), "'suspend' stopped after 2 client(s): API error: boom");
        match err {
            CliError::PartialBulk { committed, .. } => assert_eq!(committed, "c1, c2"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
