// ── Runtime connection configuration ──
//
// Describes *how* to reach the back office. Carries the token and tuning
// knobs but never touches disk; the CLI builds one from its profile.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (staging backends with self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for one back-office tenant endpoint.
#[derive(Debug, Clone)]
pub struct BackofficeConfig {
    /// API base URL (e.g., `https://api.isp.example/v1`).
    pub url: Url,
    /// Bearer token for the API.
    pub token: SecretString,
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Dashboard polling period, floored at one second.
    pub poll_interval: Duration,
    /// Initial roster page size.
    pub page_size: usize,
}

impl BackofficeConfig {
    pub fn new(url: Url, token: SecretString) -> Self {
        Self {
            url,
            token,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(60),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub(crate) fn transport(&self) -> ispdesk_api::TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => ispdesk_api::TlsMode::System,
            TlsVerification::CustomCa(path) => ispdesk_api::TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => ispdesk_api::TlsMode::DangerAcceptInvalid,
        };
        ispdesk_api::TransportConfig {
            tls,
            timeout: self.timeout,
            token: Some(self.token.clone()),
        }
    }
}
