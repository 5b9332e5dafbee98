//! Shared configuration for the ispdesk CLI.
//!
//! TOML profiles, token resolution (env + keyring + plaintext), and
//! translation to `ispdesk_core::BackofficeConfig`. Core never reads files;
//! everything on disk goes through here.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use ispdesk_core::{BackofficeConfig, TlsVerification};

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "ISPDESK_CONFIG";
/// Token used when a profile names no other source.
pub const TOKEN_ENV: &str = "ISPDESK_TOKEN";
const KEYRING_SERVICE: &str = "ispdesk";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no token configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named back-office profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Look up `name`, or the default profile when `None`.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, &Profile), ConfigError> {
        let name = name
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into());
        self.profiles
            .get(&name)
            .map(|p| (name.clone(), p))
            .ok_or(ConfigError::UnknownProfile { profile: name })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Roster rows per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Dashboard poll period for `dashboard --watch`.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            page_size: default_page_size(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_page_size() -> usize {
    ispdesk_core::config::DEFAULT_PAGE_SIZE
}
fn default_poll_interval() -> u64 {
    60
}

/// A named back-office profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Backend API base URL (e.g., "https://panel.example.net/api").
    pub url: String,

    /// Tenant display name, informational only.
    pub tenant: Option<String>,

    /// Bearer token (plaintext; prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable holding the bearer token.
    pub token_env: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override the default insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override the default timeout (seconds).
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// `$ISPDESK_CONFIG`, else the platform config dir.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("net", "ispdesk", "ispdesk").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("ispdesk");
    p
}

// ── Loading / saving ────────────────────────────────────────────────

/// Defaults, then the config file, then `ISPDESK_*` env vars
/// (`ISPDESK_DEFAULTS__OUTPUT=json`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ISPDESK_").split("__"));
    Ok(figment.extract()?)
}

pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(cfg)?)?;
    Ok(())
}

pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

// ── Token resolution ────────────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/token"),
    )?)
}

/// Profile `token_env`, then `$ISPDESK_TOKEN`, then the keyring, then the
/// plaintext token.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Ok(val) = std::env::var(TOKEN_ENV) {
        if !val.is_empty() {
            return Ok(SecretString::from(val));
        }
    }

    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a token in the system keyring for `profile_name`.
pub fn store_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(token)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

pub fn parse_url(raw: &str) -> Result<url::Url, ConfigError> {
    raw.parse().map_err(|e| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })
}

pub fn tls_for(profile: &Profile, defaults: &Defaults) -> TlsVerification {
    if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    }
}

/// Runtime config for a profile with a resolved token.
pub fn build_backoffice_config(
    profile: &Profile,
    defaults: &Defaults,
    token: SecretString,
) -> Result<BackofficeConfig, ConfigError> {
    let url = parse_url(&profile.url)?;
    let mut config = BackofficeConfig::new(url, token);
    config.tls = tls_for(profile, defaults);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.page_size = defaults.page_size.max(1);
    config.poll_interval = Duration::from_secs(defaults.poll_interval_secs.max(1));
    Ok(config)
}

/// Resolve the token, then build the runtime config.
pub fn profile_to_backoffice_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<BackofficeConfig, ConfigError> {
    let token = resolve_token(profile, profile_name)?;
    build_backoffice_config(profile, defaults, token)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn profile() -> Profile {
        Profile {
            url: "https://panel.example.net/api".into(),
            tenant: Some("Fibra Andina".into()),
            token: Some("plain-token".into()),
            ..Profile::default()
        }
    }

    #[test]
    fn file_round_trip_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.defaults.page_size = 25;
        cfg.profiles.insert("default".into(), profile());
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.defaults, Defaults::default());
        assert!(loaded.profiles.is_empty());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[defaults]\noutput = \"json\"\n\n[profiles.norte]\nurl = \"https://norte.example.net/api\"\n",
        )
        .unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.defaults.output, "json");
        assert_eq!(loaded.defaults.page_size, 10);
        let (name, norte) = loaded.profile(Some("norte")).unwrap();
        assert_eq!(name, "norte");
        assert!(norte.token.is_none());
        assert!(matches!(
            loaded.profile(None),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn runtime_config_applies_overrides() {
        let mut p = profile();
        p.timeout = Some(5);
        p.insecure = Some(true);
        let token = SecretString::from("t".to_string());
        let cfg = build_backoffice_config(&p, &Defaults::default(), token).unwrap();
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(cfg.page_size, 10);
        assert_eq!(cfg.url.as_str(), "https://panel.example.net/api");
    }

    #[test]
    fn bad_url_is_a_validation_error() {
        let mut p = profile();
        p.url = "not a url".into();
        let token = SecretString::from("t".to_string());
        let err = build_backoffice_config(&p, &Defaults::default(), token).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "url"));
    }
}
