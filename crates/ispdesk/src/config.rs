//! CLI configuration: a thin layer over `ispdesk_config` that applies
//! `GlobalOpts` flag overrides (--url, --token, --insecure, --timeout).

use std::time::Duration;

use clap::ValueEnum;
use secrecy::SecretString;
use tracing::warn;

use ispdesk_core::BackofficeConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use ispdesk_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// `--profile`, else the config's default profile, else `default`.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Fill output and color from `[defaults]` where no flag was given.
pub fn apply_defaults(global: &mut GlobalOpts, defaults: &Defaults) {
    if global.output.is_none() {
        global.output = parse_default::<OutputFormat>("output", &defaults.output);
    }
    if global.color.is_none() {
        global.color = parse_default::<ColorMode>("color", &defaults.color);
    }
}

fn parse_default<T: ValueEnum>(field: &str, raw: &str) -> Option<T> {
    match T::from_str(raw, true) {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(field, value = raw, "ignoring unknown value in [defaults]");
            None
        }
    }
}

/// Build the runtime config from the active profile with flag overrides.
/// Without a profile, `--url` and `--token` alone are enough.
pub fn resolve_backoffice(
    global: &GlobalOpts,
    config: &Config,
) -> Result<BackofficeConfig, CliError> {
    let name = active_profile_name(global, config);

    let mut profile = match config.profiles.get(&name) {
        Some(profile) => profile.clone(),
        None if global.url.is_some() => Profile::default(),
        None if config.profiles.is_empty() => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
        None => {
            return Err(CliError::ProfileNotFound {
                available: config.profiles.keys().cloned().collect::<Vec<_>>().join(", "),
                name,
            });
        }
    };

    if let Some(ref url) = global.url {
        profile.url.clone_from(url);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }

    let token = match global.token {
        Some(ref token) if !token.is_empty() => SecretString::from(token.clone()),
        _ => ispdesk_config::resolve_token(&profile, &name)?,
    };

    let mut backoffice = ispdesk_config::build_backoffice_config(&profile, &config.defaults, token)?;
    if let Some(seconds) = global.timeout {
        backoffice.timeout = Duration::from_secs(seconds);
    }
    Ok(backoffice)
}
