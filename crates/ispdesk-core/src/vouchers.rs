// ── HotSpot vouchers ──

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::export::write_csv;

/// No `0/O` or `1/I` so codes survive being read aloud or handwritten.
pub const ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

pub const MAX_BATCH: usize = 1000;
pub const MIN_LENGTH: usize = 4;
pub const MAX_LENGTH: usize = 16;
const GROUP: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherSpec {
    /// Random characters per code, dashes and prefix excluded.
    pub length: usize,
    pub prefix: Option<String>,
    /// HotSpot user profile the voucher logs in with.
    pub profile: String,
    pub duration_minutes: u32,
}

impl Default for VoucherSpec {
    fn default() -> Self {
        Self {
            length: 8,
            prefix: None,
            profile: "default".into(),
            duration_minutes: 60,
        }
    }
}

impl VoucherSpec {
    pub fn validate(&self, count: usize) -> Result<(), CoreError> {
        if count == 0 || count > MAX_BATCH {
            return Err(CoreError::ValidationFailed {
                message: format!("voucher count must be between 1 and {MAX_BATCH}, got {count}"),
            });
        }
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&self.length) {
            return Err(CoreError::ValidationFailed {
                message: format!(
                    "voucher length must be between {MIN_LENGTH} and {MAX_LENGTH}, got {}",
                    self.length
                ),
            });
        }
        if self.duration_minutes == 0 {
            return Err(CoreError::ValidationFailed {
                message: "voucher duration must be at least one minute".into(),
            });
        }
        if let Some(prefix) = &self.prefix {
            if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(CoreError::ValidationFailed {
                    message: format!("voucher prefix must be alphanumeric, got '{prefix}'"),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voucher {
    pub code: String,
    pub profile: String,
    pub duration_minutes: u32,
}

/// `count` unique codes drawn from `rng`.
pub fn generate<R: Rng + ?Sized>(
    count: usize,
    spec: &VoucherSpec,
    rng: &mut R,
) -> Result<Vec<Voucher>, CoreError> {
    spec.validate(count)?;

    let mut seen = HashSet::with_capacity(count);
    let mut out = Vec::with_capacity(count);
    let mut attempts = 0usize;
    while out.len() < count {
        attempts += 1;
        if attempts > count * 100 {
            return Err(CoreError::Internal(format!(
                "could not produce {count} unique vouchers of length {}",
                spec.length
            )));
        }
        let code = format_code(&random_chars(spec.length, rng), spec.prefix.as_deref());
        if seen.insert(code.clone()) {
            out.push(Voucher {
                code,
                profile: spec.profile.clone(),
                duration_minutes: spec.duration_minutes,
            });
        }
    }
    Ok(out)
}

/// [`generate`] with the thread-local RNG.
pub fn generate_batch(count: usize, spec: &VoucherSpec) -> Result<Vec<Voucher>, CoreError> {
    generate(count, spec, &mut rand::rng())
}

pub fn vouchers_csv(vouchers: &[Voucher]) -> String {
    write_csv(
        &["Code", "Profile", "Minutes"],
        vouchers.iter().map(|v| {
            vec![
                v.code.clone(),
                v.profile.clone(),
                v.duration_minutes.to_string(),
            ]
        }),
    )
}

fn random_chars<R: Rng + ?Sized>(length: usize, rng: &mut R) -> String {
    (0..length)
        .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
        .collect()
}

/// Dash every four characters, prefix first.
fn format_code(raw: &str, prefix: Option<&str>) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut groups: Vec<String> = chars
        .chunks(GROUP)
        .map(|chunk| chunk.iter().collect())
        .collect();
    if let Some(prefix) = prefix {
        groups.insert(0, prefix.to_ascii_uppercase());
    }
    groups.join("-")
}
