use anyhow::{Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

static HEX_SEED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^0x([0-9a-f]{1,16})$").expect("valid hex seed pattern"));

/// Seed metadata used for simulation runs and reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    /// Original phrase for seeds derived from text.
    pub phrase: Option<String>,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self { seed, phrase: None }
    }

    #[must_use]
    pub fn from_phrase(phrase: &str) -> Self {
        Self {
            seed: phrase_seed(phrase),
            phrase: Some(phrase.to_string()),
        }
    }

    #[must_use]
    pub fn label(&self) -> String {
        self.phrase
            .as_ref()
            .map_or_else(|| self.seed.to_string(), |p| format!("{p} ({})", self.seed))
    }
}

/// First eight bytes of the SHA-256 digest of the phrase.
#[must_use]
pub fn phrase_seed(phrase: &str) -> u64 {
    let digest = Sha256::digest(phrase.trim().to_lowercase().as_bytes());
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

/// Resolve CLI seed tokens: decimal integers, `0x` hex literals, and
/// `phrase:<text>` seeds hashed into a number. A `range:<a>..<b>` token
/// expands to every seed in the half-open range.
///
/// # Errors
///
/// Returns an error for tokens that match none of those forms.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut pending: Vec<SeedInfo> = Vec::new();

    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        if let Ok(value) = token.parse::<u64>() {
            pending.push(SeedInfo::from_numeric(value));
            continue;
        }

        if let Ok(value) = token.parse::<i64>() {
            pending.push(SeedInfo::from_numeric(value.unsigned_abs()));
            continue;
        }

        if let Some(caps) = HEX_SEED.captures(token) {
            let value = u64::from_str_radix(&caps[1], 16)?;
            pending.push(SeedInfo::from_numeric(value));
            continue;
        }

        if let Some(phrase) = token.strip_prefix("phrase:") {
            pending.push(SeedInfo::from_phrase(phrase));
            continue;
        }

        if let Some(range) = token.strip_prefix("range:") {
            let Some((start, end)) = range.split_once("..") else {
                bail!("Malformed seed range: {token}");
            };
            let (start, end): (u64, u64) = (start.parse()?, end.parse()?);
            if end <= start || end - start > 10_000 {
                bail!("Seed range must hold between 1 and 10000 seeds: {token}");
            }
            pending.extend((start..end).map(SeedInfo::from_numeric));
            continue;
        }

        bail!("Unrecognized seed token: {token}");
    }

    let mut seen = HashSet::new();
    pending.retain(|info| seen.insert(info.seed));

    if pending.is_empty() {
        pending.push(SeedInfo::from_numeric(1337));
    }

    Ok(pending)
}
