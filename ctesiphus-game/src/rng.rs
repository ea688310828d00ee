//! Deterministic RNG streams for a campaign.
//!
//! Each gameplay domain draws from its own `ChaCha20` stream so that, for
//! example, an extra reward roll never shifts later exploration results.
use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

const EXPLORATION_TAG: &[u8] = b"exploration";
const REWARDS_TAG: &[u8] = b"rewards";

/// Persisted position of every stream, stored in the campaign snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RngCursor {
    pub seed: u64,
    pub exploration_word: u64,
    pub rewards_word: u64,
}

impl RngCursor {
    #[must_use]
    pub const fn fresh(seed: u64) -> Self {
        Self {
            seed,
            exploration_word: 0,
            rewards_word: 0,
        }
    }
}

/// Bundle of independent RNG streams for one campaign.
#[derive(Debug, Clone)]
pub struct RngBundle {
    seed: u64,
    exploration: ChaCha20Rng,
    rewards: ChaCha20Rng,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            seed,
            exploration: ChaCha20Rng::seed_from_u64(derive_stream_seed(seed, EXPLORATION_TAG)),
            rewards: ChaCha20Rng::seed_from_u64(derive_stream_seed(seed, REWARDS_TAG)),
        }
    }

    /// Rebuild the streams and fast-forward them to a saved cursor.
    #[must_use]
    pub fn restore(cursor: RngCursor) -> Self {
        let mut bundle = Self::from_user_seed(cursor.seed);
        bundle
            .exploration
            .set_word_pos(u128::from(cursor.exploration_word));
        bundle.rewards.set_word_pos(u128::from(cursor.rewards_word));
        bundle
    }

    #[must_use]
    pub fn cursor(&self) -> RngCursor {
        RngCursor {
            seed: self.seed,
            exploration_word: word_pos(&self.exploration),
            rewards_word: word_pos(&self.rewards),
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Stream used for location and condition table rolls.
    pub fn exploration(&mut self) -> &mut ChaCha20Rng {
        &mut self.exploration
    }

    /// Stream used for reward and resupply dice.
    pub fn rewards(&mut self) -> &mut ChaCha20Rng {
        &mut self.rewards
    }
}

fn word_pos(rng: &ChaCha20Rng) -> u64 {
    u64::try_from(rng.get_word_pos()).unwrap_or(u64::MAX)
}

/// HMAC-SHA256 domain separation of the campaign seed.
#[must_use]
pub fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let mut mac = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0_u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}
