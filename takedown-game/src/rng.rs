//! Seeded random source shared by every simulation component.
//!
//! A human-readable seed string is hashed into a `ChaCha8` key, so the pair
//! `(seed, word position)` fully determines every future draw. Nothing in the
//! engine may reach for an unseeded generator; all randomness flows through
//! [`MatchRng`] handles passed in explicitly by the caller.
use hmac::{Hmac, Mac};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

const SEED_DOMAIN: &[u8] = b"takedown/match-rng";
const STATE_SEPARATOR: char = '.';
const FLOAT_SCALE: f64 = 1.0 / 9_007_199_254_740_992.0;

/// Errors raised when a serialized RNG state cannot be restored.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RngStateError {
    #[error("rng state is empty")]
    Empty,
    #[error("rng state {state:?} is missing the '.' separator")]
    MissingSeparator { state: String },
    #[error("rng state field {field} is not valid hex (got {value:?})")]
    InvalidField { field: &'static str, value: String },
}

/// Persisted snapshot of a random source, embedded in the caller's save blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RandomState {
    pub seed: String,
    pub state: String,
}

/// Deterministic draw stream seeded from a string.
#[derive(Debug, Clone)]
pub struct MatchRng {
    seed: String,
    rng: ChaCha8Rng,
    draws: u64,
}

impl MatchRng {
    /// Construct a fresh stream from a user-visible seed. Surrounding
    /// whitespace is ignored.
    #[must_use]
    pub fn new(seed: &str) -> Self {
        let seed = seed.trim();
        Self {
            seed: seed.to_string(),
            rng: ChaCha8Rng::from_seed(derive_key(seed)),
            draws: 0,
        }
    }

    /// Rebuild a stream from its seed and a string produced by [`MatchRng::serialize`].
    ///
    /// # Errors
    ///
    /// Returns `RngStateError` when `state` is not in the serialized form.
    pub fn deserialize(seed: &str, state: &str) -> Result<Self, RngStateError> {
        let state = state.trim();
        if state.is_empty() {
            return Err(RngStateError::Empty);
        }
        let (draws_hex, pos_hex) =
            state
                .split_once(STATE_SEPARATOR)
                .ok_or_else(|| RngStateError::MissingSeparator {
                    state: state.to_string(),
                })?;
        let draws = u64::from_str_radix(draws_hex, 16).map_err(|_| RngStateError::InvalidField {
            field: "draws",
            value: draws_hex.to_string(),
        })?;
        let word_pos =
            u128::from_str_radix(pos_hex, 16).map_err(|_| RngStateError::InvalidField {
                field: "position",
                value: pos_hex.to_string(),
            })?;

        let mut restored = Self::new(seed);
        restored.rng.set_word_pos(word_pos);
        restored.draws = draws;
        Ok(restored)
    }

    /// Compact, versionless state string: `<draws>.<word position>` in hex.
    #[must_use]
    pub fn serialize(&self) -> String {
        format!(
            "{:x}{STATE_SEPARATOR}{:x}",
            self.draws,
            self.rng.get_word_pos()
        )
    }

    /// Capture the seed and position for persistence.
    #[must_use]
    pub fn snapshot(&self) -> RandomState {
        RandomState {
            seed: self.seed.clone(),
            state: self.serialize(),
        }
    }

    /// Resume a stream captured with [`MatchRng::snapshot`].
    ///
    /// # Errors
    ///
    /// Returns `RngStateError` when the stored state string is malformed.
    pub fn restore(snapshot: &RandomState) -> Result<Self, RngStateError> {
        Self::deserialize(&snapshot.seed, &snapshot.state)
    }

    #[must_use]
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }

    /// Raw 32-bit draw.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u32 {
        self.next_u32()
    }

    /// Uniform float in `[0, 1)` built from the top 53 bits of one 64-bit draw.
    pub fn float(&mut self) -> f64 {
        let bits = self.next_u64() >> 11;
        #[allow(clippy::cast_precision_loss)]
        let mantissa = bits as f64;
        mantissa * FLOAT_SCALE
    }

    /// Uniform integer in `[min, max]`; reversed bounds are swapped.
    pub fn int(&mut self, min: i32, max: i32) -> i32 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.gen_range(lo..=hi)
    }

    /// Bernoulli trial. Always consumes exactly one draw, even for `p <= 0` or `p >= 1`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.float() < p
    }
}

impl PartialEq for MatchRng {
    fn eq(&self, other: &Self) -> bool {
        self.seed == other.seed
            && self.draws == other.draws
            && self.rng.get_word_pos() == other.rng.get_word_pos()
    }
}

impl RngCore for MatchRng {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

fn derive_key(seed: &str) -> [u8; 32] {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(SEED_DOMAIN).expect("hmac accepts keys of any length");
    mac.update(seed.as_bytes());
    let digest = mac.finalize().into_bytes();
    let mut key = [0_u8; 32];
    key.copy_from_slice(&digest);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(rng: &mut MatchRng, count: usize) -> Vec<u32> {
        (0..count).map(|_| rng.next()).collect()
    }

    #[test]
    fn identical_seeds_produce_identical_streams() {
        let mut a = MatchRng::new("state-finals-2024");
        let mut b = MatchRng::new("state-finals-2024");
        assert_eq!(sample(&mut a, 64), sample(&mut b, 64));
        assert_eq!(a, b);
    }

    #[test]
    fn seed_whitespace_is_ignored() {
        let mut a = MatchRng::new("  open-seed ");
        let mut b = MatchRng::new("open-seed");
        assert_eq!(a.seed(), "open-seed");
        assert_eq!(sample(&mut a, 8), sample(&mut b, 8));
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = MatchRng::new("alpha");
        let mut b = MatchRng::new("beta");
        assert_ne!(sample(&mut a, 16), sample(&mut b, 16));
    }

    #[test]
    fn serialize_resumes_mid_block() {
        let mut rng = MatchRng::new("resume");
        // Odd number of 32-bit draws leaves the stream between 64-bit words.
        let _ = sample(&mut rng, 7);
        let _ = rng.float();
        let state = rng.serialize();

        let mut resumed = MatchRng::deserialize("resume", &state).unwrap();
        assert_eq!(resumed, rng);
        assert_eq!(sample(&mut resumed, 32), sample(&mut rng, 32));
        assert_eq!(resumed.draws(), rng.draws());
    }

    #[test]
    fn snapshot_restores_through_serde() {
        let mut rng = MatchRng::new("save-slot");
        for _ in 0..13 {
            let _ = rng.int(1, 6);
        }
        let json = serde_json::to_string(&rng.snapshot()).unwrap();
        let snapshot: RandomState = serde_json::from_str(&json).unwrap();
        let mut restored = MatchRng::restore(&snapshot).unwrap();
        assert!((restored.float() - rng.float()).abs() < f64::EPSILON);
    }

    #[test]
    fn float_stays_in_unit_interval() {
        let mut rng = MatchRng::new("unit");
        for _ in 0..10_000 {
            let value = rng.float();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn int_is_inclusive_and_accepts_reversed_bounds() {
        let mut rng = MatchRng::new("dice");
        let mut seen = [false; 6];
        for _ in 0..1_000 {
            let roll = rng.int(6, 1);
            assert!((1..=6).contains(&roll));
            seen[usize::try_from(roll - 1).unwrap()] = true;
        }
        assert!(seen.iter().all(|hit| *hit));
        assert_eq!(rng.int(4, 4), 4);
    }

    #[test]
    fn chance_extremes_still_consume_draws() {
        let mut rng = MatchRng::new("coin");
        assert!(!rng.chance(0.0));
        assert!(rng.chance(1.0));
        assert!(!rng.chance(f64::NAN));
        assert_eq!(rng.draws(), 3);
    }

    #[test]
    fn malformed_state_is_rejected() {
        assert_eq!(MatchRng::deserialize("s", ""), Err(RngStateError::Empty));
        assert!(matches!(
            MatchRng::deserialize("s", "abc"),
            Err(RngStateError::MissingSeparator { .. })
        ));
        assert!(matches!(
            MatchRng::deserialize("s", "zz.10"),
            Err(RngStateError::InvalidField { field: "draws", .. })
        ));
        assert!(matches!(
            MatchRng::deserialize("s", "1.xy"),
            Err(RngStateError::InvalidField { field: "position", .. })
        ));
    }
}
