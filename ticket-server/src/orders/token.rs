//! Redemption Token Generator
//!
//! Tokens are short, human-typeable strings: a fixed prefix, the
//! low-order digits of the current timestamp, and a few bytes of
//! cryptographically strong randomness as uppercase hex.
//!
//! The generator alone is not the uniqueness guarantee; the token
//! ledger (`order_token` table) is. Callers must treat a duplicate
//! reservation as retriable.

use ring::rand::{SecureRandom, SystemRandom};

use super::OrderError;
use crate::utils::time::now_millis;

/// Fixed token prefix
pub const TOKEN_PREFIX: &str = "TK";

/// Random component width in bytes (rendered as 2x hex chars)
const RANDOM_BYTES: usize = 4;

/// Timestamp component width in digits
const TIMESTAMP_DIGITS: usize = 6;

#[derive(Clone)]
pub struct TokenGenerator {
    rng: SystemRandom,
}

impl TokenGenerator {
    pub fn new() -> Self {
        Self {
            rng: SystemRandom::new(),
        }
    }

    /// Produce one token, e.g. `TK-483920-4F9A1C6B`. Never blocks.
    pub fn generate(&self) -> Result<String, OrderError> {
        let millis = now_millis().to_string();
        let ts = &millis[millis.len().saturating_sub(TIMESTAMP_DIGITS)..];

        let mut bytes = [0u8; RANDOM_BYTES];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| OrderError::Store("secure random generator unavailable".to_string()))?;

        Ok(format!(
            "{}-{}-{}",
            TOKEN_PREFIX,
            ts,
            hex::encode_upper(bytes)
        ))
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}
