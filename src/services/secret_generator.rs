//! Bearer token generation.
//!
//! Secrets are `pk_` followed by uppercase alphanumerics sampled from the
//! thread-local CSPRNG (`rand::rng()`, ChaCha seeded from the OS).

use rand::Rng;
use sha2::{Digest, Sha256};

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const SECRET_PREFIX: &str = "pk_";
pub const DEFAULT_SECRET_LENGTH: usize = 32;
const MIN_SECRET_LENGTH: usize = DEFAULT_SECRET_LENGTH;

/// Generator for new API key secrets.
#[derive(Debug, Clone)]
pub struct SecretGenerator {
    prefix: String,
    length: usize,
}

impl Default for SecretGenerator {
    fn default() -> Self {
        Self {
            prefix: SECRET_PREFIX.to_string(),
            length: DEFAULT_SECRET_LENGTH,
        }
    }
}

impl SecretGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of random characters after the prefix (at least 32).
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length.max(MIN_SECRET_LENGTH);
        self
    }

    /// Generate a new secret.
    pub fn generate(&self) -> String {
        let mut rng = rand::rng();

        let random_part: String = (0..self.length)
            .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
            .collect();

        format!("{}{}", self.prefix, random_part)
    }
}

/// Short SHA-256 fingerprint of a secret, safe to put in logs.
pub fn fingerprint(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());

    let digest = hex::encode(hasher.finalize());
    digest[..12].to_string()
}

/// Compare two secrets without short-circuiting on the first mismatch.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();

    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
