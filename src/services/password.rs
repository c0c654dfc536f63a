// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! One-way password hashing.
//!
//! New hashes are salted PBKDF2-HMAC-SHA256 encoded as
//! `pbkdf2-sha256$<iterations>$<salt hex>$<hash hex>`. Accounts imported
//! from the previous backend carry a bare hex SHA-256 digest; those still
//! verify so users are not locked out.

use ring::digest::SHA256_OUTPUT_LEN;
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};
use std::num::NonZeroU32;
use subtle::ConstantTimeEq;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
static ALGORITHM: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Iteration count must be non-zero")]
    ZeroIterations,

    #[error("System random source failed")]
    Rng,
}

/// Hashes and verifies passwords.
#[derive(Clone)]
pub struct PasswordHasher {
    iterations: NonZeroU32,
    rng: SystemRandom,
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Result<Self, PasswordError> {
        Ok(Self {
            iterations: NonZeroU32::new(iterations).ok_or(PasswordError::ZeroIterations)?,
            rng: SystemRandom::new(),
        })
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let mut salt = [0u8; SALT_LEN];
        self.rng.fill(&mut salt).map_err(|_| PasswordError::Rng)?;

        let mut derived = [0u8; SHA256_OUTPUT_LEN];
        pbkdf2::derive(
            ALGORITHM,
            self.iterations,
            &salt,
            password.as_bytes(),
            &mut derived,
        );

        Ok(format!(
            "{}${}${}${}",
            SCHEME,
            self.iterations,
            hex::encode(salt),
            hex::encode(derived)
        ))
    }

    /// Check `password` against a stored hash. Unparseable hashes never match.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        if let Some(rest) = stored.strip_prefix(SCHEME) {
            return verify_pbkdf2(password, rest);
        }
        verify_legacy_sha256(password, stored)
    }
}

fn verify_pbkdf2(password: &str, encoded: &str) -> bool {
    let parts: Vec<&str> = encoded.split('$').collect();
    // Leading empty segment comes from the separator after the scheme.
    let ["", iterations, salt, hash] = parts.as_slice() else {
        return false;
    };

    let Some(iterations) = iterations.parse().ok().and_then(NonZeroU32::new) else {
        return false;
    };
    let (Ok(salt), Ok(hash)) = (hex::decode(salt), hex::decode(hash)) else {
        return false;
    };

    pbkdf2::verify(ALGORITHM, iterations, &salt, password.as_bytes(), &hash).is_ok()
}

fn verify_legacy_sha256(password: &str, stored: &str) -> bool {
    let Ok(expected) = hex::decode(stored) else {
        return false;
    };
    if expected.len() != SHA256_OUTPUT_LEN {
        return false;
    }

    let actual = Sha256::digest(password.as_bytes());
    actual.as_slice().ct_eq(&expected).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(1_000).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let hash = hasher.hash("correct horse").unwrap();

        assert!(hash.starts_with("pbkdf2-sha256$1000$"));
        assert!(!hash.contains("correct horse"));
        assert!(hasher.verify("correct horse", &hash));
        assert!(!hasher.verify("wrong horse", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = hasher();
        let first = hasher.hash("same-password").unwrap();
        let second = hasher.hash("same-password").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("same-password", &first));
        assert!(hasher.verify("same-password", &second));
    }

    #[test]
    fn test_stored_iteration_count_wins() {
        let stored = PasswordHasher::new(2_000).unwrap().hash("pw").unwrap();

        assert!(hasher().verify("pw", &stored));
    }

    #[test]
    fn test_legacy_sha256_digest_verifies() {
        // sha256("pw")
        let legacy = "30c952fab122c3f9759f02a6d95c3758b246b4fee239957b2d4fee46e26170c4";

        assert!(hasher().verify("pw", legacy));
        assert!(!hasher().verify("Pw", legacy));
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        let hasher = hasher();

        assert!(!hasher.verify("pw", ""));
        assert!(!hasher.verify("pw", "pbkdf2-sha256$0$00$00"));
        assert!(!hasher.verify("pw", "pbkdf2-sha256$1000$zz$zz"));
        assert!(!hasher.verify("pw", "deadbeef"));
    }

    #[test]
    fn test_zero_iterations_rejected() {
        assert!(matches!(
            PasswordHasher::new(0),
            Err(PasswordError::ZeroIterations)
        ));
    }
}
