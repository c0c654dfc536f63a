// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token issuing and validation.
//!
//! Tokens are stateless HS256 JWTs binding a request to a user id. The
//! signing key is fixed at startup; rotating it invalidates every token
//! already handed out.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Why a bearer token was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Token is missing")]
    TokenMissing,

    #[error("Token is malformed")]
    TokenMalformed,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token is invalid")]
    TokenInvalid,
}

impl AuthError {
    /// Stable machine-readable code used in error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::TokenMissing => "token_missing",
            AuthError::TokenMalformed => "token_malformed",
            AuthError::TokenExpired => "token_expired",
            AuthError::TokenInvalid => "token_invalid",
        }
    }
}

/// Issues and validates session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(signing_key: &[u8], ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(signing_key),
            decoding_key: DecodingKey::from_secret(signing_key),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Create a token for `user_id` expiring one TTL from now.
    pub fn issue(&self, user_id: &str) -> anyhow::Result<String> {
        self.issue_at(user_id, Utc::now())
    }

    /// Create a token as if issued at `now`.
    pub fn issue_at(&self, user_id: &str, now: DateTime<Utc>) -> anyhow::Result<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Validate a token and return the user id it was issued for.
    pub fn validate(&self, token: &str) -> Result<String, AuthError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate a token against the given clock reading.
    ///
    /// The signature is verified before expiry, so a tampered token that
    /// also happens to be stale reports `TokenInvalid`.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::TokenMissing);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against the injected clock.
        validation.validate_exp = false;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::InvalidToken
                    | ErrorKind::Base64(_)
                    | ErrorKind::Json(_)
                    | ErrorKind::Utf8(_)
                    | ErrorKind::MissingRequiredClaim(_) => AuthError::TokenMalformed,
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::TokenInvalid,
                }
            })?;

        let claims = token_data.claims;
        if now.timestamp() >= claims.exp {
            return Err(AuthError::TokenExpired);
        }
        if claims.sub.is_empty() {
            return Err(AuthError::TokenInvalid);
        }

        Ok(claims.sub)
    }
}
