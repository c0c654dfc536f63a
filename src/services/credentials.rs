// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account registration and login.

use crate::db::{Database, Lookup};
use crate::error::AppError;
use crate::models::user::normalize_email;
use crate::models::User;
use crate::services::password::PasswordHasher;
use crate::time_utils::now;
use uuid::Uuid;

/// Registers and authenticates users against the store. Key derivation
/// runs on the blocking pool.
#[derive(Clone)]
pub struct CredentialStore {
    db: Database,
    hasher: PasswordHasher,
}

impl CredentialStore {
    pub fn new(db: Database, hasher: PasswordHasher) -> Self {
        Self { db, hasher }
    }

    /// Create an account. Input is expected to be validated already.
    pub async fn register(&self, email: &str, name: &str, password: &str) -> Result<User, AppError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(e.into()))?
            .map_err(|e| AppError::Internal(e.into()))?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            email: normalize_email(email),
            name: name.trim().to_string(),
            password_hash,
            created_at: now(),
        };
        self.db.insert_user(&user).await?;

        tracing::info!(user_id = %user.id, "Registered user");
        Ok(user)
    }

    /// Check an email/password pair. Unknown emails and wrong passwords are
    /// the same `InvalidCredentials`.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AppError> {
        let user = match self.db.get_user_by_email(&normalize_email(email)).await? {
            Lookup::Found(user) => user,
            Lookup::NotFound => {
                tracing::debug!("Login for unknown email");
                return Err(AppError::InvalidCredentials);
            }
        };

        let hasher = self.hasher.clone();
        let password = password.to_string();
        let stored = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored))
            .await
            .map_err(|e| AppError::Internal(e.into()))?;

        if !matches {
            tracing::debug!(user_id = %user.id, "Login with wrong password");
            return Err(AppError::InvalidCredentials);
        }

        Ok(user)
    }

    pub async fn get(&self, user_id: &str) -> Result<User, AppError> {
        self.db.get_user(user_id).await?.or_not_found("User not found")
    }
}
