//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Account row as stored.
#[derive(Debug, Clone)]
pub struct User {
    /// UUID v4
    pub id: String,
    /// Trimmed, lower-cased email address (unique)
    pub email: String,
    /// Display name
    pub name: String,
    /// Encoded password hash; never serialized
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// User fields safe to return from the API.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub name: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            created_at: user.created_at,
        }
    }
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            created_at: user.created_at,
        }
    }
}

/// Canonical form used for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
