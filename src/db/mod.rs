//! Database layer (SQLite via sqlx).

mod rows;
pub mod sqlite;

pub use sqlite::{Database, PlanDeletion};

use crate::error::AppError;

/// Result of an owner-scoped lookup. Rows owned by another user are
/// `NotFound` too, so callers cannot tell the two apart.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }

    /// Turn `NotFound` into a 404 carrying `message`.
    pub fn or_not_found(self, message: &str) -> Result<T, AppError> {
        self.into_option()
            .ok_or_else(|| AppError::NotFound(message.to_string()))
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Lookup::Found(value),
            None => Lookup::NotFound,
        }
    }
}
