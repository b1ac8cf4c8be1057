//! Error types for the content store

use super::types::PostId;
use crate::core_accounts::Role;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Post with ID {0} not found.")]
    PostNotFound(PostId),

    #[error("{identifier} ({role}) is not allowed to create posts; only Authors can")]
    Unauthorized { identifier: String, role: Role },

    #[error("Lock poisoned: a thread panicked while holding a content lock")]
    LockPoisoned,

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ContentError {
    fn from(err: serde_json::Error) -> Self {
        ContentError::Serialization(err.to_string())
    }
}
