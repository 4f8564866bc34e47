//! Error types for in-memory operations.

use sift_query::QueryError;
use thiserror::Error;

/// Result type for in-memory operations.
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Errors raised by the in-memory store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    /// A row with the same primary key already exists.
    #[error("duplicate key {key} in {entity}")]
    DuplicateKey {
        /// Entity name.
        entity: &'static str,
        /// Rendered primary key.
        key: String,
    },

    /// No row has the given primary key.
    #[error("no {entity} row with key {key}")]
    MissingRow {
        /// Entity name.
        entity: &'static str,
        /// Rendered primary key.
        key: String,
    },

    /// The row has a null primary key.
    #[error("{entity} row has no primary key")]
    NullKey {
        /// Entity name.
        entity: &'static str,
    },
}

impl MemoryError {
    /// The entity the error concerns.
    pub fn entity(&self) -> &'static str {
        match self {
            Self::DuplicateKey { entity, .. }
            | Self::MissingRow { entity, .. }
            | Self::NullKey { entity } => entity,
        }
    }
}

impl From<MemoryError> for QueryError {
    fn from(err: MemoryError) -> Self {
        let entity = err.entity();
        match err {
            MemoryError::MissingRow { .. } => QueryError::not_found(entity)
                .with_context("commit")
                .with_source(err),
            _ => QueryError::data_source(err.to_string())
                .with_entity(entity)
                .with_source(err),
        }
    }
}
