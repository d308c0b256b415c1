//! Common error types for the data-access contract.

use thiserror::Error;

/// Structured error returned by every [`DataAccess`](crate::data_access::DataAccess) call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataAccessError {
    /// Record does not exist in the collection
    #[error("Record not found: {collection}/{id}")]
    NotFound {
        /// Collection name
        collection: String,
        /// Record identifier
        id: String,
    },

    /// Backend rejected the write (constraint violation, duplicate key)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Caller is not allowed to touch this collection
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Record fields could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Remote backend failed or was unreachable
    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for DataAccessError {
    fn from(err: serde_json::Error) -> Self {
        DataAccessError::Serialization(err.to_string())
    }
}
