use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum DebtError {
    #[error("filterMode must be 'all' or 'any'")]
    InvalidFilterMode,

    #[error("accountIds must be a non-empty array")]
    EmptyAccountIds,

    #[error("Malformed {table} row: {reason}")]
    MalformedRow { table: &'static str, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DebtError {
    /// True for errors caused by the request itself, raised before any store call.
    pub fn is_client_error(&self) -> bool {
        matches!(self, DebtError::InvalidFilterMode | DebtError::EmptyAccountIds)
    }
}
