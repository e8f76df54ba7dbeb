//! Error type shared by every ledger service and store.

use shared::BudgetConflict;

/// Failure of a single ledger operation.
///
/// Errors are always scoped to the one entity being mutated; none of them is
/// fatal to the session.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    /// Input rejected before any state change or network call
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The remote store refused to overwrite existing budget entries
    #[error("{message} ({} conflicting entries)", conflicts.len())]
    Conflict {
        message: String,
        conflicts: Vec<BudgetConflict>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    /// Left for the session layer to handle
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Remote store returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    Decode(String),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        LedgerError::NotFound(message.into())
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, LedgerError::Conflict { .. })
    }

    /// HTTP status a REST facade should answer with for this error
    pub fn status_code(&self) -> u16 {
        match self {
            LedgerError::Validation(_) => 422,
            LedgerError::Conflict { .. } => 409,
            LedgerError::NotFound(_) => 404,
            LedgerError::Unauthorized => 401,
            LedgerError::Remote { status, .. } => *status,
            LedgerError::Network(_) => 503,
            LedgerError::Decode(_) => 502,
        }
    }
}
