//! Error types for lot ledger operations.

use common::StorageError;

/// Error type for lot ledger operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The lot does not exist, or its stored value is empty.
    NotFound(String),

    /// The underlying store failed to serve a read or commit a write.
    StoreUnavailable(String),

    /// A stored value is present but is not a lot record.
    Decode(String),

    /// A storage key or record could not be encoded or decoded.
    Encoding(String),

    /// Invalid input or parameter errors.
    InvalidInput(String),
}

impl Error {
    /// The error raised for an operation on a lot that is not in the store.
    pub(crate) fn lot_not_found(lot_id: &str) -> Self {
        Error::NotFound(format!("The asset {} does not exist", lot_id))
    }
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
            Error::StoreUnavailable(msg) => write!(f, "Store unavailable: {}", msg),
            Error::Decode(msg) => write!(f, "Decode error: {}", msg),
            Error::Encoding(msg) => write!(f, "Encoding error: {}", msg),
            Error::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Storage(msg) | StorageError::Internal(msg) => {
                Error::StoreUnavailable(msg)
            }
        }
    }
}

/// Result type alias for lot ledger operations.
pub type Result<T> = std::result::Result<T, Error>;
