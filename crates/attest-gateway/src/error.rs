use serde::{Deserialize, Serialize};
use thiserror::Error;

use attest_ledger::LedgerError;
use attest_types::TypeError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<TypeError> for GatewayError {
    fn from(e: TypeError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}

/// Error kind surfaced to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidInput,
    DuplicateFingerprint,
    NotFound,
    Unauthorized,
    AlreadyRevoked,
    CommitTimeout,
    Internal,
}

impl ErrorKind {
    /// HTTP-equivalent status for this kind.
    pub fn status_code(self) -> u16 {
        match self {
            Self::InvalidInput => 400,
            Self::Unauthorized => 403,
            Self::NotFound => 404,
            Self::DuplicateFingerprint | Self::AlreadyRevoked => 409,
            Self::CommitTimeout => 503,
            Self::Internal => 500,
        }
    }

    pub fn is_retryable(self) -> bool {
        self == Self::CommitTimeout
    }
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Config(_) | Self::Io(_) => ErrorKind::Internal,
            Self::Ledger(e) => match e {
                LedgerError::InvalidInput(_) => ErrorKind::InvalidInput,
                LedgerError::DuplicateFingerprint(_) => ErrorKind::DuplicateFingerprint,
                LedgerError::NotFound(_) => ErrorKind::NotFound,
                LedgerError::Unauthorized { .. } => ErrorKind::Unauthorized,
                LedgerError::AlreadyRevoked(_) => ErrorKind::AlreadyRevoked,
                LedgerError::CommitTimeout(_) => ErrorKind::CommitTimeout,
                LedgerError::IntegrityViolation { .. }
                | LedgerError::Serialization(_)
                | LedgerError::Storage(_) => ErrorKind::Internal,
            },
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Body describing this error to a caller.
    pub fn to_body(&self) -> ErrorBody {
        let kind = self.kind();
        ErrorBody {
            kind,
            message: self.to_string(),
            retryable: kind.is_retryable(),
        }
    }
}

/// Serialised error returned across the gateway boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
    pub retryable: bool,
}
