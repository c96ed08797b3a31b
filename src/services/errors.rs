use thiserror::Error;

use crate::domain::attendance::AttendanceRejection;
use crate::domain::movement::LedgerRejection;
use crate::domain::types::TypeConstraintError;
use crate::repository::RepositoryError;

/// Generic error type used by service layer functions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// The attendance token is malformed, expired or unknown.
    #[error("invalid or expired attendance token")]
    InvalidToken,
    #[error("entry already recorded today")]
    AlreadyEntered,
    #[error("exit already recorded today")]
    AlreadyExited,
    #[error("no entry recorded today")]
    NoEntryYet,
    #[error("unknown product: {0}")]
    UnknownProduct(String),
    #[error("insufficient stock: available {available}, requested {requested}")]
    InsufficientStock { available: i32, requested: i32 },
    /// Requested resource was not found.
    #[error("not found")]
    NotFound,
    /// Submitted form failed validation.
    #[error("{0}")]
    Form(String),
    #[error("invalid value: {0}")]
    TypeConstraint(String),
    /// A store could not be reached.
    #[error("store unavailable")]
    StoreUnavailable,
    /// An unexpected internal error occurred.
    #[error("internal error")]
    Internal,
}

impl ServiceError {
    /// Kebab-case name of the error kind as reported to callers.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidToken => "invalid-token",
            Self::AlreadyEntered => "already-entered",
            Self::AlreadyExited => "already-exited",
            Self::NoEntryYet => "no-entry-yet",
            Self::UnknownProduct(_) => "unknown-product",
            Self::InsufficientStock { .. } => "insufficient-stock",
            Self::NotFound => "not-found",
            Self::Form(_) => "invalid-form",
            Self::TypeConstraint(_) => "invalid-value",
            Self::StoreUnavailable => "store-unreachable",
            Self::Internal => "internal",
        }
    }
}

impl From<AttendanceRejection> for ServiceError {
    fn from(value: AttendanceRejection) -> Self {
        match value {
            AttendanceRejection::AlreadyEntered => Self::AlreadyEntered,
            AttendanceRejection::AlreadyExited => Self::AlreadyExited,
            AttendanceRejection::NoEntryYet => Self::NoEntryYet,
        }
    }
}

impl From<LedgerRejection> for ServiceError {
    fn from(value: LedgerRejection) -> Self {
        match value {
            LedgerRejection::UnknownProduct(code) => Self::UnknownProduct(code),
            LedgerRejection::InsufficientStock {
                available,
                requested,
            } => Self::InsufficientStock {
                available,
                requested,
            },
            overflow @ LedgerRejection::BalanceOverflow { .. } => Self::Form(overflow.to_string()),
        }
    }
}

impl From<TypeConstraintError> for ServiceError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Attendance(rejection) => rejection.into(),
            RepositoryError::Ledger(rejection) => rejection.into(),
            RepositoryError::ValidationError(message) => Self::TypeConstraint(message),
            RepositoryError::StoreUnavailable(message) => {
                log::error!("Store unavailable: {message}");
                Self::StoreUnavailable
            }
            RepositoryError::ConstraintViolation(message) | RepositoryError::Unexpected(message) => {
                log::error!("Repository failure: {message}");
                Self::Internal
            }
        }
    }
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;
