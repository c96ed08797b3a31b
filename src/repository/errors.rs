use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use crate::domain::attendance::AttendanceRejection;
use crate::domain::movement::LedgerRejection;
use crate::domain::types::TypeConstraintError;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("validation error: {0}")]
    ValidationError(String),
    /// The store could not be opened or stayed locked past the busy timeout.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error(transparent)]
    Attendance(#[from] AttendanceRejection),
    #[error(transparent)]
    Ledger(#[from] LedgerRejection),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

/// Convenient alias for results returned from repositories.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<DieselError> for RepositoryError {
    fn from(value: DieselError) -> Self {
        match value {
            DieselError::NotFound => Self::NotFound,
            DieselError::DatabaseError(kind, info) => {
                let message = info.message().to_string();
                match kind {
                    DatabaseErrorKind::UniqueViolation
                    | DatabaseErrorKind::ForeignKeyViolation
                    | DatabaseErrorKind::NotNullViolation
                    | DatabaseErrorKind::CheckViolation => Self::ConstraintViolation(message),
                    DatabaseErrorKind::ClosedConnection => Self::StoreUnavailable(message),
                    _ if message.contains("locked") || message.contains("unable to open") => {
                        Self::StoreUnavailable(message)
                    }
                    _ => Self::Unexpected(message),
                }
            }
            other => Self::Unexpected(other.to_string()),
        }
    }
}

impl From<diesel::r2d2::PoolError> for RepositoryError {
    fn from(value: diesel::r2d2::PoolError) -> Self {
        Self::StoreUnavailable(value.to_string())
    }
}

impl From<TypeConstraintError> for RepositoryError {
    fn from(value: TypeConstraintError) -> Self {
        Self::ValidationError(value.to_string())
    }
}
