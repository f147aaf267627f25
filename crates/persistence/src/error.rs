// Copyright (C) 2026 Rollbook Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Initialization error.
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
    /// A UNIQUE constraint rejected the write.
    ///
    /// Raised when a concurrent or duplicate insert collides on the student
    /// number, course code, login name, or session token. Callers surface
    /// this as a validation error, never as a fault.
    UniqueViolation(String),
    /// A FOREIGN KEY constraint rejected the write.
    ForeignKeyViolation(String),
    /// The requested resource was not found.
    NotFound(String),
    /// A general error occurred.
    Other(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::UniqueViolation(msg) => write!(f, "Unique constraint violation: {msg}"),
            Self::ForeignKeyViolation(msg) => {
                write!(f, "Foreign key constraint violation: {msg}")
            }
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::NotFound("Record not found".to_string()),
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                info,
            ) => Self::UniqueViolation(info.message().to_string()),
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::ForeignKeyViolation,
                info,
            ) => Self::ForeignKeyViolation(info.message().to_string()),
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}
