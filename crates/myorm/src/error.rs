//! Error types for myorm

use thiserror::Error;

/// Result type alias for myorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for statement building and execution.
///
/// Build-time variants (`UnsupportedAction`, `PlaceholderArgMismatch`,
/// `EmptyInput`, `NoColumns`, `NoColumnsForUpdate`) are raised before any
/// SQL reaches the database. Driver errors are carried verbatim in `Query`.
#[derive(Debug, Error)]
pub enum OrmError {
    /// The builder was asked for an action it cannot produce
    #[error("Unsupported action: {0}")]
    UnsupportedAction(String),

    /// A fragment's `?` count differs from the number of bound arguments
    #[error("{fragment}; args doesn't match with binds `?` (placeholders: {placeholders}, args: {args})")]
    PlaceholderArgMismatch {
        fragment: String,
        placeholders: usize,
        args: usize,
    },

    /// Nothing to insert
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// The first row of a bulk insert has no columns
    #[error("No columns found in the first row for insert into {0}")]
    NoColumns(String),

    /// UPDATE called without any SET pairs
    #[error("No columns set for update of {0}")]
    NoColumnsForUpdate(String),

    /// Configured driver is not supported
    #[error("Unknown database driver: {0}")]
    UnknownDriver(String),

    /// Query execution error, passed through from the driver
    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Configuration loading/parsing error
    #[error("Config error: {0}")]
    Config(String),

    /// Query timeout error
    #[error("Query timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl OrmError {
    /// Create a placeholder/argument mismatch error for a fragment
    pub fn mismatch(fragment: impl Into<String>, placeholders: usize, args: usize) -> Self {
        Self::PlaceholderArgMismatch {
            fragment: fragment.into(),
            placeholders,
            args,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Whether the error was raised while building SQL, i.e. nothing was sent.
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedAction(_)
                | Self::PlaceholderArgMismatch { .. }
                | Self::EmptyInput(_)
                | Self::NoColumns(_)
                | Self::NoColumnsForUpdate(_)
        )
    }

    /// Check if the driver reported a unique constraint violation
    pub fn is_unique_violation(&self) -> bool {
        self.database_error()
            .is_some_and(|e| e.is_unique_violation())
    }

    /// Check if the driver reported a foreign key violation
    pub fn is_foreign_key_violation(&self) -> bool {
        self.database_error()
            .is_some_and(|e| e.is_foreign_key_violation())
    }

    fn database_error(&self) -> Option<&dyn sqlx::error::DatabaseError> {
        match self {
            Self::Query(err) => err.as_database_error(),
            _ => None,
        }
    }
}
