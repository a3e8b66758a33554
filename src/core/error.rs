/// pqlink Error Module
///
/// This module defines the error types for pqlink. Every failure along the
/// config -> open -> query/exec -> close pipeline is returned to the caller
/// as a `DbError`, whose display text is the human-readable message and
/// whose `kind()` is what callers should branch on.
use thiserror::Error;

/// Error reported by an underlying database driver.
///
/// Drivers differ in their native error types, so the diagnostic is kept
/// boxed and displayed verbatim.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct DriverError(Box<dyn std::error::Error + Send + Sync>);

impl DriverError {
    /// Wraps any driver-native error.
    pub fn new<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        DriverError(err.into())
    }

    /// Builds a driver error from a plain diagnostic message.
    pub fn msg(message: impl Into<String>) -> Self {
        let message: String = message.into();
        DriverError(message.into())
    }
}

impl From<rusqlite::Error> for DriverError {
    fn from(err: rusqlite::Error) -> Self {
        DriverError::new(err)
    }
}

impl From<postgres::Error> for DriverError {
    fn from(err: postgres::Error) -> Self {
        DriverError::new(err)
    }
}

/// Error type for every pqlink operation.
#[derive(Error, Debug)]
pub enum DbError {
    /// The configuration document could not be read or parsed
    #[error("{0}")]
    Load(String),

    /// A required connection parameter is absent (first missing key only)
    #[error("Parameters are missing from the configuration file:{key}")]
    MissingParameter { key: &'static str },

    /// A required connection parameter is present but not a string
    #[error("Parameter in the configuration file is not a string:{key}")]
    InvalidParameter { key: &'static str },

    /// The driver rejected the parameter string
    #[error("An error occurred while connecting to the database\n{0}")]
    DriverOpen(#[source] DriverError),

    /// The liveness probe failed, so the connection is not usable
    #[error("An error occurred while querying the database\n{0}")]
    ConnectionVerify(#[source] DriverError),

    /// A read statement failed
    #[error("{0}")]
    Query(#[source] DriverError),

    /// A write statement failed
    #[error("An error occurred while executing '{statement}'\n{source}")]
    Exec {
        statement: String,
        #[source]
        source: DriverError,
    },

    /// Releasing the connection failed
    #[error("Error while closing database connection\n{0}")]
    Close(#[source] DriverError),

    /// A cell could not be scanned into the requested type
    #[error("Scan error at column {index}: {message}")]
    Scan { index: usize, message: String },
}

/// Discriminant of `DbError`, for branching without matching on payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Load,
    MissingParameter,
    InvalidParameter,
    DriverOpen,
    ConnectionVerify,
    Query,
    Exec,
    Close,
    Scan,
}

impl DbError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::Load(_) => ErrorKind::Load,
            DbError::MissingParameter { .. } => ErrorKind::MissingParameter,
            DbError::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            DbError::DriverOpen(_) => ErrorKind::DriverOpen,
            DbError::ConnectionVerify(_) => ErrorKind::ConnectionVerify,
            DbError::Query(_) => ErrorKind::Query,
            DbError::Exec { .. } => ErrorKind::Exec,
            DbError::Close(_) => ErrorKind::Close,
            DbError::Scan { .. } => ErrorKind::Scan,
        }
    }
}

/// Type alias for Result to use DbError as the error type.
pub type Result<T> = std::result::Result<T, DbError>;
