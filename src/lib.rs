// Core infrastructure modules
pub mod core;

// Feature-specific modules
pub mod config;
pub mod text;

pub use crate::config::{load_config, ConnectionConfig, ParameterString};
pub use crate::core::db::{Connection, ConnectionManager, PostgresDriver, QueryResult, Row, SqliteDriver, Value};
pub use crate::core::{DbError, ErrorKind, Result};
