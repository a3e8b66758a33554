/// Database Module
///
/// The database layer of pqlink, organized into focused submodules.
///
/// ## Architecture
///
/// - **Driver Boundary** (`driver.rs`): Traits a database driver implements
/// - **Connection Management** (`connection.rs`): Verified open, close, and the query/exec facade
/// - **Query Results** (`query.rs`): Driver-neutral rows, cells, and the forward-only cursor
/// - **Drivers** (`postgres.rs`, `sqlite.rs`): PostgreSQL and SQLite implementations
///
/// ## Error Handling
///
/// All operations return the standardized `DbError` type.
pub mod connection;
pub mod driver;
pub mod postgres;
pub mod query;
pub mod sqlite;

pub use connection::*;
pub use driver::*;
pub use postgres::{PostgresConnection, PostgresDriver};
pub use query::*;
pub use sqlite::{SqliteConnection, SqliteDriver};
