/// Driver Boundary Module
///
/// The traits a database driver implements so the connection manager can
/// open, use and close sessions without knowing which database it talks to.
/// Drivers are values handed to `ConnectionManager::new`; there is no
/// process-wide registry.

use crate::config::ParameterString;
use crate::core::db::query::QueryResult;
use crate::core::error::DriverError;

/// Statement used to confirm a freshly opened session actually works
pub const LIVENESS_PROBE: &str = "SELECT 0";

/// A database driver able to open sessions from a parameter string.
pub trait Driver {
    type Connection: DriverConnection;

    /// Short driver name used in log output
    fn name(&self) -> &'static str;

    /// Requests a session for `params`.
    ///
    /// Implementations may be lazy and only validate the shape of the
    /// parameter string here; callers must not treat success as proof that
    /// the database is reachable.
    fn open(&self, params: &ParameterString) -> Result<Self::Connection, DriverError>;
}

/// A session returned by `Driver::open`.
pub trait DriverConnection {
    /// Runs a read statement and returns its rows.
    fn query(&mut self, sql: &str) -> Result<QueryResult, DriverError>;

    /// Confirms the session can reach the database.
    ///
    /// The default runs `LIVENESS_PROBE`. Drivers for which that statement
    /// never touches storage override this with one that does.
    fn probe(&mut self) -> Result<(), DriverError> {
        self.query(LIVENESS_PROBE).map(|_| ())
    }

    /// Runs a write statement and returns the number of rows affected.
    fn execute(&mut self, sql: &str) -> Result<u64, DriverError>;

    /// Releases the session.
    fn close(self) -> Result<(), DriverError>;
}
