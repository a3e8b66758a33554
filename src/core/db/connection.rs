/// Connection Management Module
///
/// Opens verified sessions through a `Driver`, and wraps them in a
/// `Connection` handle exposing the query/exec facade.
///
/// ## Verification
///
/// A driver's open call may only check the shape of the parameter string.
/// `ConnectionManager::open` therefore runs the driver's liveness probe before handing
/// out a handle; a handle is never returned unless both steps succeed.

use crate::config::ParameterString;
use crate::core::db::driver::{Driver, DriverConnection};
use crate::core::db::query::QueryResult;
use crate::core::{DbError, Result};
use tracing::{debug, info, warn};

/// Opens and closes sessions for a single driver
#[derive(Debug, Clone, Default)]
pub struct ConnectionManager<D> {
    driver: D,
}

impl<D: Driver> ConnectionManager<D> {
    /// Creates a new connection manager around `driver`
    pub fn new(driver: D) -> Self {
        ConnectionManager { driver }
    }

    /// Opens a session and verifies it with `DriverConnection::probe`.
    ///
    /// # Returns
    ///
    /// A verified `Connection`, `DbError::DriverOpen` when the driver rejects
    /// the parameter string, or `DbError::ConnectionVerify` when the probe
    /// fails. In the latter case the half-open session is dropped.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pqlink::config::load_config;
    /// use pqlink::core::db::{ConnectionManager, PostgresDriver};
    ///
    /// let params = load_config("pg_config.toml")?;
    /// let manager = ConnectionManager::new(PostgresDriver::new());
    /// let conn = manager.open(&params)?;
    /// manager.close(conn)?;
    /// # Ok::<(), pqlink::core::DbError>(())
    /// ```
    pub fn open(&self, params: &ParameterString) -> Result<Connection<D::Connection>> {
        debug!(driver = self.driver.name(), params = %params.redacted(), "opening connection");

        let mut inner = self.driver.open(params).map_err(|e| {
            warn!(driver = self.driver.name(), error = %e, "driver rejected connection parameters");
            DbError::DriverOpen(e)
        })?;

        if let Err(e) = inner.probe() {
            warn!(driver = self.driver.name(), error = %e, "liveness probe failed");
            return Err(DbError::ConnectionVerify(e));
        }

        info!(
            driver = self.driver.name(),
            host = params.get("host").unwrap_or(""),
            dbname = params.get("dbname").unwrap_or(""),
            "connection verified"
        );
        Ok(Connection { inner })
    }

    /// Releases a session
    pub fn close(&self, conn: Connection<D::Connection>) -> Result<()> {
        debug!(driver = self.driver.name(), "closing connection");
        conn.close()
    }
}

/// A verified, exclusively owned database session.
///
/// Only `ConnectionManager::open` creates one. Closing consumes the
/// handle, so it cannot be used or closed again afterwards.
#[derive(Debug)]
pub struct Connection<C> {
    inner: C,
}

impl<C: DriverConnection> Connection<C> {
    /// Runs a read statement and returns a cursor over its rows.
    ///
    /// The statement is passed through verbatim; a trailing semicolon is
    /// fine. On failure the error carries only the driver diagnostic.
    pub fn query(&mut self, sql: &str) -> Result<QueryResult> {
        self.inner.query(sql).map_err(|e| {
            debug!(error = %e, "query failed");
            DbError::Query(e)
        })
    }

    /// Runs a write statement (insert/update/delete or DDL).
    ///
    /// # Returns
    ///
    /// The number of rows affected as reported by the driver. On failure the
    /// error names the statement as well as the driver diagnostic.
    pub fn exec(&mut self, sql: &str) -> Result<u64> {
        self.inner.execute(sql).map_err(|e| {
            debug!(error = %e, "statement failed");
            DbError::Exec {
                statement: sql.to_string(),
                source: e,
            }
        })
    }

    /// Releases the session
    pub fn close(self) -> Result<()> {
        self.inner.close().map_err(DbError::Close)
    }
}
