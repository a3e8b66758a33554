/// SQLite Driver
///
/// Implements `Driver` with `rusqlite`. The `dbname` parameter is the
/// database path (`:memory:` for an in-memory database); the other
/// connection parameters are accepted and ignored.
///
/// Statement text may hold several statements; all of them run, in order.

use crate::config::ParameterString;
use crate::core::db::driver::{Driver, DriverConnection};
use crate::core::db::query::{QueryResult, Row, Value};
use crate::core::error::DriverError;
use rusqlite::types::ValueRef;
use rusqlite::{Batch, Connection, OpenFlags};

/// SQLite driver
#[derive(Debug, Clone, Copy)]
pub struct SqliteDriver {
    create_if_missing: bool,
}

impl SqliteDriver {
    /// Driver that creates the database file when it does not exist
    pub fn new() -> Self {
        SqliteDriver {
            create_if_missing: true,
        }
    }

    /// Driver that fails to open a database file that does not exist
    pub fn existing_only() -> Self {
        SqliteDriver {
            create_if_missing: false,
        }
    }
}

impl Default for SqliteDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for SqliteDriver {
    type Connection = SqliteConnection;

    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn open(&self, params: &ParameterString) -> Result<SqliteConnection, DriverError> {
        let path = params
            .get("dbname")
            .filter(|p| !p.is_empty())
            .ok_or_else(|| DriverError::msg("missing dbname in connection parameters"))?;

        let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if self.create_if_missing {
            flags |= OpenFlags::SQLITE_OPEN_CREATE;
        }
        let conn = Connection::open_with_flags(path, flags)?;
        Ok(SqliteConnection { conn })
    }
}

/// An open SQLite session
#[derive(Debug)]
pub struct SqliteConnection {
    conn: Connection,
}

fn to_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    }
}

impl SqliteConnection {
    /// Rows changed by every statement since the connection opened
    fn total_changes(&self) -> Result<u64, DriverError> {
        let n: i64 = self.conn.query_row("SELECT total_changes()", [], |r| r.get(0))?;
        Ok(n as u64)
    }
}

impl DriverConnection for SqliteConnection {
    /// Rows of every statement are concatenated; column names come from
    /// the first statement that has any.
    fn query(&mut self, sql: &str) -> Result<QueryResult, DriverError> {
        let mut columns = Vec::new();
        let mut result = Vec::new();
        let mut batch = Batch::new(&self.conn, sql);
        while let Some(mut stmt) = batch.next()? {
            let column_count = stmt.column_count();
            if columns.is_empty() && column_count > 0 {
                columns = stmt.column_names().iter().map(|c| c.to_string()).collect();
            }
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let mut values = Vec::with_capacity(column_count);
                for i in 0..column_count {
                    values.push(to_value(row.get_ref(i)?));
                }
                result.push(Row::new(values));
            }
        }
        Ok(QueryResult::new(columns, result))
    }

    // `SELECT 0` never reads the file; the schema lookup does.
    fn probe(&mut self) -> Result<(), DriverError> {
        self.conn
            .query_row("SELECT count(*) FROM sqlite_master", [], |r| r.get::<_, i64>(0))?;
        Ok(())
    }

    fn execute(&mut self, sql: &str) -> Result<u64, DriverError> {
        let before = self.total_changes()?;
        let mut batch = Batch::new(&self.conn, sql);
        while let Some(mut stmt) = batch.next()? {
            // Drain RETURNING rows so the statement runs to completion
            let mut rows = stmt.query([])?;
            while rows.next()?.is_some() {}
        }
        Ok(self.total_changes()?.saturating_sub(before))
    }

    fn close(self) -> Result<(), DriverError> {
        self.conn.close().map_err(|(_, e)| DriverError::from(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory() -> SqliteConnection {
        let params = ParameterString::from(
            "host=localhost port=0 user=u password=p dbname=:memory: sslmode=disable ",
        );
        SqliteDriver::new().open(&params).unwrap()
    }

    #[test]
    fn test_query_and_execute() {
        let mut conn = memory();
        conn.execute("CREATE TABLE test (id INTEGER PRIMARY KEY, title TEXT)").unwrap();
        assert_eq!(conn.execute("INSERT INTO test (title) VALUES ('root');").unwrap(), 1);

        let mut result = conn.query("SELECT id, title FROM test").unwrap();
        assert_eq!(result.columns(), &["id".to_string(), "title".to_string()]);
        let row = result.next().unwrap();
        assert_eq!(row.values(), &[Value::Integer(1), Value::Text("root".to_string())]);
        assert!(result.next().is_none());

        conn.close().unwrap();
    }

    #[test]
    fn test_query_runs_every_statement() {
        let mut conn = memory();
        conn.execute("CREATE TABLE test (title TEXT); INSERT INTO test VALUES ('root')").unwrap();

        let result = conn.query("SELECT title FROM test; DELETE FROM test").unwrap();
        assert_eq!(result.columns(), &["title".to_string()]);
        assert_eq!(result.count(), 1);

        let mut count = conn.query("SELECT count(*) FROM test").unwrap();
        assert_eq!(count.next().unwrap().values(), &[Value::Integer(0)]);
    }

    #[test]
    fn test_execute_runs_every_statement() {
        let mut conn = memory();
        assert_eq!(conn.execute("CREATE TABLE u (a INT); CREATE TABLE v (a INT);").unwrap(), 0);
        assert!(conn.query("SELECT * FROM v").is_ok());

        let changed = conn
            .execute("INSERT INTO u VALUES (1); INSERT INTO v VALUES (1), (2)")
            .unwrap();
        assert_eq!(changed, 3);
    }

    #[test]
    fn test_execute_with_returning() {
        let mut conn = memory();
        conn.execute("CREATE TABLE t (a INTEGER)").unwrap();
        assert_eq!(conn.execute("INSERT INTO t VALUES (1) RETURNING a").unwrap(), 1);
    }

    #[test]
    fn test_ddl_after_insert_reports_no_changes() {
        let mut conn = memory();
        conn.execute("CREATE TABLE t (a INTEGER)").unwrap();
        assert_eq!(conn.execute("INSERT INTO t VALUES (1)").unwrap(), 1);
        assert_eq!(conn.execute("CREATE INDEX t_a ON t (a)").unwrap(), 0);
    }

    #[test]
    fn test_probe_reads_the_file() {
        let mut garbage = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut garbage, &[b'x'; 512]).unwrap();
        let params = ParameterString::from(format!("dbname={} ", garbage.path().display()));

        let mut conn = SqliteDriver::new().open(&params).unwrap();
        assert!(conn.query("SELECT 0").is_ok());
        assert!(conn.probe().is_err());
    }

    #[test]
    fn test_missing_dbname() {
        let params = ParameterString::from("host=localhost ");
        let err = SqliteDriver::new().open(&params).unwrap_err();
        assert!(err.to_string().contains("dbname"));
    }

    #[test]
    fn test_existing_only_rejects_missing_file() {
        let params = ParameterString::from("dbname=/nonexistent/pqlink/missing.db ");
        assert!(SqliteDriver::existing_only().open(&params).is_err());
    }
}
