/// PostgreSQL Driver
///
/// Implements `Driver` on top of the blocking `postgres` client.
///
/// Opening only parses the parameter string; the network session is set up
/// the first time a statement runs. Statements go through the simple query
/// protocol, so they reach the server verbatim (trailing semicolons and DDL
/// included) and every cell comes back as text.

use crate::config::ParameterString;
use crate::core::db::driver::{Driver, DriverConnection};
use crate::core::db::query::{QueryResult, Row, Value};
use crate::core::error::DriverError;
use postgres::{Client, Config, NoTls, SimpleQueryMessage};
use std::fmt;
use tracing::debug;

/// PostgreSQL driver
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDriver;

impl PostgresDriver {
    pub fn new() -> Self {
        PostgresDriver
    }
}

impl Driver for PostgresDriver {
    type Connection = PostgresConnection;

    fn name(&self) -> &'static str {
        "postgres"
    }

    fn open(&self, params: &ParameterString) -> Result<PostgresConnection, DriverError> {
        let config: Config = params.as_str().parse()?;
        Ok(PostgresConnection {
            config,
            client: None,
        })
    }
}

/// A lazily connected PostgreSQL session
pub struct PostgresConnection {
    config: Config,
    client: Option<Client>,
}

impl fmt::Debug for PostgresConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresConnection")
            .field("hosts", &self.config.get_hosts())
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl PostgresConnection {
    /// Whether the network session has been established yet
    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    fn client(&mut self) -> Result<&mut Client, DriverError> {
        if self.client.is_none() {
            debug!(hosts = ?self.config.get_hosts(), "establishing postgres session");
            let client = self.config.connect(NoTls)?;
            self.client = Some(client);
        }
        self.client
            .as_mut()
            .ok_or_else(|| DriverError::msg("postgres session unavailable"))
    }
}

impl DriverConnection for PostgresConnection {
    fn query(&mut self, sql: &str) -> Result<QueryResult, DriverError> {
        let messages = self.client()?.simple_query(sql)?;

        let mut columns = Vec::new();
        let mut rows = Vec::new();
        for message in messages {
            match message {
                // Sent even when the statement returns no rows
                SimpleQueryMessage::RowDescription(description) if columns.is_empty() => {
                    columns = description.iter().map(|c| c.name().to_string()).collect();
                }
                SimpleQueryMessage::Row(row) => {
                    let values = (0..row.len())
                        .map(|i| match row.get(i) {
                            Some(text) => Value::Text(text.to_string()),
                            None => Value::Null,
                        })
                        .collect();
                    rows.push(Row::new(values));
                }
                _ => {}
            }
        }
        Ok(QueryResult::new(columns, rows))
    }

    fn execute(&mut self, sql: &str) -> Result<u64, DriverError> {
        let messages = self.client()?.simple_query(sql)?;
        Ok(messages
            .iter()
            .map(|m| match m {
                SimpleQueryMessage::CommandComplete(n) => *n,
                _ => 0,
            })
            .sum())
    }

    fn close(self) -> Result<(), DriverError> {
        match self.client {
            Some(client) => client.close().map_err(DriverError::from),
            None => Ok(()),
        }
    }
}
