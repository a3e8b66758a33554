//! Integration tests for the PostgreSQL driver
//!
//! These tests require a running Postgres instance configured as in
//! `tests/testdata/pg_config.toml`, with a table `test (title text)`
//! holding the rows 'root' and 'leaf'.
//!
//! Run with: cargo test --test postgres_integration -- --ignored

use pqlink::config::{load_config, ConnectionConfig, ParameterString};
use pqlink::core::db::{ConnectionManager, PostgresDriver};
use pqlink::core::ErrorKind;

fn params() -> ParameterString {
    load_config(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/testdata/pg_config.toml"))
        .expect("load config")
}

#[test]
fn test_pg_config_parameter_string() {
    let params = params();
    assert_eq!(
        params.as_str(),
        "host=localhost port=5432 user=starry password=belighT928s dbname=shangjiang_hospital sslmode=disable "
    );
}

#[test]
fn test_unreachable_server_fails_verification() {
    let mut config = ConnectionConfig::load(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/testdata/pg_config.toml"
    ))
    .expect("load config");
    config.host = "127.0.0.1".to_string();
    config.port = "1".to_string();

    let manager = ConnectionManager::new(PostgresDriver::new());
    let err = manager.open(&config.to_parameter_string()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConnectionVerify);
}

#[test]
fn test_invalid_sslmode_rejected_at_open() {
    let mut config = ConnectionConfig::load(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/testdata/pg_config.toml"
    ))
    .expect("load config");
    config.sslmode = "sometimes".to_string();

    let manager = ConnectionManager::new(PostgresDriver::new());
    let err = manager.open(&config.to_parameter_string()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DriverOpen);
}

#[test]
#[ignore] // Requires Postgres running
fn test_connect_and_close() {
    let manager = ConnectionManager::new(PostgresDriver::new());
    let conn = manager.open(&params()).expect("open");
    manager.close(conn).expect("close");
}

#[test]
#[ignore] // Requires Postgres running
fn test_select() {
    let manager = ConnectionManager::new(PostgresDriver::new());
    let mut conn = manager.open(&params()).expect("open");

    let mut rows = conn.query("select title from test").expect("query");
    assert_eq!(rows.columns(), &["title".to_string()]);
    let title1: String = rows.next().expect("first row").get(0).expect("scan");
    let title2: String = rows.next().expect("second row").get(0).expect("scan");
    assert_eq!(title1, "root");
    assert_eq!(title2, "leaf");

    let empty = conn.query("select title from test where false").expect("empty query");
    assert_eq!(empty.columns(), &["title".to_string()]);
    assert_eq!(empty.count(), 0);

    let err = conn.query("select title from test1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Query);
    assert!(!err.to_string().is_empty());

    conn.close().expect("close");
}

#[test]
#[ignore] // Requires Postgres running
fn test_exec() {
    let manager = ConnectionManager::new(PostgresDriver::new());
    let mut conn = manager.open(&params()).expect("open");

    conn.exec("insert into test (title) values ('test')").expect("insert");
    conn.exec("update test set title = 'test1' where title = 'test'")
        .expect("update");
    conn.exec("delete from test where title = 'test1';").expect("delete");

    let statement = "insert into test (title1) values ('test')";
    let err = conn.exec(statement).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Exec);
    assert!(err.to_string().contains(statement));

    conn.close().expect("close");
}
