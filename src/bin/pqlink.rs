use pqlink::config::{load_config, ParameterString};
use pqlink::core::db::{ConnectionManager, Driver, PostgresDriver, SqliteDriver};
use pqlink::core::Result;
use std::process::ExitCode;
use tracing::info;

const USAGE: &str = "usage: pqlink [--driver postgres|sqlite] <config.toml> [statement]";

/// Statements whose leading keyword means they return rows
const READ_KEYWORDS: [&str; 6] = ["SELECT", "WITH", "VALUES", "SHOW", "EXPLAIN", "TABLE"];

struct Args {
    driver: String,
    config: String,
    statement: Option<String>,
}

fn parse_args(args: &[String]) -> std::result::Result<Args, String> {
    let mut driver = "postgres".to_string();
    let mut positional = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--driver" => {
                driver = iter
                    .next()
                    .ok_or_else(|| "--driver needs a value".to_string())?
                    .clone();
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            _ => positional.push(arg.clone()),
        }
    }
    if driver != "postgres" && driver != "sqlite" {
        return Err(format!("unknown driver: {}\n{}", driver, USAGE));
    }
    let mut positional = positional.into_iter();
    let config = positional.next().ok_or_else(|| USAGE.to_string())?;
    let rest: Vec<String> = positional.collect();
    let statement = if rest.is_empty() { None } else { Some(rest.join(" ")) };
    Ok(Args {
        driver,
        config,
        statement,
    })
}

fn is_read_statement(sql: &str) -> bool {
    let first = sql
        .trim_start_matches(|c: char| c.is_whitespace() || c == '(')
        .split(|c: char| c.is_whitespace() || c == ';' || c == '(')
        .next()
        .unwrap_or("")
        .to_uppercase();
    READ_KEYWORDS.contains(&first.as_str())
}

fn run<D: Driver>(driver: D, params: &ParameterString, statement: Option<&str>) -> Result<()> {
    let manager = ConnectionManager::new(driver);
    let mut conn = manager.open(params)?;

    let outcome = match statement {
        None => {
            println!("connection ok");
            Ok(())
        }
        Some(sql) if is_read_statement(sql) => conn.query(sql).map(|rows| {
            for row in rows {
                // Row serialization cannot fail: cells are plain JSON values.
                println!("{}", serde_json::to_string(&row).unwrap_or_default());
            }
        }),
        Some(sql) => conn.exec(sql).map(|n| println!("{} row(s) affected", n)),
    };

    // Close even when the statement failed; report the first error.
    let closed = manager.close(conn);
    outcome.and(closed)
}

fn main() -> ExitCode {
    // Initialize the logging system using tracing subscriber; stdout carries results
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}", msg);
            return ExitCode::from(2);
        }
    };

    info!(config = %args.config, driver = %args.driver, "Starting pqlink...");

    let result = load_config(&args.config).and_then(|params| {
        let statement = args.statement.as_deref();
        match args.driver.as_str() {
            "sqlite" => run(SqliteDriver::new(), &params, statement),
            _ => run(PostgresDriver::new(), &params, statement),
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
