/// Query Result Module
///
/// Driver-neutral row and cell types. Drivers produce a `QueryResult`;
/// callers walk it once, front to back, and scan cells positionally.

use crate::core::{DbError, Result};
use serde::Serialize;

/// A single cell value as returned by a driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Integer(_) => "INTEGER",
            Value::Real(_) => "REAL",
            Value::Text(_) => "TEXT",
            Value::Blob(_) => "BLOB",
        }
    }
}

/// Conversion from a cell into a caller-side destination type.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> std::result::Result<Self, String>;
}

fn mismatch<T>(value: &Value, target: &str) -> std::result::Result<T, String> {
    Err(format!("cannot convert {} to {}", value.type_name(), target))
}

impl FromValue for Value {
    fn from_value(value: &Value) -> std::result::Result<Self, String> {
        Ok(value.clone())
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> std::result::Result<Self, String> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            Value::Integer(i) => Ok(i.to_string()),
            Value::Real(f) => Ok(f.to_string()),
            Value::Blob(b) => String::from_utf8(b.clone()).map_err(|e| e.to_string()),
            Value::Null => mismatch(value, "String"),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> std::result::Result<Self, String> {
        match value {
            Value::Integer(i) => Ok(*i),
            Value::Text(s) => s.trim().parse().map_err(|e| format!("{}: {:?}", e, s)),
            _ => mismatch(value, "i64"),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> std::result::Result<Self, String> {
        let wide = i64::from_value(value)?;
        i32::try_from(wide).map_err(|e| format!("{}: {}", e, wide))
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> std::result::Result<Self, String> {
        match value {
            Value::Real(f) => Ok(*f),
            Value::Integer(i) => Ok(*i as f64),
            Value::Text(s) => s.trim().parse().map_err(|e| format!("{}: {:?}", e, s)),
            _ => mismatch(value, "f64"),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> std::result::Result<Self, String> {
        match value {
            Value::Integer(i) => Ok(*i != 0),
            // Postgres renders booleans as `t`/`f` in text results
            Value::Text(s) => match s.trim() {
                "t" | "true" | "TRUE" | "1" => Ok(true),
                "f" | "false" | "FALSE" | "0" => Ok(false),
                other => Err(format!("invalid boolean: {:?}", other)),
            },
            _ => mismatch(value, "bool"),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> std::result::Result<Self, String> {
        match value {
            Value::Blob(b) => Ok(b.clone()),
            Value::Text(s) => Ok(s.as_bytes().to_vec()),
            _ => mismatch(value, "Vec<u8>"),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> std::result::Result<Self, String> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// One result row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Row { values }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Scans the cell at `index` into `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pqlink::core::db::{Row, Value};
    ///
    /// let row = Row::new(vec![Value::Text("root".into()), Value::Null]);
    /// let title: String = row.get(0).unwrap();
    /// let parent: Option<i64> = row.get(1).unwrap();
    /// assert_eq!(title, "root");
    /// assert_eq!(parent, None);
    /// ```
    pub fn get<T: FromValue>(&self, index: usize) -> Result<T> {
        let value = self.values.get(index).ok_or_else(|| DbError::Scan {
            index,
            message: format!("row has {} columns", self.values.len()),
        })?;
        T::from_value(value).map_err(|message| DbError::Scan { index, message })
    }
}

/// Forward-only cursor over the rows of a query.
///
/// Iterating consumes rows; once exhausted the cursor stays empty.
#[derive(Debug)]
pub struct QueryResult {
    columns: Vec<String>,
    rows: std::vec::IntoIter<Row>,
}

impl QueryResult {
    /// Creates a new QueryResult from column names and row data
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        QueryResult {
            columns,
            rows: rows.into_iter(),
        }
    }

    /// Column names, empty if the driver did not report any.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows not yet consumed.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl Iterator for QueryResult {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.rows.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;

    fn sample() -> QueryResult {
        QueryResult::new(
            vec!["title".to_string()],
            vec![
                Row::new(vec![Value::Text("root".to_string())]),
                Row::new(vec![Value::Text("leaf".to_string())]),
            ],
        )
    }

    #[test]
    fn test_cursor_is_forward_only() {
        let mut result = sample();
        assert_eq!(result.columns(), &["title".to_string()]);
        assert_eq!(result.remaining(), 2);

        let first: String = result.next().unwrap().get(0).unwrap();
        let second: String = result.next().unwrap().get(0).unwrap();
        assert_eq!(first, "root");
        assert_eq!(second, "leaf");
        assert!(result.next().is_none());
        assert!(result.next().is_none());
    }

    #[test]
    fn test_text_cells_parse_into_numbers() {
        let row = Row::new(vec![
            Value::Text("42".to_string()),
            Value::Text("2.5".to_string()),
            Value::Text("t".to_string()),
        ]);
        assert_eq!(row.get::<i64>(0).unwrap(), 42);
        assert_eq!(row.get::<i32>(0).unwrap(), 42);
        assert_eq!(row.get::<f64>(1).unwrap(), 2.5);
        assert!(row.get::<bool>(2).unwrap());
    }

    #[test]
    fn test_scan_errors() {
        let row = Row::new(vec![Value::Null, Value::Text("abc".to_string())]);

        let err = row.get::<String>(0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Scan);

        let err = row.get::<i64>(1).unwrap_err();
        assert!(matches!(err, DbError::Scan { index: 1, .. }));

        let err = row.get::<String>(5).unwrap_err();
        assert!(err.to_string().contains("row has 2 columns"));

        assert_eq!(row.get::<Option<String>>(0).unwrap(), None);
    }

    #[test]
    fn test_i32_overflow() {
        let row = Row::new(vec![Value::Integer(i64::MAX)]);
        assert!(row.get::<i32>(0).is_err());
    }

    #[test]
    fn test_row_serializes_as_array() {
        let row = Row::new(vec![
            Value::Integer(1),
            Value::Text("root".to_string()),
            Value::Null,
        ]);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"[1,"root",null]"#);
    }
}
