use crate::core::{DbError, Result};
use std::fmt;
use std::fs;
use std::path::Path;
use toml::Value;

/// Connection parameters, in the order they are serialized.
pub const PARAMETER_KEYS: [&str; 6] = ["host", "port", "user", "password", "dbname", "sslmode"];

/// The six required connection parameters read from a TOML document.
///
/// Values are kept as opaque strings; nothing here checks that `port` is
/// numeric or that `sslmode` is a mode the driver understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: String,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub sslmode: String,
}

impl ConnectionConfig {
    /// Parses a TOML document and extracts the six parameters.
    ///
    /// Keys are looked up in `PARAMETER_KEYS` order and the first absent
    /// key is reported; later keys are not examined.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let doc: Value = toml::from_str(content).map_err(|e| DbError::Load(e.to_string()))?;
        // Fields are evaluated in declaration order, which is PARAMETER_KEYS order.
        Ok(ConnectionConfig {
            host: required(&doc, "host")?,
            port: required(&doc, "port")?,
            user: required(&doc, "user")?,
            password: required(&doc, "password")?,
            dbname: required(&doc, "dbname")?,
            sslmode: required(&doc, "sslmode")?,
        })
    }

    /// Loads configuration from a TOML file at the given path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| DbError::Load(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Lists every required key absent from `content`.
    ///
    /// Diagnostic helper only; loading still stops at the first miss.
    pub fn missing_keys(content: &str) -> Result<Vec<&'static str>> {
        let doc: Value = toml::from_str(content).map_err(|e| DbError::Load(e.to_string()))?;
        Ok(PARAMETER_KEYS
            .into_iter()
            .filter(|key| doc.get(*key).is_none())
            .collect())
    }

    fn values(&self) -> [&str; 6] {
        [
            self.host.as_str(),
            self.port.as_str(),
            self.user.as_str(),
            self.password.as_str(),
            self.dbname.as_str(),
            self.sslmode.as_str(),
        ]
    }

    /// Serializes to `key=value ` tokens in `PARAMETER_KEYS` order.
    pub fn to_parameter_string(&self) -> ParameterString {
        let mut s = String::new();
        for (key, value) in PARAMETER_KEYS.iter().zip(self.values()) {
            s.push_str(key);
            s.push('=');
            s.push_str(value);
            s.push(' ');
        }
        ParameterString(s)
    }
}

fn required(doc: &Value, key: &'static str) -> Result<String> {
    match doc.get(key) {
        None => Err(DbError::MissingParameter { key }),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(DbError::InvalidParameter { key }),
    }
}

/// Driver-ready connection string: `host=.. port=.. user=.. password=.. dbname=.. sslmode=.. `
/// (note the trailing space).
#[derive(Clone, PartialEq, Eq)]
pub struct ParameterString(String);

impl ParameterString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits into `(key, value)` pairs. Whitespace between tokens,
    /// including the trailing space, is skipped; a token without `=`
    /// yields an empty value.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .split_whitespace()
            .map(|token| token.split_once('=').unwrap_or((token, "")))
    }

    /// Value of the first token named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// The string with the password value masked, safe for logs.
    pub fn redacted(&self) -> String {
        self.pairs()
            .map(|(k, v)| if k == "password" { format!("{}=***", k) } else { format!("{}={}", k, v) })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ParameterString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ParameterString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ParameterString").field(&self.redacted()).finish()
    }
}

impl From<String> for ParameterString {
    fn from(s: String) -> Self {
        ParameterString(s)
    }
}

impl From<&str> for ParameterString {
    fn from(s: &str) -> Self {
        ParameterString(s.to_string())
    }
}

/// Reads a TOML file and returns the driver connection string.
///
/// # Example
///
/// ```no_run
/// let params = pqlink::config::load_config("pg_config.toml").expect("Failed to load config");
/// println!("{}", params.redacted());
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ParameterString> {
    ConnectionConfig::load(path).map(|c| c.to_parameter_string())
}
