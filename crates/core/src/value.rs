//! Parameter values and the typed casts commands use to read them.
//!
//! Values come out of the parser untyped-ish (a bare `8080` is an integer,
//! `true` a boolean, everything else a string) and commands convert them into
//! the type each provider field expects.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CommandError;

/// A concrete parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

/// Parameters of a single command, keyed by parameter name.
pub type ParamMap = BTreeMap<String, Value>;

impl Value {
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::List(items.into_iter().map(|s| Value::Str(s.into())).collect())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Interpret a `k1:v1,k2:v2` list (or a single `k:v` string) as a map.
    ///
    /// Entries without a colon are skipped.
    pub fn as_map(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        for entry in cast_string_list(self) {
            if let Some((k, v)) = entry.split_once(':') {
                out.insert(k.to_string(), v.to_string());
            }
        }
        out
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(","))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

// ──────────────────────────────────────────────
// Casts
// ──────────────────────────────────────────────

/// Render any value as one string. Lists are joined with commas.
pub fn cast_string(v: &Value) -> String {
    v.to_string()
}

pub fn cast_int(v: &Value) -> Result<i64, String> {
    match v {
        Value::Int(n) => Ok(*n),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("invalid integer value '{}'", s)),
        Value::Float(x) if x.fract() == 0.0 => Ok(*x as i64),
        other => Err(format!("cannot cast {} to integer", kind_of(other))),
    }
}

pub fn cast_float(v: &Value) -> Result<f64, String> {
    match v {
        Value::Float(x) => Ok(*x),
        Value::Int(n) => Ok(*n as f64),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("invalid float value '{}'", s)),
        other => Err(format!("cannot cast {} to float", kind_of(other))),
    }
}

pub fn cast_bool(v: &Value) -> Result<bool, String> {
    match v {
        Value::Bool(b) => Ok(*b),
        Value::Str(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "1" | "t" => Ok(true),
            "false" | "0" | "f" => Ok(false),
            _ => Err(format!("invalid boolean value '{}'", s)),
        },
        Value::Int(1) => Ok(true),
        Value::Int(0) => Ok(false),
        other => Err(format!("cannot cast {} to boolean", kind_of(other))),
    }
}

/// A single value becomes a one-element list.
pub fn cast_string_list(v: &Value) -> Vec<String> {
    match v {
        Value::List(items) => items.iter().map(|i| i.to_string()).collect(),
        other => vec![other.to_string()],
    }
}

pub(crate) fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Bool(_) => "bool",
        Value::Int(_) => "int",
        Value::Float(_) => "float",
        Value::Str(_) => "string",
        Value::List(_) => "list",
    }
}

// ──────────────────────────────────────────────
// Injector
// ──────────────────────────────────────────────

/// Typed read access over a command's parameter map.
///
/// Every accessor returns `Ok(None)` when the key is absent and a
/// [`CommandError::InvalidParam`] when the value cannot be converted.
pub struct Injector<'a> {
    params: &'a ParamMap,
}

impl<'a> Injector<'a> {
    pub fn new(params: &'a ParamMap) -> Self {
        Injector { params }
    }

    pub fn has(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn raw(&self, key: &str) -> Option<&'a Value> {
        self.params.get(key)
    }

    pub fn string(&self, key: &str) -> Result<Option<String>, CommandError> {
        Ok(self.params.get(key).map(cast_string))
    }

    pub fn int(&self, key: &str) -> Result<Option<i64>, CommandError> {
        self.convert(key, cast_int)
    }

    pub fn float(&self, key: &str) -> Result<Option<f64>, CommandError> {
        self.convert(key, cast_float)
    }

    pub fn bool(&self, key: &str) -> Result<Option<bool>, CommandError> {
        self.convert(key, cast_bool)
    }

    pub fn strings(&self, key: &str) -> Result<Option<Vec<String>>, CommandError> {
        Ok(self.params.get(key).map(cast_string_list))
    }

    /// Read the first present key among `keys` as a list.
    pub fn strings_any(&self, keys: &[&str]) -> Result<Option<Vec<String>>, CommandError> {
        for k in keys {
            if let Some(v) = self.strings(k)? {
                return Ok(Some(v));
            }
        }
        Ok(None)
    }

    fn convert<T>(
        &self,
        key: &str,
        f: impl Fn(&Value) -> Result<T, String>,
    ) -> Result<Option<T>, CommandError> {
        match self.params.get(key) {
            None => Ok(None),
            Some(v) => f(v).map(Some).map_err(|message| CommandError::InvalidParam {
                key: key.to_string(),
                message,
            }),
        }
    }
}

/// Unwrap a required parameter, failing with `MissingParam`.
pub fn required<T>(value: Option<T>, key: &str) -> Result<T, CommandError> {
    value.ok_or_else(|| CommandError::MissingParam(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn casts_numeric_strings() {
        assert_eq!(cast_int(&Value::str("42")), Ok(42));
        assert_eq!(
            cast_int(&Value::str("4x")),
            Err("invalid integer value '4x'".to_string())
        );
        assert_eq!(cast_float(&Value::Int(3)), Ok(3.0));
        assert_eq!(cast_bool(&Value::str("TRUE")), Ok(true));
        assert!(cast_bool(&Value::str("yes")).is_err());
    }

    #[test]
    fn single_value_becomes_list() {
        assert_eq!(cast_string_list(&Value::str("a")), vec!["a"]);
        assert_eq!(
            cast_string_list(&Value::list(["a", "b"])),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn list_renders_as_csv() {
        let v = Value::List(vec![Value::str("a"), Value::Int(2)]);
        assert_eq!(v.to_string(), "a,2");
    }

    #[test]
    fn colon_pairs_read_as_map() {
        let v = Value::list(["AutoScalingGroupName:web", "Stage:prod", "bogus"]);
        let m = v.as_map();
        assert_eq!(m.len(), 2);
        assert_eq!(m["Stage"], "prod");
    }

    #[test]
    fn injector_reports_bad_conversion() {
        let mut params = ParamMap::new();
        params.insert("count".into(), Value::str("many"));
        let err = Injector::new(&params).int("count").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid param 'count': invalid integer value 'many'"
        );
        assert_eq!(Injector::new(&params).int("absent"), Ok(None));
    }
}
