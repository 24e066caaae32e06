use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::Path;

use crate::value::{kind_of, ParamMap, Value};

/// A per-parameter check receiving the value and all sibling parameters.
pub type ValidatorFn = Box<dyn Fn(&Value, &ParamMap) -> Result<(), String> + Send + Sync>;

/// Validators keyed by parameter name, run in key order.
#[derive(Default)]
pub struct Validators {
    entries: BTreeMap<String, ValidatorFn>,
}

impl Validators {
    pub fn new() -> Self {
        Validators::default()
    }

    pub fn with(mut self, key: &str, f: ValidatorFn) -> Self {
        self.entries.insert(key.to_string(), f);
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every validator whose key is present, collecting all failures.
    pub fn validate(&self, params: &ParamMap) -> Result<(), ValidationError> {
        let mut failures = Vec::new();
        for (key, f) in &self.entries {
            if let Some(v) = params.get(key) {
                if let Err(msg) = f(v, params) {
                    failures.push((key.clone(), msg));
                }
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { failures })
        }
    }
}

impl std::fmt::Debug for Validators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}

/// Aggregated validator failures for one command, as `(key, message)` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub failures: Vec<(String, String)>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "param validation:{}", self.details())
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    /// One `\n\t\t- param 'k': msg` line per failure.
    pub fn details(&self) -> String {
        self.failures
            .iter()
            .map(|(k, m)| format!("\n\t\t- param '{}': {}", k, m))
            .collect()
    }
}

// ──────────────────────────────────────────────
// Built-in validators
// ──────────────────────────────────────────────

fn as_string(v: &Value) -> Result<&str, String> {
    match v {
        Value::Str(s) => Ok(s),
        other => Err(format!("expected a string but got {}", kind_of(other))),
    }
}

pub fn is_in_enum_ignore_case(items: &'static [&'static str]) -> ValidatorFn {
    Box::new(move |v, _| {
        let s = as_string(v)?;
        if items.iter().any(|i| i.eq_ignore_ascii_case(s)) {
            Ok(())
        } else {
            Err(format!(
                "expected any of [{}] but got '{}'",
                items.join(" "),
                s
            ))
        }
    })
}

pub fn max_length_of(max: usize) -> ValidatorFn {
    Box::new(move |v, _| {
        let len = as_string(v)?.chars().count();
        if len > max {
            Err(format!("expected max length of {} but got {}", max, len))
        } else {
            Ok(())
        }
    })
}

pub fn min_length_of(min: usize) -> ValidatorFn {
    Box::new(move |v, _| {
        let len = as_string(v)?.chars().count();
        if len < min {
            Err(format!("expected min length of {} but got {}", min, len))
        } else {
            Ok(())
        }
    })
}

pub fn is_filepath() -> ValidatorFn {
    Box::new(|v, _| {
        let s = as_string(v)?;
        let path = Path::new(s);
        match std::fs::metadata(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(format!("cannot find file '{}'", s))
            }
            Err(e) => Err(e.to_string()),
            Ok(meta) if meta.is_dir() => Err(format!("'{}' is a directory", s)),
            Ok(_) => Ok(()),
        }
    })
}

pub fn is_cidr() -> ValidatorFn {
    Box::new(|v, _| {
        let s = as_string(v)?;
        let invalid = || format!("invalid CIDR address: {}", s);
        let (ip, prefix) = s.split_once('/').ok_or_else(invalid)?;
        let ip: IpAddr = ip.parse().map_err(|_| invalid())?;
        let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
        let max = if ip.is_ipv4() { 32 } else { 128 };
        if prefix > max {
            return Err(invalid());
        }
        Ok(())
    })
}

pub fn is_ip() -> ValidatorFn {
    Box::new(|v, _| {
        let s = as_string(v)?;
        s.parse::<IpAddr>()
            .map(|_| ())
            .map_err(|_| format!("expected valid IP address but got '{}'", s))
    })
}
