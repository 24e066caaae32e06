//! `config.toml` loading.
//!
//! ```toml
//! [aws]
//! region = "eu-west-1"
//! profile = "default"
//! endpoint = "http://localhost:8080/invoke"
//!
//! [defaults]
//! "instance.type" = "t2.micro"
//!
//! [aliases]
//! "subnet.main" = "subnet-12345"
//!
//! [paths]
//! keys_dir = "/home/me/.stratus/keys"
//! history_dir = "/home/me/.stratus/history"
//! ```
//!
//! Values stored with `stratus config set` take precedence over the file.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use stratus_core::Value;
use stratus_storage::StratusStorage;

pub(crate) const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    pub aws: AwsSection,
    /// Hole fillers keyed `entity.param`.
    pub defaults: BTreeMap<String, toml::Value>,
    pub aliases: BTreeMap<String, String>,
    pub paths: PathsSection,
    #[serde(skip)]
    home: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AwsSection {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct PathsSection {
    pub keys_dir: Option<PathBuf>,
    pub history_dir: Option<PathBuf>,
}

/// `$STRATUS_HOME`, else `~/.stratus`.
pub(crate) fn stratus_home() -> Result<PathBuf, String> {
    resolve_home(std::env::var_os("STRATUS_HOME"), dirs::home_dir())
}

fn resolve_home(explicit: Option<OsString>, home: Option<PathBuf>) -> Result<PathBuf, String> {
    if let Some(dir) = explicit.filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    home.map(|h| h.join(".stratus"))
        .ok_or_else(|| "cannot locate the home directory: set STRATUS_HOME".to_string())
}

impl Config {
    /// Load `path`, or `$STRATUS_HOME/config.toml` when absent. A missing
    /// default file yields the default configuration; a missing explicit
    /// file is an error.
    pub fn load(path: Option<&Path>) -> Result<Config, String> {
        let home = stratus_home()?;
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (home.join("config.toml"), false),
        };
        let mut config = match std::fs::read_to_string(&path) {
            Ok(src) => Config::parse(&src)
                .map_err(|e| format!("invalid config {}: {}", path.display(), e))?,
            Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(e) => return Err(format!("cannot read config {}: {}", path.display(), e)),
        };
        config.home = home;
        Ok(config)
    }

    pub fn parse(src: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(src)
    }

    pub fn keys_dir(&self) -> PathBuf {
        self.paths
            .keys_dir
            .clone()
            .unwrap_or_else(|| self.home.join("keys"))
    }

    pub fn history_dir(&self) -> PathBuf {
        self.paths
            .history_dir
            .clone()
            .unwrap_or_else(|| self.home.join("history"))
    }

    /// The file's value for `scope.key`, rendered as a string.
    pub fn file_value(&self, scope: &str, key: &str) -> Option<String> {
        match scope {
            "aws" => match key {
                "region" => self.aws.region.clone(),
                "profile" => self.aws.profile.clone(),
                "endpoint" => self.aws.endpoint.clone(),
                _ => None,
            },
            "defaults" => self.defaults.get(key).map(|v| match v {
                toml::Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
            "aliases" => self.aliases.get(key).cloned(),
            "paths" => match key {
                "keys_dir" => Some(self.keys_dir().display().to_string()),
                "history_dir" => Some(self.history_dir().display().to_string()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Fold stored `aws` values, and stored values for the `defaults` keys
    /// the file declares, into this configuration.
    pub async fn apply_overrides(&mut self, storage: &dyn StratusStorage) -> Result<(), String> {
        let get = |key: &'static str| async move {
            storage
                .config_get("aws", key)
                .await
                .map_err(|e| e.to_string())
        };
        if let Some(region) = get("region").await? {
            self.aws.region = Some(region);
        }
        if let Some(profile) = get("profile").await? {
            self.aws.profile = Some(profile);
        }
        if let Some(endpoint) = get("endpoint").await? {
            self.aws.endpoint = Some(endpoint);
        }
        let keys: Vec<String> = self.defaults.keys().cloned().collect();
        for key in keys {
            if let Some(v) = storage
                .config_get("defaults", &key)
                .await
                .map_err(|e| e.to_string())?
            {
                self.defaults.insert(key, toml::Value::String(v));
            }
        }
        Ok(())
    }

    pub fn region(&self) -> String {
        self.aws
            .region
            .clone()
            .unwrap_or_else(|| DEFAULT_REGION.to_string())
    }

    pub fn profile(&self) -> String {
        self.aws.profile.clone().unwrap_or_default()
    }

    /// `[defaults]` as compiler hole fillers.
    pub fn fillers(&self) -> BTreeMap<String, Value> {
        self.defaults
            .iter()
            .filter_map(|(k, v)| to_value(v).map(|v| (k.clone(), v)))
            .collect()
    }

    /// Resolve `@alias` for `entity`: `entity.alias` first, then `alias`.
    pub fn alias(&self, entity: &str, alias: &str) -> Option<String> {
        self.aliases
            .get(&format!("{}.{}", entity, alias))
            .or_else(|| self.aliases.get(alias))
            .cloned()
    }
}

fn to_value(v: &toml::Value) -> Option<Value> {
    Some(match v {
        toml::Value::String(s) => Value::Str(s.clone()),
        toml::Value::Integer(i) => Value::Int(*i),
        toml::Value::Float(f) => Value::Float(*f),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Array(items) => Value::List(items.iter().filter_map(to_value).collect()),
        toml::Value::Datetime(d) => Value::Str(d.to_string()),
        toml::Value::Table(_) => return None,
    })
}
