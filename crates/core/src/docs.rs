//! Read-only documentation lookups for commands and their parameters.
//!
//! Loaded once from TOML:
//!
//! ```toml
//! [commands.create.bucket]
//! description = "Create a bucket"
//! examples = ["create bucket name=my-bucket"]
//!
//! [commands.create.bucket.params]
//! name = "Name of the bucket"
//! acl = "Canned ACL applied to the bucket"
//!
//! [commands.create.bucket.enums]
//! acl = ["private", "public-read"]
//! ```
//!
//! Lookups are case-sensitive on action and entity.

use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandDoc {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    #[serde(default)]
    pub enums: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Docs {
    /// action → entity → doc
    #[serde(default)]
    commands: BTreeMap<String, BTreeMap<String, CommandDoc>>,
}

impl Docs {
    pub fn from_toml(src: &str) -> Result<Docs, toml::de::Error> {
        toml::from_str(src)
    }

    /// Register enum values for a parameter, replacing any listed in TOML.
    pub fn with_enum(mut self, action: &str, entity: &str, param: &str, values: &[&str]) -> Self {
        self.commands
            .entry(action.to_string())
            .or_default()
            .entry(entity.to_string())
            .or_default()
            .enums
            .insert(
                param.to_string(),
                values.iter().map(|v| v.to_string()).collect(),
            );
        self
    }

    pub fn command(&self, action: &str, entity: &str) -> Option<&CommandDoc> {
        self.commands.get(action).and_then(|m| m.get(entity))
    }

    pub fn description_for(&self, action: &str, entity: &str) -> Option<&str> {
        self.command(action, entity)
            .map(|d| d.description.as_str())
            .filter(|d| !d.is_empty())
    }

    pub fn examples_for(&self, action: &str, entity: &str) -> &[String] {
        self.command(action, entity)
            .map(|d| d.examples.as_slice())
            .unwrap_or(&[])
    }

    pub fn enum_for(&self, action: &str, entity: &str, param: &str) -> Option<&[String]> {
        self.command(action, entity)
            .and_then(|d| d.enums.get(param))
            .map(|v| v.as_slice())
    }

    /// Parameter help, with `" (v1 | v2)"` appended when the parameter has
    /// registered enum values.
    pub fn help_for(&self, action: &str, entity: &str, param: &str) -> Option<String> {
        let help = self.command(action, entity)?.params.get(param)?;
        match self.enum_for(action, entity, param) {
            Some(values) if !values.is_empty() => {
                Some(format!("{} ({})", help, values.join(" | ")))
            }
            _ => Some(help.clone()),
        }
    }

    /// Every documented `(action, entity)` pair, sorted.
    pub fn documented(&self) -> Vec<(&str, &str)> {
        self.commands
            .iter()
            .flat_map(|(a, m)| m.keys().map(move |e| (a.as_str(), e.as_str())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: &str = r#"
[commands.create.bucket]
description = "Create a bucket"
examples = ["create bucket name=b", "create bucket name=b acl=public-read"]

[commands.create.bucket.params]
name = "Name of the bucket"
acl = "Canned ACL"

[commands.create.bucket.enums]
acl = ["private", "public-read"]

[commands.delete.bucket]
description = "Delete a bucket"
"#;

    #[test]
    fn lookups() {
        let docs = Docs::from_toml(SRC).unwrap();
        assert_eq!(docs.description_for("create", "bucket"), Some("Create a bucket"));
        assert_eq!(docs.examples_for("create", "bucket").len(), 2);
        assert!(docs.examples_for("delete", "bucket").is_empty());
        assert_eq!(
            docs.help_for("create", "bucket", "name").as_deref(),
            Some("Name of the bucket")
        );
        assert_eq!(
            docs.help_for("create", "bucket", "acl").as_deref(),
            Some("Canned ACL (private | public-read)")
        );
        assert_eq!(docs.help_for("create", "bucket", "nope"), None);
    }

    #[test]
    fn lookups_are_case_sensitive() {
        let docs = Docs::from_toml(SRC).unwrap();
        assert_eq!(docs.description_for("Create", "bucket"), None);
        assert_eq!(docs.description_for("create", "Bucket"), None);
    }

    #[test]
    fn enums_can_be_registered_after_load() {
        let docs = Docs::from_toml(SRC)
            .unwrap()
            .with_enum("delete", "bucket", "name", &["a", "b"]);
        assert_eq!(
            docs.enum_for("delete", "bucket", "name"),
            Some(&["a".to_string(), "b".to_string()][..])
        );
        assert_eq!(
            docs.documented(),
            vec![("create", "bucket"), ("delete", "bucket")]
        );
    }
}
