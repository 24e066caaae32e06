//! Execution records: the post-mortem of running one template.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::value::{ParamMap, Value};

const MAX_MESSAGE_LEN: usize = 140;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Failed,
    Cancelled,
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExecutionStatus::Success => "success",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Who ran a template, where, and why.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionMeta {
    pub author: String,
    pub profile: String,
    pub region: String,
    pub locale: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub line: u32,
    pub action: String,
    pub entity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<String>,
    /// Canonical text of the command as compiled.
    pub text: String,
    /// Parameters as passed to the command, references substituted.
    pub inputs: ParamMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandRecord {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub id: String,
    pub template_id: String,
    pub source: String,
    pub author: String,
    pub profile: String,
    pub region: String,
    pub locale: String,
    pub message: String,
    pub dry_run: bool,
    pub started_at: String,
    pub finished_at: String,
    pub status: ExecutionStatus,
    #[serde(default)]
    pub fillers: BTreeMap<String, Value>,
    pub commands: Vec<CommandRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionStats {
    pub ok: usize,
    pub ko: usize,
    pub commands: usize,
    /// Count per `action entity`.
    pub per_command: BTreeMap<String, usize>,
}

pub(crate) fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

fn new_run_id() -> String {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    format!("{:010x}{:08x}", now, rand::random::<u32>())
}

impl Execution {
    /// Start a record for the template identified by `template_id`.
    pub fn start(template_id: &str, source: &str, meta: ExecutionMeta, dry_run: bool) -> Self {
        let message: String = meta.message.chars().take(MAX_MESSAGE_LEN).collect();
        Execution {
            id: new_run_id(),
            template_id: template_id.to_string(),
            source: source.to_string(),
            author: meta.author,
            profile: meta.profile,
            region: meta.region,
            locale: meta.locale,
            message,
            dry_run,
            started_at: now_rfc3339(),
            finished_at: String::new(),
            status: ExecutionStatus::Success,
            fillers: BTreeMap::new(),
            commands: Vec::new(),
        }
    }

    pub(crate) fn finish(&mut self, status: ExecutionStatus) {
        self.status = status;
        self.finished_at = now_rfc3339();
    }

    pub fn has_errors(&self) -> bool {
        self.status != ExecutionStatus::Success || self.commands.iter().any(|c| !c.is_ok())
    }

    /// Result of the first command, if it produced one.
    pub fn first_result(&self) -> Option<&str> {
        self.commands.first().and_then(|c| c.result.as_deref())
    }

    pub fn stats(&self) -> ExecutionStats {
        let mut stats = ExecutionStats {
            commands: self.commands.len(),
            ..Default::default()
        };
        for c in &self.commands {
            if c.is_ok() {
                stats.ok += 1;
            } else {
                stats.ko += 1;
            }
            *stats
                .per_command
                .entry(format!("{} {}", c.action, c.entity))
                .or_default() += 1;
        }
        stats
    }

    /// Human-readable log: a header line then one line per command.
    pub fn render_log(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "ID: {}, Date: {}, Region: {}",
            self.id, self.started_at, self.region
        );
        if !self.profile.is_empty() {
            let _ = write!(out, ", Profile: {}", self.profile);
        }
        if self.dry_run {
            out.push_str(", Dry run");
        }
        if !self.message.is_empty() {
            let _ = write!(out, "\n\t{}", self.message);
        }
        for c in &self.commands {
            match (&c.error, &c.result) {
                (Some(err), _) => {
                    let _ = write!(out, "\n    KO  {}\n\t{}", c.text, err);
                }
                (None, Some(result)) if !result.is_empty() => {
                    let _ = write!(out, "\n    OK  {}  [{}]", c.text, result);
                }
                (None, _) => {
                    let _ = write!(out, "\n    OK  {}", c.text);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(action: &str, entity: &str, result: Option<&str>, error: Option<&str>) -> CommandRecord {
        CommandRecord {
            line: 1,
            action: action.into(),
            entity: entity.into(),
            binding: None,
            text: format!("{} {} name=x", action, entity),
            inputs: ParamMap::new(),
            result: result.map(String::from),
            error: error.map(String::from),
        }
    }

    fn sample() -> Execution {
        let meta = ExecutionMeta {
            region: "eu-west-1".into(),
            message: "m".repeat(200),
            ..Default::default()
        };
        let mut exec = Execution::start("tid", "src", meta, false);
        exec.commands.push(record("create", "bucket", Some("x"), None));
        exec.commands.push(record("create", "bucket", Some("y"), None));
        exec.commands.push(record("delete", "alarm", None, Some("provider call failed: boom")));
        exec.finish(ExecutionStatus::Failed);
        exec
    }

    #[test]
    fn message_is_truncated() {
        assert_eq!(sample().message.chars().count(), 140);
    }

    #[test]
    fn stats_count_outcomes() {
        let stats = sample().stats();
        assert_eq!((stats.ok, stats.ko, stats.commands), (2, 1, 3));
        assert_eq!(stats.per_command["create bucket"], 2);
        assert_eq!(stats.per_command["delete alarm"], 1);
    }

    #[test]
    fn errors_are_detected() {
        let exec = sample();
        assert!(exec.has_errors());
        assert_eq!(exec.first_result(), Some("x"));
    }

    #[test]
    fn log_lists_every_command() {
        let log = sample().render_log();
        let mut lines = log.lines();
        assert!(lines.next().unwrap().contains("Region: eu-west-1"));
        assert!(log.contains("    OK  create bucket name=x  [x]"));
        assert!(log.contains("    KO  delete alarm name=x\n\tprovider call failed: boom"));
    }

    #[test]
    fn serializes_with_lowercase_status() {
        let exec = sample();
        let json = serde_json::to_string(&exec).unwrap();
        assert!(json.contains("\"status\":\"failed\""));
        let back: Execution = serde_json::from_str(&json).unwrap();
        assert_eq!(back, exec);
    }
}
