use async_trait::async_trait;
use stratus_core::{Execution, ExecutionStatus};

use crate::error::StorageError;

/// Selects which executions [`StratusStorage::load_executions`] returns.
///
/// Every set field must match. Results are ordered most recent first
/// (by `started_at`, then id) and truncated to `limit` when non-zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionFilter {
    pub template_id: Option<String>,
    pub status: Option<ExecutionStatus>,
    /// Keep only executions where at least one command failed.
    pub only_errors: bool,
    /// Maximum number of results (0 = no limit).
    pub limit: usize,
}

impl ExecutionFilter {
    pub fn matches(&self, exec: &Execution) -> bool {
        if let Some(template_id) = &self.template_id {
            if &exec.template_id != template_id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if exec.status != status {
                return false;
            }
        }
        !self.only_errors || exec.has_errors()
    }

    /// Filter, order and truncate `execs`.
    pub fn select(&self, execs: impl IntoIterator<Item = Execution>) -> Vec<Execution> {
        let mut selected: Vec<Execution> = execs.into_iter().filter(|e| self.matches(e)).collect();
        selected.sort_by(|a, b| {
            b.started_at
                .cmp(&a.started_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        if self.limit > 0 {
            selected.truncate(self.limit);
        }
        selected
    }
}

/// The storage trait for Stratus execution history and configuration.
///
/// ## Executions
///
/// Executions are keyed by their run id. Saving an execution whose id is
/// already stored replaces the earlier record.
///
/// ## Configuration
///
/// Config values are strings addressed by `(scope, key)`, as in
/// `aws.region` or `defaults.instance.type`. Only the first dot separates
/// scope from key.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` so a single handle can
/// be shared across async tasks.
#[async_trait]
pub trait StratusStorage: Send + Sync + 'static {
    // ── Executions ────────────────────────────────────────────────────────────

    async fn save_execution(&self, exec: &Execution) -> Result<(), StorageError>;

    /// Returns `Err(StorageError::ExecutionNotFound)` if `id` is unknown.
    async fn load_execution(&self, id: &str) -> Result<Execution, StorageError>;

    async fn load_executions(&self, filter: &ExecutionFilter)
        -> Result<Vec<Execution>, StorageError>;

    /// Every stored execution keyed by run id, most recent first.
    async fn list_templates(&self) -> Result<Vec<(String, Execution)>, StorageError> {
        Ok(self
            .load_executions(&ExecutionFilter::default())
            .await?
            .into_iter()
            .map(|e| (e.id.clone(), e))
            .collect())
    }

    // ── Configuration ─────────────────────────────────────────────────────────

    async fn config_get(&self, scope: &str, key: &str) -> Result<Option<String>, StorageError>;

    async fn config_set(&self, scope: &str, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Split `scope.key` at its first dot.
pub fn split_config_key(path: &str) -> Result<(&str, &str), StorageError> {
    match path.split_once('.') {
        Some((scope, key)) if !scope.is_empty() && !key.is_empty() => Ok((scope, key)),
        _ => Err(StorageError::InvalidKey {
            scope: path.to_string(),
            key: String::new(),
        }),
    }
}

pub(crate) fn check_config_key(scope: &str, key: &str) -> Result<(), StorageError> {
    if scope.is_empty() || key.is_empty() {
        return Err(StorageError::InvalidKey {
            scope: scope.to_string(),
            key: key.to_string(),
        });
    }
    Ok(())
}
