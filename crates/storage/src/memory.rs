//! In-memory backend.

use std::collections::BTreeMap;

use async_trait::async_trait;
use stratus_core::Execution;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::traits::{check_config_key, ExecutionFilter, StratusStorage};

#[derive(Debug, Default)]
pub struct MemoryStorage {
    executions: RwLock<BTreeMap<String, Execution>>,
    config: RwLock<BTreeMap<(String, String), String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StratusStorage for MemoryStorage {
    async fn save_execution(&self, exec: &Execution) -> Result<(), StorageError> {
        self.executions
            .write()
            .await
            .insert(exec.id.clone(), exec.clone());
        Ok(())
    }

    async fn load_execution(&self, id: &str) -> Result<Execution, StorageError> {
        self.executions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::ExecutionNotFound {
                execution_id: id.to_string(),
            })
    }

    async fn load_executions(
        &self,
        filter: &ExecutionFilter,
    ) -> Result<Vec<Execution>, StorageError> {
        let executions = self.executions.read().await;
        Ok(filter.select(executions.values().cloned()))
    }

    async fn config_get(&self, scope: &str, key: &str) -> Result<Option<String>, StorageError> {
        check_config_key(scope, key)?;
        let config = self.config.read().await;
        Ok(config.get(&(scope.to_string(), key.to_string())).cloned())
    }

    async fn config_set(&self, scope: &str, key: &str, value: &str) -> Result<(), StorageError> {
        check_config_key(scope, key)?;
        self.config
            .write()
            .await
            .insert((scope.to_string(), key.to_string()), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conformance::run_conformance_suite;

    #[tokio::test]
    async fn memory_conformance() {
        let report = run_conformance_suite(|| async { MemoryStorage::new() }).await;
        assert!(report.failed == 0, "{report}");
        assert!(report.total > 0);
    }
}
