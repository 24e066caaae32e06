//! Conformance test suite for `StratusStorage` implementations.
//!
//! This module provides a backend-agnostic test suite that any
//! `StratusStorage` implementation can run to verify correctness. The suite
//! covers:
//!
//! - **History**: save/load round trips, replacement, missing ids
//! - **Filters**: template id, status, errors only, ordering and limit
//! - **Concurrency**: parallel saves from many tasks
//! - **Configuration**: scoped get/set, overwrite, key validation
//!
//! # Usage
//!
//! Backend crates call [`run_conformance_suite`] with a factory function that
//! creates a fresh, empty storage instance for each test:
//!
//! ```ignore
//! use stratus_storage::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn my_backend_conformance() {
//!     let report = run_conformance_suite(|| async { MyStorage::open_temp() }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod config;
mod history;

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;

use stratus_core::{CommandRecord, Execution, ExecutionStatus, ParamMap, Value};

use crate::StratusStorage;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "history", "config").
    pub category: String,
    pub name: String,
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        let (passed, message) = match result {
            Ok(()) => (true, None),
            Err(msg) => (false, Some(msg)),
        };
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed,
            message,
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in self.results.iter().filter(|r| !r.passed) {
            writeln!(
                f,
                "  FAIL [{}/{}]: {}",
                r.category,
                r.name,
                r.message.as_deref().unwrap_or("(no message)")
            )?;
        }
        Ok(())
    }
}

/// Run the full conformance suite against a storage backend.
///
/// The `factory` function is called once per test to create a fresh, empty
/// storage instance, ensuring test isolation.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: StratusStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(history::run_history_tests(&factory).await);
    results.extend(config::run_config_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// A one-command execution; `failed` records a provider error on it.
pub(crate) fn make_execution(
    id: &str,
    template_id: &str,
    started_at: &str,
    failed: bool,
) -> Execution {
    let mut inputs = ParamMap::new();
    inputs.insert("cidr".to_string(), Value::str("10.0.0.0/16"));
    let (result, error, status) = if failed {
        (
            None,
            Some("provider call failed: UnauthorizedOperation".to_string()),
            ExecutionStatus::Failed,
        )
    } else {
        (Some("vpc-1234".to_string()), None, ExecutionStatus::Success)
    };
    Execution {
        id: id.to_string(),
        template_id: template_id.to_string(),
        source: "create vpc cidr=10.0.0.0/16".to_string(),
        author: "tester".to_string(),
        profile: "default".to_string(),
        region: "us-east-1".to_string(),
        locale: "en".to_string(),
        message: String::new(),
        dry_run: false,
        started_at: started_at.to_string(),
        finished_at: started_at.to_string(),
        status,
        fillers: BTreeMap::new(),
        commands: vec![CommandRecord {
            line: 1,
            action: "create".to_string(),
            entity: "vpc".to_string(),
            binding: None,
            text: "create vpc cidr=10.0.0.0/16".to_string(),
            inputs,
            result,
            error,
        }],
    }
}

fn ids(execs: &[Execution]) -> Vec<&str> {
    execs.iter().map(|e| e.id.as_str()).collect()
}
