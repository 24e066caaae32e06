//! Builder-style acceptance harness.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value as Json;
use stratus_aws::{Apis, AwsFactory};
use stratus_core::{compile, revert_source, run, swap_factory, Env, Execution, RunOptions, Value};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::AcceptanceError;
use crate::mock::Mock;

// The command factory is process-wide: runs are serialized so parallel tests
// never observe each other's mock.
static SERIAL: Mutex<()> = Mutex::const_new(());

/// One template run against a fresh [`Mock`], with the expectations to check
/// once it completes.
pub struct Acceptance {
    template: String,
    mock: Arc<Mock>,
    fillers: BTreeMap<String, Value>,
    dry_run: bool,
    expected_calls: Option<BTreeMap<String, usize>>,
    expected_result: Option<String>,
    expected_error: Option<String>,
    expected_revert: Option<String>,
}

impl Acceptance {
    pub fn template(source: &str) -> Self {
        Acceptance {
            template: source.to_string(),
            mock: Arc::new(Mock::new()),
            fillers: BTreeMap::new(),
            dry_run: false,
            expected_calls: None,
            expected_result: None,
            expected_error: None,
            expected_revert: None,
        }
    }

    /// Answer `call` with `output`; queued answers are consumed in order.
    pub fn respond(self, call: &str, output: Json) -> Self {
        self.mock.respond(call, output);
        self
    }

    pub fn fail(self, call: &str, code: &str, message: &str) -> Self {
        self.mock.fail(call, code, message);
        self
    }

    pub fn filler(mut self, hole: &str, value: Value) -> Self {
        self.fillers.insert(hole.to_string(), value);
        self
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// The input `call` must receive, compared structurally.
    pub fn expect_input(self, call: &str, input: Json) -> Self {
        self.mock.expect_input(call, input);
        self
    }

    /// Exactly these calls, as a multiset: order is not checked.
    pub fn expect_calls(mut self, calls: &[&str]) -> Self {
        let mut expected = BTreeMap::new();
        for call in calls {
            *expected.entry(call.to_string()).or_default() += 1;
        }
        self.expected_calls = Some(expected);
        self
    }

    /// The first command's result.
    pub fn expect_command_result(mut self, result: &str) -> Self {
        self.expected_result = Some(result.to_string());
        self
    }

    /// Some command must fail with an error containing `message`.
    pub fn expect_error(mut self, message: &str) -> Self {
        self.expected_error = Some(message.to_string());
        self
    }

    /// The reverse template of the run.
    pub fn expect_revert(mut self, source: &str) -> Self {
        self.expected_revert = Some(source.to_string());
        self
    }

    /// The mock, for inspecting recorded inputs after [`run`](Self::run).
    pub fn mock(&self) -> Arc<Mock> {
        Arc::clone(&self.mock)
    }

    /// Compile and run the template, then check every expectation.
    pub async fn run(self) -> Result<Execution, AcceptanceError> {
        let _serial = SERIAL.lock().await;
        let factory = AwsFactory::new(Apis::from_transport(Arc::clone(&self.mock)));
        let _factory = swap_factory(Arc::new(factory));

        let mut env = Env::new().with_fillers(self.fillers.clone());
        let compiled = compile(&self.template, &mut env)?;
        let exec = run(
            compiled,
            RunOptions {
                dry_run: self.dry_run,
                ..Default::default()
            },
        )
        .await;
        debug!(id = %exec.id, status = %exec.status, "acceptance run finished");

        self.check(&exec)?;
        Ok(exec)
    }

    fn check(&self, exec: &Execution) -> Result<(), AcceptanceError> {
        let mismatches = self.mock.mismatches();
        if !mismatches.is_empty() {
            return Err(AcceptanceError::InputMismatch(mismatches));
        }
        let calls = self.mock.calls();
        if let Some(missing) = self
            .mock
            .expected_calls()
            .into_iter()
            .find(|c| !calls.contains_key(c))
        {
            return Err(AcceptanceError::InputNeverSent(missing));
        }

        match &self.expected_error {
            Some(message) => {
                let raised = exec
                    .commands
                    .iter()
                    .filter_map(|c| c.error.as_deref())
                    .any(|e| e.contains(message.as_str()));
                if !raised {
                    return Err(AcceptanceError::ErrorNotRaised(message.clone()));
                }
            }
            None => {
                if let Some(failed) = exec.commands.iter().find(|c| !c.is_ok()) {
                    return Err(AcceptanceError::CommandFailed {
                        line: failed.line,
                        text: failed.text.clone(),
                        error: failed.error.clone().unwrap_or_default(),
                    });
                }
            }
        }

        if let Some(expected) = &self.expected_calls {
            if expected != &calls {
                return Err(AcceptanceError::CallsMismatch {
                    expected: expected.clone(),
                    actual: calls,
                });
            }
        }

        if let Some(expected) = &self.expected_result {
            let actual = exec.commands.first().and_then(|c| c.result.clone());
            if actual.as_deref() != Some(expected.as_str()) {
                return Err(AcceptanceError::ResultMismatch {
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        if let Some(expected) = &self.expected_revert {
            let actual = revert_source(exec)?;
            if actual.trim() != expected.trim() {
                return Err(AcceptanceError::RevertMismatch {
                    expected: expected.clone(),
                    actual,
                });
            }
        }
        Ok(())
    }
}
