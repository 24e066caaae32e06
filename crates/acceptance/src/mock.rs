//! Mock AWS transport.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{json, Value as Json};
use stratus_aws::Transport;
use stratus_core::ProviderError;
use tracing::debug;

use crate::diff::diff;

#[derive(Default)]
struct State {
    calls: BTreeMap<String, usize>,
    inputs: Vec<(String, Json)>,
    expected: BTreeMap<String, VecDeque<Json>>,
    responses: BTreeMap<String, VecDeque<Result<Json, ProviderError>>>,
    mismatches: Vec<String>,
}

/// Answers every provider call from declared responses.
///
/// Responses and expected inputs are queued per call name; the last one
/// queued repeats for any further call. A call with no response declared
/// gets `{}`. An input that differs from the expectation is recorded as a
/// mismatch and the call fails with the diff as its message.
#[derive(Default)]
pub struct Mock {
    state: Mutex<State>,
}

fn next<T: Clone>(queue: Option<&mut VecDeque<T>>) -> Option<T> {
    let queue = queue?;
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

impl Mock {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue `output` as the answer to `call`.
    pub fn respond(&self, call: &str, output: Json) {
        self.state()
            .responses
            .entry(call.to_string())
            .or_default()
            .push_back(Ok(output));
    }

    /// Queue a provider failure for `call`.
    pub fn fail(&self, call: &str, code: &str, message: &str) {
        let err = ProviderError::new(call, message).with_code(code);
        self.state()
            .responses
            .entry(call.to_string())
            .or_default()
            .push_back(Err(err));
    }

    /// Queue the input `call` must receive.
    pub fn expect_input(&self, call: &str, input: Json) {
        self.state()
            .expected
            .entry(call.to_string())
            .or_default()
            .push_back(input);
    }

    /// Replace every expected input at once.
    pub fn set_inputs(&self, inputs: BTreeMap<String, Json>) {
        self.state().expected = inputs
            .into_iter()
            .map(|(call, input)| (call, VecDeque::from([input])))
            .collect();
    }

    /// Call name to number of invocations.
    pub fn calls(&self) -> BTreeMap<String, usize> {
        self.state().calls.clone()
    }

    /// Inputs received by `call`, in order.
    pub fn inputs(&self, call: &str) -> Vec<Json> {
        self.state()
            .inputs
            .iter()
            .filter(|(c, _)| c == call)
            .map(|(_, input)| input.clone())
            .collect()
    }

    pub fn expected_calls(&self) -> Vec<String> {
        self.state().expected.keys().cloned().collect()
    }

    pub fn mismatches(&self) -> Vec<String> {
        self.state().mismatches.clone()
    }
}

#[async_trait]
impl Transport for Mock {
    async fn invoke(
        &self,
        service: &'static str,
        call: &'static str,
        input: Json,
    ) -> Result<Json, ProviderError> {
        debug!(service, call, %input, "mock call");
        let mut state = self.state();
        *state.calls.entry(call.to_string()).or_default() += 1;
        state.inputs.push((call.to_string(), input.clone()));

        if let Some(expected) = next(state.expected.get_mut(call)) {
            let diffs = diff(&expected, &input);
            if !diffs.is_empty() {
                state
                    .mismatches
                    .extend(diffs.iter().map(|d| format!("{call}: {d}")));
                return Err(ProviderError::new(call, diffs.join("; ")).with_code("InputMismatch"));
            }
        }

        next(state.responses.get_mut(call)).unwrap_or_else(|| Ok(json!({})))
    }
}
