//! Recording transport for command unit tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value as Json};
use stratus_core::{Command, ParamMap, ProviderError, RunContext, Value};

use crate::api::{Apis, Transport};

#[derive(Default)]
pub struct Recorder {
    replies: Mutex<BTreeMap<&'static str, VecDeque<Result<Json, ProviderError>>>>,
    calls: Mutex<Vec<(String, Json)>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Recorder::default())
    }

    /// Queue a reply for `call`. The last queued reply repeats.
    pub fn reply(&self, call: &'static str, out: Json) -> &Self {
        self.push(call, Ok(out))
    }

    pub fn fail(&self, call: &'static str, code: &str) -> &Self {
        self.push(call, Err(ProviderError::new(call, "failed").with_code(code)))
    }

    fn push(&self, call: &'static str, out: Result<Json, ProviderError>) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .entry(call)
            .or_default()
            .push_back(out);
        self
    }

    pub fn calls(&self) -> Vec<(String, Json)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_names(&self) -> Vec<String> {
        self.calls().into_iter().map(|(c, _)| c).collect()
    }

    pub fn input(&self, call: &str) -> Json {
        self.calls()
            .into_iter()
            .find(|(c, _)| c == call)
            .map(|(_, i)| i)
            .unwrap_or_else(|| panic!("no {call} call recorded"))
    }
}

#[async_trait]
impl Transport for Recorder {
    async fn invoke(
        &self,
        _service: &'static str,
        call: &'static str,
        input: Json,
    ) -> Result<Json, ProviderError> {
        self.calls.lock().unwrap().push((call.to_string(), input));
        let mut replies = self.replies.lock().unwrap();
        match replies.get_mut(call) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap_or_else(|| Ok(json!({}))),
            None => Ok(json!({})),
        }
    }
}

pub fn apis(recorder: &Arc<Recorder>) -> Apis {
    Apis::from_transport(Arc::clone(recorder))
}

pub fn params(pairs: &[(&str, Value)]) -> ParamMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Inject `pairs` and run the command.
pub async fn run(cmd: &mut dyn Command, pairs: &[(&str, Value)]) -> Result<String, stratus_core::CommandError> {
    cmd.inject(&params(pairs))?;
    cmd.run(&RunContext::default()).await
}
