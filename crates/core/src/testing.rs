//! In-crate fakes for compiler, runner and revert tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::command::{Command, RunContext};
use crate::error::CommandError;
use crate::factory::CommandFactory;
use crate::params::{Rule, Validators};
use crate::value::ParamMap;

pub(crate) type Calls = Arc<Mutex<Vec<(String, ParamMap)>>>;

#[derive(Clone)]
pub(crate) struct Spec {
    pub action: &'static str,
    pub entity: &'static str,
    pub rule: Rule,
    pub validators: fn() -> Validators,
    pub defaults: ParamMap,
    pub file_params: &'static [&'static str],
    pub returns_result: bool,
    pub outcome: fn(&ParamMap) -> Result<String, CommandError>,
    pub fatal: bool,
    /// Flip the run's cancellation token once the command has run.
    pub cancels_run: bool,
}

impl Spec {
    pub fn new(action: &'static str, entity: &'static str, rule: Rule) -> Self {
        Spec {
            action,
            entity,
            rule,
            validators: Validators::new,
            defaults: ParamMap::new(),
            file_params: &[],
            returns_result: true,
            outcome: |_| Ok("new-id".to_string()),
            fatal: true,
            cancels_run: false,
        }
    }
}

pub(crate) struct FakeFactory {
    specs: Vec<Spec>,
    pub calls: Calls,
}

impl FakeFactory {
    pub fn new(specs: Vec<Spec>) -> Arc<Self> {
        Arc::new(FakeFactory {
            specs,
            calls: Arc::default(),
        })
    }

    pub fn calls(&self) -> Vec<(String, ParamMap)> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandFactory for FakeFactory {
    fn build(&self, key: &str) -> Option<Box<dyn Command>> {
        self.specs
            .iter()
            .find(|s| format!("{}{}", s.action, s.entity) == key)
            .map(|spec| {
                Box::new(FakeCommand {
                    spec: spec.clone(),
                    params: ParamMap::new(),
                    calls: self.calls.clone(),
                }) as Box<dyn Command>
            })
    }

    fn keys(&self) -> Vec<String> {
        self.specs
            .iter()
            .map(|s| format!("{}{}", s.action, s.entity))
            .collect()
    }
}

struct FakeCommand {
    spec: Spec,
    params: ParamMap,
    calls: Calls,
}

#[async_trait]
impl Command for FakeCommand {
    fn action(&self) -> &'static str {
        self.spec.action
    }

    fn entity(&self) -> &'static str {
        self.spec.entity
    }

    fn params_rule(&self) -> Rule {
        self.spec.rule.clone()
    }

    fn validators(&self) -> Validators {
        (self.spec.validators)()
    }

    fn handle_kind(&self) -> &'static str {
        "fake"
    }

    fn returns_result(&self) -> bool {
        self.spec.returns_result
    }

    fn defaults(&self) -> ParamMap {
        self.spec.defaults.clone()
    }

    fn file_params(&self) -> &'static [&'static str] {
        self.spec.file_params
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.params = params.clone();
        Ok(())
    }

    async fn run(&mut self, ctx: &RunContext) -> Result<String, CommandError> {
        self.calls
            .lock()
            .unwrap()
            .push((self.key(), self.params.clone()));
        if self.spec.cancels_run {
            ctx.cancel();
        }
        (self.spec.outcome)(&self.params)
    }

    fn is_fatal(&self, _err: &CommandError) -> bool {
        self.spec.fatal
    }
}
