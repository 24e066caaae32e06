//! End-to-end pipeline through the public API: compile, run, record, revert.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use stratus_core::{
    compile, revert_source, run, Command, CommandError, CommandFactory, Env, Execution,
    ExecutionMeta, ExecutionStatus, ParamMap, ProviderError, Rule, RunContext, RunOptions, Value,
};

/// A toy provider holding live resource ids.
#[derive(Default)]
struct Cloud {
    live: Mutex<BTreeSet<String>>,
    next: Mutex<u32>,
}

impl Cloud {
    fn create(&self, prefix: &str) -> String {
        let mut next = self.next.lock().unwrap();
        *next += 1;
        let id = format!("{}-{}", prefix, next);
        self.live.lock().unwrap().insert(id.clone());
        id
    }

    fn delete(&self, call: &str, id: &str) -> Result<(), ProviderError> {
        if self.live.lock().unwrap().remove(id) {
            Ok(())
        } else {
            Err(ProviderError::new(call, format!("{} does not exist", id)).with_code("NotFound"))
        }
    }

    fn live(&self) -> Vec<String> {
        self.live.lock().unwrap().iter().cloned().collect()
    }
}

struct Resource {
    action: &'static str,
    entity: &'static str,
    cloud: Arc<Cloud>,
    params: ParamMap,
}

#[async_trait]
impl Command for Resource {
    fn action(&self) -> &'static str {
        self.action
    }

    fn entity(&self) -> &'static str {
        self.entity
    }

    fn params_rule(&self) -> Rule {
        match (self.action, self.entity) {
            ("create", "vpc") => Rule::key("cidr"),
            ("create", "subnet") => Rule::all_of(vec![Rule::key("cidr"), Rule::key("vpc")]),
            _ => Rule::key("id"),
        }
    }

    fn handle_kind(&self) -> &'static str {
        "toy"
    }

    fn returns_result(&self) -> bool {
        self.action == "create"
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.params = params.clone();
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        if self.action == "create" {
            return Ok(self.cloud.create(self.entity));
        }
        let id = self
            .params
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| CommandError::MissingParam("id".into()))?;
        self.cloud.delete("Delete", id)?;
        Ok(String::new())
    }
}

struct ToyFactory {
    cloud: Arc<Cloud>,
}

impl CommandFactory for ToyFactory {
    fn build(&self, key: &str) -> Option<Box<dyn Command>> {
        let (action, entity) = match key {
            "createvpc" => ("create", "vpc"),
            "createsubnet" => ("create", "subnet"),
            "deletevpc" => ("delete", "vpc"),
            "deletesubnet" => ("delete", "subnet"),
            _ => return None,
        };
        Some(Box::new(Resource {
            action,
            entity,
            cloud: self.cloud.clone(),
            params: ParamMap::new(),
        }))
    }

    fn keys(&self) -> Vec<String> {
        ["createsubnet", "createvpc", "deletesubnet", "deletevpc"]
            .map(String::from)
            .to_vec()
    }
}

const NETWORK: &str = "\
vpc = create vpc cidr=10.0.0.0/16
subnet = create subnet cidr=10.0.1.0/24 vpc=$vpc
";

fn env(cloud: &Arc<Cloud>) -> Env {
    Env::new().with_factory(Arc::new(ToyFactory {
        cloud: cloud.clone(),
    }))
}

async fn execute(cloud: &Arc<Cloud>, source: &str, opts: RunOptions) -> Execution {
    let compiled = compile(source, &mut env(cloud)).unwrap();
    run(compiled, opts).await
}

#[tokio::test]
async fn references_flow_between_commands() {
    let cloud = Arc::new(Cloud::default());
    let exec = execute(&cloud, NETWORK, RunOptions::default()).await;

    assert_eq!(exec.status, ExecutionStatus::Success);
    assert_eq!(exec.first_result(), Some("vpc-1"));
    assert_eq!(exec.commands[1].inputs["vpc"], Value::str("vpc-1"));
    assert_eq!(exec.commands[1].binding.as_deref(), Some("subnet"));
    assert_eq!(cloud.live(), ["subnet-2", "vpc-1"]);
}

#[tokio::test]
async fn revert_undoes_a_live_run() {
    let cloud = Arc::new(Cloud::default());
    let exec = execute(&cloud, NETWORK, RunOptions::default()).await;

    let reverse = revert_source(&exec).unwrap();
    assert_eq!(reverse.trim(), "delete subnet id=subnet-2\ndelete vpc id=vpc-1");

    let undone = execute(&cloud, &reverse, RunOptions::default()).await;
    assert!(!undone.has_errors(), "{}", undone.render_log());
    assert!(cloud.live().is_empty());
}

#[tokio::test]
async fn provider_failure_stops_the_template() {
    let cloud = Arc::new(Cloud::default());
    let exec = execute(
        &cloud,
        "delete vpc id=vpc-404\ncreate vpc cidr=10.0.0.0/16\n",
        RunOptions::default(),
    )
    .await;

    assert_eq!(exec.status, ExecutionStatus::Failed);
    assert_eq!(exec.commands.len(), 1);
    let log = exec.render_log();
    assert!(log.contains("KO  delete vpc id=vpc-404"), "{log}");
    assert!(log.contains("vpc-404 does not exist"), "{log}");
    assert!(cloud.live().is_empty());
}

#[tokio::test]
async fn cancelled_before_start_runs_nothing() {
    let cloud = Arc::new(Cloud::default());
    let exec = execute(
        &cloud,
        NETWORK,
        RunOptions {
            cancel: Arc::new(AtomicBool::new(true)),
            ..Default::default()
        },
    )
    .await;

    assert_eq!(exec.status, ExecutionStatus::Cancelled);
    assert!(exec.commands.is_empty());
    assert!(cloud.live().is_empty());
}

#[tokio::test]
async fn dry_run_leaves_the_provider_untouched() {
    let cloud = Arc::new(Cloud::default());
    let cancel = Arc::new(AtomicBool::new(false));
    let exec = execute(
        &cloud,
        NETWORK,
        RunOptions {
            dry_run: true,
            cancel: cancel.clone(),
            ..Default::default()
        },
    )
    .await;

    assert!(exec.dry_run);
    assert!(exec.first_result().unwrap().starts_with("vpc-"));
    assert!(cloud.live().is_empty());
    assert!(revert_source(&exec).is_err());
    assert!(!cancel.load(Ordering::SeqCst));
}

#[tokio::test]
async fn execution_record_carries_metadata() {
    let cloud = Arc::new(Cloud::default());
    let exec = execute(
        &cloud,
        NETWORK,
        RunOptions {
            meta: ExecutionMeta {
                author: "ops".into(),
                region: "eu-west-1".into(),
                message: "m".repeat(200),
                ..Default::default()
            },
            ..Default::default()
        },
    )
    .await;

    assert_eq!(exec.author, "ops");
    assert_eq!(exec.message.chars().count(), 140);
    assert!(exec.render_log().starts_with(&format!("ID: {}, Date: ", exec.id)));
    let stats = exec.stats();
    assert_eq!((stats.ok, stats.ko, stats.commands), (2, 0, 2));
    assert_eq!(stats.per_command["create vpc"], 1);

    let stored: Execution = serde_json::from_str(&serde_json::to_string(&exec).unwrap()).unwrap();
    assert_eq!(stored, exec);
}

#[test]
fn template_id_depends_only_on_source() {
    let cloud = Arc::new(Cloud::default());
    let a = compile(NETWORK, &mut env(&cloud)).unwrap();
    let b = compile(NETWORK, &mut env(&cloud)).unwrap();
    let c = compile("create vpc cidr=10.9.0.0/16", &mut env(&cloud)).unwrap();
    assert_eq!(a.id, b.id);
    assert_ne!(a.id, c.id);
    assert_eq!(a.id.len(), 64);
}

#[test]
fn undeclared_reference_is_rejected() {
    let cloud = Arc::new(Cloud::default());
    let err = compile("create subnet cidr=10.0.1.0/24 vpc=$nope", &mut env(&cloud)).unwrap_err();
    assert!(
        err.to_string().contains("'nope' is undefined"),
        "{err}"
    );
}
