//! Catalogue-wide properties of the AWS command factory.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value as Json};
use stratus_aws::{Apis, AwsFactory, Transport};
use stratus_core::{compile, run, CommandFactory, Env, ProviderError, RunOptions};

#[derive(Default)]
struct Counting {
    calls: AtomicUsize,
}

#[async_trait]
impl Transport for Counting {
    async fn invoke(&self, _: &'static str, _: &'static str, _: Json) -> Result<Json, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(json!({}))
    }
}

fn factory() -> (Arc<Counting>, Arc<AwsFactory>) {
    let transport = Arc::new(Counting::default());
    let factory = Arc::new(AwsFactory::new(Apis::from_transport(transport.clone())));
    (transport, factory)
}

#[test]
fn keys_are_sorted_and_buildable() {
    let (_, factory) = factory();
    let keys = factory.keys();
    assert_eq!(keys.len(), 78);
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    for key in &keys {
        let cmd = factory.build(key).unwrap();
        assert_eq!(&cmd.key(), key);
    }
    assert!(factory.build("createunicorn").is_none());
}

#[test]
fn validator_keys_appear_in_rules() {
    let (_, factory) = factory();
    for key in factory.keys() {
        let cmd = factory.build(&key).unwrap();
        let (required, optional, suggested) = cmd.params_rule().list();
        assert!(
            !(required.is_empty() && optional.is_empty()),
            "{key}: rule lists no params"
        );
        for v in cmd.validators().keys() {
            let known = required.iter().chain(&optional).chain(&suggested).any(|k| k == v);
            assert!(known, "{key}: validator on unknown param '{v}'");
        }
    }
}

#[test]
fn handles_match_provider_services() {
    let (_, factory) = factory();
    let kinds = ["ec2", "s3", "cloudwatch", "iam", "elbv2", "route53"];
    for key in factory.keys() {
        let cmd = factory.build(&key).unwrap();
        assert!(kinds.contains(&cmd.handle_kind()), "{key}: {}", cmd.handle_kind());
    }
}

#[tokio::test]
async fn dry_run_never_calls_the_provider() {
    let (transport, factory) = factory();
    let source = "\
vpc = create vpc cidr=10.0.0.0/16
subnet = create subnet cidr=10.0.1.0/24 vpc=$vpc
inst = create instance distro=canonical count=1 type=t2.micro name=web subnet=$subnet
create tag resource=$inst key=env value=prod
stop instance id=$inst
create bucket name=logs acl=private
delete alarm name=a1,a2
";
    let mut env = Env::new().with_factory(factory);
    let compiled = compile(source, &mut env).unwrap();
    let exec = run(
        compiled,
        RunOptions {
            dry_run: true,
            ..Default::default()
        },
    )
    .await;
    assert!(!exec.has_errors(), "{}", exec.render_log());
    assert_eq!(exec.commands.len(), 7);
    assert!(exec.commands[0].result.as_deref().unwrap().starts_with("vpc-"));
    assert!(exec.commands[2].result.as_deref().unwrap().starts_with("i-"));
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
}
