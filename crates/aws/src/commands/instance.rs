//! EC2 instances, plus their registration into load balancer target groups.

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use stratus_core::params::{is_ip, Validators};
use stratus_core::poll::{poll_until, timeout_secs};
use stratus_core::value::required;
use stratus_core::{Command, CommandError, Injector, ParamMap, Rule, RunContext};

use super::{check_rule, check_validators, fatal_unless_gone, ids_rule, tag, NOT_FOUND};
use crate::api::{
    AttributeValue, DescribeInstancesInput, Ec2Api, Elbv2Api, IamInstanceProfileSpecification,
    InstanceIdsInput, ModifyInstanceAttributeInput, RunInstancesInput, TargetDescription,
    TargetsInput,
};
use crate::images;

pub const INSTANCE_STATES: &[&str] = &[
    "pending",
    "running",
    "shutting-down",
    "terminated",
    "stopping",
    "stopped",
    NOT_FOUND,
];

/// Read `ids`, or `id` as a one-element list.
fn instance_ids(p: &Injector<'_>) -> Result<Vec<String>, CommandError> {
    required(p.strings_any(&["ids", "id"])?, "ids")
}

// ──────────────────────────────────────────────
// create / update / delete
// ──────────────────────────────────────────────

pub struct CreateInstance {
    api: Arc<dyn Ec2Api>,
    input: RunInstancesInput,
    distro: Option<String>,
    name: Option<String>,
}

impl CreateInstance {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        CreateInstance {
            api,
            input: RunInstancesInput::default(),
            distro: None,
            name: None,
        }
    }
}

#[async_trait]
impl Command for CreateInstance {
    descriptor!("create", "instance", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![
            Rule::only_one_of(vec![Rule::key("distro"), Rule::key("image")]),
            Rule::key("count"),
            Rule::key("type"),
            Rule::key("name"),
            Rule::key("subnet"),
            Rule::opt_with(&["ip", "userdata", "lock", "role"], &["keypair", "securitygroup"]),
        ])
    }

    fn validators(&self) -> Validators {
        Validators::new().with("ip", is_ip())
    }

    fn file_params(&self) -> &'static [&'static str] {
        &["userdata"]
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        let count = required(p.int("count")?, "count")?;
        self.distro = p.string("distro")?;
        self.name = p.string("name")?;
        self.input = RunInstancesInput {
            image_id: p.string("image")?.unwrap_or_default(),
            instance_type: required(p.string("type")?, "type")?,
            min_count: count,
            max_count: count,
            subnet_id: required(p.string("subnet")?, "subnet")?,
            key_name: p.string("keypair")?,
            security_group_ids: p.strings("securitygroup")?.unwrap_or_default(),
            user_data: p.string("userdata")?.map(|data| BASE64.encode(data)),
            iam_instance_profile: p.string("role")?.map(|name| IamInstanceProfileSpecification {
                name: Some(name),
                arn: None,
            }),
            private_ip_address: p.string("ip")?,
            disable_api_termination: p.bool("lock")?,
        };
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let mut input = self.input.clone();
        if let Some(distro) = &self.distro {
            input.image_id = images::resolve_distro(self.api.as_ref(), distro)
                .await
                .map_err(CommandError::Other)?;
        }
        let out = self.api.run_instances(input).await?;
        let id = out
            .instances
            .first()
            .map(|i| i.instance_id.clone())
            .ok_or_else(|| CommandError::Other("no instance created".into()))?;
        if let Some(name) = &self.name {
            tag::put_tag(self.api.as_ref(), &[id.clone()], "Name", name).await?;
        }
        Ok(id)
    }
}

pub struct UpdateInstance {
    api: Arc<dyn Ec2Api>,
    input: ModifyInstanceAttributeInput,
}

impl UpdateInstance {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        UpdateInstance {
            api,
            input: ModifyInstanceAttributeInput::default(),
        }
    }
}

#[async_trait]
impl Command for UpdateInstance {
    descriptor!("update", "instance", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("id"), Rule::opt(&["lock", "type"])])
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        self.input = ModifyInstanceAttributeInput {
            instance_id: required(p.string("id")?, "id")?,
            instance_type: p.string("type")?.map(|value| AttributeValue { value }),
            disable_api_termination: p.bool("lock")?.map(|value| AttributeValue { value }),
            groups: None,
        };
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.modify_instance_attribute(self.input.clone()).await?;
        Ok(String::new())
    }
}

pub struct DeleteInstance {
    api: Arc<dyn Ec2Api>,
    ids: Vec<String>,
}

impl DeleteInstance {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        DeleteInstance { api, ids: Vec::new() }
    }
}

#[async_trait]
impl Command for DeleteInstance {
    descriptor!("delete", "instance", "ec2");

    fn is_fatal(&self, err: &CommandError) -> bool {
        fatal_unless_gone(err)
    }

    fn params_rule(&self) -> Rule {
        ids_rule()
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.ids = instance_ids(&Injector::new(params))?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let input = InstanceIdsInput {
            instance_ids: self.ids.clone(),
        };
        self.api.terminate_instances(input).await?;
        Ok(String::new())
    }
}

// ──────────────────────────────────────────────
// start / stop / restart
// ──────────────────────────────────────────────

pub struct StartInstance {
    api: Arc<dyn Ec2Api>,
    ids: Vec<String>,
}

impl StartInstance {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        StartInstance { api, ids: Vec::new() }
    }
}

#[async_trait]
impl Command for StartInstance {
    descriptor!("start", "instance", "ec2");

    fn params_rule(&self) -> Rule {
        ids_rule()
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.ids = instance_ids(&Injector::new(params))?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let input = InstanceIdsInput {
            instance_ids: self.ids.clone(),
        };
        let out = self.api.start_instances(input).await?;
        Ok(out
            .instances
            .first()
            .map(|i| i.instance_id.clone())
            .unwrap_or_default())
    }
}

pub struct StopInstance {
    api: Arc<dyn Ec2Api>,
    ids: Vec<String>,
}

impl StopInstance {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        StopInstance { api, ids: Vec::new() }
    }
}

#[async_trait]
impl Command for StopInstance {
    descriptor!("stop", "instance", "ec2");

    fn params_rule(&self) -> Rule {
        ids_rule()
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.ids = instance_ids(&Injector::new(params))?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let input = InstanceIdsInput {
            instance_ids: self.ids.clone(),
        };
        let out = self.api.stop_instances(input).await?;
        Ok(out
            .instances
            .first()
            .map(|i| i.instance_id.clone())
            .unwrap_or_default())
    }
}

pub struct RestartInstance {
    api: Arc<dyn Ec2Api>,
    ids: Vec<String>,
}

impl RestartInstance {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        RestartInstance { api, ids: Vec::new() }
    }
}

#[async_trait]
impl Command for RestartInstance {
    descriptor!("restart", "instance", "ec2");

    fn params_rule(&self) -> Rule {
        ids_rule()
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.ids = instance_ids(&Injector::new(params))?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let input = InstanceIdsInput {
            instance_ids: self.ids.clone(),
        };
        self.api.reboot_instances(input).await?;
        Ok(String::new())
    }
}

// ──────────────────────────────────────────────
// check
// ──────────────────────────────────────────────

pub struct CheckInstance {
    api: Arc<dyn Ec2Api>,
    id: String,
    state: String,
    timeout: u64,
}

impl CheckInstance {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        CheckInstance {
            api,
            id: String::new(),
            state: String::new(),
            timeout: 0,
        }
    }
}

#[async_trait]
impl Command for CheckInstance {
    descriptor!("check", "instance", "ec2");

    fn params_rule(&self) -> Rule {
        check_rule()
    }

    fn validators(&self) -> Validators {
        check_validators(INSTANCE_STATES)
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        self.id = required(p.string("id")?, "id")?;
        self.state = required(p.string("state")?, "state")?;
        self.timeout = timeout_secs(required(p.int("timeout")?, "timeout")?)?;
        Ok(())
    }

    async fn run(&mut self, ctx: &RunContext) -> Result<String, CommandError> {
        let api = self.api.as_ref();
        let id = self.id.as_str();
        poll_until(ctx, self.timeout, &self.state, || async move {
            let input = DescribeInstancesInput {
                instance_ids: vec![id.to_string()],
                ..Default::default()
            };
            match api.describe_instances(input).await {
                Err(e) if e.is_not_found() => Ok(NOT_FOUND.to_string()),
                Err(e) => Err(e.into()),
                Ok(out) => Ok(out
                    .instances()
                    .find(|i| i.instance_id == id)
                    .map(|i| i.state.name.clone())
                    .unwrap_or_else(|| NOT_FOUND.to_string())),
            }
        })
        .await?;
        Ok(String::new())
    }
}

// ──────────────────────────────────────────────
// attach / detach (target groups)
// ──────────────────────────────────────────────

pub struct AttachInstance {
    api: Arc<dyn Elbv2Api>,
    input: TargetsInput,
}

impl AttachInstance {
    pub fn new(api: Arc<dyn Elbv2Api>) -> Self {
        AttachInstance {
            api,
            input: TargetsInput::default(),
        }
    }
}

#[async_trait]
impl Command for AttachInstance {
    descriptor!("attach", "instance", "elbv2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("id"), Rule::key("targetgroup"), Rule::opt(&["port"])])
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        self.input = TargetsInput {
            target_group_arn: required(p.string("targetgroup")?, "targetgroup")?,
            targets: vec![TargetDescription {
                id: required(p.string("id")?, "id")?,
                port: p.int("port")?,
            }],
        };
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.register_targets(self.input.clone()).await?;
        Ok(String::new())
    }
}

pub struct DetachInstance {
    api: Arc<dyn Elbv2Api>,
    input: TargetsInput,
}

impl DetachInstance {
    pub fn new(api: Arc<dyn Elbv2Api>) -> Self {
        DetachInstance {
            api,
            input: TargetsInput::default(),
        }
    }
}

#[async_trait]
impl Command for DetachInstance {
    descriptor!("detach", "instance", "elbv2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("id"), Rule::key("targetgroup")])
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        self.input = TargetsInput {
            target_group_arn: required(p.string("targetgroup")?, "targetgroup")?,
            targets: vec![TargetDescription {
                id: required(p.string("id")?, "id")?,
                port: None,
            }],
        };
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.deregister_targets(self.input.clone()).await?;
        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use stratus_core::poll::set_poll_interval;
    use stratus_core::Value;

    use super::*;
    use crate::testing::{apis, run, Recorder};

    #[tokio::test]
    async fn create_runs_then_tags_name() {
        let rec = Recorder::new();
        rec.reply("RunInstances", json!({"Instances": [{"InstanceId": "i-42"}]}));
        let mut cmd = CreateInstance::new(apis(&rec).ec2);
        let id = run(
            &mut cmd,
            &[
                ("image", Value::str("ami-1")),
                ("count", Value::Int(1)),
                ("type", Value::str("t2.micro")),
                ("name", Value::str("web")),
                ("subnet", Value::str("subnet-1")),
                ("userdata", Value::str("#!/bin/sh")),
                ("lock", Value::Bool(true)),
                ("role", Value::str("profile")),
            ],
        )
        .await
        .unwrap();
        assert_eq!(id, "i-42");
        assert_eq!(rec.call_names(), vec!["RunInstances", "CreateTagsRequest"]);
        assert_eq!(
            rec.input("RunInstances"),
            json!({
                "ImageId": "ami-1",
                "InstanceType": "t2.micro",
                "MinCount": 1,
                "MaxCount": 1,
                "SubnetId": "subnet-1",
                "UserData": "IyEvYmluL3No",
                "IamInstanceProfile": {"Name": "profile"},
                "DisableApiTermination": true
            })
        );
        assert_eq!(
            rec.input("CreateTagsRequest"),
            json!({"Resources": ["i-42"], "Tags": [{"Key": "Name", "Value": "web"}]})
        );
    }

    #[tokio::test]
    async fn update_sets_attribute_values() {
        let rec = Recorder::new();
        let mut cmd = UpdateInstance::new(apis(&rec).ec2);
        run(
            &mut cmd,
            &[("id", Value::str("i-1")), ("type", Value::str("t2.large"))],
        )
        .await
        .unwrap();
        assert_eq!(
            rec.input("ModifyInstanceAttribute"),
            json!({"InstanceId": "i-1", "InstanceType": {"Value": "t2.large"}})
        );
    }

    #[tokio::test]
    async fn delete_accepts_a_single_id() {
        let rec = Recorder::new();
        let mut cmd = DeleteInstance::new(apis(&rec).ec2);
        run(&mut cmd, &[("id", Value::str("i-1"))]).await.unwrap();
        assert_eq!(
            rec.input("TerminateInstances"),
            json!({"InstanceIds": ["i-1"]})
        );
    }

    #[tokio::test]
    async fn stop_returns_first_instance() {
        let rec = Recorder::new();
        rec.reply(
            "StopInstances",
            json!({"StoppingInstances": [{"InstanceId": "i-1"}, {"InstanceId": "i-2"}]}),
        );
        let mut cmd = StopInstance::new(apis(&rec).ec2);
        let out = run(&mut cmd, &[("ids", Value::list(["i-1", "i-2"]))])
            .await
            .unwrap();
        assert_eq!(out, "i-1");
    }

    #[tokio::test]
    async fn check_maps_not_found() {
        set_poll_interval(Duration::from_millis(1));
        let rec = Recorder::new();
        rec.fail("DescribeInstances", "InvalidInstanceID.NotFound");
        let mut cmd = CheckInstance::new(apis(&rec).ec2);
        let params = [
            ("id", Value::str("i-1")),
            ("state", Value::str("not-found")),
            ("timeout", Value::Int(1)),
        ];
        assert_eq!(run(&mut cmd, &params).await.unwrap(), "");
    }

    #[tokio::test]
    async fn check_reads_instance_state() {
        set_poll_interval(Duration::from_millis(1));
        let rec = Recorder::new();
        rec.reply(
            "DescribeInstances",
            json!({"Reservations": [{"Instances": [{"InstanceId": "i-1", "State": {"Name": "pending"}}]}]}),
        )
        .reply(
            "DescribeInstances",
            json!({"Reservations": [{"Instances": [{"InstanceId": "i-1", "State": {"Name": "running"}}]}]}),
        );
        let mut cmd = CheckInstance::new(apis(&rec).ec2);
        let params = [
            ("id", Value::str("i-1")),
            ("state", Value::str("running")),
            ("timeout", Value::Int(2)),
        ];
        run(&mut cmd, &params).await.unwrap();
        assert_eq!(rec.calls().len(), 2);
    }

    #[tokio::test]
    async fn check_rejects_negative_timeout() {
        let rec = Recorder::new();
        let mut cmd = CheckInstance::new(apis(&rec).ec2);
        let params = [
            ("id", Value::str("i-1")),
            ("state", Value::str("running")),
            ("timeout", Value::Int(-5)),
        ];
        let err = run(&mut cmd, &params).await.unwrap_err();
        assert!(matches!(err, CommandError::InvalidParam { ref key, .. } if key == "timeout"));
        assert!(rec.calls().is_empty());
    }

    #[tokio::test]
    async fn attach_registers_target_with_port() {
        let rec = Recorder::new();
        let mut cmd = AttachInstance::new(apis(&rec).elbv2);
        run(
            &mut cmd,
            &[
                ("id", Value::str("i-1")),
                ("targetgroup", Value::str("arn:tg")),
                ("port", Value::Int(8080)),
            ],
        )
        .await
        .unwrap();
        assert_eq!(
            rec.input("RegisterTargets"),
            json!({"TargetGroupArn": "arn:tg", "Targets": [{"Id": "i-1", "Port": 8080}]})
        );
    }
}
