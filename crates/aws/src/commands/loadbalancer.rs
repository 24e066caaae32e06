//! Application load balancers and their target groups.

use std::sync::Arc;

use async_trait::async_trait;
use stratus_core::params::Validators;
use stratus_core::poll::{poll_until, timeout_secs};
use stratus_core::value::required;
use stratus_core::{Command, CommandError, Injector, ParamMap, Rule, RunContext};

use super::{check_rule, check_validators, NOT_FOUND};
use crate::api::{
    CreateLoadBalancerInput, CreateTargetGroupInput, DescribeLoadBalancersInput, Elbv2Api,
    LoadBalancerArnInput, Matcher, TargetGroupArnInput,
};

pub const LOADBALANCER_STATES: &[&str] = &["provisioning", "active", "failed", NOT_FOUND];

pub struct CreateLoadBalancer {
    api: Arc<dyn Elbv2Api>,
    input: CreateLoadBalancerInput,
}

impl CreateLoadBalancer {
    pub fn new(api: Arc<dyn Elbv2Api>) -> Self {
        CreateLoadBalancer {
            api,
            input: CreateLoadBalancerInput::default(),
        }
    }
}

#[async_trait]
impl Command for CreateLoadBalancer {
    descriptor!("create", "loadbalancer", "elbv2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![
            Rule::key("name"),
            Rule::key("subnets"),
            Rule::opt(&["iptype", "scheme", "securitygroups", "type"]),
        ])
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        self.input = CreateLoadBalancerInput {
            name: required(p.string("name")?, "name")?,
            subnets: required(p.strings("subnets")?, "subnets")?,
            security_groups: p.strings("securitygroups")?.unwrap_or_default(),
            scheme: p.string("scheme")?,
            ip_address_type: p.string("iptype")?,
            kind: p.string("type")?,
        };
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let out = self.api.create_load_balancer(self.input.clone()).await?;
        out.load_balancers
            .into_iter()
            .next()
            .map(|lb| lb.load_balancer_arn)
            .ok_or_else(|| CommandError::Other("no load balancer created".into()))
    }
}

pub struct DeleteLoadBalancer {
    api: Arc<dyn Elbv2Api>,
    input: LoadBalancerArnInput,
}

impl DeleteLoadBalancer {
    pub fn new(api: Arc<dyn Elbv2Api>) -> Self {
        DeleteLoadBalancer {
            api,
            input: LoadBalancerArnInput::default(),
        }
    }
}

#[async_trait]
impl Command for DeleteLoadBalancer {
    descriptor!("delete", "loadbalancer", "elbv2");

    fn params_rule(&self) -> Rule {
        Rule::key("id")
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.input.load_balancer_arn = required(Injector::new(params).string("id")?, "id")?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.delete_load_balancer(self.input.clone()).await?;
        Ok(String::new())
    }
}

pub struct CheckLoadBalancer {
    api: Arc<dyn Elbv2Api>,
    id: String,
    state: String,
    timeout: u64,
}

impl CheckLoadBalancer {
    pub fn new(api: Arc<dyn Elbv2Api>) -> Self {
        CheckLoadBalancer {
            api,
            id: String::new(),
            state: String::new(),
            timeout: 0,
        }
    }
}

#[async_trait]
impl Command for CheckLoadBalancer {
    descriptor!("check", "loadbalancer", "elbv2");

    fn params_rule(&self) -> Rule {
        check_rule()
    }

    fn validators(&self) -> Validators {
        check_validators(LOADBALANCER_STATES)
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
            let input = DescribeLoadBalancersInput {
                load_balancer_arns: vec![id.to_string()],
            };
            match api.describe_load_balancers(input).await {
                Err(e) if e.is_not_found() => Ok(NOT_FOUND.to_string()),
                Err(e) => Err(e.into()),
                Ok(out) => Ok(out
                    .load_balancers
                    .into_iter()
                    .find(|lb| lb.load_balancer_arn == id)
                    .map(|lb| lb.state.code)
                    .unwrap_or_else(|| NOT_FOUND.to_string())),
            }
        })
        .await?;
        Ok(String::new())
    }
}

// ──────────────────────────────────────────────
// Target groups
// ──────────────────────────────────────────────

pub struct CreateTargetGroup {
    api: Arc<dyn Elbv2Api>,
    input: CreateTargetGroupInput,
}

impl CreateTargetGroup {
    pub fn new(api: Arc<dyn Elbv2Api>) -> Self {
        CreateTargetGroup {
            api,
            input: CreateTargetGroupInput::default(),
        }
    }
}

#[async_trait]
impl Command for CreateTargetGroup {
    descriptor!("create", "targetgroup", "elbv2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![
            Rule::key("name"),
            Rule::key("port"),
            Rule::key("protocol"),
            Rule::key("vpc"),
            Rule::opt(&[
                "healthcheckinterval",
                "healthcheckpath",
                "healthythreshold",
                "unhealthythreshold",
                "matcher",
            ]),
        ])
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        self.input = CreateTargetGroupInput {
            name: required(p.string("name")?, "name")?,
            port: required(p.int("port")?, "port")?,
            protocol: required(p.string("protocol")?, "protocol")?,
            vpc_id: required(p.string("vpc")?, "vpc")?,
            health_check_path: p.string("healthcheckpath")?,
            health_check_interval_seconds: p.int("healthcheckinterval")?,
            healthy_threshold_count: p.int("healthythreshold")?,
            unhealthy_threshold_count: p.int("unhealthythreshold")?,
            matcher: p.string("matcher")?.map(|http_code| Matcher { http_code }),
        };
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let out = self.api.create_target_group(self.input.clone()).await?;
        out.target_groups
            .into_iter()
            .next()
            .map(|tg| tg.target_group_arn)
            .ok_or_else(|| CommandError::Other("no target group created".into()))
    }
}

pub struct DeleteTargetGroup {
    api: Arc<dyn Elbv2Api>,
    input: TargetGroupArnInput,
}

impl DeleteTargetGroup {
    pub fn new(api: Arc<dyn Elbv2Api>) -> Self {
        DeleteTargetGroup {
            api,
            input: TargetGroupArnInput::default(),
        }
    }
}

#[async_trait]
impl Command for DeleteTargetGroup {
    descriptor!("delete", "targetgroup", "elbv2");

    fn params_rule(&self) -> Rule {
        Rule::key("id")
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.input.target_group_arn = required(Injector::new(params).string("id")?, "id")?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.delete_target_group(self.input.clone()).await?;
        Ok(String::new())
    }
}
