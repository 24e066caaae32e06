//! Security groups: creation, rule updates and instance membership.

use std::sync::Arc;

use async_trait::async_trait;
use stratus_core::params::{is_cidr, is_in_enum_ignore_case, Validators};
use stratus_core::poll::{poll_until, timeout_secs};
use stratus_core::value::{cast_string, required};
use stratus_core::{Command, CommandError, Injector, ParamMap, Rule, RunContext};
use tracing::warn;

use super::{check_rule, fatal_unless_gone};
use crate::api::{
    CreateSecurityGroupInput, DescribeInstancesInput, Ec2Api, Filter, FiltersInput,
    GroupIdInput, GroupIdentifier, IpPermission, IpRange, ModifyInstanceAttributeInput,
    SecurityGroupRulesInput,
};

pub const RULE_ACTIONS: &[&str] = &["authorize", "revoke"];
pub const SECURITYGROUP_STATES: &[&str] = &["unused"];

pub struct CreateSecurityGroup {
    api: Arc<dyn Ec2Api>,
    input: CreateSecurityGroupInput,
}

impl CreateSecurityGroup {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        CreateSecurityGroup {
            api,
            input: CreateSecurityGroupInput::default(),
        }
    }
}

#[async_trait]
impl Command for CreateSecurityGroup {
    descriptor!("create", "securitygroup", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("name"), Rule::key("vpc"), Rule::key("description")])
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        self.input = CreateSecurityGroupInput {
            group_name: required(p.string("name")?, "name")?,
            vpc_id: required(p.string("vpc")?, "vpc")?,
            description: required(p.string("description")?, "description")?,
        };
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        Ok(self.api.create_security_group(self.input.clone()).await?.group_id)
    }
}

// ──────────────────────────────────────────────
// update: ingress and egress rules
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Inbound,
    Outbound,
}

/// Build the permission described by `protocol`, `portrange` and the
/// `cidr` or source `securitygroup`.
fn ip_permission(
    protocol: &str,
    portrange: Option<&str>,
    cidr: Option<String>,
    source: Option<String>,
) -> Result<IpPermission, CommandError> {
    let protocol = protocol.to_lowercase();
    let invalid = |message: String| CommandError::InvalidParam {
        key: "portrange".into(),
        message,
    };

    let (ip_protocol, from, to) = if protocol == "any" || protocol == "-1" {
        ("-1".to_string(), -1, -1)
    } else {
        let (from, to) = match portrange.map(str::trim) {
            None | Some("any") if protocol == "tcp" || protocol == "udp" => (0, 65535),
            None | Some("any") => (-1, -1),
            Some(range) => match range.split_once('-') {
                Some((a, b)) => {
                    let from = a.trim().parse::<i64>().map_err(|e| invalid(e.to_string()))?;
                    let to = b.trim().parse::<i64>().map_err(|e| invalid(e.to_string()))?;
                    (from, to)
                }
                None => {
                    let port = range.parse::<i64>().map_err(|e| invalid(e.to_string()))?;
                    (port, port)
                }
            },
        };
        (protocol, from, to)
    };

    Ok(IpPermission {
        ip_protocol,
        from_port: Some(from),
        to_port: Some(to),
        ip_ranges: cidr.into_iter().map(|cidr_ip| IpRange { cidr_ip }).collect(),
        user_id_group_pairs: source
            .into_iter()
            .map(|group_id| GroupIdentifier { group_id })
            .collect(),
    })
}

pub struct UpdateSecurityGroup {
    api: Arc<dyn Ec2Api>,
    direction: Direction,
    authorize: bool,
    input: SecurityGroupRulesInput,
}

impl UpdateSecurityGroup {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        UpdateSecurityGroup {
            api,
            direction: Direction::Inbound,
            authorize: true,
            input: SecurityGroupRulesInput::default(),
        }
    }
}

#[async_trait]
impl Command for UpdateSecurityGroup {
    descriptor!("update", "securitygroup", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![
            Rule::key("id"),
            Rule::key("protocol"),
            Rule::only_one_of(vec![Rule::key("inbound"), Rule::key("outbound")]),
            Rule::only_one_of(vec![Rule::key("cidr"), Rule::key("securitygroup")]),
            Rule::opt(&["portrange"]),
        ])
    }

    fn validators(&self) -> Validators {
        Validators::new()
            .with("cidr", is_cidr())
            .with("inbound", is_in_enum_ignore_case(RULE_ACTIONS))
            .with("outbound", is_in_enum_ignore_case(RULE_ACTIONS))
            .with(
                "protocol",
                Box::new(|value, params| {
                    let protocol = cast_string(value).to_lowercase();
                    if (protocol == "tcp" || protocol == "udp") && !params.contains_key("portrange")
                    {
                        return Err("missing 'portrange' when protocol is TCP/UDP".to_string());
                    }
                    Ok(())
                }),
            )
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        let (direction, action) = match (p.string("inbound")?, p.string("outbound")?) {
            (Some(action), _) => (Direction::Inbound, action),
            (None, Some(action)) => (Direction::Outbound, action),
            (None, None) => return Err(CommandError::MissingParam("inbound".into())),
        };
        self.direction = direction;
        self.authorize = match action.to_lowercase().as_str() {
            "authorize" => true,
            "revoke" => false,
            other => {
                return Err(CommandError::InvalidParam {
                    key: "inbound".into(),
                    message: format!("expected authorize or revoke, got '{}'", other),
                })
            }
        };

        let protocol = required(p.string("protocol")?, "protocol")?;
        let portrange = p.string("portrange")?;
        let permission = ip_permission(
            &protocol,
            portrange.as_deref(),
            p.string("cidr")?,
            p.string("securitygroup")?,
        )?;
        self.input = SecurityGroupRulesInput {
            group_id: required(p.string("id")?, "id")?,
            ip_permissions: vec![permission],
        };
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let input = self.input.clone();
        match (self.direction, self.authorize) {
            (Direction::Inbound, true) => self.api.authorize_security_group_ingress(input).await?,
            (Direction::Inbound, false) => self.api.revoke_security_group_ingress(input).await?,
            (Direction::Outbound, true) => self.api.authorize_security_group_egress(input).await?,
            (Direction::Outbound, false) => self.api.revoke_security_group_egress(input).await?,
        };
        Ok(String::new())
    }
}

pub struct DeleteSecurityGroup {
    api: Arc<dyn Ec2Api>,
    input: GroupIdInput,
}

impl DeleteSecurityGroup {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        DeleteSecurityGroup {
            api,
            input: GroupIdInput::default(),
        }
    }
}

#[async_trait]
impl Command for DeleteSecurityGroup {
    descriptor!("delete", "securitygroup", "ec2");

    fn is_fatal(&self, err: &CommandError) -> bool {
        fatal_unless_gone(err)
    }

    fn params_rule(&self) -> Rule {
        Rule::key("id")
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.input.group_id = required(Injector::new(params).string("id")?, "id")?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.delete_security_group(self.input.clone()).await?;
        Ok(String::new())
    }
}

/// Waits until no network interface references the group.
pub struct CheckSecurityGroup {
    api: Arc<dyn Ec2Api>,
    id: String,
    state: String,
    timeout: u64,
}

impl CheckSecurityGroup {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        CheckSecurityGroup {
            api,
            id: String::new(),
            state: String::new(),
            timeout: 0,
        }
    }
}

#[async_trait]
impl Command for CheckSecurityGroup {
    descriptor!("check", "securitygroup", "ec2");

    fn params_rule(&self) -> Rule {
        check_rule()
    }

    fn validators(&self) -> Validators {
        super::check_validators(SECURITYGROUP_STATES)
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
            let out = api
                .describe_network_interfaces(FiltersInput {
                    filters: vec![Filter::new("group-id", &[id])],
                })
                .await?;
            if out.network_interfaces.is_empty() {
                return Ok("unused".to_string());
            }
            let users: Vec<&str> = out
                .network_interfaces
                .iter()
                .map(|n| n.network_interface_id.as_str())
                .collect();
            Ok(format!("used by {}", users.join(", ")))
        })
        .await?;
        Ok(String::new())
    }
}

// ──────────────────────────────────────────────
// attach / detach on instances
// ──────────────────────────────────────────────

async fn instance_groups(api: &dyn Ec2Api, instance: &str) -> Result<Vec<String>, CommandError> {
    let out = api
        .describe_instances(DescribeInstancesInput {
            instance_ids: vec![instance.to_string()],
            ..Default::default()
        })
        .await?;
    let found = out
        .instances()
        .find(|i| i.instance_id == instance)
        .ok_or_else(|| CommandError::Other(format!("instance '{}' not found", instance)))?;
    Ok(found
        .security_groups
        .iter()
        .map(|g| g.group_id.clone())
        .collect())
}

async fn set_instance_groups(
    api: &dyn Ec2Api,
    instance: &str,
    groups: Vec<String>,
) -> Result<(), CommandError> {
    api.modify_instance_attribute(ModifyInstanceAttributeInput {
        instance_id: instance.to_string(),
        groups: Some(groups),
        ..Default::default()
    })
    .await?;
    Ok(())
}

fn membership(params: &ParamMap) -> Result<(String, String), CommandError> {
    let p = Injector::new(params);
    Ok((
        required(p.string("id")?, "id")?,
        required(p.string("instance")?, "instance")?,
    ))
}

pub struct AttachSecurityGroup {
    api: Arc<dyn Ec2Api>,
    id: String,
    instance: String,
}

impl AttachSecurityGroup {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        AttachSecurityGroup {
            api,
            id: String::new(),
            instance: String::new(),
        }
    }
}

#[async_trait]
impl Command for AttachSecurityGroup {
    descriptor!("attach", "securitygroup", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("id"), Rule::key("instance")])
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        (self.id, self.instance) = membership(params)?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let mut groups = instance_groups(self.api.as_ref(), &self.instance).await?;
        if !groups.contains(&self.id) {
            groups.push(self.id.clone());
        }
        set_instance_groups(self.api.as_ref(), &self.instance, groups).await?;
        Ok(String::new())
    }
}

pub struct DetachSecurityGroup {
    api: Arc<dyn Ec2Api>,
    id: String,
    instance: String,
}

impl DetachSecurityGroup {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        DetachSecurityGroup {
            api,
            id: String::new(),
            instance: String::new(),
        }
    }
}

#[async_trait]
impl Command for DetachSecurityGroup {
    descriptor!("detach", "securitygroup", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("id"), Rule::key("instance")])
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        (self.id, self.instance) = membership(params)?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let mut groups = instance_groups(self.api.as_ref(), &self.instance).await?;
        groups.retain(|g| g != &self.id);
        if groups.is_empty() {
            warn!(
                instance = %self.instance,
                group = %self.id,
                "detach securitygroup: instance would be left without any group"
            );
        }
        set_instance_groups(self.api.as_ref(), &self.instance, groups).await?;
        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use stratus_core::Value;

    use super::*;
    use crate::testing::{apis, run, Recorder};

    #[test]
    fn port_ranges() {
        let p = ip_permission("tcp", Some("10-22"), None, None).unwrap();
        assert_eq!((p.from_port, p.to_port), (Some(10), Some(22)));
        let p = ip_permission("udp", Some("any"), None, None).unwrap();
        assert_eq!((p.from_port, p.to_port), (Some(0), Some(65535)));
        let p = ip_permission("icmp", Some("any"), None, None).unwrap();
        assert_eq!((p.from_port, p.to_port), (Some(-1), Some(-1)));
        let p = ip_permission("any", Some("80"), None, None).unwrap();
        assert_eq!(p.ip_protocol, "-1");
        let p = ip_permission("tcp", Some("443"), None, None).unwrap();
        assert_eq!((p.from_port, p.to_port), (Some(443), Some(443)));
        assert!(ip_permission("tcp", Some("a-b"), None, None).is_err());
    }

    #[test]
    fn tcp_requires_portrange() {
        let cmd = UpdateSecurityGroup::new(apis(&Recorder::new()).ec2);
        let mut values = ParamMap::new();
        values.insert("protocol".into(), Value::str("TCP"));
        let err = cmd.validators().validate(&values).unwrap_err();
        assert!(err
            .details()
            .contains("missing 'portrange' when protocol is TCP/UDP"));
        values.insert("portrange".into(), Value::str("22"));
        assert!(cmd.validators().validate(&values).is_ok());
    }

    #[tokio::test]
    async fn update_authorizes_ingress() {
        let rec = Recorder::new();
        let mut cmd = UpdateSecurityGroup::new(apis(&rec).ec2);
        run(
            &mut cmd,
            &[
                ("id", Value::str("sg-1")),
                ("protocol", Value::str("tcp")),
                ("inbound", Value::str("authorize")),
                ("cidr", Value::str("10.0.0.0/16")),
                ("portrange", Value::str("10-22")),
            ],
        )
        .await
        .unwrap();
        assert_eq!(
            rec.input("AuthorizeSecurityGroupIngress"),
            json!({
                "GroupId": "sg-1",
                "IpPermissions": [{
                    "IpProtocol": "tcp",
                    "FromPort": 10,
                    "ToPort": 22,
                    "IpRanges": [{"CidrIp": "10.0.0.0/16"}]
                }]
            })
        );
    }

    #[tokio::test]
    async fn update_revokes_egress() {
        let rec = Recorder::new();
        let mut cmd = UpdateSecurityGroup::new(apis(&rec).ec2);
        run(
            &mut cmd,
            &[
                ("id", Value::str("sg-1")),
                ("protocol", Value::str("any")),
                ("outbound", Value::str("revoke")),
                ("securitygroup", Value::str("sg-2")),
            ],
        )
        .await
        .unwrap();
        assert_eq!(rec.call_names(), vec!["RevokeSecurityGroupEgress"]);
    }

    #[tokio::test]
    async fn check_reports_users() {
        let rec = Recorder::new();
        rec.reply(
            "DescribeNetworkInterfaces",
            json!({"NetworkInterfaces": [{"NetworkInterfaceId": "eni-1"}]}),
        );
        let mut cmd = CheckSecurityGroup::new(apis(&rec).ec2);
        let err = run(
            &mut cmd,
            &[
                ("id", Value::str("sg-1")),
                ("state", Value::str("unused")),
                ("timeout", Value::Int(0)),
            ],
        )
        .await
        .unwrap_err();
        assert_eq!(err, CommandError::Timeout(0));
        assert_eq!(
            rec.input("DescribeNetworkInterfaces"),
            json!({"Filters": [{"Name": "group-id", "Values": ["sg-1"]}]})
        );
    }

    #[tokio::test]
    async fn attach_appends_group() {
        let rec = Recorder::new();
        rec.reply(
            "DescribeInstances",
            json!({"Reservations": [{"Instances": [{"InstanceId": "i-1", "SecurityGroups": [{"GroupId": "sg-0"}]}]}]}),
        );
        let mut cmd = AttachSecurityGroup::new(apis(&rec).ec2);
        run(
            &mut cmd,
            &[("id", Value::str("sg-1")), ("instance", Value::str("i-1"))],
        )
        .await
        .unwrap();
        assert_eq!(
            rec.input("ModifyInstanceAttribute"),
            json!({"InstanceId": "i-1", "Groups": ["sg-0", "sg-1"]})
        );
    }

    #[tokio::test]
    async fn detach_removes_group() {
        let rec = Recorder::new();
        rec.reply(
            "DescribeInstances",
            json!({"Reservations": [{"Instances": [{"InstanceId": "i-1", "SecurityGroups": [{"GroupId": "sg-0"}, {"GroupId": "sg-1"}]}]}]}),
        );
        let mut cmd = DetachSecurityGroup::new(apis(&rec).ec2);
        run(
            &mut cmd,
            &[("id", Value::str("sg-1")), ("instance", Value::str("i-1"))],
        )
        .await
        .unwrap();
        assert_eq!(
            rec.input("ModifyInstanceAttribute"),
            json!({"InstanceId": "i-1", "Groups": ["sg-0"]})
        );
    }
}
