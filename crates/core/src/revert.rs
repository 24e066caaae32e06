//! Build the template that undoes a recorded execution.
//!
//! Commands are visited last to first. Each revertible command maps to its
//! inverse, optionally surrounded by `check` commands that wait for the
//! provider to settle before the next step.

use crate::ast::{CommandNode, Node, ParamValue, Statement, Template};
use crate::error::Error;
use crate::execution::{CommandRecord, Execution};
use crate::value::{cast_string_list, Value};

/// The reverse template of `exec`.
///
/// Dry runs, and executions where nothing succeeded in a revertible way,
/// cannot be reverted.
pub fn revert(exec: &Execution) -> Result<Template, Error> {
    if exec.dry_run {
        return Err(Error::Compile(format!(
            "execution {} is a dry run and cannot be reverted",
            exec.id
        )));
    }

    let mut nodes = Vec::new();
    let count = exec.commands.len();
    for (i, rec) in exec.commands.iter().rev().enumerate() {
        if !is_revertible(rec) {
            continue;
        }
        let not_last = i != count - 1;
        nodes.extend(pre_checks(rec));
        nodes.push(inverse(rec));
        if not_last {
            nodes.extend(post_check(rec));
        }
    }

    if nodes.is_empty() {
        return Err(Error::Compile(format!(
            "execution {} has no revertible command",
            exec.id
        )));
    }

    let statements = nodes
        .into_iter()
        .enumerate()
        .map(|(i, node)| Statement {
            node: Node::Command(node),
            line: i as u32 + 1,
        })
        .collect();
    Ok(Template { statements })
}

/// Source text of [`revert`].
pub fn revert_source(exec: &Execution) -> Result<String, Error> {
    revert(exec).map(|t| t.to_string())
}

pub fn is_revertible(rec: &CommandRecord) -> bool {
    if rec.error.is_some() || rec.action == "check" {
        return false;
    }
    let (action, entity) = (rec.action.as_str(), rec.entity.as_str());
    match (action, entity) {
        ("detach", "routetable") => false,
        ("create" | "delete", "instanceprofile")
        | ("start" | "stop", "alarm")
        | ("update", "securitygroup")
        | ("create", "tag" | "route")
        | ("attach" | "detach", _) => true,
        ("create" | "start" | "stop" | "copy", _) => {
            rec.result.as_deref().is_some_and(|r| !r.is_empty())
        }
        _ => false,
    }
}

fn inverse_action(action: &str) -> &str {
    match action {
        "create" | "copy" => "delete",
        "start" => "stop",
        "stop" => "start",
        "attach" => "detach",
        "detach" => "attach",
        "delete" => "create",
        other => other,
    }
}

fn inverse(rec: &CommandRecord) -> CommandNode {
    let mut node = CommandNode::new(inverse_action(&rec.action), &rec.entity);
    let result = || Value::str(rec.result.clone().unwrap_or_default());
    let input = |key: &str| rec.inputs.get(key).cloned().unwrap_or_else(|| Value::str(""));
    let all_except = |skip: &[&str]| -> Vec<(String, Value)> {
        rec.inputs
            .iter()
            .filter(|(k, _)| !skip.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    };

    let params: Vec<(String, Value)> = match (rec.action.as_str(), rec.entity.as_str()) {
        ("attach", "routetable" | "elasticip") => vec![("association".into(), result())],
        ("attach", "instance") => all_except(&["port"]),
        ("attach", "instanceprofile") => all_except(&["replace"]),
        ("detach", "volume") => all_except(&["force"]),
        ("attach" | "detach" | "start" | "stop", _) => all_except(&[]),
        ("create", "tag") => all_except(&[]),
        ("create", "route") => all_except(&["gateway"]),
        ("create", "policy") => vec![
            ("arn".into(), result()),
            ("all-versions".into(), Value::Bool(true)),
        ],
        ("create", "group" | "user" | "instanceprofile") => {
            vec![("name".into(), input("name"))]
        }
        ("create", "accesskey") => vec![("id".into(), result()), ("user".into(), input("user"))],
        ("create", "bucket" | "alarm" | "keypair") => vec![("name".into(), result())],
        ("delete", "instanceprofile") => vec![("name".into(), input("name"))],
        ("copy", "image") => vec![
            ("id".into(), result()),
            ("delete-snapshots".into(), Value::Bool(true)),
        ],
        ("update", "securitygroup") => rec
            .inputs
            .iter()
            .map(|(k, v)| match (k.as_str(), v.as_str()) {
                ("inbound" | "outbound", Some("authorize")) => (k.clone(), Value::str("revoke")),
                ("inbound" | "outbound", Some("revoke")) => (k.clone(), Value::str("authorize")),
                _ => (k.clone(), v.clone()),
            })
            .collect(),
        _ => vec![("id".into(), result())],
    };

    for (k, v) in params {
        node.params.insert(k, ParamValue::Literal(v));
    }
    node
}

fn check(entity: &str, id: Value, state: &str, timeout: i64) -> CommandNode {
    let mut node = CommandNode::new("check", entity);
    node.params.insert("id".into(), ParamValue::Literal(id));
    node.params
        .insert("state".into(), ParamValue::Literal(Value::str(state)));
    node.params
        .insert("timeout".into(), ParamValue::Literal(Value::Int(timeout)));
    node
}

fn pre_checks(rec: &CommandRecord) -> Vec<CommandNode> {
    let result = Value::str(rec.result.clone().unwrap_or_default());
    match (rec.action.as_str(), rec.entity.as_str()) {
        ("create", "securitygroup") => vec![check("securitygroup", result, "unused", 300)],
        (action @ ("start" | "stop"), "instance") => {
            let state = if action == "start" { "running" } else { "stopped" };
            rec.inputs
                .get("ids")
                .or_else(|| rec.inputs.get("id"))
                .map(cast_string_list)
                .unwrap_or_default()
                .into_iter()
                .map(|id| check("instance", Value::Str(id), state, 180))
                .collect()
        }
        _ => Vec::new(),
    }
}

fn post_check(rec: &CommandRecord) -> Option<CommandNode> {
    let result = || Value::str(rec.result.clone().unwrap_or_default());
    match (rec.action.as_str(), rec.entity.as_str()) {
        ("create", "instance") => Some(check("instance", result(), "terminated", 180)),
        ("create", "loadbalancer") => Some(check("loadbalancer", result(), "not-found", 180)),
        ("attach", "volume") => rec
            .inputs
            .get("id")
            .map(|id| check("volume", id.clone(), "available", 180)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::{ExecutionMeta, ExecutionStatus};
    use crate::value::ParamMap;

    /// `(command text, result, error)` triples, in execution order.
    fn exec(cmds: &[(&str, Option<&str>, Option<&str>)]) -> Execution {
        let mut exec = Execution::start("tid", "", ExecutionMeta::default(), false);
        for (text, result, error) in cmds {
            let template = crate::parser::parse(text).unwrap();
            let node = template.commands().next().unwrap().clone();
            let inputs: ParamMap = node.literal_params();
            exec.commands.push(CommandRecord {
                line: 1,
                action: node.action.clone(),
                entity: node.entity.clone(),
                binding: None,
                text: node.to_string(),
                inputs,
                result: result.map(String::from),
                error: error.map(String::from),
            });
        }
        exec.finish(ExecutionStatus::Success);
        exec
    }

    fn reverted(cmds: &[(&str, Option<&str>, Option<&str>)]) -> String {
        revert_source(&exec(cmds)).unwrap()
    }

    #[test]
    fn one_liners() {
        let cases = [
            ("create instanceprofile name=stuff", None, "delete instanceprofile name=stuff"),
            ("delete instanceprofile name=stuff", None, "create instanceprofile name=stuff"),
            (
                "update securitygroup cidr=0.0.0.0/0 id=sg-12345 inbound=authorize portrange=443 protocol=tcp",
                None,
                "update securitygroup cidr=0.0.0.0/0 id=sg-12345 inbound=revoke portrange=443 protocol=tcp",
            ),
            (
                "update securitygroup cidr=0.0.0.0/0 id=sg-12345 outbound=revoke portrange=443 protocol=tcp",
                None,
                "update securitygroup cidr=0.0.0.0/0 id=sg-12345 outbound=authorize portrange=443 protocol=tcp",
            ),
            (
                "stop instance ids=inst-id-1",
                Some("inst-id-1"),
                "check instance id=inst-id-1 state=stopped timeout=180\nstart instance ids=inst-id-1",
            ),
            (
                "start instance ids=inst-id-1,inst-id-2",
                Some("inst-id-1"),
                "check instance id=inst-id-1 state=running timeout=180\ncheck instance id=inst-id-2 state=running timeout=180\nstop instance ids=[inst-id-1,inst-id-2]",
            ),
            (
                "create instanceprofile name='my funny name'",
                None,
                "delete instanceprofile name='my funny name'",
            ),
            ("create user name=bob", Some("AIDA1"), "delete user name=bob"),
            ("create group name=ops", Some("AGPA1"), "delete group name=ops"),
            ("create accesskey user=myuser", Some("AKIA1"), "delete accesskey id=AKIA1 user=myuser"),
            ("create policy name=p", Some("arn:aws:iam::1:policy/p"), "delete policy all-versions=true arn=arn:aws:iam::1:policy/p"),
            ("create bucket name=b", Some("b"), "delete bucket name=b"),
            ("copy image source-id=ami-1 source-region=us-west-1", Some("ami-12345678"), "delete image delete-snapshots=true id=ami-12345678"),
            ("create route cidr=0.0.0.0/0 gateway=igw-12345 table=rtb-12345", None, "delete route cidr=0.0.0.0/0 table=rtb-12345"),
            ("attach instance id=i-123456 port=80 targetgroup=tg", None, "detach instance id=i-123456 targetgroup=tg"),
            ("attach routetable id=rtb-1 subnet=sub-1", Some("rtbassoc-1"), "detach routetable association=rtbassoc-1"),
            ("detach volume device=/dev/sdh force=true id=vol-12345 instance=i-12345", None, "attach volume device=/dev/sdh id=vol-12345 instance=i-12345"),
            ("attach instanceprofile instance=i-1 name=p replace=true", None, "detach instanceprofile instance=i-1 name=p"),
        ];
        for (src, result, expected) in cases {
            assert_eq!(reverted(&[(src, result, None)]), expected, "reverting {src}");
        }
    }

    #[test]
    fn instance_creation_not_first_waits_for_termination() {
        let out = reverted(&[
            ("create subnet cidr=10.0.0.0/24 vpc=vpc-1", Some("sub-1"), None),
            ("create instance type=t2.micro", Some("i-54321"), None),
        ]);
        assert_eq!(
            out,
            "delete instance id=i-54321\ncheck instance id=i-54321 state=terminated timeout=180\ndelete subnet id=sub-1"
        );
    }

    #[test]
    fn failed_and_non_revertible_commands_are_skipped() {
        let out = reverted(&[
            ("attach policy arn=stuff user=mrT", None, None),
            ("create vpc cidr=10.0.0.0/16", Some("vpc-12345"), None),
            ("start instance ids=i-54g3hj", Some("i-54g3hj"), None),
            ("create tag key=Key resource=myinst value=Value", None, None),
            ("check instance id=i-1 state=running timeout=10", None, None),
            ("detach routetable association=a-1", None, None),
            ("create instance image=ami-1", None, Some("cannot create instance")),
        ]);
        assert_eq!(
            out,
            "delete tag key=Key resource=myinst value=Value\n\
             check instance id=i-54g3hj state=running timeout=180\n\
             stop instance ids=i-54g3hj\n\
             delete vpc id=vpc-12345\n\
             detach policy arn=stuff user=mrT"
        );
    }

    #[test]
    fn load_balancer_and_securitygroup_checks() {
        let out = reverted(&[
            ("create securitygroup name=fw", Some("sg-1"), None),
            ("create loadbalancer name=lb", Some("lb-1"), None),
            ("create instance image=ami-1", Some("i-1"), None),
        ]);
        assert_eq!(
            out,
            "delete instance id=i-1\n\
             check instance id=i-1 state=terminated timeout=180\n\
             delete loadbalancer id=lb-1\n\
             check loadbalancer id=lb-1 state=not-found timeout=180\n\
             check securitygroup id=sg-1 state=unused timeout=300\n\
             delete securitygroup id=sg-1"
        );
    }

    #[test]
    fn attach_volume_waits_for_availability() {
        let out = reverted(&[
            ("detach volume device=/dev/sdh id=vol-12345 instance=i-12345", None, None),
            ("attach volume device=/dev/sdh id=vol-12345 instance=i-12345", None, None),
        ]);
        assert_eq!(
            out,
            "detach volume device=/dev/sdh id=vol-12345 instance=i-12345\n\
             check volume id=vol-12345 state=available timeout=180\n\
             attach volume device=/dev/sdh id=vol-12345 instance=i-12345"
        );
    }

    #[test]
    fn results_with_spaces_are_quoted() {
        assert_eq!(
            reverted(&[("create alarm name=x", Some("my alarm"), None)]),
            "delete alarm name='my alarm'"
        );
    }

    #[test]
    fn nothing_to_revert_is_an_error() {
        let err = revert(&exec(&[("create vpc cidr=10.0.0.0/16", None, Some("boom"))])).unwrap_err();
        assert!(err.to_string().contains("has no revertible command"), "{err}");

        let mut dry = exec(&[("create vpc cidr=10.0.0.0/16", Some("vpc-1"), None)]);
        dry.dry_run = true;
        assert!(revert(&dry).unwrap_err().to_string().contains("dry run"));
    }
}
