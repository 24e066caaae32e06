//! Reference resolution, factory swapping and dry runs through the harness.

use serde_json::json;
use stratus_acceptance::{Acceptance, AcceptanceError};
use stratus_core::Value;

const CREATE: &str = "x = create instance count=1 image=ami-1 subnet=sub-1 type=t2.nano name=n";

fn create_returning_new_id(src: &str) -> Acceptance {
    Acceptance::template(src).respond("RunInstances", json!({"Instances": [{"InstanceId": "new-id"}]}))
}

#[tokio::test]
async fn reference_is_substituted_with_result() {
    let harness = create_returning_new_id(&format!("{CREATE}\nstop instance id=$x"));
    let mock = harness.mock();
    harness.run().await.unwrap();
    assert_eq!(mock.inputs("StopInstances"), vec![json!({"InstanceIds": ["new-id"]})]);
}

#[tokio::test]
async fn reference_inside_list_keeps_position() {
    create_returning_new_id(&format!("{CREATE}\nstop instance id=[id-1234,$x,id-2345]"))
        .expect_input(
            "StopInstances",
            json!({"InstanceIds": ["id-1234", "new-id", "id-2345"]}),
        )
        .run()
        .await
        .unwrap();
}

#[tokio::test]
async fn swapped_factory_sees_every_call() {
    let harness = create_returning_new_id(&format!("{CREATE}\nstart instance ids=$x\nstop instance ids=$x"));
    let mock = harness.mock();
    harness.run().await.unwrap();
    let calls = mock.calls();
    assert_eq!(calls.get("RunInstances"), Some(&1));
    assert_eq!(calls.get("CreateTagsRequest"), Some(&1));
    assert_eq!(calls.get("StartInstances"), Some(&1));
    assert_eq!(calls.get("StopInstances"), Some(&1));
    assert_eq!(calls.len(), 4);
}

#[tokio::test]
async fn wrong_input_is_reported_as_diff() {
    let err = Acceptance::template("delete vpc id=vpc-2")
        .expect_input("DeleteVpc", json!({"VpcId": "vpc-1"}))
        .run()
        .await
        .unwrap_err();
    match err {
        AcceptanceError::InputMismatch(lines) => {
            assert_eq!(lines, vec!["DeleteVpc: $.VpcId: expected \"vpc-1\", got \"vpc-2\""]);
        }
        other => panic!("unexpected {other}"),
    }
}

#[tokio::test]
async fn unexpected_call_count_fails() {
    let err = Acceptance::template("delete vpc id=vpc-1\ndelete vpc id=vpc-2")
        .expect_calls(&["DeleteVpc"])
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, AcceptanceError::CallsMismatch { .. }), "{err}");
}

#[tokio::test]
async fn dry_run_calls_nothing() {
    let harness = Acceptance::template(&format!("{CREATE}\nstop instance id=$x\ncreate bucket name=b"))
        .dry_run()
        .expect_calls(&[]);
    let mock = harness.mock();
    let exec = harness.run().await.unwrap();
    assert!(mock.calls().is_empty());
    assert!(exec.commands[0].result.as_deref().unwrap().starts_with("i-"));
    assert!(exec.commands.iter().all(|c| c.result.is_some()));
}

#[tokio::test]
async fn filler_answers_hole() {
    Acceptance::template("create vpc cidr={vpc.cidr}")
        .filler("vpc.cidr", Value::str("10.0.0.0/16"))
        .respond("CreateVpc", json!({"Vpc": {"VpcId": "vpc-9"}}))
        .expect_input("CreateVpc", json!({"CidrBlock": "10.0.0.0/16"}))
        .expect_command_result("vpc-9")
        .run()
        .await
        .unwrap();
}

#[tokio::test]
async fn fatal_failure_stops_template() {
    let harness = Acceptance::template("create vpc cidr=10.0.0.0/16\ncreate bucket name=b")
        .fail("CreateVpc", "VpcLimitExceeded", "too many vpcs")
        .expect_error("too many vpcs");
    let mock = harness.mock();
    let exec = harness.run().await.unwrap();
    assert!(exec.has_errors());
    assert!(!mock.calls().contains_key("CreateBucket"));
}

#[tokio::test]
async fn deleting_a_missing_resource_does_not_stop_template() {
    let harness = Acceptance::template("delete vpc id=vpc-gone\ncreate bucket name=b")
        .fail("DeleteVpc", "InvalidVpcID.NotFound", "vpc is gone")
        .expect_error("vpc is gone")
        .expect_calls(&["DeleteVpc", "CreateBucket"]);
    let exec = harness.run().await.unwrap();
    assert!(exec.has_errors());
    assert_eq!(exec.commands.len(), 2);
    assert_eq!(exec.commands[1].result.as_deref(), Some("b"));
}

#[tokio::test]
async fn unknown_command_fails_to_compile() {
    let err = Acceptance::template("create unicorn name=x").run().await.unwrap_err();
    assert!(matches!(err, AcceptanceError::Compile(_)), "{err}");
}
