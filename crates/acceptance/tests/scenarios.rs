//! End-to-end scenarios: one template, the provider calls it must make.

use serde_json::json;
use stratus_acceptance::Acceptance;

#[tokio::test]
async fn create_bucket_with_acl() {
    Acceptance::template("create bucket name=my-new-bucket acl=public-read")
        .expect_input(
            "CreateBucket",
            json!({"Bucket": "my-new-bucket", "ACL": "public-read"}),
        )
        .expect_calls(&["CreateBucket"])
        .expect_command_result("my-new-bucket")
        .run()
        .await
        .unwrap();
}

#[tokio::test]
async fn delete_several_alarms_at_once() {
    Acceptance::template("delete alarm name=alarm1,alarm2")
        .expect_input("DeleteAlarms", json!({"AlarmNames": ["alarm1", "alarm2"]}))
        .expect_calls(&["DeleteAlarms"])
        .run()
        .await
        .unwrap();
}

#[tokio::test]
async fn create_route_to_gateway() {
    Acceptance::template("create route table=table-id cidr=10.0.0.0/16 gateway=igw-id")
        .expect_input(
            "CreateRoute",
            json!({
                "RouteTableId": "table-id",
                "DestinationCidrBlock": "10.0.0.0/16",
                "GatewayId": "igw-id"
            }),
        )
        .expect_calls(&["CreateRoute"])
        .run()
        .await
        .unwrap();
}

#[tokio::test]
async fn attach_instanceprofile_replaces_existing_association() {
    Acceptance::template("attach instanceprofile name=my-profile instance=i-12345 replace=true")
        .respond(
            "DescribeIamInstanceProfileAssociations",
            json!({"IamInstanceProfileAssociations": [
                {"AssociationId": "assoc-1", "InstanceId": "i-12345"}
            ]}),
        )
        .expect_input(
            "DescribeIamInstanceProfileAssociations",
            json!({"Filters": [
                {"Name": "instance-id", "Values": ["i-12345"]},
                {"Name": "state", "Values": ["associated"]}
            ]}),
        )
        .expect_input(
            "ReplaceIamInstanceProfileAssociation",
            json!({"AssociationId": "assoc-1", "IamInstanceProfile": {"Name": "my-profile"}}),
        )
        .expect_calls(&[
            "DescribeIamInstanceProfileAssociations",
            "ReplaceIamInstanceProfileAssociation",
        ])
        .run()
        .await
        .unwrap();
}

#[tokio::test]
async fn attach_instanceprofile_without_association_associates() {
    Acceptance::template("attach instanceprofile name=my-profile instance=i-12345 replace=true")
        .expect_input(
            "AssociateIamInstanceProfile",
            json!({"IamInstanceProfile": {"Name": "my-profile"}, "InstanceId": "i-12345"}),
        )
        .expect_calls(&[
            "DescribeIamInstanceProfileAssociations",
            "AssociateIamInstanceProfile",
        ])
        .run()
        .await
        .unwrap();
}

#[tokio::test]
async fn authorize_tcp_port_range() {
    Acceptance::template(
        "update securitygroup id=sg-1 inbound=authorize protocol=tcp cidr=10.10.10.0/24 portrange=10-22",
    )
    .expect_input(
        "AuthorizeSecurityGroupIngress",
        json!({
            "GroupId": "sg-1",
            "IpPermissions": [{
                "IpProtocol": "tcp",
                "FromPort": 10,
                "ToPort": 22,
                "IpRanges": [{"CidrIp": "10.10.10.0/24"}]
            }]
        }),
    )
    .expect_calls(&["AuthorizeSecurityGroupIngress"])
    .run()
    .await
    .unwrap();
}

#[tokio::test]
async fn create_then_stop_instance() {
    let src = "inst = create instance count=1 image=ami-1 subnet=sub-1 type=t2.nano name=n\n\
               stop instance id=$inst";
    Acceptance::template(src)
        .respond("RunInstances", json!({"Instances": [{"InstanceId": "new-instance-id"}]}))
        .expect_input(
            "RunInstances",
            json!({
                "ImageId": "ami-1",
                "InstanceType": "t2.nano",
                "MinCount": 1,
                "MaxCount": 1,
                "SubnetId": "sub-1"
            }),
        )
        .expect_input(
            "CreateTagsRequest",
            json!({
                "Resources": ["new-instance-id"],
                "Tags": [{"Key": "Name", "Value": "n"}]
            }),
        )
        .expect_input("StopInstances", json!({"InstanceIds": ["new-instance-id"]}))
        .expect_calls(&["RunInstances", "CreateTagsRequest", "StopInstances"])
        .expect_command_result("new-instance-id")
        .run()
        .await
        .unwrap();
}
