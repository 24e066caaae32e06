//! Concrete AWS command descriptors.
//!
//! Each command owns the typed provider input it builds during `inject` and
//! the API handle the factory bound at construction. Commands are grouped by
//! resource family; [`builders`] lists every one of them.

use std::sync::Arc;

use stratus_core::params::{is_in_enum_ignore_case, Validators};
use stratus_core::{Command, CommandError, Rule};

use crate::api::Apis;

/// Implement the identity methods of [`Command`].
macro_rules! descriptor {
    ($action:literal, $entity:literal, $handle:literal) => {
        fn action(&self) -> &'static str {
            $action
        }

        fn entity(&self) -> &'static str {
            $entity
        }

        fn handle_kind(&self) -> &'static str {
            $handle
        }
    };
}

pub mod alarm;
pub mod bucket;
pub mod elasticip;
pub mod iam;
pub mod image;
pub mod instance;
pub mod internetgateway;
pub mod keypair;
pub mod loadbalancer;
pub mod routing;
pub mod securitygroup;
pub mod tag;
pub mod volume;
pub mod vpc;
pub mod zone;

/// State reported by `check` commands when the resource is gone.
pub const NOT_FOUND: &str = "not-found";

/// Builds one command with its API handle bound.
pub type Builder = fn(&Apis) -> Box<dyn Command>;

/// `id`, `state` and `timeout`, all required.
pub(crate) fn check_rule() -> Rule {
    Rule::all_of(vec![Rule::key("id"), Rule::key("state"), Rule::key("timeout")])
}

pub(crate) fn check_validators(states: &'static [&'static str]) -> Validators {
    Validators::new().with("state", is_in_enum_ignore_case(states))
}

/// Deleting a resource the provider no longer knows leaves the template
/// running; any other failure stops it.
pub(crate) fn fatal_unless_gone(err: &CommandError) -> bool {
    !matches!(err, CommandError::Provider(e) if e.is_not_found())
}

/// `ids` or a single `id`.
pub(crate) fn ids_rule() -> Rule {
    Rule::only_one_of(vec![Rule::key("ids"), Rule::key("id")])
}

macro_rules! build {
    ($handle:ident => $ty:path) => {
        (|apis: &Apis| -> Box<dyn Command> { Box::new(<$ty>::new(Arc::clone(&apis.$handle))) })
            as Builder
    };
}

/// Every command of the catalogue.
pub fn builders() -> Vec<Builder> {
    vec![
        // instance
        build!(ec2 => instance::CreateInstance),
        build!(ec2 => instance::UpdateInstance),
        build!(ec2 => instance::DeleteInstance),
        build!(ec2 => instance::StartInstance),
        build!(ec2 => instance::StopInstance),
        build!(ec2 => instance::RestartInstance),
        build!(ec2 => instance::CheckInstance),
        build!(elbv2 => instance::AttachInstance),
        build!(elbv2 => instance::DetachInstance),
        // networking
        build!(ec2 => vpc::CreateVpc),
        build!(ec2 => vpc::DeleteVpc),
        build!(ec2 => vpc::CreateSubnet),
        build!(ec2 => vpc::UpdateSubnet),
        build!(ec2 => vpc::DeleteSubnet),
        build!(ec2 => internetgateway::CreateInternetGateway),
        build!(ec2 => internetgateway::DeleteInternetGateway),
        build!(ec2 => internetgateway::AttachInternetGateway),
        build!(ec2 => internetgateway::DetachInternetGateway),
        build!(ec2 => routing::CreateRouteTable),
        build!(ec2 => routing::DeleteRouteTable),
        build!(ec2 => routing::AttachRouteTable),
        build!(ec2 => routing::DetachRouteTable),
        build!(ec2 => routing::CreateRoute),
        build!(ec2 => routing::DeleteRoute),
        build!(ec2 => elasticip::CreateElasticIp),
        build!(ec2 => elasticip::DeleteElasticIp),
        build!(ec2 => elasticip::AttachElasticIp),
        build!(ec2 => elasticip::DetachElasticIp),
        // security groups
        build!(ec2 => securitygroup::CreateSecurityGroup),
        build!(ec2 => securitygroup::UpdateSecurityGroup),
        build!(ec2 => securitygroup::DeleteSecurityGroup),
        build!(ec2 => securitygroup::CheckSecurityGroup),
        build!(ec2 => securitygroup::AttachSecurityGroup),
        build!(ec2 => securitygroup::DetachSecurityGroup),
        // storage and images
        build!(ec2 => keypair::CreateKeypair),
        build!(ec2 => keypair::DeleteKeypair),
        build!(ec2 => volume::CreateVolume),
        build!(ec2 => volume::DeleteVolume),
        build!(ec2 => volume::AttachVolume),
        build!(ec2 => volume::DetachVolume),
        build!(ec2 => volume::CheckVolume),
        build!(ec2 => tag::CreateTag),
        build!(ec2 => tag::DeleteTag),
        build!(ec2 => image::CreateImage),
        build!(ec2 => image::CopyImage),
        build!(ec2 => image::DeleteImage),
        // s3
        build!(s3 => bucket::CreateBucket),
        build!(s3 => bucket::UpdateBucket),
        build!(s3 => bucket::DeleteBucket),
        // cloudwatch
        build!(cloudwatch => alarm::CreateAlarm),
        build!(cloudwatch => alarm::DeleteAlarm),
        build!(cloudwatch => alarm::StartAlarm),
        build!(cloudwatch => alarm::StopAlarm),
        build!(cloudwatch => alarm::AttachAlarm),
        build!(cloudwatch => alarm::DetachAlarm),
        // iam
        build!(iam => iam::CreateInstanceProfile),
        build!(iam => iam::DeleteInstanceProfile),
        build!(ec2 => iam::AttachInstanceProfile),
        build!(ec2 => iam::DetachInstanceProfile),
        build!(iam => iam::CreateUser),
        build!(iam => iam::DeleteUser),
        build!(iam => iam::AttachUser),
        build!(iam => iam::DetachUser),
        build!(iam => iam::CreateGroup),
        build!(iam => iam::DeleteGroup),
        build!(iam => iam::CreatePolicy),
        build!(iam => iam::DeletePolicy),
        build!(iam => iam::AttachPolicy),
        build!(iam => iam::DetachPolicy),
        build!(iam => iam::CreateAccessKey),
        build!(iam => iam::DeleteAccessKey),
        // load balancing
        build!(elbv2 => loadbalancer::CreateLoadBalancer),
        build!(elbv2 => loadbalancer::DeleteLoadBalancer),
        build!(elbv2 => loadbalancer::CheckLoadBalancer),
        build!(elbv2 => loadbalancer::CreateTargetGroup),
        build!(elbv2 => loadbalancer::DeleteTargetGroup),
        // dns
        build!(route53 => zone::CreateZone),
        build!(route53 => zone::DeleteZone),
    ]
}
