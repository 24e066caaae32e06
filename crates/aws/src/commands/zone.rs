//! Route 53 hosted zones.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use stratus_core::value::required;
use stratus_core::{Command, CommandError, Injector, ParamMap, Rule, RunContext};
use time::OffsetDateTime;

use crate::api::{CreateHostedZoneInput, HostedZoneConfig, HostedZoneIdInput, Route53Api};

pub type CallerReference = fn() -> String;

static CALLER_REFERENCE: RwLock<Option<CallerReference>> = RwLock::new(None);

/// Replace the caller reference generator; `None` restores the default.
pub fn set_caller_reference(generator: Option<CallerReference>) {
    *CALLER_REFERENCE.write().unwrap_or_else(|e| e.into_inner()) = generator;
}

fn caller_reference() -> String {
    let generator = *CALLER_REFERENCE.read().unwrap_or_else(|e| e.into_inner());
    match generator {
        Some(f) => f(),
        None => OffsetDateTime::now_utc().unix_timestamp_nanos().to_string(),
    }
}

pub struct CreateZone {
    api: Arc<dyn Route53Api>,
    input: CreateHostedZoneInput,
}

impl CreateZone {
    pub fn new(api: Arc<dyn Route53Api>) -> Self {
        CreateZone {
            api,
            input: CreateHostedZoneInput::default(),
        }
    }
}

#[async_trait]
impl Command for CreateZone {
    descriptor!("create", "zone", "route53");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![
            Rule::key("name"),
            Rule::opt(&["callerreference", "comment", "delegationsetid", "isprivate"]),
        ])
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        let comment = p.string("comment")?;
        let private_zone = p.bool("isprivate")?;
        self.input = CreateHostedZoneInput {
            name: required(p.string("name")?, "name")?,
            caller_reference: p.string("callerreference")?.unwrap_or_else(caller_reference),
            delegation_set_id: p.string("delegationsetid")?,
            hosted_zone_config: (comment.is_some() || private_zone.is_some()).then(|| {
                HostedZoneConfig {
                    comment,
                    private_zone,
                }
            }),
        };
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let out = self.api.create_hosted_zone(self.input.clone()).await?;
        Ok(out.hosted_zone.id)
    }
}

pub struct DeleteZone {
    api: Arc<dyn Route53Api>,
    input: HostedZoneIdInput,
}

impl DeleteZone {
    pub fn new(api: Arc<dyn Route53Api>) -> Self {
        DeleteZone {
            api,
            input: HostedZoneIdInput::default(),
        }
    }
}

#[async_trait]
impl Command for DeleteZone {
    descriptor!("delete", "zone", "route53");

    fn params_rule(&self) -> Rule {
        Rule::key("id")
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.input.id = required(Injector::new(params).string("id")?, "id")?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.delete_hosted_zone(self.input.clone()).await?;
        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use stratus_core::Value;

    use super::*;
    use crate::testing::{apis, run, Recorder};

    #[tokio::test]
    async fn explicit_caller_reference_and_config() {
        let rec = Recorder::new();
        rec.reply(
            "CreateHostedZone",
            json!({"HostedZone": {"Id": "/hostedzone/Z1", "Name": "example.com."}}),
        );
        let mut cmd = CreateZone::new(apis(&rec).route53);
        let out = run(
            &mut cmd,
            &[
                ("name", Value::str("example.com")),
                ("callerreference", Value::str("ref-1")),
                ("comment", Value::str("main")),
            ],
        )
        .await
        .unwrap();
        assert_eq!(out, "/hostedzone/Z1");
        assert_eq!(
            rec.input("CreateHostedZone"),
            json!({
                "Name": "example.com",
                "CallerReference": "ref-1",
                "HostedZoneConfig": {"Comment": "main"}
            })
        );
    }

    #[test]
    fn default_caller_reference_is_time_based() {
        let a = caller_reference();
        assert!(a.parse::<i128>().is_ok(), "{a}");
    }
}
