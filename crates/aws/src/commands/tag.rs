//! Resource tags.

use std::sync::Arc;

use async_trait::async_trait;
use stratus_core::poll::poll_interval;
use stratus_core::value::required;
use stratus_core::{Command, CommandError, Injector, ParamMap, ProviderError, Rule, RunContext};
use tracing::debug;

use crate::api::{CreateTagsInput, Ec2Api, Tag};

const TAG_ATTEMPTS: usize = 5;

/// Tag `resources`, retrying while the freshly created resource is not yet
/// visible to the tagging API.
pub(crate) async fn put_tag(
    api: &dyn Ec2Api,
    resources: &[String],
    key: &str,
    value: &str,
) -> Result<(), ProviderError> {
    let input = CreateTagsInput {
        resources: resources.to_vec(),
        tags: vec![Tag {
            key: key.to_string(),
            value: value.to_string(),
        }],
    };
    let mut attempt = 1;
    loop {
        match api.create_tags_request(input.clone()).await {
            Err(e) if e.is_not_found() && attempt < TAG_ATTEMPTS => {
                debug!(attempt, error = %e, "tag: resource not visible yet, retrying");
                attempt += 1;
                tokio::time::sleep(poll_interval()).await;
            }
            other => return other.map(|_| ()),
        }
    }
}

pub struct CreateTag {
    api: Arc<dyn Ec2Api>,
    resource: String,
    key: String,
    value: String,
}

impl CreateTag {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        CreateTag {
            api,
            resource: String::new(),
            key: String::new(),
            value: String::new(),
        }
    }
}

#[async_trait]
impl Command for CreateTag {
    descriptor!("create", "tag", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("resource"), Rule::key("key"), Rule::key("value")])
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        self.resource = required(p.string("resource")?, "resource")?;
        self.key = required(p.string("key")?, "key")?;
        self.value = required(p.string("value")?, "value")?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        put_tag(
            self.api.as_ref(),
            &[self.resource.clone()],
            &self.key,
            &self.value,
        )
        .await?;
        Ok(String::new())
    }
}

pub struct DeleteTag {
    api: Arc<dyn Ec2Api>,
    input: CreateTagsInput,
}

impl DeleteTag {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        DeleteTag {
            api,
            input: CreateTagsInput::default(),
        }
    }
}

#[async_trait]
impl Command for DeleteTag {
    descriptor!("delete", "tag", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("resource"), Rule::key("key"), Rule::opt(&["value"])])
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        self.input = CreateTagsInput {
            resources: vec![required(p.string("resource")?, "resource")?],
            tags: vec![Tag {
                key: required(p.string("key")?, "key")?,
                value: p.string("value")?.unwrap_or_default(),
            }],
        };
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.delete_tags(self.input.clone()).await?;
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
    async fn retries_until_resource_is_visible() {
        set_poll_interval(Duration::from_millis(1));
        let rec = Recorder::new();
        rec.fail("CreateTagsRequest", "InvalidInstanceID.NotFound")
            .fail("CreateTagsRequest", "InvalidInstanceID.NotFound")
            .reply("CreateTagsRequest", json!({}));
        let mut cmd = CreateTag::new(apis(&rec).ec2);
        let out = run(
            &mut cmd,
            &[
                ("resource", Value::str("i-1")),
                ("key", Value::str("env")),
                ("value", Value::str("prod")),
            ],
        )
        .await
        .unwrap();
        assert_eq!(out, "");
        assert_eq!(rec.calls().len(), 3);
        assert_eq!(
            rec.input("CreateTagsRequest"),
            json!({"Resources": ["i-1"], "Tags": [{"Key": "env", "Value": "prod"}]})
        );
    }

    #[tokio::test]
    async fn gives_up_after_five_attempts() {
        set_poll_interval(Duration::from_millis(1));
        let rec = Recorder::new();
        rec.fail("CreateTagsRequest", "InvalidInstanceID.NotFound");
        let err = put_tag(apis(&rec).ec2.as_ref(), &["i-1".into()], "Name", "web")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(rec.calls().len(), TAG_ATTEMPTS);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let rec = Recorder::new();
        rec.fail("CreateTagsRequest", "UnauthorizedOperation");
        assert!(put_tag(apis(&rec).ec2.as_ref(), &["i-1".into()], "Name", "web")
            .await
            .is_err());
        assert_eq!(rec.calls().len(), 1);
    }
}
