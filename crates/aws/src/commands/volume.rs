use std::sync::Arc;

use async_trait::async_trait;
use stratus_core::params::Validators;
use stratus_core::poll::{poll_until, timeout_secs};
use stratus_core::value::required;
use stratus_core::{Command, CommandError, Injector, ParamMap, Rule, RunContext};

use super::{check_rule, check_validators, fatal_unless_gone, NOT_FOUND};
use crate::api::{
    CreateVolumeInput, DescribeVolumesInput, Ec2Api, VolumeAttachmentInput, VolumeIdInput,
};

pub const VOLUME_STATES: &[&str] = &["available", "in-use", NOT_FOUND];

pub struct CreateVolume {
    api: Arc<dyn Ec2Api>,
    input: CreateVolumeInput,
}

impl CreateVolume {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        CreateVolume {
            api,
            input: CreateVolumeInput::default(),
        }
    }
}

#[async_trait]
impl Command for CreateVolume {
    descriptor!("create", "volume", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("availabilityzone"), Rule::key("size")])
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        self.input = CreateVolumeInput {
            availability_zone: required(p.string("availabilityzone")?, "availabilityzone")?,
            size: required(p.int("size")?, "size")?,
            volume_type: None,
        };
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        Ok(self.api.create_volume(self.input.clone()).await?.volume_id)
    }
}

pub struct DeleteVolume {
    api: Arc<dyn Ec2Api>,
    input: VolumeIdInput,
}

impl DeleteVolume {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        DeleteVolume {
            api,
            input: VolumeIdInput::default(),
        }
    }
}

#[async_trait]
impl Command for DeleteVolume {
    descriptor!("delete", "volume", "ec2");

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
        self.input.volume_id = required(Injector::new(params).string("id")?, "id")?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.delete_volume(self.input.clone()).await?;
        Ok(String::new())
    }
}

fn attachment(params: &ParamMap) -> Result<VolumeAttachmentInput, CommandError> {
    let p = Injector::new(params);
    Ok(VolumeAttachmentInput {
        device: required(p.string("device")?, "device")?,
        instance_id: required(p.string("instance")?, "instance")?,
        volume_id: required(p.string("id")?, "id")?,
        force: p.bool("force")?,
    })
}

pub struct AttachVolume {
    api: Arc<dyn Ec2Api>,
    input: VolumeAttachmentInput,
}

impl AttachVolume {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        AttachVolume {
            api,
            input: VolumeAttachmentInput::default(),
        }
    }
}

#[async_trait]
impl Command for AttachVolume {
    descriptor!("attach", "volume", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("device"), Rule::key("id"), Rule::key("instance")])
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.input = attachment(params)?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let out = self.api.attach_volume(self.input.clone()).await?;
        Ok(if out.volume_id.is_empty() {
            self.input.volume_id.clone()
        } else {
            out.volume_id
        })
    }
}

pub struct DetachVolume {
    api: Arc<dyn Ec2Api>,
    input: VolumeAttachmentInput,
}

impl DetachVolume {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        DetachVolume {
            api,
            input: VolumeAttachmentInput::default(),
        }
    }
}

#[async_trait]
impl Command for DetachVolume {
    descriptor!("detach", "volume", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![
            Rule::key("device"),
            Rule::key("id"),
            Rule::key("instance"),
            Rule::opt(&["force"]),
        ])
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.input = attachment(params)?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let out = self.api.detach_volume(self.input.clone()).await?;
        Ok(if out.volume_id.is_empty() {
            self.input.volume_id.clone()
        } else {
            out.volume_id
        })
    }
}

pub struct CheckVolume {
    api: Arc<dyn Ec2Api>,
    id: String,
    state: String,
    timeout: u64,
}

impl CheckVolume {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        CheckVolume {
            api,
            id: String::new(),
            state: String::new(),
            timeout: 0,
        }
    }
}

#[async_trait]
impl Command for CheckVolume {
    descriptor!("check", "volume", "ec2");

    fn params_rule(&self) -> Rule {
        check_rule()
    }

    fn validators(&self) -> Validators {
        check_validators(VOLUME_STATES)
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
            let input = DescribeVolumesInput {
                volume_ids: vec![id.to_string()],
            };
            match api.describe_volumes(input).await {
                Err(e) if e.is_not_found() => Ok(NOT_FOUND.to_string()),
                Err(e) => Err(e.into()),
                Ok(out) => Ok(out
                    .volumes
                    .into_iter()
                    .find(|v| v.volume_id == id)
                    .map(|v| v.state)
                    .unwrap_or_else(|| NOT_FOUND.to_string())),
            }
        })
        .await?;
        Ok(String::new())
    }
}
