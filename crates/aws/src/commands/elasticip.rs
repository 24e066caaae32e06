use std::sync::Arc;

use async_trait::async_trait;
use stratus_core::params::{is_in_enum_ignore_case, is_ip, Validators};
use stratus_core::value::required;
use stratus_core::{Command, CommandError, Injector, ParamMap, Rule, RunContext};

use crate::api::{
    AllocateAddressInput, AssociateAddressInput, AssociationIdInput, Ec2Api, ReleaseAddressInput,
};

pub const DOMAINS: &[&str] = &["vpc", "standard"];

pub struct CreateElasticIp {
    api: Arc<dyn Ec2Api>,
    input: AllocateAddressInput,
}

impl CreateElasticIp {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        CreateElasticIp {
            api,
            input: AllocateAddressInput::default(),
        }
    }
}

#[async_trait]
impl Command for CreateElasticIp {
    descriptor!("create", "elasticip", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::key("domain")
    }

    fn validators(&self) -> Validators {
        Validators::new().with("domain", is_in_enum_ignore_case(DOMAINS))
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.input.domain = required(Injector::new(params).string("domain")?, "domain")?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let out = self.api.allocate_address(self.input.clone()).await?;
        Ok(out.allocation_id)
    }
}

/// Releases an address by allocation id or by public ip.
pub struct DeleteElasticIp {
    api: Arc<dyn Ec2Api>,
    input: ReleaseAddressInput,
}

impl DeleteElasticIp {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        DeleteElasticIp {
            api,
            input: ReleaseAddressInput::default(),
        }
    }
}

#[async_trait]
impl Command for DeleteElasticIp {
    descriptor!("delete", "elasticip", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::only_one_of(vec![Rule::key("id"), Rule::key("ip")])
    }

    fn validators(&self) -> Validators {
        Validators::new().with("ip", is_ip())
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        self.input = ReleaseAddressInput {
            allocation_id: p.string("id")?,
            public_ip: p.string("ip")?,
        };
        if self.input.allocation_id.is_none() && self.input.public_ip.is_none() {
            return Err(CommandError::MissingParam("id".into()));
        }
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.release_address(self.input.clone()).await?;
        Ok(String::new())
    }
}

pub struct AttachElasticIp {
    api: Arc<dyn Ec2Api>,
    input: AssociateAddressInput,
}

impl AttachElasticIp {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        AttachElasticIp {
            api,
            input: AssociateAddressInput::default(),
        }
    }
}

#[async_trait]
impl Command for AttachElasticIp {
    descriptor!("attach", "elasticip", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![
            Rule::key("id"),
            Rule::opt(&["allow-reassociation", "instance", "networkinterface", "privateip"]),
        ])
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        self.input = AssociateAddressInput {
            allocation_id: required(p.string("id")?, "id")?,
            instance_id: p.string("instance")?,
            network_interface_id: p.string("networkinterface")?,
            private_ip_address: p.string("privateip")?,
            allow_reassociation: p.bool("allow-reassociation")?,
        };
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let out = self.api.associate_address(self.input.clone()).await?;
        Ok(out.association_id)
    }
}

pub struct DetachElasticIp {
    api: Arc<dyn Ec2Api>,
    input: AssociationIdInput,
}

impl DetachElasticIp {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        DetachElasticIp {
            api,
            input: AssociationIdInput::default(),
        }
    }
}

#[async_trait]
impl Command for DetachElasticIp {
    descriptor!("detach", "elasticip", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::key("association")
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.input.association_id =
            required(Injector::new(params).string("association")?, "association")?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.disassociate_address(self.input.clone()).await?;
        Ok(String::new())
    }
}
