//! VPCs and their subnets.

use std::sync::Arc;

use async_trait::async_trait;
use stratus_core::params::{is_cidr, Validators};
use stratus_core::value::required;
use stratus_core::{Command, CommandError, Injector, ParamMap, Rule, RunContext};

use super::{fatal_unless_gone, tag};
use crate::api::{
    AttributeValue, CreateSubnetInput, CreateVpcInput, Ec2Api, ModifySubnetAttributeInput,
    SubnetIdInput, VpcIdInput,
};

pub struct CreateVpc {
    api: Arc<dyn Ec2Api>,
    input: CreateVpcInput,
    name: Option<String>,
}

impl CreateVpc {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        CreateVpc {
            api,
            input: CreateVpcInput::default(),
            name: None,
        }
    }
}

#[async_trait]
impl Command for CreateVpc {
    descriptor!("create", "vpc", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("cidr"), Rule::opt(&["name"])])
    }

    fn validators(&self) -> Validators {
        Validators::new().with("cidr", is_cidr())
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        self.input.cidr_block = required(p.string("cidr")?, "cidr")?;
        self.name = p.string("name")?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let id = self.api.create_vpc(self.input.clone()).await?.vpc.vpc_id;
        if let Some(name) = &self.name {
            tag::put_tag(self.api.as_ref(), &[id.clone()], "Name", name).await?;
        }
        Ok(id)
    }
}

pub struct DeleteVpc {
    api: Arc<dyn Ec2Api>,
    input: VpcIdInput,
}

impl DeleteVpc {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        DeleteVpc {
            api,
            input: VpcIdInput::default(),
        }
    }
}

#[async_trait]
impl Command for DeleteVpc {
    descriptor!("delete", "vpc", "ec2");

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
        self.input.vpc_id = required(Injector::new(params).string("id")?, "id")?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.delete_vpc(self.input.clone()).await?;
        Ok(String::new())
    }
}

// ──────────────────────────────────────────────
// Subnets
// ──────────────────────────────────────────────

pub struct CreateSubnet {
    api: Arc<dyn Ec2Api>,
    input: CreateSubnetInput,
    public: bool,
    name: Option<String>,
}

impl CreateSubnet {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        CreateSubnet {
            api,
            input: CreateSubnetInput::default(),
            public: false,
            name: None,
        }
    }
}

async fn set_public(api: &dyn Ec2Api, subnet: &str, public: bool) -> Result<(), CommandError> {
    api.modify_subnet_attribute(ModifySubnetAttributeInput {
        subnet_id: subnet.to_string(),
        map_public_ip_on_launch: AttributeValue { value: public },
    })
    .await?;
    Ok(())
}

#[async_trait]
impl Command for CreateSubnet {
    descriptor!("create", "subnet", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![
            Rule::key("cidr"),
            Rule::key("vpc"),
            Rule::opt_with(&["availabilityzone", "public"], &["name"]),
        ])
    }

    fn validators(&self) -> Validators {
        Validators::new().with("cidr", is_cidr())
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        self.input = CreateSubnetInput {
            cidr_block: required(p.string("cidr")?, "cidr")?,
            vpc_id: required(p.string("vpc")?, "vpc")?,
            availability_zone: p.string("availabilityzone")?,
        };
        self.public = p.bool("public")?.unwrap_or(false);
        self.name = p.string("name")?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let id = self
            .api
            .create_subnet(self.input.clone())
            .await?
            .subnet
            .subnet_id;
        if self.public {
            set_public(self.api.as_ref(), &id, true).await?;
        }
        if let Some(name) = &self.name {
            tag::put_tag(self.api.as_ref(), &[id.clone()], "Name", name).await?;
        }
        Ok(id)
    }
}

pub struct UpdateSubnet {
    api: Arc<dyn Ec2Api>,
    id: String,
    public: Option<bool>,
}

impl UpdateSubnet {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        UpdateSubnet {
            api,
            id: String::new(),
            public: None,
        }
    }
}

#[async_trait]
impl Command for UpdateSubnet {
    descriptor!("update", "subnet", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("id"), Rule::opt(&["public"])])
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        self.id = required(p.string("id")?, "id")?;
        self.public = p.bool("public")?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        if let Some(public) = self.public {
            set_public(self.api.as_ref(), &self.id, public).await?;
        }
        Ok(String::new())
    }
}

pub struct DeleteSubnet {
    api: Arc<dyn Ec2Api>,
    input: SubnetIdInput,
}

impl DeleteSubnet {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        DeleteSubnet {
            api,
            input: SubnetIdInput::default(),
        }
    }
}

#[async_trait]
impl Command for DeleteSubnet {
    descriptor!("delete", "subnet", "ec2");

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
        self.input.subnet_id = required(Injector::new(params).string("id")?, "id")?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.delete_subnet(self.input.clone()).await?;
        Ok(String::new())
    }
}
