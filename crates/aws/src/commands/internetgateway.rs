use std::sync::Arc;

use async_trait::async_trait;
use stratus_core::value::required;
use stratus_core::{Command, CommandError, Injector, ParamMap, Rule, RunContext};

use super::fatal_unless_gone;
use crate::api::{Ec2Api, Empty, InternetGatewayInput};

pub struct CreateInternetGateway {
    api: Arc<dyn Ec2Api>,
}

impl CreateInternetGateway {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        CreateInternetGateway { api }
    }
}

#[async_trait]
impl Command for CreateInternetGateway {
    descriptor!("create", "internetgateway", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::None
    }

    fn inject(&mut self, _params: &ParamMap) -> Result<(), CommandError> {
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let out = self.api.create_internet_gateway(Empty {}).await?;
        Ok(out.internet_gateway.internet_gateway_id)
    }
}

pub struct DeleteInternetGateway {
    api: Arc<dyn Ec2Api>,
    input: InternetGatewayInput,
}

impl DeleteInternetGateway {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        DeleteInternetGateway {
            api,
            input: InternetGatewayInput::default(),
        }
    }
}

#[async_trait]
impl Command for DeleteInternetGateway {
    descriptor!("delete", "internetgateway", "ec2");

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
        self.input.internet_gateway_id = required(Injector::new(params).string("id")?, "id")?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.delete_internet_gateway(self.input.clone()).await?;
        Ok(String::new())
    }
}

fn gateway_attachment(params: &ParamMap) -> Result<InternetGatewayInput, CommandError> {
    let p = Injector::new(params);
    Ok(InternetGatewayInput {
        internet_gateway_id: required(p.string("id")?, "id")?,
        vpc_id: Some(required(p.string("vpc")?, "vpc")?),
    })
}

pub struct AttachInternetGateway {
    api: Arc<dyn Ec2Api>,
    input: InternetGatewayInput,
}

impl AttachInternetGateway {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        AttachInternetGateway {
            api,
            input: InternetGatewayInput::default(),
        }
    }
}

#[async_trait]
impl Command for AttachInternetGateway {
    descriptor!("attach", "internetgateway", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("id"), Rule::key("vpc")])
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.input = gateway_attachment(params)?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.attach_internet_gateway(self.input.clone()).await?;
        Ok(String::new())
    }
}

pub struct DetachInternetGateway {
    api: Arc<dyn Ec2Api>,
    input: InternetGatewayInput,
}

impl DetachInternetGateway {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        DetachInternetGateway {
            api,
            input: InternetGatewayInput::default(),
        }
    }
}

#[async_trait]
impl Command for DetachInternetGateway {
    descriptor!("detach", "internetgateway", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("id"), Rule::key("vpc")])
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.input = gateway_attachment(params)?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.detach_internet_gateway(self.input.clone()).await?;
        Ok(String::new())
    }
}
