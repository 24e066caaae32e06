//! Route tables and routes.

use std::sync::Arc;

use async_trait::async_trait;
use stratus_core::params::{is_cidr, Validators};
use stratus_core::value::required;
use stratus_core::{Command, CommandError, Injector, ParamMap, Rule, RunContext};

use super::fatal_unless_gone;
use crate::api::{
    AssociateRouteTableInput, AssociationIdInput, Ec2Api, RouteInput, RouteTableInput, VpcIdInput,
};

pub struct CreateRouteTable {
    api: Arc<dyn Ec2Api>,
    input: VpcIdInput,
}

impl CreateRouteTable {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        CreateRouteTable {
            api,
            input: VpcIdInput::default(),
        }
    }
}

#[async_trait]
impl Command for CreateRouteTable {
    descriptor!("create", "routetable", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::key("vpc")
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.input.vpc_id = required(Injector::new(params).string("vpc")?, "vpc")?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let out = self.api.create_route_table(self.input.clone()).await?;
        Ok(out.route_table.route_table_id)
    }
}

pub struct DeleteRouteTable {
    api: Arc<dyn Ec2Api>,
    input: RouteTableInput,
}

impl DeleteRouteTable {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        DeleteRouteTable {
            api,
            input: RouteTableInput::default(),
        }
    }
}

#[async_trait]
impl Command for DeleteRouteTable {
    descriptor!("delete", "routetable", "ec2");

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
        self.input.route_table_id = required(Injector::new(params).string("id")?, "id")?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.delete_route_table(self.input.clone()).await?;
        Ok(String::new())
    }
}

/// Associates a route table with a subnet; the association id is the result.
pub struct AttachRouteTable {
    api: Arc<dyn Ec2Api>,
    input: AssociateRouteTableInput,
}

impl AttachRouteTable {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        AttachRouteTable {
            api,
            input: AssociateRouteTableInput::default(),
        }
    }
}

#[async_trait]
impl Command for AttachRouteTable {
    descriptor!("attach", "routetable", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("id"), Rule::key("subnet")])
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        self.input = AssociateRouteTableInput {
            route_table_id: required(p.string("id")?, "id")?,
            subnet_id: required(p.string("subnet")?, "subnet")?,
        };
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let out = self.api.associate_route_table(self.input.clone()).await?;
        Ok(out.association_id)
    }
}

pub struct DetachRouteTable {
    api: Arc<dyn Ec2Api>,
    input: AssociationIdInput,
}

impl DetachRouteTable {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        DetachRouteTable {
            api,
            input: AssociationIdInput::default(),
        }
    }
}

#[async_trait]
impl Command for DetachRouteTable {
    descriptor!("detach", "routetable", "ec2");

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
        self.api.disassociate_route_table(self.input.clone()).await?;
        Ok(String::new())
    }
}

// ──────────────────────────────────────────────
// Routes
// ──────────────────────────────────────────────

fn route_input(params: &ParamMap) -> Result<RouteInput, CommandError> {
    let p = Injector::new(params);
    Ok(RouteInput {
        route_table_id: required(p.string("table")?, "table")?,
        destination_cidr_block: required(p.string("cidr")?, "cidr")?,
        gateway_id: p.string("gateway")?,
    })
}

pub struct CreateRoute {
    api: Arc<dyn Ec2Api>,
    input: RouteInput,
}

impl CreateRoute {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        CreateRoute {
            api,
            input: RouteInput::default(),
        }
    }
}

#[async_trait]
impl Command for CreateRoute {
    descriptor!("create", "route", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("table"), Rule::key("cidr"), Rule::key("gateway")])
    }

    fn validators(&self) -> Validators {
        Validators::new().with("cidr", is_cidr())
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.input = route_input(params)?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.create_route(self.input.clone()).await?;
        Ok(String::new())
    }
}

pub struct DeleteRoute {
    api: Arc<dyn Ec2Api>,
    input: RouteInput,
}

impl DeleteRoute {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        DeleteRoute {
            api,
            input: RouteInput::default(),
        }
    }
}

#[async_trait]
impl Command for DeleteRoute {
    descriptor!("delete", "route", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("table"), Rule::key("cidr")])
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.input = route_input(params)?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.delete_route(self.input.clone()).await?;
        Ok(String::new())
    }
}
