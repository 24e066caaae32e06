//! Key pairs generated locally and imported into EC2.

use std::sync::Arc;

use async_trait::async_trait;
use stratus_core::params::Validators;
use stratus_core::value::{cast_bool, cast_string, required};
use stratus_core::{Command, CommandError, Injector, ParamMap, Rule, RunContext};
use tracing::info;

use super::fatal_unless_gone;
use crate::api::{Ec2Api, ImportKeyPairInput, KeyNameInput};
use crate::keygen;

pub struct CreateKeypair {
    api: Arc<dyn Ec2Api>,
    name: String,
}

impl CreateKeypair {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        CreateKeypair {
            api,
            name: String::new(),
        }
    }
}

#[async_trait]
impl Command for CreateKeypair {
    descriptor!("create", "keypair", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("name"), Rule::opt(&["encrypted"])])
    }

    fn validators(&self) -> Validators {
        Validators::new()
            .with(
                "encrypted",
                Box::new(|value, _| match cast_bool(value) {
                    Ok(true) => Err("encrypted private keys are not supported".to_string()),
                    Ok(false) => Ok(()),
                    Err(e) => Err(e),
                }),
            )
            .with(
                "name",
                Box::new(|value, _| {
                    match keygen::private_key_path(&cast_string(value)) {
                        Ok(path) if path.exists() => {
                            Err(format!("file already exists at path: {}", path.display()))
                        }
                        _ => Ok(()),
                    }
                }),
            )
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.name = required(Injector::new(params).string("name")?, "name")?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let path = keygen::private_key_path(&self.name).map_err(CommandError::Io)?;
        let pair = keygen::generate().map_err(CommandError::Other)?;
        keygen::write_private_key(&path, &pair.private_pem).map_err(CommandError::Io)?;
        info!(path = %path.display(), "keypair: private key saved");

        let out = self
            .api
            .import_key_pair(ImportKeyPairInput {
                key_name: self.name.clone(),
                public_key_material: pair.public_openssh,
            })
            .await?;
        Ok(if out.key_name.is_empty() {
            self.name.clone()
        } else {
            out.key_name
        })
    }
}

pub struct DeleteKeypair {
    api: Arc<dyn Ec2Api>,
    input: KeyNameInput,
}

impl DeleteKeypair {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        DeleteKeypair {
            api,
            input: KeyNameInput::default(),
        }
    }
}

#[async_trait]
impl Command for DeleteKeypair {
    descriptor!("delete", "keypair", "ec2");

    fn is_fatal(&self, err: &CommandError) -> bool {
        fatal_unless_gone(err)
    }

    fn params_rule(&self) -> Rule {
        Rule::key("name")
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.input.key_name = required(Injector::new(params).string("name")?, "name")?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.delete_key_pair(self.input.clone()).await?;
        Ok(String::new())
    }
}
