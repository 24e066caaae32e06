//! Machine images.

use std::sync::Arc;

use async_trait::async_trait;
use stratus_core::value::required;
use stratus_core::{Command, CommandError, Injector, ParamMap, Rule, RunContext};
use tracing::info;

use crate::api::{
    CopyImageInput, CreateImageInput, DescribeImagesInput, Ec2Api, ImageIdInput, SnapshotIdInput,
};

pub struct CreateImage {
    api: Arc<dyn Ec2Api>,
    input: CreateImageInput,
}

impl CreateImage {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        CreateImage {
            api,
            input: CreateImageInput::default(),
        }
    }
}

#[async_trait]
impl Command for CreateImage {
    descriptor!("create", "image", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![
            Rule::key("name"),
            Rule::key("instance"),
            Rule::opt(&["reboot", "description"]),
        ])
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        self.input = CreateImageInput {
            instance_id: required(p.string("instance")?, "instance")?,
            name: required(p.string("name")?, "name")?,
            description: p.string("description")?,
            no_reboot: !p.bool("reboot")?.unwrap_or(false),
        };
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        Ok(self.api.create_image(self.input.clone()).await?.image_id)
    }
}

pub struct CopyImage {
    api: Arc<dyn Ec2Api>,
    input: CopyImageInput,
}

impl CopyImage {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        CopyImage {
            api,
            input: CopyImageInput::default(),
        }
    }
}

#[async_trait]
impl Command for CopyImage {
    descriptor!("copy", "image", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![
            Rule::key("name"),
            Rule::key("source-id"),
            Rule::key("source-region"),
            Rule::opt(&["encrypted", "description"]),
        ])
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        self.input = CopyImageInput {
            source_image_id: required(p.string("source-id")?, "source-id")?,
            source_region: required(p.string("source-region")?, "source-region")?,
            name: required(p.string("name")?, "name")?,
            description: p.string("description")?,
            encrypted: p.bool("encrypted")?,
        };
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        Ok(self.api.copy_image(self.input.clone()).await?.image_id)
    }
}

/// Deregisters an image, optionally deleting the snapshots behind it.
pub struct DeleteImage {
    api: Arc<dyn Ec2Api>,
    id: String,
    delete_snapshots: bool,
}

impl DeleteImage {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        DeleteImage {
            api,
            id: String::new(),
            delete_snapshots: false,
        }
    }
}

#[async_trait]
impl Command for DeleteImage {
    descriptor!("delete", "image", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("id"), Rule::opt(&["delete-snapshots"])])
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        self.id = required(p.string("id")?, "id")?;
        self.delete_snapshots = p.bool("delete-snapshots")?.unwrap_or(false);
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let mut snapshots = Vec::new();
        if self.delete_snapshots {
            let out = self
                .api
                .describe_images(DescribeImagesInput {
                    image_ids: vec![self.id.clone()],
                    ..Default::default()
                })
                .await?;
            snapshots = out
                .images
                .iter()
                .flat_map(|img| img.block_device_mappings.iter())
                .filter_map(|m| m.ebs.as_ref())
                .map(|ebs| ebs.snapshot_id.clone())
                .filter(|id| !id.is_empty())
                .collect();
        }

        self.api
            .deregister_image(ImageIdInput {
                image_id: self.id.clone(),
            })
            .await?;

        for snapshot_id in snapshots {
            self.api
                .delete_snapshot(SnapshotIdInput {
                    snapshot_id: snapshot_id.clone(),
                })
                .await?;
            info!(image = %self.id, snapshot = %snapshot_id, "image: snapshot deleted");
        }
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
    async fn absent_reboot_means_no_reboot() {
        let rec = Recorder::new();
        rec.reply("CreateImage", json!({"ImageId": "ami-9"}));
        let mut cmd = CreateImage::new(apis(&rec).ec2);
        let out = run(
            &mut cmd,
            &[("name", Value::str("golden")), ("instance", Value::str("i-1"))],
        )
        .await
        .unwrap();
        assert_eq!(out, "ami-9");
        assert_eq!(rec.input("CreateImage")["NoReboot"], json!(true));
    }

    #[tokio::test]
    async fn delete_removes_snapshots_after_deregistering() {
        let rec = Recorder::new();
        rec.reply(
            "DescribeImages",
            json!({"Images": [{"ImageId": "ami-1", "BlockDeviceMappings": [
                {"Ebs": {"SnapshotId": "snap-1"}},
                {"DeviceName": "/dev/sdb"},
                {"Ebs": {"SnapshotId": "snap-2"}}
            ]}]}),
        );
        let mut cmd = DeleteImage::new(apis(&rec).ec2);
        run(
            &mut cmd,
            &[("id", Value::str("ami-1")), ("delete-snapshots", Value::Bool(true))],
        )
        .await
        .unwrap();
        assert_eq!(
            rec.call_names(),
            vec!["DescribeImages", "DeregisterImage", "DeleteSnapshot", "DeleteSnapshot"]
        );
    }
}
