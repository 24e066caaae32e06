//! S3 buckets.

use std::sync::Arc;

use async_trait::async_trait;
use stratus_core::params::{is_in_enum_ignore_case, Validators};
use stratus_core::value::required;
use stratus_core::{Command, CommandError, Injector, ParamMap, Rule, RunContext};

use crate::api::{
    BucketInput, CreateBucketInput, IndexDocument, PutBucketAclInput, PutBucketWebsiteInput,
    RedirectAllRequestsTo, S3Api, WebsiteConfiguration,
};

/// Canned ACLs.
pub const ACLS: &[&str] = &[
    "private",
    "public-read",
    "public-read-write",
    "aws-exec-read",
    "authenticated-read",
    "bucket-owner-read",
    "bucket-owner-full-control",
    "log-delivery-write",
];

pub struct CreateBucket {
    api: Arc<dyn S3Api>,
    input: CreateBucketInput,
}

impl CreateBucket {
    pub fn new(api: Arc<dyn S3Api>) -> Self {
        CreateBucket {
            api,
            input: CreateBucketInput::default(),
        }
    }
}

#[async_trait]
impl Command for CreateBucket {
    descriptor!("create", "bucket", "s3");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("name"), Rule::opt(&["acl"])])
    }

    fn validators(&self) -> Validators {
        Validators::new().with("acl", is_in_enum_ignore_case(ACLS))
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        self.input = CreateBucketInput {
            bucket: required(p.string("name")?, "name")?,
            acl: p.string("acl")?,
        };
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.create_bucket(self.input.clone()).await?;
        Ok(self.input.bucket.clone())
    }
}

/// What an `update bucket` statement changes.
#[derive(Debug, Clone, PartialEq)]
enum BucketUpdate {
    Acl(String),
    Website(WebsiteConfiguration),
    RemoveWebsite,
}

pub struct UpdateBucket {
    api: Arc<dyn S3Api>,
    name: String,
    updates: Vec<BucketUpdate>,
}

impl UpdateBucket {
    pub fn new(api: Arc<dyn S3Api>) -> Self {
        UpdateBucket {
            api,
            name: String::new(),
            updates: Vec::new(),
        }
    }
}

#[async_trait]
impl Command for UpdateBucket {
    descriptor!("update", "bucket", "s3");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![
            Rule::key("name"),
            Rule::opt(&[
                "acl",
                "enforce-https",
                "index-suffix",
                "public-website",
                "redirect-hostname",
            ]),
        ])
    }

    fn validators(&self) -> Validators {
        Validators::new().with("acl", is_in_enum_ignore_case(ACLS))
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        self.name = required(p.string("name")?, "name")?;
        self.updates.clear();
        if let Some(acl) = p.string("acl")? {
            self.updates.push(BucketUpdate::Acl(acl));
        }

        match p.bool("public-website")? {
            Some(true) => {
                let redirect = p.string("redirect-hostname")?.map(|host_name| {
                    RedirectAllRequestsTo {
                        host_name,
                        protocol: None,
                    }
                });
                let enforce_https = p.bool("enforce-https")?.unwrap_or(false);
                let website = match redirect {
                    Some(mut to) => {
                        if enforce_https {
                            to.protocol = Some("https".into());
                        }
                        WebsiteConfiguration {
                            index_document: None,
                            redirect_all_requests_to: Some(to),
                        }
                    }
                    None => WebsiteConfiguration {
                        index_document: Some(IndexDocument {
                            suffix: p
                                .string("index-suffix")?
                                .unwrap_or_else(|| "index.html".to_string()),
                        }),
                        redirect_all_requests_to: None,
                    },
                };
                self.updates.push(BucketUpdate::Website(website));
            }
            Some(false) => self.updates.push(BucketUpdate::RemoveWebsite),
            None => {}
        }
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        for update in &self.updates {
            let bucket = self.name.clone();
            match update {
                BucketUpdate::Acl(acl) => {
                    self.api
                        .put_bucket_acl(PutBucketAclInput {
                            bucket,
                            acl: acl.clone(),
                        })
                        .await?;
                }
                BucketUpdate::Website(config) => {
                    self.api
                        .put_bucket_website(PutBucketWebsiteInput {
                            bucket,
                            website_configuration: config.clone(),
                        })
                        .await?;
                }
                BucketUpdate::RemoveWebsite => {
                    self.api.delete_bucket_website(BucketInput { bucket }).await?;
                }
            }
        }
        Ok(String::new())
    }
}

pub struct DeleteBucket {
    api: Arc<dyn S3Api>,
    input: BucketInput,
}

impl DeleteBucket {
    pub fn new(api: Arc<dyn S3Api>) -> Self {
        DeleteBucket {
            api,
            input: BucketInput::default(),
        }
    }
}

#[async_trait]
impl Command for DeleteBucket {
    descriptor!("delete", "bucket", "s3");

    fn params_rule(&self) -> Rule {
        Rule::key("name")
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.input.bucket = required(Injector::new(params).string("name")?, "name")?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.delete_bucket(self.input.clone()).await?;
        Ok(String::new())
    }
}
