use serde::{Deserialize, Serialize};

use super::Empty;

provider_api! {
    /// Simple Storage Service buckets.
    "s3" => pub trait S3Api {
        fn create_bucket(CreateBucketInput) -> Empty = "CreateBucket";
        fn delete_bucket(BucketInput) -> Empty = "DeleteBucket";
        fn put_bucket_acl(PutBucketAclInput) -> Empty = "PutBucketAcl";
        fn put_bucket_website(PutBucketWebsiteInput) -> Empty = "PutBucketWebsite";
        fn delete_bucket_website(BucketInput) -> Empty = "DeleteBucketWebsite";
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateBucketInput {
    pub bucket: String,
    #[serde(rename = "ACL", default, skip_serializing_if = "Option::is_none")]
    pub acl: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BucketInput {
    pub bucket: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutBucketAclInput {
    pub bucket: String,
    #[serde(rename = "ACL")]
    pub acl: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IndexDocument {
    pub suffix: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RedirectAllRequestsTo {
    pub host_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WebsiteConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_document: Option<IndexDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_all_requests_to: Option<RedirectAllRequestsTo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutBucketWebsiteInput {
    pub bucket: String,
    pub website_configuration: WebsiteConfiguration,
}
