use serde::{Deserialize, Serialize};

use super::Empty;

provider_api! {
    /// Identity and Access Management.
    "iam" => pub trait IamApi {
        fn create_instance_profile(InstanceProfileNameInput) -> CreateInstanceProfileOutput = "CreateInstanceProfile";
        fn delete_instance_profile(InstanceProfileNameInput) -> Empty = "DeleteInstanceProfile";
        fn create_user(UserNameInput) -> CreateUserOutput = "CreateUser";
        fn delete_user(UserNameInput) -> Empty = "DeleteUser";
        fn add_user_to_group(UserGroupInput) -> Empty = "AddUserToGroup";
        fn remove_user_from_group(UserGroupInput) -> Empty = "RemoveUserFromGroup";
        fn create_group(GroupNameInput) -> CreateGroupOutput = "CreateGroup";
        fn delete_group(GroupNameInput) -> Empty = "DeleteGroup";
        fn create_policy(CreatePolicyInput) -> CreatePolicyOutput = "CreatePolicy";
        fn delete_policy(PolicyArnInput) -> Empty = "DeletePolicy";
        fn list_policy_versions(PolicyArnInput) -> ListPolicyVersionsOutput = "ListPolicyVersions";
        fn delete_policy_version(PolicyVersionInput) -> Empty = "DeletePolicyVersion";
        fn attach_user_policy(PolicyAttachmentInput) -> Empty = "AttachUserPolicy";
        fn detach_user_policy(PolicyAttachmentInput) -> Empty = "DetachUserPolicy";
        fn attach_group_policy(PolicyAttachmentInput) -> Empty = "AttachGroupPolicy";
        fn detach_group_policy(PolicyAttachmentInput) -> Empty = "DetachGroupPolicy";
        fn attach_role_policy(PolicyAttachmentInput) -> Empty = "AttachRolePolicy";
        fn detach_role_policy(PolicyAttachmentInput) -> Empty = "DetachRolePolicy";
        fn create_access_key(UserNameInput) -> CreateAccessKeyOutput = "CreateAccessKey";
        fn delete_access_key(AccessKeyInput) -> Empty = "DeleteAccessKey";
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceProfileNameInput {
    pub instance_profile_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceProfile {
    #[serde(default)]
    pub instance_profile_name: String,
    #[serde(default)]
    pub arn: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateInstanceProfileOutput {
    #[serde(default)]
    pub instance_profile: InstanceProfile,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserNameInput {
    pub user_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateUserOutput {
    #[serde(default)]
    pub user: User,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserGroupInput {
    pub group_name: String,
    pub user_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupNameInput {
    pub group_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Group {
    #[serde(default)]
    pub group_id: String,
    #[serde(default)]
    pub group_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateGroupOutput {
    #[serde(default)]
    pub group: Group,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreatePolicyInput {
    pub policy_name: String,
    /// JSON policy document.
    pub policy_document: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Policy {
    #[serde(default)]
    pub arn: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreatePolicyOutput {
    #[serde(default)]
    pub policy: Policy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyArnInput {
    pub policy_arn: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyVersion {
    pub version_id: String,
    #[serde(default)]
    pub is_default_version: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListPolicyVersionsOutput {
    #[serde(default)]
    pub versions: Vec<PolicyVersion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyVersionInput {
    pub policy_arn: String,
    pub version_id: String,
}

/// Target of a policy attachment: exactly one of user, group or role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyAttachmentInput {
    pub policy_arn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccessKey {
    pub access_key_id: String,
    #[serde(default)]
    pub secret_access_key: String,
    #[serde(default)]
    pub user_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateAccessKeyOutput {
    #[serde(default)]
    pub access_key: AccessKey,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccessKeyInput {
    pub access_key_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}
