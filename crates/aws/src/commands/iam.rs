//! IAM identities and policies, plus instance profile associations.
//!
//! Instance profiles are created through IAM but associated with instances
//! through EC2, so `attach`/`detach instanceprofile` bind the EC2 handle.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use stratus_core::params::{is_in_enum_ignore_case, Validators};
use stratus_core::value::required;
use stratus_core::{Command, CommandError, Injector, ParamMap, Rule, RunContext};
use tracing::info;

use crate::api::{
    AccessKeyInput, AssociateIamInstanceProfileInput, AssociationIdInput, CreatePolicyInput,
    Ec2Api, Filter, FiltersInput, GroupNameInput, IamApi, IamInstanceProfileSpecification,
    InstanceProfileNameInput, PolicyArnInput, PolicyAttachmentInput, PolicyVersionInput,
    ReplaceIamInstanceProfileAssociationInput, UserGroupInput, UserNameInput,
};
use crate::keygen;

pub const EFFECTS: &[&str] = &["allow", "deny"];

/// Reads the required `name` param.
fn name_param(params: &ParamMap) -> Result<String, CommandError> {
    required(Injector::new(params).string("name")?, "name")
}

// ──────────────────────────────────────────────
// Instance profiles
// ──────────────────────────────────────────────

pub struct CreateInstanceProfile {
    api: Arc<dyn IamApi>,
    input: InstanceProfileNameInput,
}

impl CreateInstanceProfile {
    pub fn new(api: Arc<dyn IamApi>) -> Self {
        CreateInstanceProfile {
            api,
            input: InstanceProfileNameInput::default(),
        }
    }
}

#[async_trait]
impl Command for CreateInstanceProfile {
    descriptor!("create", "instanceprofile", "iam");

    fn params_rule(&self) -> Rule {
        Rule::key("name")
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.input.instance_profile_name = name_param(params)?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let out = self.api.create_instance_profile(self.input.clone()).await?;
        Ok(out.instance_profile.instance_profile_name)
    }
}

pub struct DeleteInstanceProfile {
    api: Arc<dyn IamApi>,
    input: InstanceProfileNameInput,
}

impl DeleteInstanceProfile {
    pub fn new(api: Arc<dyn IamApi>) -> Self {
        DeleteInstanceProfile {
            api,
            input: InstanceProfileNameInput::default(),
        }
    }
}

#[async_trait]
impl Command for DeleteInstanceProfile {
    descriptor!("delete", "instanceprofile", "iam");

    fn params_rule(&self) -> Rule {
        Rule::key("name")
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.input.instance_profile_name = name_param(params)?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.delete_instance_profile(self.input.clone()).await?;
        Ok(String::new())
    }
}

fn association_filters(instance: &str) -> FiltersInput {
    FiltersInput {
        filters: vec![
            Filter::new("instance-id", &[instance]),
            Filter::new("state", &["associated"]),
        ],
    }
}

/// Associates an instance profile with an instance. With `replace=true`
/// an existing association of that instance is swapped instead.
pub struct AttachInstanceProfile {
    api: Arc<dyn Ec2Api>,
    instance: String,
    name: String,
    replace: bool,
}

impl AttachInstanceProfile {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        AttachInstanceProfile {
            api,
            instance: String::new(),
            name: String::new(),
            replace: false,
        }
    }

    fn profile(&self) -> IamInstanceProfileSpecification {
        IamInstanceProfileSpecification {
            name: Some(self.name.clone()),
            arn: None,
        }
    }
}

#[async_trait]
impl Command for AttachInstanceProfile {
    descriptor!("attach", "instanceprofile", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("instance"), Rule::key("name"), Rule::opt(&["replace"])])
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        self.instance = required(p.string("instance")?, "instance")?;
        self.name = required(p.string("name")?, "name")?;
        self.replace = p.bool("replace")?.unwrap_or(false);
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        if self.replace {
            let out = self
                .api
                .describe_iam_instance_profile_associations(association_filters(&self.instance))
                .await?;
            if let Some(existing) = out
                .iam_instance_profile_associations
                .first()
                .filter(|a| a.instance_id == self.instance)
            {
                self.api
                    .replace_iam_instance_profile_association(
                        ReplaceIamInstanceProfileAssociationInput {
                            association_id: existing.association_id.clone(),
                            iam_instance_profile: self.profile(),
                        },
                    )
                    .await?;
                info!(
                    instance = %self.instance,
                    profile = %self.name,
                    "instanceprofile: association replaced"
                );
                return Ok(String::new());
            }
        }

        self.api
            .associate_iam_instance_profile(AssociateIamInstanceProfileInput {
                iam_instance_profile: self.profile(),
                instance_id: self.instance.clone(),
            })
            .await?;
        Ok(String::new())
    }
}

pub struct DetachInstanceProfile {
    api: Arc<dyn Ec2Api>,
    instance: String,
    name: String,
}

impl DetachInstanceProfile {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        DetachInstanceProfile {
            api,
            instance: String::new(),
            name: String::new(),
        }
    }
}

#[async_trait]
impl Command for DetachInstanceProfile {
    descriptor!("detach", "instanceprofile", "ec2");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("instance"), Rule::key("name")])
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        self.instance = required(p.string("instance")?, "instance")?;
        self.name = required(p.string("name")?, "name")?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let out = self
            .api
            .describe_iam_instance_profile_associations(association_filters(&self.instance))
            .await?;
        let mut last = None;
        for association in out.iam_instance_profile_associations {
            let matches = association
                .iam_instance_profile
                .arn
                .as_deref()
                .is_some_and(|arn| arn.contains(&self.name));
            if !matches {
                continue;
            }
            self.api
                .disassociate_iam_instance_profile(AssociationIdInput {
                    association_id: association.association_id.clone(),
                })
                .await?;
            last = Some(association.association_id);
        }
        last.ok_or_else(|| {
            CommandError::Other(format!(
                "no association of instance profile '{}' found on instance '{}'",
                self.name, self.instance
            ))
        })
    }
}

// ──────────────────────────────────────────────
// Users and groups
// ──────────────────────────────────────────────

pub struct CreateUser {
    api: Arc<dyn IamApi>,
    input: UserNameInput,
}

impl CreateUser {
    pub fn new(api: Arc<dyn IamApi>) -> Self {
        CreateUser {
            api,
            input: UserNameInput::default(),
        }
    }
}

#[async_trait]
impl Command for CreateUser {
    descriptor!("create", "user", "iam");

    fn params_rule(&self) -> Rule {
        Rule::key("name")
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.input.user_name = name_param(params)?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        Ok(self.api.create_user(self.input.clone()).await?.user.user_id)
    }
}

pub struct DeleteUser {
    api: Arc<dyn IamApi>,
    input: UserNameInput,
}

impl DeleteUser {
    pub fn new(api: Arc<dyn IamApi>) -> Self {
        DeleteUser {
            api,
            input: UserNameInput::default(),
        }
    }
}

#[async_trait]
impl Command for DeleteUser {
    descriptor!("delete", "user", "iam");

    fn params_rule(&self) -> Rule {
        Rule::key("name")
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.input.user_name = name_param(params)?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.delete_user(self.input.clone()).await?;
        Ok(String::new())
    }
}

fn user_group(params: &ParamMap) -> Result<UserGroupInput, CommandError> {
    let p = Injector::new(params);
    Ok(UserGroupInput {
        group_name: required(p.string("group")?, "group")?,
        user_name: required(p.string("name")?, "name")?,
    })
}

pub struct AttachUser {
    api: Arc<dyn IamApi>,
    input: UserGroupInput,
}

impl AttachUser {
    pub fn new(api: Arc<dyn IamApi>) -> Self {
        AttachUser {
            api,
            input: UserGroupInput::default(),
        }
    }
}

#[async_trait]
impl Command for AttachUser {
    descriptor!("attach", "user", "iam");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("group"), Rule::key("name")])
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.input = user_group(params)?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.add_user_to_group(self.input.clone()).await?;
        Ok(String::new())
    }
}

pub struct DetachUser {
    api: Arc<dyn IamApi>,
    input: UserGroupInput,
}

impl DetachUser {
    pub fn new(api: Arc<dyn IamApi>) -> Self {
        DetachUser {
            api,
            input: UserGroupInput::default(),
        }
    }
}

#[async_trait]
impl Command for DetachUser {
    descriptor!("detach", "user", "iam");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("group"), Rule::key("name")])
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.input = user_group(params)?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.remove_user_from_group(self.input.clone()).await?;
        Ok(String::new())
    }
}

pub struct CreateGroup {
    api: Arc<dyn IamApi>,
    input: GroupNameInput,
}

impl CreateGroup {
    pub fn new(api: Arc<dyn IamApi>) -> Self {
        CreateGroup {
            api,
            input: GroupNameInput::default(),
        }
    }
}

#[async_trait]
impl Command for CreateGroup {
    descriptor!("create", "group", "iam");

    fn params_rule(&self) -> Rule {
        Rule::key("name")
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.input.group_name = name_param(params)?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        Ok(self.api.create_group(self.input.clone()).await?.group.group_id)
    }
}

pub struct DeleteGroup {
    api: Arc<dyn IamApi>,
    input: GroupNameInput,
}

impl DeleteGroup {
    pub fn new(api: Arc<dyn IamApi>) -> Self {
        DeleteGroup {
            api,
            input: GroupNameInput::default(),
        }
    }
}

#[async_trait]
impl Command for DeleteGroup {
    descriptor!("delete", "group", "iam");

    fn params_rule(&self) -> Rule {
        Rule::key("name")
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.input.group_name = name_param(params)?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.delete_group(self.input.clone()).await?;
        Ok(String::new())
    }
}

// ──────────────────────────────────────────────
// Policies
// ──────────────────────────────────────────────

/// A single-statement policy document.
fn policy_document(effect: &str, actions: &[String], resources: &[String]) -> String {
    let mut effect = effect.to_lowercase();
    if let Some(first) = effect.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    let resources: Vec<&str> = resources
        .iter()
        .map(|r| if r == "all" { "*" } else { r.as_str() })
        .collect();
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": effect,
            "Action": actions,
            "Resource": resources,
        }]
    })
    .to_string()
}

pub struct CreatePolicy {
    api: Arc<dyn IamApi>,
    input: CreatePolicyInput,
}

impl CreatePolicy {
    pub fn new(api: Arc<dyn IamApi>) -> Self {
        CreatePolicy {
            api,
            input: CreatePolicyInput::default(),
        }
    }
}

#[async_trait]
impl Command for CreatePolicy {
    descriptor!("create", "policy", "iam");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![
            Rule::key("action"),
            Rule::key("effect"),
            Rule::key("name"),
            Rule::key("resource"),
            Rule::opt(&["description"]),
        ])
    }

    fn validators(&self) -> Validators {
        Validators::new().with("effect", is_in_enum_ignore_case(EFFECTS))
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        let effect = required(p.string("effect")?, "effect")?;
        let actions = required(p.strings("action")?, "action")?;
        let resources = required(p.strings("resource")?, "resource")?;
        self.input = CreatePolicyInput {
            policy_name: required(p.string("name")?, "name")?,
            policy_document: policy_document(&effect, &actions, &resources),
            description: p.string("description")?,
        };
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        Ok(self.api.create_policy(self.input.clone()).await?.policy.arn)
    }
}

/// Deletes a policy; with `all-versions=true` the non-default versions are
/// deleted first, as IAM refuses to delete a policy that still has them.
pub struct DeletePolicy {
    api: Arc<dyn IamApi>,
    arn: String,
    all_versions: bool,
}

impl DeletePolicy {
    pub fn new(api: Arc<dyn IamApi>) -> Self {
        DeletePolicy {
            api,
            arn: String::new(),
            all_versions: false,
        }
    }
}

#[async_trait]
impl Command for DeletePolicy {
    descriptor!("delete", "policy", "iam");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("arn"), Rule::opt(&["all-versions"])])
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        self.arn = required(p.string("arn")?, "arn")?;
        self.all_versions = p.bool("all-versions")?.unwrap_or(false);
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let arn = PolicyArnInput {
            policy_arn: self.arn.clone(),
        };
        if self.all_versions {
            let out = self.api.list_policy_versions(arn.clone()).await?;
            for version in out.versions.into_iter().filter(|v| !v.is_default_version) {
                self.api
                    .delete_policy_version(PolicyVersionInput {
                        policy_arn: self.arn.clone(),
                        version_id: version.version_id,
                    })
                    .await?;
            }
        }
        self.api.delete_policy(arn).await?;
        Ok(String::new())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Principal {
    User,
    Group,
    Role,
}

fn policy_attachment(params: &ParamMap) -> Result<(Principal, PolicyAttachmentInput), CommandError> {
    let p = Injector::new(params);
    let input = PolicyAttachmentInput {
        policy_arn: required(p.string("arn")?, "arn")?,
        user_name: p.string("user")?,
        group_name: p.string("group")?,
        role_name: p.string("role")?,
    };
    let principal = if input.user_name.is_some() {
        Principal::User
    } else if input.group_name.is_some() {
        Principal::Group
    } else if input.role_name.is_some() {
        Principal::Role
    } else {
        return Err(CommandError::MissingParam("user".into()));
    };
    Ok((principal, input))
}

fn policy_attachment_rule() -> Rule {
    Rule::all_of(vec![
        Rule::only_one_of(vec![Rule::key("user"), Rule::key("role"), Rule::key("group")]),
        Rule::key("arn"),
    ])
}

pub struct AttachPolicy {
    api: Arc<dyn IamApi>,
    principal: Principal,
    input: PolicyAttachmentInput,
}

impl AttachPolicy {
    pub fn new(api: Arc<dyn IamApi>) -> Self {
        AttachPolicy {
            api,
            principal: Principal::User,
            input: PolicyAttachmentInput::default(),
        }
    }
}

#[async_trait]
impl Command for AttachPolicy {
    descriptor!("attach", "policy", "iam");

    fn params_rule(&self) -> Rule {
        policy_attachment_rule()
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        (self.principal, self.input) = policy_attachment(params)?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let input = self.input.clone();
        match self.principal {
            Principal::User => self.api.attach_user_policy(input).await?,
            Principal::Group => self.api.attach_group_policy(input).await?,
            Principal::Role => self.api.attach_role_policy(input).await?,
        };
        Ok(String::new())
    }
}

pub struct DetachPolicy {
    api: Arc<dyn IamApi>,
    principal: Principal,
    input: PolicyAttachmentInput,
}

impl DetachPolicy {
    pub fn new(api: Arc<dyn IamApi>) -> Self {
        DetachPolicy {
            api,
            principal: Principal::User,
            input: PolicyAttachmentInput::default(),
        }
    }
}

#[async_trait]
impl Command for DetachPolicy {
    descriptor!("detach", "policy", "iam");

    fn params_rule(&self) -> Rule {
        policy_attachment_rule()
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        (self.principal, self.input) = policy_attachment(params)?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let input = self.input.clone();
        match self.principal {
            Principal::User => self.api.detach_user_policy(input).await?,
            Principal::Group => self.api.detach_group_policy(input).await?,
            Principal::Role => self.api.detach_role_policy(input).await?,
        };
        Ok(String::new())
    }
}

// ──────────────────────────────────────────────
// Access keys
// ──────────────────────────────────────────────

pub struct CreateAccessKey {
    api: Arc<dyn IamApi>,
    input: UserNameInput,
    save: bool,
}

impl CreateAccessKey {
    pub fn new(api: Arc<dyn IamApi>) -> Self {
        CreateAccessKey {
            api,
            input: UserNameInput::default(),
            save: false,
        }
    }
}

#[async_trait]
impl Command for CreateAccessKey {
    descriptor!("create", "accesskey", "iam");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("user"), Rule::opt(&["save"])])
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        self.input.user_name = required(p.string("user")?, "user")?;
        self.save = p.bool("save")?.unwrap_or(false);
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let key = self
            .api
            .create_access_key(self.input.clone())
            .await?
            .access_key;
        let credentials = format!(
            "[{}]\naws_access_key_id = {}\naws_secret_access_key = {}\n",
            self.input.user_name, key.access_key_id, key.secret_access_key
        );
        if self.save {
            let path = keygen::keys_dir()
                .map(|dir| dir.join(format!("{}.credentials", self.input.user_name)))
                .ok_or_else(|| CommandError::Io("keys directory is not configured".into()))?;
            keygen::write_private_key(&path, &credentials).map_err(CommandError::Io)?;
            info!(path = %path.display(), "accesskey: credentials saved");
        } else {
            eprintln!("{}", credentials);
        }
        Ok(key.access_key_id)
    }
}

pub struct DeleteAccessKey {
    api: Arc<dyn IamApi>,
    input: AccessKeyInput,
}

impl DeleteAccessKey {
    pub fn new(api: Arc<dyn IamApi>) -> Self {
        DeleteAccessKey {
            api,
            input: AccessKeyInput::default(),
        }
    }
}

#[async_trait]
impl Command for DeleteAccessKey {
    descriptor!("delete", "accesskey", "iam");

    fn params_rule(&self) -> Rule {
        Rule::at_least_one_of(vec![Rule::key("id"), Rule::key("user")])
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        self.input = AccessKeyInput {
            access_key_id: required(p.string("id")?, "id")?,
            user_name: p.string("user")?,
        };
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.delete_access_key(self.input.clone()).await?;
        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value as Json;
    use stratus_core::Value;

    use super::*;
    use crate::testing::{apis, run, Recorder};

    #[test]
    fn policy_document_shape() {
        let doc = policy_document(
            "ALLOW",
            &["ec2:Describe*".to_string()],
            &["all".to_string()],
        );
        let doc: Json = serde_json::from_str(&doc).unwrap();
        assert_eq!(
            doc,
            json!({
                "Version": "2012-10-17",
                "Statement": [{"Effect": "Allow", "Action": ["ec2:Describe*"], "Resource": ["*"]}]
            })
        );
    }

    #[tokio::test]
    async fn attach_policy_targets_the_given_principal() {
        let rec = Recorder::new();
        let mut cmd = AttachPolicy::new(apis(&rec).iam);
        run(
            &mut cmd,
            &[("arn", Value::str("arn:p")), ("role", Value::str("ops"))],
        )
        .await
        .unwrap();
        assert_eq!(rec.call_names(), vec!["AttachRolePolicy"]);
        assert_eq!(
            rec.input("AttachRolePolicy"),
            json!({"PolicyArn": "arn:p", "RoleName": "ops"})
        );
    }

    #[tokio::test]
    async fn delete_policy_drops_non_default_versions_first() {
        let rec = Recorder::new();
        rec.reply(
            "ListPolicyVersions",
            json!({"Versions": [
                {"VersionId": "v1", "IsDefaultVersion": false},
                {"VersionId": "v2", "IsDefaultVersion": true}
            ]}),
        );
        let mut cmd = DeletePolicy::new(apis(&rec).iam);
        run(
            &mut cmd,
            &[("arn", Value::str("arn:p")), ("all-versions", Value::Bool(true))],
        )
        .await
        .unwrap();
        assert_eq!(
            rec.call_names(),
            vec!["ListPolicyVersions", "DeletePolicyVersion", "DeletePolicy"]
        );
        assert_eq!(
            rec.input("DeletePolicyVersion"),
            json!({"PolicyArn": "arn:p", "VersionId": "v1"})
        );
    }

    #[tokio::test]
    async fn attach_profile_without_existing_association() {
        let rec = Recorder::new();
        rec.reply(
            "DescribeIamInstanceProfileAssociations",
            json!({"IamInstanceProfileAssociations": []}),
        );
        let mut cmd = AttachInstanceProfile::new(apis(&rec).ec2);
        run(
            &mut cmd,
            &[
                ("instance", Value::str("i-1")),
                ("name", Value::str("web")),
                ("replace", Value::Bool(true)),
            ],
        )
        .await
        .unwrap();
        assert_eq!(
            rec.call_names(),
            vec!["DescribeIamInstanceProfileAssociations", "AssociateIamInstanceProfile"]
        );
    }

    #[tokio::test]
    async fn detach_profile_disassociates_matching_arns() {
        let rec = Recorder::new();
        rec.reply(
            "DescribeIamInstanceProfileAssociations",
            json!({"IamInstanceProfileAssociations": [
                {"AssociationId": "a-1", "InstanceId": "i-1", "IamInstanceProfile": {"Arn": "arn:aws:iam::1:instance-profile/other"}},
                {"AssociationId": "a-2", "InstanceId": "i-1", "IamInstanceProfile": {"Arn": "arn:aws:iam::1:instance-profile/web"}}
            ]}),
        );
        let mut cmd = DetachInstanceProfile::new(apis(&rec).ec2);
        let out = run(
            &mut cmd,
            &[("instance", Value::str("i-1")), ("name", Value::str("web"))],
        )
        .await
        .unwrap();
        assert_eq!(out, "a-2");
        assert_eq!(
            rec.input("DisassociateIamInstanceProfile"),
            json!({"AssociationId": "a-2"})
        );
    }

    #[tokio::test]
    async fn delete_access_key_requires_id() {
        let mut cmd = DeleteAccessKey::new(apis(&Recorder::new()).iam);
        let err = run(&mut cmd, &[("user", Value::str("bob"))]).await.unwrap_err();
        assert_eq!(err, CommandError::MissingParam("id".into()));
    }
}
