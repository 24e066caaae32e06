use serde::{Deserialize, Serialize};

use super::{Empty, Filter, Tag};

provider_api! {
    /// Elastic Compute Cloud: instances, networking, volumes and images.
    "ec2" => pub trait Ec2Api {
        fn run_instances(RunInstancesInput) -> RunInstancesOutput = "RunInstances";
        fn terminate_instances(InstanceIdsInput) -> Empty = "TerminateInstances";
        fn start_instances(InstanceIdsInput) -> InstanceStateChangeOutput = "StartInstances";
        fn stop_instances(InstanceIdsInput) -> InstanceStateChangeOutput = "StopInstances";
        fn reboot_instances(InstanceIdsInput) -> Empty = "RebootInstances";
        fn describe_instances(DescribeInstancesInput) -> DescribeInstancesOutput = "DescribeInstances";
        fn modify_instance_attribute(ModifyInstanceAttributeInput) -> Empty = "ModifyInstanceAttribute";
        fn create_tags_request(CreateTagsInput) -> Empty = "CreateTagsRequest";
        fn delete_tags(CreateTagsInput) -> Empty = "DeleteTags";
        fn create_vpc(CreateVpcInput) -> CreateVpcOutput = "CreateVpc";
        fn delete_vpc(VpcIdInput) -> Empty = "DeleteVpc";
        fn create_subnet(CreateSubnetInput) -> CreateSubnetOutput = "CreateSubnet";
        fn modify_subnet_attribute(ModifySubnetAttributeInput) -> Empty = "ModifySubnetAttribute";
        fn delete_subnet(SubnetIdInput) -> Empty = "DeleteSubnet";
        fn create_security_group(CreateSecurityGroupInput) -> CreateSecurityGroupOutput = "CreateSecurityGroup";
        fn delete_security_group(GroupIdInput) -> Empty = "DeleteSecurityGroup";
        fn authorize_security_group_ingress(SecurityGroupRulesInput) -> Empty = "AuthorizeSecurityGroupIngress";
        fn authorize_security_group_egress(SecurityGroupRulesInput) -> Empty = "AuthorizeSecurityGroupEgress";
        fn revoke_security_group_ingress(SecurityGroupRulesInput) -> Empty = "RevokeSecurityGroupIngress";
        fn revoke_security_group_egress(SecurityGroupRulesInput) -> Empty = "RevokeSecurityGroupEgress";
        fn describe_network_interfaces(FiltersInput) -> DescribeNetworkInterfacesOutput = "DescribeNetworkInterfaces";
        fn create_internet_gateway(Empty) -> CreateInternetGatewayOutput = "CreateInternetGateway";
        fn delete_internet_gateway(InternetGatewayInput) -> Empty = "DeleteInternetGateway";
        fn attach_internet_gateway(InternetGatewayInput) -> Empty = "AttachInternetGateway";
        fn detach_internet_gateway(InternetGatewayInput) -> Empty = "DetachInternetGateway";
        fn create_route_table(VpcIdInput) -> CreateRouteTableOutput = "CreateRouteTable";
        fn delete_route_table(RouteTableInput) -> Empty = "DeleteRouteTable";
        fn associate_route_table(AssociateRouteTableInput) -> AssociationOutput = "AssociateRouteTable";
        fn disassociate_route_table(AssociationIdInput) -> Empty = "DisassociateRouteTable";
        fn create_route(RouteInput) -> Empty = "CreateRoute";
        fn delete_route(RouteInput) -> Empty = "DeleteRoute";
        fn allocate_address(AllocateAddressInput) -> AllocateAddressOutput = "AllocateAddress";
        fn release_address(ReleaseAddressInput) -> Empty = "ReleaseAddress";
        fn associate_address(AssociateAddressInput) -> AssociationOutput = "AssociateAddress";
        fn disassociate_address(AssociationIdInput) -> Empty = "DisassociateAddress";
        fn import_key_pair(ImportKeyPairInput) -> ImportKeyPairOutput = "ImportKeyPair";
        fn delete_key_pair(KeyNameInput) -> Empty = "DeleteKeyPair";
        fn create_volume(CreateVolumeInput) -> Volume = "CreateVolume";
        fn delete_volume(VolumeIdInput) -> Empty = "DeleteVolume";
        fn attach_volume(VolumeAttachmentInput) -> VolumeAttachment = "AttachVolume";
        fn detach_volume(VolumeAttachmentInput) -> VolumeAttachment = "DetachVolume";
        fn describe_volumes(DescribeVolumesInput) -> DescribeVolumesOutput = "DescribeVolumes";
        fn create_image(CreateImageInput) -> ImageIdOutput = "CreateImage";
        fn copy_image(CopyImageInput) -> ImageIdOutput = "CopyImage";
        fn deregister_image(ImageIdInput) -> Empty = "DeregisterImage";
        fn describe_images(DescribeImagesInput) -> DescribeImagesOutput = "DescribeImages";
        fn delete_snapshot(SnapshotIdInput) -> Empty = "DeleteSnapshot";
        fn describe_iam_instance_profile_associations(FiltersInput) -> DescribeIamInstanceProfileAssociationsOutput = "DescribeIamInstanceProfileAssociations";
        fn associate_iam_instance_profile(AssociateIamInstanceProfileInput) -> Empty = "AssociateIamInstanceProfile";
        fn replace_iam_instance_profile_association(ReplaceIamInstanceProfileAssociationInput) -> Empty = "ReplaceIamInstanceProfileAssociation";
        fn disassociate_iam_instance_profile(AssociationIdInput) -> Empty = "DisassociateIamInstanceProfile";
    }
}

// ──────────────────────────────────────────────
// Instances
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IamInstanceProfileSpecification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RunInstancesInput {
    pub image_id: String,
    pub instance_type: String,
    pub min_count: i64,
    pub max_count: i64,
    pub subnet_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_group_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iam_instance_profile: Option<IamInstanceProfileSpecification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_api_termination: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceState {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupIdentifier {
    pub group_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Instance {
    pub instance_id: String,
    #[serde(default)]
    pub state: InstanceState,
    #[serde(default)]
    pub security_groups: Vec<GroupIdentifier>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RunInstancesOutput {
    #[serde(default)]
    pub instances: Vec<Instance>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceIdsInput {
    pub instance_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceStateChange {
    pub instance_id: String,
    #[serde(default)]
    pub current_state: InstanceState,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceStateChangeOutput {
    #[serde(default, alias = "StartingInstances", alias = "StoppingInstances")]
    pub instances: Vec<InstanceStateChange>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeInstancesInput {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instance_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Reservation {
    #[serde(default)]
    pub instances: Vec<Instance>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeInstancesOutput {
    #[serde(default)]
    pub reservations: Vec<Reservation>,
}

impl DescribeInstancesOutput {
    pub fn instances(&self) -> impl Iterator<Item = &Instance> {
        self.reservations.iter().flat_map(|r| r.instances.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeValue<T> {
    pub value: T,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModifyInstanceAttributeInput {
    pub instance_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<AttributeValue<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_api_termination: Option<AttributeValue<bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateTagsInput {
    pub resources: Vec<String>,
    pub tags: Vec<Tag>,
}

// ──────────────────────────────────────────────
// Networking
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateVpcInput {
    pub cidr_block: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VpcIdInput {
    pub vpc_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateVpcOutput {
    #[serde(default)]
    pub vpc: VpcIdInput,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateSubnetInput {
    pub cidr_block: String,
    pub vpc_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubnetIdInput {
    pub subnet_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateSubnetOutput {
    #[serde(default)]
    pub subnet: SubnetIdInput,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModifySubnetAttributeInput {
    pub subnet_id: String,
    pub map_public_ip_on_launch: AttributeValue<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateSecurityGroupInput {
    pub group_name: String,
    pub vpc_id: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateSecurityGroupOutput {
    pub group_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupIdInput {
    pub group_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IpRange {
    pub cidr_ip: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IpPermission {
    pub ip_protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_port: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_port: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ip_ranges: Vec<IpRange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_id_group_pairs: Vec<GroupIdentifier>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityGroupRulesInput {
    pub group_id: String,
    pub ip_permissions: Vec<IpPermission>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FiltersInput {
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkInterface {
    pub network_interface_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeNetworkInterfacesOutput {
    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterface>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InternetGatewayInput {
    pub internet_gateway_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateInternetGatewayOutput {
    #[serde(default)]
    pub internet_gateway: InternetGatewayInput,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouteTableInput {
    pub route_table_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateRouteTableOutput {
    #[serde(default)]
    pub route_table: RouteTableInput,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssociateRouteTableInput {
    pub route_table_id: String,
    pub subnet_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssociationOutput {
    #[serde(default)]
    pub association_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssociationIdInput {
    pub association_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouteInput {
    pub route_table_id: String,
    pub destination_cidr_block: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AllocateAddressInput {
    pub domain: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AllocateAddressOutput {
    pub allocation_id: String,
    #[serde(default)]
    pub public_ip: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReleaseAddressInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_ip: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssociateAddressInput {
    pub allocation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_interface_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_reassociation: Option<bool>,
}

// ──────────────────────────────────────────────
// Key pairs, volumes and images
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImportKeyPairInput {
    pub key_name: String,
    pub public_key_material: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImportKeyPairOutput {
    #[serde(default)]
    pub key_name: String,
    #[serde(default)]
    pub key_fingerprint: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeyNameInput {
    pub key_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateVolumeInput {
    pub availability_zone: String,
    pub size: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Volume {
    pub volume_id: String,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VolumeIdInput {
    pub volume_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VolumeAttachmentInput {
    pub device: String,
    pub instance_id: String,
    pub volume_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VolumeAttachment {
    #[serde(default)]
    pub volume_id: String,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeVolumesInput {
    pub volume_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeVolumesOutput {
    #[serde(default)]
    pub volumes: Vec<Volume>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateImageInput {
    pub instance_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub no_reboot: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CopyImageInput {
    pub source_image_id: String,
    pub source_region: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageIdOutput {
    pub image_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageIdInput {
    pub image_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeImagesInput {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owners: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub executable_users: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EbsBlockDevice {
    #[serde(default)]
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BlockDeviceMapping {
    #[serde(default)]
    pub ebs: Option<EbsBlockDevice>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Image {
    pub image_id: String,
    #[serde(default)]
    pub name: String,
    /// RFC 3339 creation timestamp.
    #[serde(default)]
    pub creation_date: String,
    #[serde(default)]
    pub block_device_mappings: Vec<BlockDeviceMapping>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeImagesOutput {
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SnapshotIdInput {
    pub snapshot_id: String,
}

// ──────────────────────────────────────────────
// Instance profile associations
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IamInstanceProfileAssociation {
    pub association_id: String,
    #[serde(default)]
    pub instance_id: String,
    #[serde(default)]
    pub iam_instance_profile: IamInstanceProfileSpecification,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeIamInstanceProfileAssociationsOutput {
    #[serde(default)]
    pub iam_instance_profile_associations: Vec<IamInstanceProfileAssociation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssociateIamInstanceProfileInput {
    pub iam_instance_profile: IamInstanceProfileSpecification,
    pub instance_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReplaceIamInstanceProfileAssociationInput {
    pub association_id: String,
    pub iam_instance_profile: IamInstanceProfileSpecification,
}
