//! Typed artifact records.
//!
//! Each record carries the data for one rendered unit and maps it to
//! template placeholders. The indexed model never sees template text, and
//! templates never see the model.

use std::collections::BTreeMap;

use lift_graph::{IndexedInstance, IndexedSecurityGroup, IndexedVpc};
use lift_model::{Rule, Tag};

use crate::templates;

pub const VPC_MODULE_FILE: &str = "vpc-module.tf";
pub const VPC_VARIABLES_FILE: &str = "vpc-variables.tf";
pub const VPC_AUTO_TFVARS_FILE: &str = "vpc.auto.tfvars";
pub const GENERIC_VARIABLES_FILE: &str = "generic-variables.tf";
pub const TERRAFORM_TFVARS_FILE: &str = "terraform.tfvars";
pub const VERSIONS_FILE: &str = "versions.tf";
pub const BACKEND_FILE: &str = "backend.tf";
pub const SECURITY_GROUPS_FILE: &str = "security-groups.tf";
pub const EC2_INSTANCES_FILE: &str = "ec2-instances.tf";
pub const EIP_FILE: &str = "eip-resources.tf";

/// Placeholder values. `None` marks a required value that is absent.
pub type Bindings = BTreeMap<&'static str, Option<String>>;

/// Something that can be rendered from a template.
pub trait Template {
    fn template(&self) -> &'static str;
    fn bindings(&self) -> Bindings;
}

/// A rendered unit appended to a per-Vpc file.
pub trait Artifact: Template {
    fn file_name(&self) -> &'static str;
    /// Ids reported when this artifact cannot be rendered.
    fn resource_ids(&self) -> Vec<String>;
}

/// Terraform expression referencing a generated security group.
pub fn security_group_reference(index: usize) -> String {
    format!("aws_security_group.security_group_{}.id", index)
}

/// Terraform expression referencing a generated instance module.
pub fn instance_reference(index: usize) -> String {
    format!("module.ec2_instance_{}", index)
}

/// Quote a value as an HCL string literal.
pub fn quoted(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace("${", "$${")
        .replace("%{", "%%{");
    format!("\"{}\"", escaped)
}

/// A list of quoted strings.
pub fn string_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    expression_list(items.into_iter().map(|s| quoted(s.as_ref())))
}

/// A list of raw expressions.
pub fn expression_list(items: impl IntoIterator<Item = String>) -> String {
    format!("[{}]", items.into_iter().collect::<Vec<_>>().join(", "))
}

/// Tags as an HCL map. Keys that are not plain identifiers are quoted.
pub fn tag_map(tags: &[Tag]) -> String {
    let entries: Vec<String> = tags
        .iter()
        .map(|tag| {
            let key = if is_identifier(&tag.key) {
                tag.key.clone()
            } else {
                quoted(&tag.key)
            };
            format!("{} = {}", key, quoted(&tag.value))
        })
        .collect();
    format!("{{{}}}", entries.join(", "))
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn value(v: impl ToString) -> Option<String> {
    Some(v.to_string())
}

/// A quoted value that must not be blank.
fn required(v: &str) -> Option<String> {
    if v.trim().is_empty() {
        None
    } else {
        Some(quoted(v))
    }
}

/// The network module declaration. Has no placeholders.
pub struct NetworkModule {
    pub vpc_id: String,
}

impl Template for NetworkModule {
    fn template(&self) -> &'static str {
        templates::VPC_MODULE
    }

    fn bindings(&self) -> Bindings {
        Bindings::new()
    }
}

impl Artifact for NetworkModule {
    fn file_name(&self) -> &'static str {
        VPC_MODULE_FILE
    }

    fn resource_ids(&self) -> Vec<String> {
        vec![self.vpc_id.clone()]
    }
}

/// Values shared by the Vpc variable declarations and their bindings.
#[derive(Debug, Clone)]
pub struct VpcSettings {
    pub vpc_id: String,
    pub name: String,
    pub cidr_block: String,
    pub public_subnets: Vec<String>,
    pub tags: Vec<Tag>,
}

impl VpcSettings {
    pub fn from_vpc(vpc: &IndexedVpc) -> Self {
        Self {
            vpc_id: vpc.id.clone(),
            name: vpc.name(),
            cidr_block: vpc.cidr_block.clone(),
            public_subnets: vpc.subnets.iter().map(|s| s.cidr_block.clone()).collect(),
            tags: vpc.tags.clone(),
        }
    }

    fn bindings(&self) -> Bindings {
        let mut b = Bindings::new();
        b.insert("vpc_name", required(&self.name));
        b.insert("cidr_block", required(&self.cidr_block));
        b.insert("public_subnets", value(string_list(&self.public_subnets)));
        b.insert("tags", value(tag_map(&self.tags)));
        b
    }
}

/// `vpc-variables.tf`.
pub struct VpcVariables(pub VpcSettings);

impl Template for VpcVariables {
    fn template(&self) -> &'static str {
        templates::VPC_VARIABLES
    }

    fn bindings(&self) -> Bindings {
        self.0.bindings()
    }
}

impl Artifact for VpcVariables {
    fn file_name(&self) -> &'static str {
        VPC_VARIABLES_FILE
    }

    fn resource_ids(&self) -> Vec<String> {
        vec![self.0.vpc_id.clone()]
    }
}

/// `vpc.auto.tfvars`.
pub struct VpcAutoValues(pub VpcSettings);

impl Template for VpcAutoValues {
    fn template(&self) -> &'static str {
        templates::VPC_AUTO_TFVARS
    }

    fn bindings(&self) -> Bindings {
        self.0.bindings()
    }
}

impl Artifact for VpcAutoValues {
    fn file_name(&self) -> &'static str {
        VPC_AUTO_TFVARS_FILE
    }

    fn resource_ids(&self) -> Vec<String> {
        vec![self.0.vpc_id.clone()]
    }
}

/// Destination region, either as a variable declaration or as a value.
pub struct RegionSetting {
    pub vpc_id: String,
    pub region: String,
    /// `true` for `terraform.tfvars`, `false` for `generic-variables.tf`.
    pub as_value: bool,
}

impl Template for RegionSetting {
    fn template(&self) -> &'static str {
        if self.as_value {
            templates::TERRAFORM_TFVARS
        } else {
            templates::GENERIC_VARIABLES
        }
    }

    fn bindings(&self) -> Bindings {
        let mut b = Bindings::new();
        b.insert("region", required(&self.region));
        b
    }
}

impl Artifact for RegionSetting {
    fn file_name(&self) -> &'static str {
        if self.as_value {
            TERRAFORM_TFVARS_FILE
        } else {
            GENERIC_VARIABLES_FILE
        }
    }

    fn resource_ids(&self) -> Vec<String> {
        vec![self.vpc_id.clone()]
    }
}

pub struct Versions {
    pub vpc_id: String,
}

impl Template for Versions {
    fn template(&self) -> &'static str {
        templates::VERSIONS
    }

    fn bindings(&self) -> Bindings {
        Bindings::new()
    }
}

impl Artifact for Versions {
    fn file_name(&self) -> &'static str {
        VERSIONS_FILE
    }

    fn resource_ids(&self) -> Vec<String> {
        vec![self.vpc_id.clone()]
    }
}

/// S3 remote-state backend. The state key is prefixed with the Vpc name.
pub struct Backend {
    pub vpc_id: String,
    pub vpc_name: String,
    pub bucket: String,
    pub key: String,
    pub region: String,
    pub lock_table: String,
}

impl Template for Backend {
    fn template(&self) -> &'static str {
        templates::BACKEND
    }

    fn bindings(&self) -> Bindings {
        let mut b = Bindings::new();
        b.insert("bucket", required(&self.bucket));
        b.insert(
            "key",
            required(&self.key).map(|_| quoted(&format!("{}/{}", self.vpc_name, self.key))),
        );
        b.insert("region", required(&self.region));
        b.insert("lock_table", required(&self.lock_table));
        b
    }
}

impl Artifact for Backend {
    fn file_name(&self) -> &'static str {
        BACKEND_FILE
    }

    fn resource_ids(&self) -> Vec<String> {
        vec![self.vpc_id.clone()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleDirection {
    Ingress,
    Egress,
}

/// One ingress or egress block nested in a security group declaration.
pub struct RuleBlock<'a> {
    pub direction: RuleDirection,
    pub rule: &'a Rule,
}

impl Template for RuleBlock<'_> {
    fn template(&self) -> &'static str {
        match self.direction {
            RuleDirection::Ingress => templates::INGRESS_RULE,
            RuleDirection::Egress => templates::EGRESS_RULE,
        }
    }

    fn bindings(&self) -> Bindings {
        let rule = self.rule;
        let mut b = Bindings::new();
        b.insert("description", value(quoted(&rule.description)));
        b.insert("from_port", value(rule.from_port));
        b.insert("to_port", value(rule.to_port));
        b.insert("protocol", required(&rule.protocol));
        b.insert("cidr_blocks", value(string_list(&rule.cidr_blocks)));
        b.insert("ipv6_cidr_blocks", value(string_list(&rule.ipv6_cidr_blocks)));
        b
    }
}

/// The canonical declaration of one security group.
///
/// Rule blocks are rendered beforehand and bound as text.
pub struct SecurityGroupDeclaration {
    pub vpc_id: String,
    pub index: usize,
    pub group_id: String,
    pub tags: Vec<Tag>,
    pub ingress_rules: String,
    pub egress_rules: String,
}

impl SecurityGroupDeclaration {
    pub fn new(vpc: &IndexedVpc, group: &IndexedSecurityGroup, ingress: String, egress: String) -> Self {
        Self {
            vpc_id: vpc.id.clone(),
            index: group.index,
            group_id: group.group.id.clone(),
            tags: group.group.tags.clone(),
            ingress_rules: ingress,
            egress_rules: egress,
        }
    }
}

impl Template for SecurityGroupDeclaration {
    fn template(&self) -> &'static str {
        templates::SECURITY_GROUP
    }

    fn bindings(&self) -> Bindings {
        let mut b = Bindings::new();
        b.insert("index", value(self.index));
        b.insert(
            "description",
            value(quoted(&format!("Migrated from {}", self.group_id))),
        );
        b.insert("ingress_rules", value(&self.ingress_rules));
        b.insert("egress_rules", value(&self.egress_rules));
        b.insert("tags", value(tag_map(&self.tags)));
        b
    }
}

impl Artifact for SecurityGroupDeclaration {
    fn file_name(&self) -> &'static str {
        SECURITY_GROUPS_FILE
    }

    fn resource_ids(&self) -> Vec<String> {
        vec![self.vpc_id.clone(), self.group_id.clone()]
    }
}

/// One instance module declaration.
pub struct InstanceDeclaration {
    pub vpc_id: String,
    pub index: usize,
    pub instance_id: String,
    pub image_id: String,
    pub instance_type: String,
    pub subnet_position: usize,
    pub security_group_indices: Vec<usize>,
    pub tags: Vec<Tag>,
}

impl InstanceDeclaration {
    pub fn new(vpc: &IndexedVpc, instance: &IndexedInstance) -> Self {
        Self {
            vpc_id: vpc.id.clone(),
            index: instance.index,
            instance_id: instance.id.clone(),
            image_id: instance.image_id.clone(),
            instance_type: instance.instance_type.clone(),
            subnet_position: instance.subnet_position,
            security_group_indices: instance.security_group_indices(),
            tags: instance.tags.clone(),
        }
    }
}

impl Template for InstanceDeclaration {
    fn template(&self) -> &'static str {
        templates::EC2_INSTANCE
    }

    fn bindings(&self) -> Bindings {
        let mut b = Bindings::new();
        b.insert("index", value(self.index));
        b.insert("name", value(quoted(&format!("instance-{}", self.index))));
        b.insert("image_id", required(&self.image_id));
        b.insert("instance_type", required(&self.instance_type));
        b.insert("subnet_position", value(self.subnet_position));
        b.insert(
            "security_group_ids",
            value(expression_list(
                self.security_group_indices
                    .iter()
                    .map(|i| security_group_reference(*i)),
            )),
        );
        b.insert("tags", value(tag_map(&self.tags)));
        b
    }
}

impl Artifact for InstanceDeclaration {
    fn file_name(&self) -> &'static str {
        EC2_INSTANCES_FILE
    }

    fn resource_ids(&self) -> Vec<String> {
        vec![self.vpc_id.clone(), self.instance_id.clone()]
    }
}

/// Elastic IP attached to a generated instance.
pub struct ElasticIp {
    pub vpc_id: String,
    pub index: usize,
    pub instance_id: String,
}

impl Template for ElasticIp {
    fn template(&self) -> &'static str {
        templates::EIP
    }

    fn bindings(&self) -> Bindings {
        let mut b = Bindings::new();
        b.insert("index", value(self.index));
        b
    }
}

impl Artifact for ElasticIp {
    fn file_name(&self) -> &'static str {
        EIP_FILE
    }

    fn resource_ids(&self) -> Vec<String> {
        vec![self.vpc_id.clone(), self.instance_id.clone()]
    }
}
