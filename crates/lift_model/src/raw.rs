//! Raw EC2 describe response shapes.
//!
//! These mirror the JSON the cloud inventory returns. Every field is
//! optional here; deciding what is required is the normalizer's job.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Treat an explicit `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawTag {
    pub key: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawGroupIdentifier {
    pub group_id: Option<String>,
    pub group_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawInstance {
    pub instance_id: Option<String>,
    pub instance_type: Option<String>,
    pub vpc_id: Option<String>,
    pub subnet_id: Option<String>,
    pub private_ip_address: Option<String>,
    pub image_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub security_groups: Vec<RawGroupIdentifier>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<RawTag>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawReservation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub instances: Vec<RawInstance>,
}

/// Response of describe-instances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeInstancesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub reservations: Vec<RawReservation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawVpc {
    pub vpc_id: Option<String>,
    pub cidr_block: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<RawTag>,
}

/// Response of describe-vpcs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeVpcsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub vpcs: Vec<RawVpc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawSubnet {
    pub subnet_id: Option<String>,
    pub availability_zone: Option<String>,
    pub cidr_block: Option<String>,
    pub vpc_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<RawTag>,
}

/// Response of describe-subnets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeSubnetsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub subnets: Vec<RawSubnet>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawIpRange {
    pub cidr_ip: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawIpv6Range {
    pub cidr_ipv6: Option<String>,
    pub description: Option<String>,
}

/// One permission entry. Ports are kept as loose JSON values because
/// archived payloads carry numbers, numeric strings or empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawIpPermission {
    pub from_port: Option<Value>,
    pub to_port: Option<Value>,
    pub ip_protocol: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ip_ranges: Vec<RawIpRange>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ipv6_ranges: Vec<RawIpv6Range>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawSecurityGroup {
    pub group_id: Option<String>,
    pub group_name: Option<String>,
    pub description: Option<String>,
    pub vpc_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ip_permissions: Vec<RawIpPermission>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ip_permissions_egress: Vec<RawIpPermission>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<RawTag>,
}

/// Response of describe-security-groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeSecurityGroupsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub security_groups: Vec<RawSecurityGroup>,
}

/// Any one of the describe responses the pipeline understands.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    Instances(DescribeInstancesResponse),
    Vpcs(DescribeVpcsResponse),
    Subnets(DescribeSubnetsResponse),
    SecurityGroups(DescribeSecurityGroupsResponse),
}

impl RawPayload {
    /// Classify a JSON document by its top-level collection key.
    ///
    /// Returns `Ok(None)` when the document carries none of the known keys.
    pub fn from_value(value: Value) -> Result<Option<Self>, serde_json::Error> {
        let Some(object) = value.as_object() else {
            return Ok(None);
        };

        let payload = if object.contains_key("Reservations") {
            Self::Instances(serde_json::from_value(value)?)
        } else if object.contains_key("Vpcs") {
            Self::Vpcs(serde_json::from_value(value)?)
        } else if object.contains_key("Subnets") {
            Self::Subnets(serde_json::from_value(value)?)
        } else if object.contains_key("SecurityGroups") {
            Self::SecurityGroups(serde_json::from_value(value)?)
        } else {
            return Ok(None);
        };

        Ok(Some(payload))
    }

    /// Resource type label used for archive file names.
    pub fn resource_type(&self) -> &'static str {
        match self {
            Self::Instances(_) => "ec2-instance",
            Self::Vpcs(_) => "vpc",
            Self::Subnets(_) => "subnet",
            Self::SecurityGroups(_) => "security-group",
        }
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Instances(p) => serde_json::to_value(p),
            Self::Vpcs(p) => serde_json::to_value(p),
            Self::Subnets(p) => serde_json::to_value(p),
            Self::SecurityGroups(p) => serde_json::to_value(p),
        }
    }
}
