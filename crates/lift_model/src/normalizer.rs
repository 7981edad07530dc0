//! Raw payload to canonical record conversion.
//!
//! Optional fields default to empty strings and lists. A record missing a
//! required field is dropped and reported as [`SkipKind::MalformedRecord`].

use serde_json::Value;
use tracing::debug;

use crate::models::{Instance, Inventory, Rule, SecurityGroup, Subnet, Tag, Vpc};
use crate::raw::{
    DescribeInstancesResponse, DescribeSecurityGroupsResponse, DescribeSubnetsResponse,
    DescribeVpcsResponse, RawIpPermission, RawPayload, RawTag,
};
use crate::report::{RunReport, SkipKind};

/// Placeholder id used when a record lacks its own id.
pub const UNKNOWN_ID: &str = "<unknown>";

/// Converts raw describe responses into canonical records.
pub struct Normalizer;

impl Normalizer {
    /// Normalize every instance in a describe-instances response.
    ///
    /// `InstanceId`, `InstanceType` and `VpcId` are required.
    pub fn instances(response: &DescribeInstancesResponse, report: &mut RunReport) -> Vec<Instance> {
        let mut instances = Vec::new();

        for raw in response.reservations.iter().flat_map(|r| r.instances.iter()) {
            let id = present(&raw.instance_id);
            let instance_type = present(&raw.instance_type);
            let vpc_id = present(&raw.vpc_id);

            let (Some(id), Some(instance_type), Some(vpc_id)) = (id, instance_type, vpc_id) else {
                let missing: Vec<_> = [
                    ("InstanceId", id),
                    ("InstanceType", instance_type),
                    ("VpcId", vpc_id),
                ]
                .iter()
                .filter(|(_, v)| v.is_none())
                .map(|(name, _)| *name)
                .collect();

                report.record(
                    SkipKind::MalformedRecord,
                    [id.unwrap_or(UNKNOWN_ID)],
                    format!("instance record missing required fields: {}", missing.join(", ")),
                );
                continue;
            };

            let mut security_group_ids: Vec<String> = Vec::new();
            for group in &raw.security_groups {
                if let Some(group_id) = present(&group.group_id) {
                    if !security_group_ids.iter().any(|g| g == group_id) {
                        security_group_ids.push(group_id.to_string());
                    }
                }
            }

            instances.push(Instance {
                id: id.to_string(),
                instance_type: instance_type.to_string(),
                vpc_id: vpc_id.to_string(),
                subnet_id: or_empty(&raw.subnet_id),
                private_ip_address: or_empty(&raw.private_ip_address),
                image_id: String::new(),
                tags: Self::tags(&raw.tags),
                security_group_ids,
            });
        }

        instances
    }

    /// Normalize every Vpc in a describe-vpcs response.
    pub fn vpcs(response: &DescribeVpcsResponse, report: &mut RunReport) -> Vec<Vpc> {
        response
            .vpcs
            .iter()
            .filter_map(|raw| {
                let Some(id) = present(&raw.vpc_id) else {
                    report.record(SkipKind::MalformedRecord, [UNKNOWN_ID], "vpc record missing VpcId");
                    return None;
                };
                Some(Vpc {
                    id: id.to_string(),
                    cidr_block: or_empty(&raw.cidr_block),
                    tags: Self::tags(&raw.tags),
                })
            })
            .collect()
    }

    /// Normalize every subnet in a describe-subnets response.
    pub fn subnets(response: &DescribeSubnetsResponse, report: &mut RunReport) -> Vec<Subnet> {
        response
            .subnets
            .iter()
            .filter_map(|raw| {
                let Some(id) = present(&raw.subnet_id) else {
                    report.record(
                        SkipKind::MalformedRecord,
                        [UNKNOWN_ID],
                        "subnet record missing SubnetId",
                    );
                    return None;
                };
                Some(Subnet {
                    id: id.to_string(),
                    availability_zone: or_empty(&raw.availability_zone),
                    cidr_block: or_empty(&raw.cidr_block),
                    vpc_id: or_empty(&raw.vpc_id),
                    tags: Self::tags(&raw.tags),
                })
            })
            .collect()
    }

    /// Normalize every group in a describe-security-groups response.
    pub fn security_groups(
        response: &DescribeSecurityGroupsResponse,
        report: &mut RunReport,
    ) -> Vec<SecurityGroup> {
        response
            .security_groups
            .iter()
            .filter_map(|raw| {
                let Some(id) = present(&raw.group_id) else {
                    report.record(
                        SkipKind::MalformedRecord,
                        [UNKNOWN_ID],
                        "security group record missing GroupId",
                    );
                    return None;
                };
                Some(SecurityGroup {
                    id: id.to_string(),
                    vpc_id: or_empty(&raw.vpc_id),
                    ingress: raw.ip_permissions.iter().map(Self::rule).collect(),
                    egress: raw.ip_permissions_egress.iter().map(Self::rule).collect(),
                    tags: Self::tags(&raw.tags),
                })
            })
            .collect()
    }

    /// Normalize one permission entry.
    ///
    /// The rule description is taken from the first described IPv4 range,
    /// falling back to the first described IPv6 range.
    pub fn rule(raw: &RawIpPermission) -> Rule {
        let description = raw
            .ip_ranges
            .iter()
            .filter_map(|r| present(&r.description))
            .chain(raw.ipv6_ranges.iter().filter_map(|r| present(&r.description)))
            .next()
            .unwrap_or_default()
            .to_string();

        Rule {
            from_port: Self::port(raw.from_port.as_ref()),
            to_port: Self::port(raw.to_port.as_ref()),
            protocol: or_empty(&raw.ip_protocol),
            cidr_blocks: raw
                .ip_ranges
                .iter()
                .filter_map(|r| present(&r.cidr_ip).map(str::to_string))
                .collect(),
            ipv6_cidr_blocks: raw
                .ipv6_ranges
                .iter()
                .filter_map(|r| present(&r.cidr_ipv6).map(str::to_string))
                .collect(),
            description,
        }
    }

    /// Normalize a port value. Absent, empty or non-numeric values become 0.
    ///
    /// Whole-number floats such as `22.0` are accepted.
    pub fn port(value: Option<&Value>) -> i32 {
        let number = match value {
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().and_then(whole)),
            Some(Value::String(s)) => {
                let s = s.trim();
                s.parse().ok().or_else(|| s.parse().ok().and_then(whole))
            }
            _ => None,
        };
        number.and_then(|n| i32::try_from(n).ok()).unwrap_or(0)
    }

    fn tags(raw: &[RawTag]) -> Vec<Tag> {
        raw.iter()
            .filter_map(|tag| match present(&tag.key) {
                Some(key) => Some(Tag::new(key, or_empty(&tag.value))),
                None => {
                    debug!("Dropping tag without a key");
                    None
                }
            })
            .collect()
    }
}

impl Inventory {
    /// Normalize a raw payload and merge its records, keyed by id.
    ///
    /// Returns the number of records merged.
    pub fn ingest(&mut self, payload: &RawPayload, report: &mut RunReport) -> usize {
        match payload {
            RawPayload::Instances(response) => {
                let records = Normalizer::instances(response, report);
                let count = records.len();
                self.instances.extend(records.into_iter().map(|r| (r.id.clone(), r)));
                count
            }
            RawPayload::Vpcs(response) => {
                let records = Normalizer::vpcs(response, report);
                let count = records.len();
                self.vpcs.extend(records.into_iter().map(|r| (r.id.clone(), r)));
                count
            }
            RawPayload::Subnets(response) => {
                let records = Normalizer::subnets(response, report);
                let count = records.len();
                self.subnets.extend(records.into_iter().map(|r| (r.id.clone(), r)));
                count
            }
            RawPayload::SecurityGroups(response) => {
                let records = Normalizer::security_groups(response, report);
                let count = records.len();
                self.security_groups
                    .extend(records.into_iter().map(|r| (r.id.clone(), r)));
                count
            }
        }
    }
}

/// A string field that is present and non-blank.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

fn whole(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0).then_some(value as i64)
}

fn or_empty(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}
