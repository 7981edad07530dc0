//! Inventory provider trait.

use async_trait::async_trait;

use lift_model::raw::{
    DescribeInstancesResponse, DescribeSecurityGroupsResponse, DescribeSubnetsResponse,
    DescribeVpcsResponse,
};

use crate::error::CloudResult;

/// Source of raw describe responses for single resources.
///
/// An unknown id is [`crate::CloudError::NotFound`]. Any other error is
/// treated as fatal by the collector.
#[async_trait]
pub trait InventoryProvider: Send + Sync {
    async fn describe_instance(&self, instance_id: &str) -> CloudResult<DescribeInstancesResponse>;

    async fn describe_vpc(&self, vpc_id: &str) -> CloudResult<DescribeVpcsResponse>;

    async fn describe_subnet(&self, subnet_id: &str) -> CloudResult<DescribeSubnetsResponse>;

    async fn describe_security_group(
        &self,
        group_id: &str,
    ) -> CloudResult<DescribeSecurityGroupsResponse>;
}
