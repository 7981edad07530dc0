//! Fixed Terraform templates.
//!
//! Placeholders use `{{name}}`. Values are already HCL expressions when
//! bound (quoted strings, lists, maps), so templates never add quotes.

pub const VPC_MODULE: &str = r#"
# AWS Availability Zones Datasource
data "aws_availability_zones" "available" {
  state = "available"
}

# Create VPC Terraform Module
module "vpc" {
  source  = "terraform-aws-modules/vpc/aws"
  version = "5.1.2"

  # VPC Basic Details
  name           = var.vpc_name
  cidr           = var.vpc_cidr_block
  azs            = data.aws_availability_zones.available.names
  public_subnets = var.vpc_public_subnets

  # VPC DNS Parameters
  enable_dns_hostnames = true
  enable_dns_support   = true

  tags = var.vpc_tags

  # Instances launched into the public subnets get a public IP address
  map_public_ip_on_launch = true
}
"#;

pub const VPC_VARIABLES: &str = r#"
# VPC Input Variables

# VPC Name
variable "vpc_name" {
  description = "VPC Name"
  type        = string
  default     = {{vpc_name}}
}

# VPC CIDR Block
variable "vpc_cidr_block" {
  description = "VPC CIDR Block"
  type        = string
  default     = {{cidr_block}}
}

# VPC Public Subnets
variable "vpc_public_subnets" {
  description = "VPC Public Subnets"
  type        = list(string)
  default     = {{public_subnets}}
}

# VPC Tags
variable "vpc_tags" {
  description = "VPC Tags"
  type        = map(string)
  default     = {{tags}}
}
"#;

pub const VPC_AUTO_TFVARS: &str = r#"
# VPC Variables
vpc_name           = {{vpc_name}}
vpc_cidr_block     = {{cidr_block}}
vpc_public_subnets = {{public_subnets}}
vpc_tags           = {{tags}}
"#;

pub const GENERIC_VARIABLES: &str = r#"
# Input Variables
# AWS Region
variable "aws_region" {
  description = "Region in which AWS Resources to be created"
  type        = string
  default     = {{region}}
}
"#;

pub const TERRAFORM_TFVARS: &str = r#"
# Generic Variables
aws_region = {{region}}
"#;

pub const VERSIONS: &str = r#"
# Terraform Block
terraform {
  required_version = ">= 1.0"
  required_providers {
    aws = {
      source  = "hashicorp/aws"
      version = ">= 4.65"
    }
  }
}

# Provider Block
provider "aws" {
  region = var.aws_region
}
"#;

pub const BACKEND: &str = r#"
terraform {
  backend "s3" {
    bucket         = {{bucket}}
    key            = {{key}}
    region         = {{region}}
    encrypt        = true
    dynamodb_table = {{lock_table}}
  }
}
"#;

pub const SECURITY_GROUP: &str = r#"
resource "aws_security_group" "security_group_{{index}}" {
  description = {{description}}
  vpc_id      = module.vpc.vpc_id
{{ingress_rules}}{{egress_rules}}
  tags = {{tags}}
}
"#;

pub const INGRESS_RULE: &str = r#"
  ingress {
    description      = {{description}}
    from_port        = {{from_port}}
    to_port          = {{to_port}}
    protocol         = {{protocol}}
    cidr_blocks      = {{cidr_blocks}}
    ipv6_cidr_blocks = {{ipv6_cidr_blocks}}
  }
"#;

pub const EGRESS_RULE: &str = r#"
  egress {
    description      = {{description}}
    from_port        = {{from_port}}
    to_port          = {{to_port}}
    protocol         = {{protocol}}
    cidr_blocks      = {{cidr_blocks}}
    ipv6_cidr_blocks = {{ipv6_cidr_blocks}}
  }
"#;

pub const EC2_INSTANCE: &str = r#"
module "ec2_instance_{{index}}" {
  source  = "terraform-aws-modules/ec2-instance/aws"
  version = "5.5.0"

  name          = {{name}}
  ami           = {{image_id}}
  instance_type = {{instance_type}}

  subnet_id              = module.vpc.public_subnets[{{subnet_position}}]
  vpc_security_group_ids = {{security_group_ids}}

  tags = {{tags}}
}
"#;

pub const EIP: &str = r#"
# Elastic IP for instance-{{index}}
resource "aws_eip" "instance_eip_{{index}}" {
  instance   = module.ec2_instance_{{index}}.id
  domain     = "vpc"
  depends_on = [module.ec2_instance_{{index}}, module.vpc]
}
"#;
