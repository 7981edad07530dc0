//! # lift_iac
//!
//! Terraform artifact emission for regionlift.
//!
//! This crate renders an indexed Vpc graph into a directory of Terraform
//! files per Vpc. Each logical unit (a Vpc, an instance, a unique security
//! group) is a typed [`Artifact`] whose bindings are substituted into a
//! fixed template and appended to its file.
//!
//! ## Features
//!
//! - Typed artifact records, kept apart from template text
//! - Strict `{{placeholder}}` rendering that fails on unbound values
//! - Append-only sinks: the filesystem or memory
//! - Optional S3 remote-state backend per Vpc
//!
//! ## Cross-references
//!
//! Instance declarations refer to security groups as
//! `aws_security_group.security_group_<n>.id` and elastic IPs refer to
//! instances as `module.ec2_instance_<n>.id`. Every `<n>` comes from the
//! index allocator of the same run that produced the declarations.
//!
//! ## Example
//!
//! ```rust,no_run
//! use lift_iac::{BackendSettings, EmitOptions, Emitter, FsSink};
//! use lift_model::RunReport;
//!
//! # let vpcs: Vec<lift_graph::IndexedVpc> = Vec::new();
//! let emitter = Emitter::new(EmitOptions::new("eu-central-1", BackendSettings::default()));
//! let mut sink = FsSink::new("terraform");
//! let mut report = RunReport::new();
//!
//! let summary = emitter.emit_all(&vpcs, &mut sink, &mut report).unwrap();
//! println!("wrote {} artifacts", summary.artifacts_written());
//! ```

pub mod artifact;
pub mod backend;
pub mod emitter;
pub mod error;
pub mod renderer;
pub mod sink;
pub mod templates;

pub use artifact::{Artifact, Bindings, Template};
pub use backend::BackendSettings;
pub use emitter::{EmitOptions, EmitSummary, Emitter, VpcSummary};
pub use error::{IacError, IacResult};
pub use renderer::TemplateRenderer;
pub use sink::{ArtifactSink, FsSink, MemorySink};
