//! # lift_model
//!
//! Canonical resource records for regionlift.
//!
//! This crate is the bottom of the pipeline. It knows the shape of the raw
//! EC2 describe responses, turns them into canonical records keyed by
//! provider id, and owns the consolidated snapshot that later stages read.
//!
//! ## Features
//!
//! - **Raw payloads**: serde shapes for describe-instances/vpcs/subnets/security-groups
//! - **Normalizer**: raw payload to canonical [`Inventory`] records, dropping malformed ones
//! - **Snapshot**: the nested Vpc → Subnet → Instance tree, read from and written to JSON
//! - **Archive**: timestamped raw payload dumps in an audit directory
//! - **Report**: accumulated skipped items for best-effort runs
//!
//! ## Example
//!
//! ```rust,no_run
//! use lift_model::{Inventory, RawPayload, RunReport};
//!
//! let raw: serde_json::Value = serde_json::from_str(r#"{"Vpcs": []}"#).unwrap();
//! let mut inventory = Inventory::default();
//! let mut report = RunReport::new();
//!
//! if let Some(payload) = RawPayload::from_value(raw).unwrap() {
//!     inventory.ingest(&payload, &mut report);
//! }
//! ```

pub mod archive;
pub mod error;
pub mod models;
pub mod normalizer;
pub mod raw;
pub mod report;
pub mod snapshot;

pub use archive::AuditArchive;
pub use error::{ModelError, ModelResult};
pub use models::*;
pub use normalizer::Normalizer;
pub use raw::RawPayload;
pub use report::{RunReport, SkipKind, SkippedItem};
pub use snapshot::Snapshot;
