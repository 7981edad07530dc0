//! # lift_cloud
//!
//! Collaborators that talk to the cloud account for regionlift.
//!
//! Nothing here is needed to generate Terraform from an existing snapshot.
//! This crate supplies the two inputs the pipeline expects from outside:
//! raw describe payloads for a set of instances, and the destination-region
//! image id of each instance.
//!
//! - [`InventoryProvider`] serves raw describe responses. [`DumpInventory`]
//!   serves them from a directory of JSON dumps.
//! - [`InventoryCollector`] fetches instances and their dependencies once
//!   each, archives the payloads and normalizes them.
//! - [`ImageService`] creates and copies images. [`ImageMigrator`] drives
//!   it and polls every copy with a bounded [`WaitConfig`].
//! - [`ImageMap`] is an offline image service backed by a YAML map.

pub mod collector;
pub mod dump;
pub mod error;
pub mod image;
pub mod image_map;
pub mod provider;

pub use collector::{Collection, InventoryCollector};
pub use dump::DumpInventory;
pub use error::{CloudError, CloudResult};
pub use image::{
    wait_for_image, ImageFailure, ImageMigrator, ImageService, ImageState, MigrationOutcome,
    WaitConfig,
};
pub use image_map::ImageMap;
pub use provider::InventoryProvider;
