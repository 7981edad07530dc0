//! # lift_graph
//!
//! Turns flat canonical records into an indexed resource graph.
//!
//! Two stages live here, run in order:
//!
//! 1. [`Assembler`] joins the flat [`lift_model::Inventory`] into a
//!    Vpc → Subnet → Instance tree with resolved security groups.
//! 2. [`IndexAllocator`] walks each tree, deduplicates security groups per Vpc
//!    and hands out the integer indices the generated files use to refer to
//!    each other.
//!
//! ## Ordering
//!
//! Vpcs, subnets and instances are visited in ascending provider id.
//! Security group references keep the order the instance reported them.
//! The same snapshot always yields the same indices.
//!
//! ## Example
//!
//! ```rust,no_run
//! use lift_graph::{Assembler, IndexAllocator};
//! use lift_model::{Inventory, RunReport};
//!
//! let inventory = Inventory::default();
//! let mut report = RunReport::new();
//!
//! let snapshot = Assembler::new(&inventory).assemble(&mut report);
//! let indexed = IndexAllocator::new().allocate_all(&snapshot).unwrap();
//! ```

pub mod allocator;
pub mod assembler;
pub mod error;

pub use allocator::{
    IndexAllocator, IndexedInstance, IndexedSecurityGroup, IndexedSubnet, IndexedVpc,
    SecurityGroupRef,
};
pub use assembler::Assembler;
pub use error::{GraphError, GraphResult};
