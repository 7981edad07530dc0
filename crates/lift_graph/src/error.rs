//! Error types for graph building.

use thiserror::Error;

/// Result type alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that stop a whole run.
///
/// Per-record problems are not errors; they go to the run report.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("No usable input: no VPCs found in snapshot")]
    NoUsableInput,
}
