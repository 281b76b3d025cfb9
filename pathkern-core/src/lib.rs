//! # pathkern-core
//!
//! Path-feature extraction primitives for reaction-graph kernels.
//!
//! This crate provides:
//! - **GraphRegistry**: the ordered, deduplicated list of graph names
//!   and their ordinal indices
//! - **PathListing**: the parsed frequency listing produced by the
//!   upstream path-indexing pipeline, with commonality filtering
//! - **SparseVector / FeatureTable**: per-graph sparse feature vectors
//!   keyed by path index, with the sparse dot product the kernel
//!   engine is built on
//!
//! Graphs are opaque names here; the listing's path descriptors are
//! never interpreted. The ordinal order fixed by [`GraphRegistry`] is
//! a cross-file contract: every output row downstream is emitted in
//! that order.

use std::path::PathBuf;
use thiserror::Error;

pub mod features;
pub mod listing;
pub mod registry;

pub use features::{FeatureTable, SparseVector};
pub use listing::{FilterOutcome, PathListing, PathRecord};
pub use registry::GraphRegistry;

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while resolving graph sources or parsing listings
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("graph source {} is neither a readable directory nor a file", .0.display())]
    BadGraphSource(PathBuf),
    #[error("failed to read graph source {}: {source}", path.display())]
    GraphSourceIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read listing file {}: {source}", path.display())]
    ListingIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("listing line {line}: token {token:?} is not of the form graph:frequency")]
    MalformedToken { line: usize, token: String },
    #[error("listing line {line}: frequency {value:?} is not a non-negative integer")]
    BadFrequency { line: usize, value: String },
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;
