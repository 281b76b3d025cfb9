//! # pathkern-engine
//!
//! Kernel-matrix engine over path-feature vectors.
//!
//! This crate provides:
//! - **KernelEngine**: diagonal (self-kernel) phase plus a streaming,
//!   rayon-parallel row phase over the normalized linear kernel
//! - **Normalization**: the literal row-diagonal normalization of the
//!   reference pipeline and the corrected geometric-mean variant
//! - **writer**: whitespace-delimited feature and kernel row output
//!   with overwrite protection
//! - **pipeline**: the end-to-end run driven by a [`RunConfig`]
//!
//! Rows are computed in bounded chunks and emitted in ordinal order;
//! the full kernel matrix is never held in memory.

use std::path::PathBuf;
use thiserror::Error;

pub mod kernel;
pub mod pipeline;
pub mod writer;

pub use kernel::{KernelConfig, KernelEngine, Normalization};
pub use pipeline::{run, RunConfig, RunSummary};

// ============================================================================
// Error Types
// ============================================================================

/// Errors in kernel computation and output writing
#[derive(Error, Debug)]
pub enum EngineError {
    /// A graph's self-kernel is zero, so its row cannot be normalized.
    /// Usually means the graph has no surviving paths at all; check
    /// the upstream listing and the commonality threshold.
    #[error("graph {name:?} (ordinal {ordinal}) has a zero self-kernel and cannot be normalized")]
    DegenerateGraph { name: String, ordinal: usize },
    #[error("output file {} exists already; set the overwrite flag to replace it", .0.display())]
    OutputExists(PathBuf),
    #[error("failed to write output file {}: {source}", path.display())]
    OutputIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Core(#[from] pathkern_core::CoreError),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
