//! End-to-end run: registry, listing, filter, features, kernel rows.
//!
//! All configuration and output-path checks happen before any
//! computation, so a run can only fail late on genuine data defects
//! (malformed listing lines, degenerate graphs) or IO errors.

use std::path::PathBuf;

use pathkern_core::{FeatureTable, GraphRegistry, PathListing};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::kernel::{KernelConfig, KernelEngine, Normalization};
use crate::writer::{MatrixWriter, OutputTargets};
use crate::EngineResult;

/// Full configuration of one kernel-extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Directory of graph files, or a newline-delimited listing file.
    pub graph_source: PathBuf,
    /// Frequency listing produced by the upstream indexing pipeline.
    pub listing_file: PathBuf,
    /// Directory receiving the `kernels` (and optional `features`) file.
    pub output_dir: PathBuf,
    /// Optional prefix prepended to output filenames.
    pub output_prefix: Option<String>,
    /// Drop paths shared between `<= threshold` graphs; `None` keeps all.
    pub commonality_threshold: Option<u64>,
    /// Also write the dense feature matrix.
    pub write_features: bool,
    /// Replace existing output files instead of refusing to run.
    pub overwrite_existing: bool,
    /// Kernel row normalization strategy.
    pub normalization: Normalization,
}

/// Counters reported back to the caller after a successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Graphs in the registry (output rows).
    pub graphs: usize,
    /// Paths in the unfiltered listing.
    pub total_paths: usize,
    /// Paths dropped by the commonality filter.
    pub removed_paths: usize,
    /// Surviving feature dimensionality.
    pub dimensions: usize,
}

/// Execute a full run and stream the kernel matrix to disk.
pub fn run(config: &RunConfig) -> EngineResult<RunSummary> {
    let targets = OutputTargets::resolve(
        &config.output_dir,
        config.output_prefix.as_deref(),
        config.write_features,
    );
    targets.prepare(config.overwrite_existing)?;

    let registry = GraphRegistry::resolve(&config.graph_source)?;
    let listing = PathListing::from_file(&config.listing_file)?;
    let total_paths = listing.len();
    let outcome = listing.filter_common(config.commonality_threshold);
    let table = FeatureTable::build(&registry, &outcome.listing);

    let kernel_config = KernelConfig {
        normalization: config.normalization,
        ..KernelConfig::default()
    };
    let engine = KernelEngine::new(&registry, &table, kernel_config);
    // Degenerate graphs abort here, before any output file is
    // created or truncated.
    engine.ensure_normalizable()?;

    if let Some(path) = &targets.features {
        info!("writing feature matrix to {}", path.display());
        let mut writer = MatrixWriter::create(path)?;
        for ordinal in 0..registry.len() {
            let row = table.vector(ordinal).to_dense(table.dimensions());
            writer.write_row(&row)?;
        }
        writer.finish()?;
    }

    info!("writing kernel matrix to {}", targets.kernels.display());
    let mut writer = MatrixWriter::create(&targets.kernels)?;
    engine.stream_rows(|_, row| writer.write_row(row))?;
    writer.finish()?;

    Ok(RunSummary {
        graphs: registry.len(),
        total_paths,
        removed_paths: outcome.removed,
        dimensions: table.dimensions(),
    })
}
