//! Kernel engine: diagonal phase, streaming row phase, normalization.
//!
//! Phase 1 computes every graph's raw self-kernel once (the diagonal
//! cache). Phase 2 walks graphs in ascending ordinal, computes the raw
//! kernel row against all graphs, normalizes it and hands it to the
//! caller's sink. Rows inside a chunk are computed in parallel with
//! rayon but always emitted in ordinal order.

use pathkern_core::{FeatureTable, GraphRegistry};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{EngineError, EngineResult};

/// How a raw kernel row is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Normalization {
    /// `raw / sqrt(diag[i] * diag[i])`: divides by the row graph's own
    /// diagonal twice, reproducing the reference pipeline exactly.
    /// Asymmetric for distinct graphs; kept for output compatibility.
    RowDiagonal,
    /// `raw / sqrt(diag[i] * diag[j])`: cosine normalization over both
    /// graphs' diagonals. Symmetric, with unit self-kernels.
    Geometric,
}

impl Default for Normalization {
    fn default() -> Self {
        Normalization::RowDiagonal
    }
}

/// Tuning knobs for the row phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Normalization strategy for emitted rows.
    pub normalization: Normalization,
    /// Rows computed per parallel batch before emission.
    pub chunk_size: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            normalization: Normalization::default(),
            chunk_size: 64,
        }
    }
}

/// Streaming kernel-matrix engine over a read-only feature table.
#[derive(Debug)]
pub struct KernelEngine<'a> {
    registry: &'a GraphRegistry,
    table: &'a FeatureTable,
    diagonal: Vec<u64>,
    config: KernelConfig,
}

impl<'a> KernelEngine<'a> {
    /// Build the engine and run the diagonal phase.
    pub fn new(
        registry: &'a GraphRegistry,
        table: &'a FeatureTable,
        config: KernelConfig,
    ) -> Self {
        info!("computing {} diagonal kernels", registry.len());
        let diagonal: Vec<u64> = (0..registry.len())
            .into_par_iter()
            .map(|i| {
                let phi = table.vector(i);
                phi.dot(phi)
            })
            .collect();
        Self {
            registry,
            table,
            diagonal,
            config,
        }
    }

    /// Raw self-kernel values, one per graph in ordinal order.
    pub fn diagonal(&self) -> &[u64] {
        &self.diagonal
    }

    /// Fail on the first graph with a zero self-kernel.
    ///
    /// Streaming the full matrix puts every graph's diagonal in a
    /// denominator (each graph owns a row, and geometric normalization
    /// reads the columns too), so callers writing output files should
    /// check this right after the diagonal phase rather than discover
    /// the error mid-stream behind a half-written file.
    pub fn ensure_normalizable(&self) -> EngineResult<()> {
        match self.diagonal.iter().position(|&value| value == 0) {
            Some(ordinal) => Err(self.degenerate(ordinal)),
            None => Ok(()),
        }
    }

    /// Raw (unnormalized) kernel row for graph `i`.
    pub fn raw_row(&self, i: usize) -> Vec<u64> {
        let phi_i = self.table.vector(i);
        (0..self.table.len())
            .map(|j| phi_i.dot(self.table.vector(j)))
            .collect()
    }

    /// Normalized kernel row for graph `i`.
    pub fn normalized_row(&self, i: usize) -> EngineResult<Vec<f64>> {
        let raw = self.raw_row(i);
        let diag_i = self.diagonal[i] as f64;
        if self.diagonal[i] == 0 {
            return Err(self.degenerate(i));
        }
        match self.config.normalization {
            Normalization::RowDiagonal => Ok(raw
                .into_iter()
                .map(|value| value as f64 / (diag_i * diag_i).sqrt())
                .collect()),
            Normalization::Geometric => raw
                .into_iter()
                .enumerate()
                .map(|(j, value)| {
                    if self.diagonal[j] == 0 {
                        return Err(self.degenerate(j));
                    }
                    Ok(value as f64 / (diag_i * self.diagonal[j] as f64).sqrt())
                })
                .collect(),
        }
    }

    /// Stream all normalized rows to `sink` in ascending ordinal order.
    ///
    /// Rows are computed `chunk_size` at a time across the rayon pool;
    /// only one chunk plus the diagonal cache is ever held.
    pub fn stream_rows<F>(&self, mut sink: F) -> EngineResult<()>
    where
        F: FnMut(usize, &[f64]) -> EngineResult<()>,
    {
        let n = self.registry.len();
        let chunk = self.config.chunk_size.max(1);
        info!("computing {n} kernel rows ({chunk} per batch)");
        let mut start = 0;
        while start < n {
            let end = (start + chunk).min(n);
            let rows: Vec<Vec<f64>> = (start..end)
                .into_par_iter()
                .map(|i| self.normalized_row(i))
                .collect::<EngineResult<_>>()?;
            for (i, row) in (start..end).zip(&rows) {
                sink(i, row)?;
                debug!("emitted kernel row {} of {}", i + 1, n);
            }
            start = end;
        }
        Ok(())
    }

    fn degenerate(&self, ordinal: usize) -> EngineError {
        EngineError::DegenerateGraph {
            name: self.registry.name(ordinal).to_string(),
            ordinal,
        }
    }
}
