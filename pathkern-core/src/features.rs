//! Sparse per-graph feature vectors and the feature table.
//!
//! A graph's feature vector maps surviving path indices to occurrence
//! frequencies; absent dimensions are implicitly zero. The table is
//! built once by a single grouping pass over the filtered listing and
//! then shared read-only, so the kernel engine never re-scans the
//! listing per graph pair.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::listing::PathListing;
use crate::registry::GraphRegistry;

/// Sparse mapping from path index to occurrence frequency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseVector {
    entries: HashMap<usize, u64>,
}

impl SparseVector {
    /// Create an empty (all-zero) vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the frequency for a path index.
    pub fn set(&mut self, path_index: usize, frequency: u64) {
        self.entries.insert(path_index, frequency);
    }

    /// Frequency at a path index (0 if absent).
    pub fn get(&self, path_index: usize) -> u64 {
        self.entries.get(&path_index).copied().unwrap_or(0)
    }

    /// Number of explicitly stored (nonzero) dimensions.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Sparse linear kernel: sum of products over the shared keys.
    ///
    /// Iterates the smaller vector's keys only; never a dense scan of
    /// the full dimensionality.
    pub fn dot(&self, other: &SparseVector) -> u64 {
        let (small, large) = if self.nnz() <= other.nnz() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .entries
            .iter()
            .filter_map(|(key, a)| large.entries.get(key).map(|b| a * b))
            .sum()
    }

    /// Materialize the dense row of length `dimensions` for output.
    pub fn to_dense(&self, dimensions: usize) -> Vec<u64> {
        let mut row = vec![0; dimensions];
        for (&path_index, &frequency) in &self.entries {
            if path_index < dimensions {
                row[path_index] = frequency;
            }
        }
        row
    }
}

/// Feature vectors for every registry graph, indexed by ordinal.
///
/// Immutable once built; safe to share read-only across row workers.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    vectors: Vec<SparseVector>,
    dimensions: usize,
}

impl FeatureTable {
    /// Group the filtered listing's tokens per graph in one pass.
    ///
    /// Listing graphs missing from the registry are silently ignored;
    /// registry graphs absent from every record keep all-zero vectors.
    pub fn build(registry: &GraphRegistry, listing: &PathListing) -> Self {
        info!("extracting features for {} graphs", registry.len());
        let mut vectors = vec![SparseVector::new(); registry.len()];
        for (path_index, record) in listing.iter() {
            for (graph, frequency) in &record.occurrences {
                if let Some(ordinal) = registry.ordinal(graph) {
                    vectors[ordinal].set(path_index, *frequency);
                }
            }
            debug!("extracted path {} of {}", path_index + 1, listing.len());
        }
        Self {
            vectors,
            dimensions: listing.len(),
        }
    }

    /// Feature vector for the graph at the given ordinal.
    pub fn vector(&self, ordinal: usize) -> &SparseVector {
        &self.vectors[ordinal]
    }

    /// Number of graphs in the table.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the table holds no graphs.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Feature dimensionality (surviving path count).
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}
