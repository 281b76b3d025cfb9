//! Frequency-listing parser and commonality filter.
//!
//! The listing is the text output of the upstream path-indexing
//! pipeline: one line per path, a leading opaque descriptor token,
//! then `graph:frequency` tokens for every graph the path occurs in.
//! A record's line position is its path index, i.e. its feature
//! dimension id.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{CoreError, CoreResult};

/// One parsed listing line: an opaque descriptor plus the graphs the
/// path occurs in, with occurrence frequencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRecord {
    /// Structural descriptor of the path; never interpreted here.
    pub descriptor: String,
    /// `(graph_name, frequency)` pairs, one per listing token.
    pub occurrences: Vec<(String, u64)>,
}

impl PathRecord {
    /// Number of distinct graphs this path occurs in.
    pub fn support(&self) -> usize {
        self.occurrences.len()
    }
}

/// Ordered sequence of path records; position = path index.
#[derive(Debug, Clone, Default)]
pub struct PathListing {
    records: Vec<PathRecord>,
}

/// Result of a commonality filter pass.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    /// Surviving records, compacted to path indices `0..m-1`.
    pub listing: PathListing,
    /// Number of records dropped.
    pub removed: usize,
}

impl PathListing {
    /// Parse a listing file.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let contents = fs::read_to_string(path).map_err(|source| CoreError::ListingIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parse listing text; line numbers in errors are 1-based.
    pub fn parse(input: &str) -> CoreResult<Self> {
        let mut records = Vec::new();
        for (offset, line) in input.lines().enumerate() {
            records.push(parse_line(line, offset + 1)?);
        }
        Ok(Self { records })
    }

    /// Drop every record whose support is `<= threshold`; `None`
    /// disables filtering. Survivors keep their relative order and are
    /// re-indexed densely from 0.
    pub fn filter_common(&self, threshold: Option<u64>) -> FilterOutcome {
        let total = self.records.len();
        let records: Vec<PathRecord> = match threshold {
            None => self.records.clone(),
            Some(c) => self
                .records
                .iter()
                .filter(|record| record.support() as u64 > c)
                .cloned()
                .collect(),
        };
        let removed = total - records.len();
        if let Some(c) = threshold {
            info!(
                "{} of {} paths removed that are shared between <= {} graphs, \
                 feature dimensionality is {}",
                removed,
                total,
                c,
                records.len()
            );
        }
        FilterOutcome {
            listing: Self { records },
            removed,
        }
    }

    /// Number of records (the feature dimensionality once filtered).
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the listing holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in path-index order.
    pub fn records(&self) -> &[PathRecord] {
        &self.records
    }

    /// Iterate `(path_index, record)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &PathRecord)> {
        self.records.iter().enumerate()
    }
}

fn parse_line(line: &str, line_no: usize) -> CoreResult<PathRecord> {
    let mut tokens = line.split_whitespace();
    let descriptor = tokens.next().unwrap_or_default().to_string();
    let mut occurrences = Vec::new();
    for token in tokens {
        let (graph, freq) = match token.split_once(':') {
            // Exactly one separator: the frequency half may not
            // contain another one. The graph half may be empty; it
            // simply never matches a registry name.
            Some((graph, freq)) if !freq.contains(':') => (graph, freq),
            _ => {
                return Err(CoreError::MalformedToken {
                    line: line_no,
                    token: token.to_string(),
                })
            }
        };
        let frequency: u64 = freq.parse().map_err(|_| CoreError::BadFrequency {
            line: line_no,
            value: freq.to_string(),
        })?;
        occurrences.push((graph.to_string(), frequency));
    }
    Ok(PathRecord {
        descriptor,
        occurrences,
    })
}
