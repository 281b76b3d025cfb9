//! Graph registry: the ordered list of graph names and their ordinals.
//!
//! The registry fixes the row/column order of every downstream output
//! file. Names come either from a directory of graph files (dotfiles
//! skipped) or from a plain-text listing with one filename per line;
//! in both cases the file extension is stripped and the result is
//! sorted alphanumerically and deduplicated.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::{CoreError, CoreResult};

/// Ordered, deduplicated set of graph names with ordinal lookup.
///
/// Ordinals are assigned by alphanumeric sort order and are immutable
/// once the registry is built. Label files consumed by downstream
/// tools must be sorted the same way.
#[derive(Debug, Clone)]
pub struct GraphRegistry {
    names: Vec<String>,
    ordinals: HashMap<String, usize>,
}

impl GraphRegistry {
    /// Resolve a graph source path: a directory of graph files or a
    /// newline-delimited listing file.
    pub fn resolve(source: &Path) -> CoreResult<Self> {
        if source.is_dir() {
            info!("reading graphs from directory {}", source.display());
            Self::from_dir(source)
        } else if source.is_file() {
            info!("reading graphs from listing file {}", source.display());
            Self::from_listing_file(source)
        } else {
            Err(CoreError::BadGraphSource(source.to_path_buf()))
        }
    }

    /// Build a registry from the entries of a directory, skipping
    /// hidden files.
    pub fn from_dir(dir: &Path) -> CoreResult<Self> {
        let entries = fs::read_dir(dir).map_err(|source| CoreError::GraphSourceIo {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| CoreError::GraphSourceIo {
                path: dir.to_path_buf(),
                source,
            })?;
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        Ok(Self::from_names(names))
    }

    /// Build a registry from a listing file with one graph filename
    /// per line (e.g. the output of `ls -1 graphdir/*.mol`).
    pub fn from_listing_file(path: &Path) -> CoreResult<Self> {
        let contents = fs::read_to_string(path).map_err(|source| CoreError::GraphSourceIo {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_names(contents.lines().map(str::to_string)))
    }

    /// Build a registry from raw filenames: hidden and blank entries
    /// are dropped, extensions stripped, then sorted and deduplicated.
    pub fn from_names<I>(raw: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut names: Vec<String> = raw
            .into_iter()
            .filter_map(|raw| strip_extension(raw.trim()))
            .collect();
        names.sort();
        names.dedup();
        let ordinals = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        debug!("registry holds {} graphs", names.len());
        Self { names, ordinals }
    }

    /// Number of graphs in the registry.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Graph names in ordinal order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Ordinal index of a graph name, if registered.
    pub fn ordinal(&self, name: &str) -> Option<usize> {
        self.ordinals.get(name).copied()
    }

    /// Graph name at the given ordinal.
    pub fn name(&self, ordinal: usize) -> &str {
        &self.names[ordinal]
    }
}

/// Take the final path component, drop hidden and empty names, and
/// strip the last extension (`R00004.mol` -> `R00004`).
fn strip_extension(raw: &str) -> Option<String> {
    let base = Path::new(raw).file_name()?.to_str()?;
    if base.is_empty() || base.starts_with('.') {
        return None;
    }
    match base.rsplit_once('.') {
        Some((stem, _)) => Some(stem.to_string()),
        None => Some(base.to_string()),
    }
}
