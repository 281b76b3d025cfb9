//! Whitespace-delimited row output with overwrite protection.
//!
//! One line per graph in ordinal order, values separated by single
//! spaces, no trailing space, newline-terminated. Existing output
//! files are refused unless the overwrite flag is set, in which case
//! the prior file is removed first (single-writer assumption; the
//! check-then-act is not concurrency-safe).

use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::{EngineError, EngineResult};

/// Resolved output file paths for a run.
#[derive(Debug, Clone)]
pub struct OutputTargets {
    /// Kernel matrix file, always written.
    pub kernels: PathBuf,
    /// Feature matrix file, written on request.
    pub features: Option<PathBuf>,
}

impl OutputTargets {
    /// Join the output directory and optional filename prefix into
    /// concrete `features` / `kernels` paths.
    pub fn resolve(output_dir: &Path, prefix: Option<&str>, write_features: bool) -> Self {
        let prefix = prefix.unwrap_or("");
        let kernels = output_dir.join(format!("{prefix}kernels"));
        let features = write_features.then(|| output_dir.join(format!("{prefix}features")));
        Self { kernels, features }
    }

    /// Check every target before any computation starts: refuse
    /// existing files unless `overwrite` is set, else delete them.
    pub fn prepare(&self, overwrite: bool) -> EngineResult<()> {
        prepare_target(&self.kernels, overwrite)?;
        if let Some(features) = &self.features {
            prepare_target(features, overwrite)?;
        }
        Ok(())
    }
}

fn prepare_target(path: &Path, overwrite: bool) -> EngineResult<()> {
    if !path.is_file() {
        return Ok(());
    }
    if !overwrite {
        return Err(EngineError::OutputExists(path.to_path_buf()));
    }
    warn!(
        "overwrite flag is set: output file {} exists and will be replaced",
        path.display()
    );
    fs::remove_file(path).map_err(|source| EngineError::OutputIo {
        path: path.to_path_buf(),
        source,
    })
}

/// Buffered row writer for one output file.
#[derive(Debug)]
pub struct MatrixWriter {
    path: PathBuf,
    out: BufWriter<File>,
}

impl MatrixWriter {
    /// Create (truncate) the output file.
    pub fn create(path: &Path) -> EngineResult<Self> {
        let file = File::create(path).map_err(|source| EngineError::OutputIo {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
        })
    }

    /// Write one space-separated row.
    pub fn write_row<T: Display>(&mut self, row: &[T]) -> EngineResult<()> {
        let mut line = String::new();
        for (i, value) in row.iter().enumerate() {
            if i > 0 {
                line.push(' ');
            }
            line.push_str(&value.to_string());
        }
        line.push('\n');
        self.out
            .write_all(line.as_bytes())
            .map_err(|source| self.io_error(source))
    }

    /// Flush and close the file.
    pub fn finish(mut self) -> EngineResult<()> {
        self.out.flush().map_err(|source| EngineError::OutputIo {
            path: self.path.clone(),
            source,
        })
    }

    fn io_error(&self, source: std::io::Error) -> EngineError {
        EngineError::OutputIo {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_with_prefix() {
        let targets = OutputTargets::resolve(Path::new("/out"), Some("run1-"), true);
        assert_eq!(targets.kernels, Path::new("/out/run1-kernels"));
        assert_eq!(
            targets.features.as_deref(),
            Some(Path::new("/out/run1-features"))
        );
    }

    #[test]
    fn test_prepare_refuses_existing_file() {
        let dir = tempdir().unwrap();
        let targets = OutputTargets::resolve(dir.path(), None, false);
        fs::write(&targets.kernels, "old\n").unwrap();
        let err = targets.prepare(false).unwrap_err();
        assert!(matches!(err, EngineError::OutputExists(_)));
        // The old file is untouched.
        assert_eq!(fs::read_to_string(&targets.kernels).unwrap(), "old\n");
    }

    #[test]
    fn test_prepare_overwrite_deletes_first() {
        let dir = tempdir().unwrap();
        let targets = OutputTargets::resolve(dir.path(), None, false);
        fs::write(&targets.kernels, "old\n").unwrap();
        targets.prepare(true).unwrap();
        assert!(!targets.kernels.exists());
    }

    #[test]
    fn test_write_rows_no_trailing_space() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kernels");
        let mut writer = MatrixWriter::create(&path).unwrap();
        writer.write_row(&[1.0f64, 0.4, 0.0]).unwrap();
        writer.write_row(&[2u64, 1, 0]).unwrap();
        writer.finish().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "1 0.4 0\n2 1 0\n");
    }
}
