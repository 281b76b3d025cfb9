//! Integration tests for the end-to-end kernel extraction pipeline
//!
//! Exercises the full run against temporary directories: registry
//! resolution from a graph directory and from a listing file, the
//! commonality filter, feature and kernel output contents, overwrite
//! protection and byte-for-byte determinism.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use pathkern_engine::{pipeline, EngineError, Normalization, RunConfig};
use tempfile::{tempdir, TempDir};

/// Listing shared by most tests:
///   pA occurs in g1 (freq 2) and g2 (freq 1)
///   pB occurs in g1 (freq 1)
///   pC occurs in g2 (freq 3) and g3 (freq 1)
const LISTING: &str = "pA g1:2 g2:1\npB g1:1\npC g2:3 g3:1\n";

struct Fixture {
    root: TempDir,
    graphs: PathBuf,
    listing: PathBuf,
    out: PathBuf,
}

fn fixture() -> Fixture {
    let root = tempdir().expect("tempdir");
    let graphs = root.path().join("graphs");
    fs::create_dir(&graphs).expect("graph dir");
    for name in ["g1.mol", "g2.mol", "g3.mol", ".DS_Store"] {
        File::create(graphs.join(name)).expect("graph file");
    }
    let listing = root.path().join("result.freqs");
    fs::write(&listing, LISTING).expect("listing");
    let out = root.path().join("out");
    fs::create_dir(&out).expect("out dir");
    Fixture {
        root,
        graphs,
        listing,
        out,
    }
}

fn config(fix: &Fixture) -> RunConfig {
    RunConfig {
        graph_source: fix.graphs.clone(),
        listing_file: fix.listing.clone(),
        output_dir: fix.out.clone(),
        output_prefix: None,
        commonality_threshold: None,
        write_features: false,
        overwrite_existing: false,
        normalization: Normalization::RowDiagonal,
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("output file")
}

/// Unfiltered run: feature vectors and the literal row-diagonal
/// kernel normalization.
#[test]
fn test_no_filter_run_writes_features_and_kernels() {
    let fix = fixture();
    let mut config = config(&fix);
    config.write_features = true;

    let summary = pipeline::run(&config).expect("run should succeed");
    assert_eq!(summary.graphs, 3);
    assert_eq!(summary.total_paths, 3);
    assert_eq!(summary.removed_paths, 0);
    assert_eq!(summary.dimensions, 3);

    // Ordinal order g1, g2, g3; per-graph frequencies per path.
    assert_eq!(read(&fix.out.join("features")), "2 1 0\n1 0 3\n0 0 1\n");

    // Raw rows [5 2 0], [2 10 3], [0 3 1] divided by the row's own
    // diagonal (5, 10, 1).
    assert_eq!(
        read(&fix.out.join("kernels")),
        "1 0.4 0\n0.2 1 0.3\n0 3 1\n"
    );
}

/// Threshold 1 drops pB only (supports are 2, 1, 2); every graph
/// keeps a surviving path, so the filtered run still succeeds.
#[test]
fn test_filtered_run_keeps_shared_paths() {
    let fix = fixture();
    let mut config = config(&fix);
    config.commonality_threshold = Some(1);
    config.write_features = true;

    let summary = pipeline::run(&config).expect("run should succeed");
    assert_eq!(summary.removed_paths, 1);
    assert_eq!(summary.dimensions, 2);

    // Surviving dimensions are pA, pC.
    assert_eq!(read(&fix.out.join("features")), "2 0\n1 3\n0 1\n");
}

/// When a graph loses every path to the filter, its zero self-kernel
/// must abort the run with the graph named — before any output file
/// is created.
#[test]
fn test_filtered_run_hits_degenerate_graph() {
    let fix = fixture();
    // g3 only occurs in pC, which has support 1 and falls to c=1.
    fs::write(&fix.listing, "pA g1:2 g2:1\npB g1:1\npC g3:1\n").expect("listing");
    let mut config = config(&fix);
    config.commonality_threshold = Some(1);
    config.write_features = true;

    let err = pipeline::run(&config).expect_err("g3 has a zero self-kernel");
    match err {
        EngineError::DegenerateGraph { name, ordinal } => {
            assert_eq!(name, "g3");
            assert_eq!(ordinal, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!fix.out.join("kernels").exists());
    assert!(!fix.out.join("features").exists());
}

/// A threshold above every support empties the listing; the run must
/// fail up front without touching the output directory.
#[test]
fn test_all_paths_filtered_leaves_no_output() {
    let fix = fixture();
    let mut config = config(&fix);
    config.commonality_threshold = Some(5);

    let err = pipeline::run(&config).expect_err("no graph has any path left");
    assert!(matches!(err, EngineError::DegenerateGraph { ordinal: 0, .. }));
    assert!(!fix.out.join("kernels").exists());
}

/// Geometric normalization yields a symmetric matrix with unit
/// diagonal.
#[test]
fn test_geometric_normalization_is_symmetric() {
    let fix = fixture();
    let mut config = config(&fix);
    config.normalization = Normalization::Geometric;

    pipeline::run(&config).expect("run should succeed");

    let rows: Vec<Vec<f64>> = read(&fix.out.join("kernels"))
        .lines()
        .map(|line| {
            line.split(' ')
                .map(|v| v.parse().expect("kernel value"))
                .collect()
        })
        .collect();
    assert_eq!(rows.len(), 3);
    for i in 0..3 {
        assert!((rows[i][i] - 1.0).abs() < 1e-12);
        for j in 0..3 {
            assert!((rows[i][j] - rows[j][i]).abs() < 1e-12);
        }
    }
}

/// A graph listing file (with directory components and extensions)
/// resolves to the same registry as the directory scan.
#[test]
fn test_graph_listing_file_source() {
    let fix = fixture();
    let graphlist = fix.root.path().join("graphlist.txt");
    fs::write(&graphlist, "graphs/g2.mol\ngraphs/g1.mol\ngraphs/g3.mol\n").expect("graphlist");

    let mut config = config(&fix);
    config.graph_source = graphlist;
    config.write_features = true;

    pipeline::run(&config).expect("run should succeed");
    assert_eq!(read(&fix.out.join("features")), "2 1 0\n1 0 3\n0 0 1\n");
}

/// Existing outputs are refused without the overwrite flag and
/// replaced with it; re-runs are byte-for-byte identical.
#[test]
fn test_overwrite_protection_and_determinism() {
    let fix = fixture();
    let config = config(&fix);

    pipeline::run(&config).expect("first run");
    let first = read(&fix.out.join("kernels"));

    let err = pipeline::run(&config).expect_err("must refuse to overwrite");
    assert!(matches!(err, EngineError::OutputExists(_)));
    assert_eq!(read(&fix.out.join("kernels")), first);

    let mut forced = config.clone();
    forced.overwrite_existing = true;
    pipeline::run(&forced).expect("forced run");
    assert_eq!(read(&fix.out.join("kernels")), first);
}

/// Output filenames carry the configured prefix.
#[test]
fn test_output_prefix() {
    let fix = fixture();
    let mut config = config(&fix);
    config.output_prefix = Some("kegg-".to_string());
    config.write_features = true;

    pipeline::run(&config).expect("run should succeed");
    assert!(fix.out.join("kegg-kernels").is_file());
    assert!(fix.out.join("kegg-features").is_file());
}

/// A malformed listing line fails the run with its line number before
/// any output file is created.
#[test]
fn test_malformed_listing_aborts_before_output() {
    let fix = fixture();
    fs::write(&fix.listing, "pA g1:2\npB g1=1\n").expect("listing");

    let config = config(&fix);
    let err = pipeline::run(&config).expect_err("malformed token");
    assert!(err.to_string().contains("line 2"));
    assert!(!fix.out.join("kernels").exists());
}
