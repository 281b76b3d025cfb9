//! Integration test crate for pathkern; all tests live under `tests/`.
