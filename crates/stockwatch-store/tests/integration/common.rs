use std::path::PathBuf;

use stockwatch_store::FileStatusStore;
use tempfile::TempDir;

/// Creates a store pointing at a fresh temp directory.
///
/// The `TempDir` must be kept in scope for the test duration;
/// dropping it deletes the directory.
pub fn setup_test_store(file_name: &str) -> (FileStatusStore, PathBuf, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join(file_name);
    (FileStatusStore::new(&path), path, dir)
}
