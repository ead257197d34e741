//! Filesystem utilities

use std::path::Path;

/// Check if a path exists
pub fn path_exists(path: &str) -> bool {
    Path::new(path).exists()
}

/// Check if a path points at a regular file
///
/// The dataset is opened read-only, so a missing file is reported up front
/// instead of letting SQLite fail on the first query.
pub fn is_file(path: &str) -> bool {
    Path::new(path).is_file()
}
