//! Fixed layout under the data root.
//!
//! ```text
//! <data_root>/
//!   library/<n>.wav        numeral clips, 1..=library_size
//!   cache/<fingerprint>.wav  finished countdown artifacts
//!   cache/.build-*/        per-build scratch, removed on completion
//! ```

use std::path::{Path, PathBuf};

/// Directory holding the pre-built numeral clips.
#[must_use]
pub fn library_dir(data_root: &Path) -> PathBuf {
    data_root.join("library")
}

/// Directory holding finished countdown artifacts.
#[must_use]
pub fn cache_dir(data_root: &Path) -> PathBuf {
    data_root.join("cache")
}
