//! Pure path resolver for testing and the `salvo paths` command.

use std::path::{Path, PathBuf};

use super::{DataRootSource, PathError, cache_dir, library_dir, resolve_data_root};

/// All resolved paths captured in a single struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    /// Root directory for everything salvo writes.
    pub data_root: PathBuf,
    /// How the data root was resolved.
    pub data_root_source: DataRootSource,
    /// Numeral clip library.
    pub library_dir: PathBuf,
    /// Countdown artifact cache.
    pub cache_dir: PathBuf,
}

impl ResolvedPaths {
    /// Resolve all paths using the current environment.
    pub fn resolve() -> Result<Self, PathError> {
        Self::resolve_with_data_dir(None)
    }

    /// Resolve with an explicit data directory override.
    pub fn resolve_with_data_dir(data_dir: Option<&Path>) -> Result<Self, PathError> {
        let (data_root, data_root_source) = resolve_data_root(data_dir)?;
        Ok(Self {
            library_dir: library_dir(&data_root),
            cache_dir: cache_dir(&data_root),
            data_root,
            data_root_source,
        })
    }
}

impl std::fmt::Display for ResolvedPaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "data_root = {}", self.data_root.display())?;
        writeln!(f, "data_root_source = {:?}", self.data_root_source)?;
        writeln!(f, "library_dir = {}", self.library_dir.display())?;
        write!(f, "cache_dir = {}", self.cache_dir.display())
    }
}
