//! Path utilities for salvo's data directories.
//!
//! This module provides the canonical path resolution for:
//! - The data root (explicit override, `SALVO_DATA_DIR`, platform default)
//! - The numeral library directory
//! - The countdown artifact cache
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - No interactive/terminal I/O - adapters handle user prompts separately
//! - OS-specific logic is kept private in `platform`

mod ensure;
mod error;
mod layout;
mod platform;
mod resolver;

#[cfg(test)]
mod test_utils;

// Error type
pub use error::PathError;

// Platform detection and roots
pub use platform::{DATA_DIR_ENV, DataRootSource, data_root, resolve_data_root};

// Directory layout under the data root
pub use layout::{cache_dir, library_dir};

// Directory operations
pub use ensure::{DirectoryCreationStrategy, ensure_directory, verify_writable};

// Pure resolver for testing and CLI
pub use resolver::ResolvedPaths;
