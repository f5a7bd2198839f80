//! Platform-specific data root resolution.

use std::env;
use std::path::{Path, PathBuf};

use super::error::PathError;

/// Environment variable overriding the data root.
pub const DATA_DIR_ENV: &str = "SALVO_DATA_DIR";

/// How the data root was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataRootSource {
    /// The caller passed a path (settings file or `--data-dir`).
    Explicit,
    /// `SALVO_DATA_DIR` was set.
    EnvVar,
    /// Platform data directory (e.g. `~/.local/share/salvo`).
    Default,
}

/// Get the root directory for the library and cache.
///
/// Resolution order:
/// 1. `SALVO_DATA_DIR` environment variable
/// 2. System data directory (e.g., `~/.local/share/salvo`)
///
/// The directory is not created here; see [`ensure_directory`](super::ensure_directory).
pub fn data_root() -> Result<PathBuf, PathError> {
    resolve_data_root(None).map(|(path, _)| path)
}

/// Resolve the data root, giving an explicit path the highest priority.
pub fn resolve_data_root(explicit: Option<&Path>) -> Result<(PathBuf, DataRootSource), PathError> {
    if let Some(path) = explicit {
        return Ok((normalize_user_path(path)?, DataRootSource::Explicit));
    }

    if let Ok(path) = env::var(DATA_DIR_ENV) {
        if !path.trim().is_empty() {
            return Ok((
                normalize_user_path(Path::new(path.trim()))?,
                DataRootSource::EnvVar,
            ));
        }
    }

    let data_dir = dirs::data_local_dir().ok_or(PathError::NoDataDir)?;
    Ok((data_dir.join("salvo"), DataRootSource::Default))
}

/// Expand a leading `~` and make the path absolute.
fn normalize_user_path(raw: &Path) -> Result<PathBuf, PathError> {
    if raw.as_os_str().is_empty() {
        return Err(PathError::EmptyPath);
    }

    let expanded = match raw.strip_prefix("~") {
        Ok(rest) => dirs::home_dir().ok_or(PathError::NoHomeDir)?.join(rest),
        Err(_) => raw.to_path_buf(),
    };

    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(expanded))
            .map_err(|e| PathError::CurrentDirError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::test_utils::{ENV_LOCK, EnvVarGuard};

    #[test]
    fn explicit_path_wins_over_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _env = EnvVarGuard::set(DATA_DIR_ENV, "/tmp/from-env");

        let (path, source) = resolve_data_root(Some(Path::new("/tmp/explicit"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/explicit"));
        assert_eq!(source, DataRootSource::Explicit);
    }

    #[test]
    fn env_var_overrides_platform_default() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _env = EnvVarGuard::set(DATA_DIR_ENV, "/tmp/salvo-env");

        let (path, source) = resolve_data_root(None).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/salvo-env"));
        assert_eq!(source, DataRootSource::EnvVar);
        assert_eq!(data_root().unwrap(), path);
    }

    #[test]
    fn blank_env_var_is_ignored() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _env = EnvVarGuard::set(DATA_DIR_ENV, "  ");

        if let Ok((path, source)) = resolve_data_root(None) {
            assert_eq!(source, DataRootSource::Default);
            assert!(path.ends_with("salvo"));
        }
    }

    #[test]
    fn relative_paths_are_made_absolute() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _env = EnvVarGuard::unset(DATA_DIR_ENV);

        let (path, _) = resolve_data_root(Some(Path::new("relative/dir"))).unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("relative/dir"));
    }

    #[test]
    fn empty_explicit_path_is_rejected() {
        assert!(matches!(
            resolve_data_root(Some(Path::new(""))),
            Err(PathError::EmptyPath)
        ));
    }
}
