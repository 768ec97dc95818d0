//! On-disk path provisioning for the engine's storage subsystems.
//!
//! The engine needs three directories under the user cache root before the
//! context is constructed (local storage, disk cache, indexed databases),
//! plus an optional cookie database path. Directory creation failures are
//! surfaced as errors and treated as fatal by session assembly.
//!
//! ## Cache root resolution
//!
//! 1. `XDG_CACHE_HOME` environment variable
//! 2. `$HOME/.cache`
//! 3. Current working directory (last resort)

use std::fs::DirBuilder;
use std::io;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::DirBuilderExt;

use tracing::debug;

/// Filename of the persistent cookie database, directly under the cache root.
const COOKIE_DATABASE_FILE: &str = "cookies.db";

/// Returns the user cache root directory.
pub fn user_cache_dir() -> PathBuf {
    std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".cache")))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Joins `segments` into a path and creates it (with all intermediate
/// directories) using `mode` as the Unix permission bits.
///
/// Returns the joined path. Already-existing directories are fine; their
/// mode is left untouched. On non-Unix platforms the mode is ignored.
pub fn provision_dir<I, S>(mode: u32, segments: I) -> io::Result<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<Path>,
{
    let mut path = PathBuf::new();
    for segment in segments {
        path.push(segment);
    }

    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(mode);
    #[cfg(not(unix))]
    let _ = mode;

    builder.create(&path)?;
    debug!(path = %path.display(), "Répertoire provisionné");
    Ok(path)
}

/// Returns the path of the persistent cookie database
/// (`<cache root>/cookies.db` — deliberately not under the `wpe` namespace).
pub fn cookie_database_path() -> PathBuf {
    user_cache_dir().join(COOKIE_DATABASE_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provision_dir_creates_nested_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let path = provision_dir(0o700, [tmp.path(), Path::new("wpe"), Path::new("disk-cache")])
            .unwrap();
        assert!(path.is_dir());
        assert!(path.ends_with("wpe/disk-cache"));
    }

    #[test]
    fn test_provision_dir_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let segments = [tmp.path(), Path::new("wpe"), Path::new("local-storage")];
        let first = provision_dir(0o700, segments).unwrap();
        let second = provision_dir(0o700, segments).unwrap();
        assert_eq!(first, second);
    }

    #[cfg(unix)]
    #[test]
    fn test_provision_dir_applies_owner_only_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let path = provision_dir(0o700, [tmp.path(), Path::new("index-db")]).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[test]
    fn test_provision_dir_surfaces_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();
        // A file in the way of an intermediate segment must error out.
        let result = provision_dir(0o700, [file.as_path(), Path::new("child")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cookie_database_path_is_the_db_file() {
        let path = cookie_database_path();
        assert_eq!(path.file_name().unwrap(), "cookies.db");
        // Directly under the cache root, not under the wpe namespace.
        assert!(!path.to_string_lossy().contains("wpe"));
    }

    #[test]
    fn test_user_cache_dir_not_empty() {
        assert!(!user_cache_dir().as_os_str().is_empty());
    }
}
