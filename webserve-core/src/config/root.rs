//! Root directory resolution and validation

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Bundle location relative to the executable
pub const DEFAULT_BUNDLE_DIR: &str = "build/web";

/// Command that produces the bundle
pub const BUILD_COMMAND: &str = "flutter build web";

/// `build/web` next to the running executable
pub fn default_root() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let dir = exe
        .parent()
        .ok_or_else(|| Error::Server(format!("Executable path has no parent: {}", exe.display())))?;
    Ok(dir.join(DEFAULT_BUNDLE_DIR))
}

/// Resolve the directory to serve
///
/// An explicit path is taken relative to the working directory; without one
/// the bundle next to the executable is used.
pub fn resolve_root(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) if path.is_absolute() => Ok(path.to_path_buf()),
        Some(path) => Ok(std::env::current_dir()?.join(path)),
        None => default_root(),
    }
}

/// Check that `root` exists and can be listed, returning its canonical form
pub fn validate_root(root: &Path) -> Result<PathBuf> {
    if !root.exists() {
        return Err(Error::MissingRootDirectory(root.to_path_buf()));
    }

    let unreadable = |source| Error::UnreadableRootDirectory {
        path: root.to_path_buf(),
        source,
    };

    std::fs::read_dir(root).map_err(unreadable)?;
    let canonical = root.canonicalize().map_err(unreadable)?;

    tracing::debug!("📁 Root directory validated: {}", canonical.display());
    Ok(canonical)
}
