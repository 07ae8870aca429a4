//! Creating the directory layout the shell expects before its first prompt.

use crate::env::Environment;
use crate::retry::os_reason;
use anyhow::{Result, bail};
use std::fs::DirBuilder;
use std::io;
use std::iter;
use std::os::unix::fs::DirBuilderExt;
use std::path::Path;
use tracing::debug;

/// Make sure `path` exists as a directory. An existing directory is not an
/// error.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    DirBuilder::new().recursive(true).mode(0o755).create(path)
}

/// Create the mount point and every search directory.
///
/// Every directory is attempted even if an earlier one fails; the error lists
/// all the paths that could not be created.
pub fn ensure_layout(env: &Environment) -> Result<()> {
    let mut failed = Vec::new();
    for dir in iter::once(&env.mount).chain(env.search_path.dirs()) {
        match ensure_dir(dir) {
            Ok(()) => debug!(dir = %dir.display(), "directory ready"),
            Err(e) => {
                debug!(dir = %dir.display(), "cannot create directory: {}", os_reason(&e));
                failed.push(format!("{} ({})", dir.display(), os_reason(&e)));
            }
        }
    }
    if !failed.is_empty() {
        bail!("could not create {}", failed.join(", "));
    }
    Ok(())
}
