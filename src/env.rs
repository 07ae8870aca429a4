use crate::resolver::SearchPath;
use std::env as stdenv;
use std::path::PathBuf;

/// Mount point used when none is configured.
pub const DEFAULT_MOUNT: &str = "/mnt";

/// Session state handed to built-ins by reference.
///
/// The environment contains:
/// - `mount`: the directory `ls`, `cat` and `save` operate under.
/// - `search_path`: the ordered directories searched for bare program names.
/// - `current_dir`: the working directory as resolved for the current iteration.
///
/// The process working directory itself is owned by the operating system; `cd`
/// changes it there and the shell loop re-reads it before every prompt.
#[derive(Debug, Clone)]
pub struct Environment {
    pub mount: PathBuf,
    pub search_path: SearchPath,
    /// `?` when the working directory cannot be resolved.
    pub current_dir: String,
}

impl Environment {
    pub fn new(mount: impl Into<PathBuf>, search_path: SearchPath) -> Self {
        Self {
            mount: mount.into(),
            search_path,
            current_dir: resolve_current_dir(),
        }
    }

    /// Re-read the process working directory into `current_dir`.
    pub fn refresh_current_dir(&mut self) -> &str {
        self.current_dir = resolve_current_dir();
        &self.current_dir
    }

    /// Location of `name` under the mount point.
    ///
    /// Leading separators are dropped, so `/etc/x` still lands inside the mount.
    pub fn mount_path(&self, name: &str) -> PathBuf {
        self.mount.join(name.trim_start_matches('/'))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(DEFAULT_MOUNT, SearchPath::default())
    }
}

fn resolve_current_dir() -> String {
    stdenv::current_dir()
        .map(|dir| dir.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "?".to_string())
}
