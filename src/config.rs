use crate::env::{DEFAULT_MOUNT, Environment};
use crate::resolver::SearchPath;
use argh::FromArgs;
use std::path::PathBuf;
use tracing::Level;

#[derive(FromArgs, Debug)]
/// Minimal init shell: built-ins over a mount point and external programs
/// from a fixed search path.
pub struct Config {
    #[argh(option, default = "PathBuf::from(DEFAULT_MOUNT)")]
    /// directory that ls, cat and save operate under (default /mnt)
    pub mount: PathBuf,

    #[argh(option)]
    /// directory searched for bare program names; repeat to add more, tried
    /// in the given order (default /bin then /sbin)
    pub search: Vec<PathBuf>,

    #[argh(switch)]
    /// read commands from plain stdin, without line editing
    pub plain: bool,

    #[argh(switch)]
    /// do not create the mount and search directories at startup
    pub no_bootstrap: bool,

    #[argh(switch, short = 'q')]
    /// do not print the welcome banner
    pub quiet: bool,

    #[argh(option, default = "Level::WARN")]
    /// most verbose log level written to stderr: error, warn, info, debug or trace
    pub log_level: Level,
}

impl Config {
    /// Session state described by these flags.
    pub fn environment(&self) -> Environment {
        let search_path = if self.search.is_empty() {
            SearchPath::default()
        } else {
            SearchPath::new(self.search.clone())
        };
        Environment::new(&self.mount, search_path)
    }
}
