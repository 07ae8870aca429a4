//! Turning a program name into the ordered paths to try executing.
//!
//! Resolution never touches the filesystem. It only yields candidates; the
//! supervisor's child tries them in order and the first successful `execv` wins.

use std::fmt;
use std::path::PathBuf;
use std::slice;

/// Ordered list of directories searched for bare program names.
///
/// Order is significant: the first directory holding an executable match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl Default for SearchPath {
    /// `/bin`, then `/sbin`.
    fn default() -> Self {
        Self::new(vec![PathBuf::from("/bin"), PathBuf::from("/sbin")])
    }
}

impl fmt::Display for SearchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, dir) in self.dirs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", dir.display())?;
        }
        Ok(())
    }
}

/// Whether `name` is meant as a path rather than a name to look up.
pub fn has_separator(name: &str) -> bool {
    name.contains('/')
}

/// Iterator over the candidate paths for one program name.
#[derive(Debug, Clone)]
pub enum Candidates<'a> {
    /// The name contained a separator and is used exactly as written.
    Literal(Option<&'a str>),
    /// A bare name joined onto each search directory in turn.
    Search {
        name: &'a str,
        dirs: slice::Iter<'a, PathBuf>,
    },
}

impl Iterator for Candidates<'_> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        match self {
            Candidates::Literal(name) => name.take().map(PathBuf::from),
            Candidates::Search { name, dirs } => dirs.next().map(|dir| dir.join(*name)),
        }
    }
}

/// Candidate paths for `name`, in the order they must be attempted.
///
/// A name containing `/` short-circuits to itself; anything else is tried under
/// every directory of `search`, first to last.
pub fn candidates<'a>(name: &'a str, search: &'a SearchPath) -> Candidates<'a> {
    if has_separator(name) {
        Candidates::Literal(Some(name))
    } else {
        Candidates::Search {
            name,
            dirs: search.dirs.iter(),
        }
    }
}
