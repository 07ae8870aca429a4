//! Turning one raw input line into a bounded argument vector.
//!
//! There is no quoting and no escaping: a token is any run of non-whitespace
//! characters. Both the line and the argument vector have fixed capacities, and
//! anything beyond them is dropped rather than overrunning.

use std::ops::Deref;
use tracing::{debug, warn};

/// Capacity of the line buffer, including the terminator slot.
pub const LINE_CAPACITY: usize = 512;

/// Slots in an argument vector. The last one is reserved for the terminator
/// handed to `execv`, so at most `MAX_ARGS - 1` tokens are kept.
pub const MAX_ARGS: usize = 64;

/// Whitespace as C `isspace` sees it in the "C" locale: space, `\t`, `\n`,
/// `\v`, `\f` and `\r`. Other Unicode spaces are ordinary token characters.
pub fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r')
}

/// Fixed-capacity buffer holding one line of input, reused every iteration.
#[derive(Debug)]
pub struct LineBuffer {
    buf: String,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineBuffer {
    pub fn new() -> Self {
        Self {
            buf: String::with_capacity(LINE_CAPACITY),
        }
    }

    /// Replace the buffer contents with `line`.
    ///
    /// The line terminator is stripped, content past `LINE_CAPACITY - 1` bytes is
    /// cut at the nearest character boundary, and the result is trimmed of
    /// surrounding whitespace.
    pub fn load(&mut self, line: &str) -> &str {
        let line = line.trim_end_matches(['\n', '\r']);
        let mut end = line.len().min(LINE_CAPACITY - 1);
        while !line.is_char_boundary(end) {
            end -= 1;
        }
        if end < line.len() {
            warn!(
                len = line.len(),
                kept = end,
                "input line exceeds buffer capacity, truncating"
            );
        }

        self.buf.clear();
        self.buf.push_str(line[..end].trim_matches(is_separator));
        &self.buf
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }
}

/// Ordered, non-empty tokens of one command line; the first is the command name.
///
/// Borrows from the line it was split from and lives for a single iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Argv<'a> {
    args: Vec<&'a str>,
}

impl<'a> Argv<'a> {
    /// The command name, if the line had any tokens at all.
    pub fn name(&self) -> Option<&'a str> {
        self.args.first().copied()
    }

    /// Everything after the command name.
    pub fn args(&self) -> &[&'a str] {
        self.args.get(1..).unwrap_or_default()
    }
}

impl<'a> Deref for Argv<'a> {
    type Target = [&'a str];

    fn deref(&self) -> &Self::Target {
        &self.args
    }
}

/// Split `line` on runs of whitespace, keeping at most `MAX_ARGS - 1` tokens.
pub fn tokenize(line: &str) -> Argv<'_> {
    let mut tokens = line.split(is_separator).filter(|token| !token.is_empty());
    let mut args = Vec::with_capacity(MAX_ARGS - 1);
    args.extend(tokens.by_ref().take(MAX_ARGS - 1));

    let dropped = tokens.count();
    if dropped > 0 {
        debug!(dropped, "argument vector full, dropping excess tokens");
    }
    Argv { args }
}
