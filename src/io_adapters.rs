//! Input sources and output adapters for the shell loop.
//!
//! The main loop and the `save` built-in read from the same [`LineSource`], so a
//! nested read sees exactly the lines the loop has not consumed yet.

use crate::retry::retry_interrupted;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::cell::RefCell;
use std::io::{self, BufRead, Result as IoResult, Write};
use std::rc::Rc;

/// A stream of input lines, each read after showing a prompt.
pub trait LineSource {
    /// Show `prompt` and read one line.
    ///
    /// Returns `Ok(None)` at end of input. Interrupted reads are retried, never
    /// reported. `out` is where the source should write the prompt if it does
    /// not draw the prompt itself.
    fn read_line(&mut self, prompt: &str, out: &mut dyn Write) -> IoResult<Option<String>>;
}

/// Line source over any buffered reader, e.g. locked stdin or a `Cursor`.
pub struct BufReadSource<R> {
    reader: R,
}

impl<R: BufRead> BufReadSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for BufReadSource<R> {
    fn read_line(&mut self, prompt: &str, out: &mut dyn Write) -> IoResult<Option<String>> {
        out.write_all(prompt.as_bytes())?;
        out.flush()?;

        let mut raw = Vec::new();
        let read = retry_interrupted(|| self.reader.read_until(b'\n', &mut raw))?;
        if read == 0 && raw.is_empty() {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&raw).into_owned()))
    }
}

/// Line source backed by a rustyline editor, for interactive terminals.
pub struct EditorSource {
    editor: DefaultEditor,
}

impl EditorSource {
    pub fn new() -> rustyline::Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for EditorSource {
    /// The editor draws the prompt on the terminal itself, so `out` is unused.
    ///
    /// Ctrl-C at the prompt only discards the current line; this shell must not
    /// exit on it.
    fn read_line(&mut self, prompt: &str, _out: &mut dyn Write) -> IoResult<Option<String>> {
        loop {
            match self.editor.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = self.editor.add_history_entry(line.as_str());
                    }
                    return Ok(Some(line));
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => return Ok(None),
                Err(ReadlineError::Io(e)) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(ReadlineError::Io(e)) => return Err(e),
                Err(e) => return Err(io::Error::other(e.to_string())),
            }
        }
    }
}

/// Memory-backed writer for capturing shell output.
pub struct MemWriter {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl Default for MemWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl MemWriter {
    pub fn new() -> Self {
        Self {
            buf: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Create a writer and a handle to read what it collected after it has been
    /// moved into the shell.
    pub fn with_handle() -> (Self, Rc<RefCell<Vec<u8>>>) {
        let mw = MemWriter::new();
        let rc = mw.buf.clone();
        (mw, rc)
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}
