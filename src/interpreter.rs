use crate::builtin::Builtin;
use crate::env::Environment;
use crate::io_adapters::LineSource;
use crate::supervisor::ExternalCommand;
use crate::tokenizer::{LineBuffer, tokenize};
use anyhow::{Context, Result};
use std::io::{self, Write};
use tracing::{debug, info, warn};

/// Greeting printed once before the first prompt.
pub const BANNER: &str = "Welcome to TerOS\nType 'help' for commands.";

/// The read-dispatch-execute loop.
///
/// The interpreter owns the session [`Environment`], the line source shared by
/// the loop and `save`, and the output built-ins write to. External programs
/// inherit the process's own stdio.
///
/// Example
/// ```
/// use initsh::{Environment, Interpreter};
/// use initsh::io_adapters::{BufReadSource, MemWriter};
/// use std::io::Cursor;
///
/// let (out, collected) = MemWriter::with_handle();
/// let mut sh = Interpreter::new(
///     Environment::default(),
///     Box::new(BufReadSource::new(Cursor::new(""))),
///     Box::new(out),
/// );
/// sh.execute_line("echo hello   world").unwrap();
/// assert_eq!(collected.borrow().as_slice(), b"hello world\n");
/// ```
pub struct Interpreter {
    env: Environment,
    input: Box<dyn LineSource>,
    stdout: Box<dyn Write>,
    line: LineBuffer,
}

impl Interpreter {
    pub fn new(env: Environment, input: Box<dyn LineSource>, stdout: Box<dyn Write>) -> Self {
        Self {
            env,
            input,
            stdout,
            line: LineBuffer::new(),
        }
    }

    /// Session state, with `current_dir` as of the most recent line.
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Prompt, read and execute lines until the input ends.
    ///
    /// End of input is the only normal way out. A failing command never stops
    /// the loop; only an input stream that keeps erroring does.
    pub fn repl(&mut self) -> Result<()> {
        loop {
            let prompt = format!("{}> ", self.env.refresh_current_dir());
            let line = match self.input.read_line(&prompt, self.stdout.as_mut()) {
                Ok(Some(line)) => line,
                Ok(None) => {
                    info!("end of input, leaving command loop");
                    return Ok(());
                }
                Err(e) => return Err(e).context("reading command line"),
            };

            if let Err(e) = self.execute_line(&line) {
                warn!("{e:#}");
            }
        }
    }

    /// Tokenize and run one line: a built-in if the name matches one, otherwise
    /// an external program. Blank lines do nothing.
    ///
    /// Command failures are reported on the spot; an `Err` only means the
    /// shell's own output could not be written.
    pub fn execute_line(&mut self, line: &str) -> Result<()> {
        self.env.refresh_current_dir();
        let argv = tokenize(self.line.load(line));
        let Some(name) = argv.name() else {
            return Ok(());
        };

        match Builtin::lookup(name) {
            Some(builtin) => {
                let res = builtin.execute(
                    argv.args(),
                    self.input.as_mut(),
                    self.stdout.as_mut(),
                    &self.env,
                );
                if let Err(e) = res {
                    debug!(builtin = builtin.name(), "{e:#}");
                    writeln!(self.stdout, "{e:#}")?;
                }
                self.stdout.flush()?;
            }
            None => {
                // Nothing buffered may leak into the child's copy of the process.
                self.stdout.flush()?;
                io::stdout().flush()?;
                match ExternalCommand::new(&argv, &self.env.search_path)
                    .and_then(ExternalCommand::execute)
                {
                    Ok(status) => debug!(program = name, ?status, "external command finished"),
                    Err(e) => {
                        debug!(program = name, "{e:#}");
                        eprintln!("{e:#}");
                    }
                }
            }
        }
        Ok(())
    }
}
