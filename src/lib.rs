//! A minimal command interpreter meant to run as process 1.
//!
//! The shell reads one line at a time, splits it into a bounded argument vector
//! and either runs one of a handful of built-ins (file access under a fixed mount
//! point, `cd`, `pwd`, `echo` and friends) or executes an external program found
//! on a fixed search path. External programs always run synchronously: the
//! child is reaped before the next prompt appears, and signal-interrupted waits
//! are retried rather than reported.
//!
//! There are no pipes, redirections, variables or job control, and `exit` is
//! refused: an init process must not go away.
//!
//! The main entry point is [`Interpreter`]. [`Config`] turns command-line flags
//! into the [`Environment`] it runs with.

pub mod bootstrap;
pub mod builtin;
pub mod config;
pub mod env;
pub mod interpreter;
pub mod io_adapters;
pub mod resolver;
pub mod retry;
pub mod supervisor;
pub mod tokenizer;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use env::Environment;
/// Just a convenient re-export of the interactive command runner.
pub use interpreter::Interpreter;
