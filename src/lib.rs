//! bashlite - a minimal pipeline shell
//!
//! # Overview
//!
//! bashlite reads one line at a time, splits it on `|` into stages, splits
//! each stage on whitespace into an argument vector and runs the stages as
//! child processes connected by anonymous pipes. There is no quoting,
//! globbing, redirection or variable expansion.
//!
//! ```text
//! $ ls -l | grep rs | wc -l
//! $ cd /tmp
//! $ history
//! 1: ls -l | grep rs | wc -l
//! 2: cd /tmp
//! 3: history
//! $ exit
//! ```
//!
//! # Layout
//!
//! - [`command`]: turning a line into a [`Pipeline`] of [`Command`]s
//! - [`launcher`]: starting one program with its stdin/stdout wired to
//!   channel endpoints
//! - [`pipeline`]: composing stages and collecting the last stage's status
//! - [`history`]: the bounded command history
//! - [`builtin`]: `cd`, `exit` and `history`
//! - [`shell`]: the per-line dispatcher
//! - [`repl`]: the prompt/read/dispatch loop
//!
//! # Example
//!
//! ```rust
//! use bashlite::{Outcome, Shell};
//!
//! let mut shell = Shell::default();
//! let mut out = Vec::new();
//! assert_eq!(shell.run_line("true | false", &mut out), Outcome::Continue(1));
//! assert_eq!(shell.history().len(), 1);
//! ```

#[cfg(not(unix))]
compile_error!("bashlite only supports unix platforms");

pub mod builtin;
pub mod command;
pub mod config;
pub mod error;
pub mod history;
pub mod launcher;
pub mod pipeline;
pub mod repl;
pub mod shell;
pub mod signals;

// Re-export commonly used items
pub use command::{Command, ParseError, Pipeline};
pub use config::{ShellConfig, DEFAULT_PROMPT};
pub use error::ShellError;
pub use history::{History, HistoryEntry};
pub use launcher::{LaunchError, StreamEndpoint, Termination};
pub use pipeline::{PipelineComposer, StagingMode};
pub use shell::{Outcome, Shell};
