//! Shell - the per-line dispatcher
//!
//! The Shell owns the history and the pipeline composer and handles one
//! input line at a time:
//! 1. Record the raw line in history (builtins and parse failures included)
//! 2. Parse it into a pipeline
//! 3. Run a lone builtin in-process, or hand the pipeline to the composer

use crate::builtin::{self, Builtin};
use crate::command::{Command, Pipeline};
use crate::config::ShellConfig;
use crate::error::ShellError;
use crate::history::History;
use crate::pipeline::PipelineComposer;

use std::io::Write;

/// What the caller should do after a line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Keep reading; carries the line's status.
    Continue(i32),
    /// `exit` was run.
    Exit,
}

#[derive(Debug)]
pub struct Shell {
    history: History,
    composer: PipelineComposer,
    last_status: i32,
    verbose: bool,
}

impl Default for Shell {
    fn default() -> Self {
        Self::new(&ShellConfig::default())
    }
}

impl Shell {
    pub fn new(config: &ShellConfig) -> Self {
        Shell {
            history: History::new(config.history_capacity),
            composer: PipelineComposer::new(config.staging).verbose(config.verbose),
            last_status: 0,
            verbose: config.verbose,
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Status of the most recent non-blank line (0 before any).
    pub fn last_status(&self) -> i32 {
        self.last_status
    }

    /// Handle one raw line, reporting failures on stderr.
    ///
    /// Blank lines are ignored: not recorded, not executed.
    pub fn run_line(&mut self, line: &str, out: &mut dyn Write) -> Outcome {
        match self.execute_line(line, out) {
            Ok(Outcome::Continue(status)) => {
                self.last_status = status;
                Outcome::Continue(status)
            }
            Ok(Outcome::Exit) => Outcome::Exit,
            Err(err) => {
                eprintln!("bashlite: {}", err);
                self.last_status = err.status();
                Outcome::Continue(self.last_status)
            }
        }
    }

    /// Record, parse and dispatch one raw line.
    pub fn execute_line(&mut self, line: &str, out: &mut dyn Write) -> Result<Outcome, ShellError> {
        if line.trim().is_empty() {
            return Ok(Outcome::Continue(self.last_status));
        }
        self.history.record(line);
        match Pipeline::parse(line)? {
            Some(pipeline) => self.dispatch(&pipeline, out),
            None => Ok(Outcome::Continue(self.last_status)),
        }
    }

    /// Record `raw_line`, then run the already-parsed `pipeline`.
    pub fn handle(
        &mut self,
        pipeline: &Pipeline,
        raw_line: &str,
        out: &mut dyn Write,
    ) -> Result<Outcome, ShellError> {
        self.history.record(raw_line);
        self.dispatch(pipeline, out)
    }

    fn dispatch(&mut self, pipeline: &Pipeline, out: &mut dyn Write) -> Result<Outcome, ShellError> {
        if let Some(command) = pipeline.single() {
            if let Some(builtin) = Builtin::lookup(command.program()) {
                return self.run_builtin(builtin, command, out);
            }
        }
        // Anything the shell printed must land before the children's output
        out.flush()?;
        let status = self.composer.run(pipeline)?;
        Ok(Outcome::Continue(status))
    }

    fn run_builtin(
        &mut self,
        builtin: Builtin,
        command: &Command,
        out: &mut dyn Write,
    ) -> Result<Outcome, ShellError> {
        match builtin {
            Builtin::Cd => {
                let cwd = builtin::change_directory(command.args())?;
                if self.verbose {
                    eprintln!("[bashlite] cd: now in {}", cwd.display());
                }
                Ok(Outcome::Continue(0))
            }
            Builtin::Exit => Ok(Outcome::Exit),
            Builtin::History => {
                builtin::print_history(&self.history, out)?;
                Ok(Outcome::Continue(0))
            }
        }
    }
}
