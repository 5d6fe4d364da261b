//! Errors surfaced while handling one input line
//!
//! None of these end the shell; the loop reports them and reads the next
//! line.

use crate::command::ParseError;
use crate::launcher::LaunchError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error("{builtin}: missing {expected} argument")]
    MissingArgument {
        builtin: &'static str,
        expected: &'static str,
    },
    #[error("cd: {}: {}", .path.display(), .source)]
    ChangeDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ShellError {
    /// Status recorded for the line that failed.
    pub fn status(&self) -> i32 {
        match self {
            ShellError::Parse(_) => 2,
            _ => 1,
        }
    }
}
