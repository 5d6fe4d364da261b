//! Builtin commands
//!
//! Builtins run inside the shell process. They are only recognised when
//! they are the sole command on a line: `history | cat` runs an external
//! program called `history`.

use crate::error::ShellError;
use crate::history::History;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Cd,
    Exit,
    History,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Builtin> {
        match name {
            "cd" => Some(Builtin::Cd),
            "exit" => Some(Builtin::Exit),
            "history" => Some(Builtin::History),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Cd => "cd",
            Builtin::Exit => "exit",
            Builtin::History => "history",
        }
    }
}

/// `cd <dir>`: change the shell's working directory.
///
/// Children spawned afterwards inherit the new directory. On failure the
/// working directory is left as it was.
pub fn change_directory(args: &[String]) -> Result<PathBuf, ShellError> {
    let target = args.first().ok_or(ShellError::MissingArgument {
        builtin: Builtin::Cd.name(),
        expected: "directory",
    })?;
    let path = Path::new(target);
    std::env::set_current_dir(path).map_err(|source| ShellError::ChangeDirectory {
        path: path.to_path_buf(),
        source,
    })?;
    std::env::current_dir().map_err(ShellError::Io)
}

/// `history`: one `<timestamp>: <command>` line per stored entry, oldest first.
pub fn print_history(history: &History, out: &mut dyn Write) -> Result<(), ShellError> {
    for entry in history.list() {
        writeln!(out, "{}", entry)?;
    }
    out.flush()?;
    Ok(())
}
