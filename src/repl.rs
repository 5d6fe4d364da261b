//! Read-eval loop
//!
//! Reads one line per prompt cycle from a [`LineSource`], hands it to the
//! [`Shell`] and only reads the next line once everything the previous one
//! started has finished.

use crate::config::ShellConfig;
use crate::history::{truncate, MAX_ENTRY_LEN};
use crate::shell::{Outcome, Shell};
use crate::signals;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, BufRead, Read, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReplError {
    #[error("line editor error: {0}")]
    Readline(#[from] ReadlineError),
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
}

/// Result of asking a source for the next line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// One line, without its terminator.
    Line(String),
    /// Ctrl-C while editing; the partial line is dropped.
    Interrupted,
    Eof,
}

/// Where input lines come from.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome, ReplError>;
}

/// Interactive terminal input with line editing.
pub struct EditorSource {
    editor: DefaultEditor,
}

impl EditorSource {
    pub fn new() -> Result<Self, ReplError> {
        Ok(EditorSource {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome, ReplError> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    // Up-arrow recall only; the `history` builtin is separate
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(ReadOutcome::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(err) => Err(err.into()),
        }
    }
}

/// Plain buffered input (pipes, files, tests). The prompt goes to `prompt_out`.
///
/// At most `max_line_len` bytes of a line are kept in memory; the rest of
/// an over-long line is skipped.
pub struct ReaderSource<R, W> {
    reader: R,
    prompt_out: W,
    max_line_len: usize,
}

impl<R: BufRead, W: Write> ReaderSource<R, W> {
    pub fn new(reader: R, prompt_out: W) -> Self {
        ReaderSource {
            reader,
            prompt_out,
            max_line_len: MAX_ENTRY_LEN,
        }
    }

    pub fn line_limit(mut self, max_line_len: usize) -> Self {
        self.max_line_len = max_line_len;
        self
    }

    /// Consume input up to and including the next newline.
    fn skip_rest_of_line(&mut self) -> io::Result<()> {
        loop {
            let available = self.reader.fill_buf()?;
            if available.is_empty() {
                return Ok(());
            }
            match available.iter().position(|&b| b == b'\n') {
                Some(i) => {
                    self.reader.consume(i + 1);
                    return Ok(());
                }
                None => {
                    let len = available.len();
                    self.reader.consume(len);
                }
            }
        }
    }
}

impl<R: BufRead, W: Write> LineSource for ReaderSource<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome, ReplError> {
        if !prompt.is_empty() {
            self.prompt_out.write_all(prompt.as_bytes())?;
        }
        self.prompt_out.flush()?;

        // One byte past the limit tells a full line from an over-long one
        let limit = self.max_line_len as u64 + 1;
        let mut buf = Vec::new();
        if (&mut self.reader).take(limit).read_until(b'\n', &mut buf)? == 0 {
            return Ok(ReadOutcome::Eof);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        } else if buf.len() as u64 == limit {
            buf.truncate(self.max_line_len);
            self.skip_rest_of_line()?;
        }
        Ok(ReadOutcome::Line(String::from_utf8_lossy(&buf).into_owned()))
    }
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEnd {
    /// The `exit` builtin ran.
    Exit,
    /// The source ran dry; carries the last line's status.
    EndOfInput(i32),
}

impl LoopEnd {
    pub fn status(self) -> i32 {
        match self {
            LoopEnd::Exit => 0,
            LoopEnd::EndOfInput(status) => status,
        }
    }
}

/// Run the prompt cycle until `exit` or end of input.
pub fn run<S: LineSource>(
    shell: &mut Shell,
    source: &mut S,
    config: &ShellConfig,
    out: &mut dyn Write,
) -> Result<LoopEnd, ReplError> {
    loop {
        let line = match source.read_line(&config.prompt)? {
            ReadOutcome::Line(line) => line,
            ReadOutcome::Interrupted => continue,
            ReadOutcome::Eof => return Ok(LoopEnd::EndOfInput(shell.last_status())),
        };

        let outcome = shell.run_line(truncate(&line, config.max_line_len), out);

        if signals::take_interrupt() {
            writeln!(out)?;
        }
        if outcome == Outcome::Exit {
            return Ok(LoopEnd::Exit);
        }
    }
}
