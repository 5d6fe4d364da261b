//! Commands and pipelines
//!
//! A [`Command`] is one argument vector (program name first). A [`Pipeline`]
//! is the ordered list of commands produced from one input line split on `|`.
//! There is no quoting, escaping or expansion; tokens are whitespace-separated
//! words.

use std::fmt;
use thiserror::Error;

/// Maximum number of tokens in a single command.
pub const MAX_ARGS: usize = 64;

/// Maximum number of commands in a single pipeline.
pub const MAX_STAGES: usize = 64;

/// The channel operator separating pipeline stages.
pub const PIPE_DELIMITER: char = '|';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("syntax error: empty command near `|'")]
    EmptyCommand,
    #[error("too many arguments (limit is {limit})")]
    TooManyArguments { limit: usize },
    #[error("too many commands in pipeline (limit is {limit})")]
    TooManyStages { limit: usize },
}

/// A single program invocation: program name followed by its arguments.
///
/// Never empty. Tokens are never empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    argv: Vec<String>,
}

impl Command {
    /// Build a command from its argument vector.
    pub fn new<I, S>(argv: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv
            .into_iter()
            .map(Into::into)
            .filter(|token| !token.is_empty())
            .collect();
        if argv.is_empty() {
            return Err(ParseError::EmptyCommand);
        }
        if argv.len() > MAX_ARGS {
            return Err(ParseError::TooManyArguments { limit: MAX_ARGS });
        }
        Ok(Command { argv })
    }

    /// Split one pipeline segment on whitespace.
    pub fn parse(segment: &str) -> Result<Self, ParseError> {
        Command::new(segment.split_whitespace())
    }

    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv.join(" "))
    }
}

/// An ordered chain of commands, length >= 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    commands: Vec<Command>,
}

impl Pipeline {
    pub fn new(commands: Vec<Command>) -> Result<Self, ParseError> {
        if commands.is_empty() {
            return Err(ParseError::EmptyCommand);
        }
        if commands.len() > MAX_STAGES {
            return Err(ParseError::TooManyStages { limit: MAX_STAGES });
        }
        Ok(Pipeline { commands })
    }

    /// Parse a raw input line.
    ///
    /// Returns `Ok(None)` for a line that is empty after trimming. Every
    /// `|`-separated segment must contain at least one word.
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        if line.trim().is_empty() {
            return Ok(None);
        }
        let commands = line
            .split(PIPE_DELIMITER)
            .map(Command::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Pipeline::new(commands).map(Some)
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Always false for a constructed pipeline.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The only command of a one-stage pipeline.
    pub fn single(&self) -> Option<&Command> {
        match self.commands.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stages: Vec<String> = self.commands.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", stages.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_command() {
        let pipeline = Pipeline::parse("ls -la /tmp").unwrap().unwrap();
        assert_eq!(pipeline.len(), 1);
        let cmd = pipeline.single().unwrap();
        assert_eq!(cmd.program(), "ls");
        assert_eq!(cmd.args(), ["-la", "/tmp"]);
    }

    #[test]
    fn parse_pipeline_splits_on_pipe() {
        let pipeline = Pipeline::parse("cat file |  grep foo\t| wc -l").unwrap().unwrap();
        let programs: Vec<&str> = pipeline.commands().iter().map(|c| c.program()).collect();
        assert_eq!(programs, ["cat", "grep", "wc"]);
        assert_eq!(pipeline.commands()[1].args(), ["foo"]);
        assert!(pipeline.single().is_none());
    }

    #[test]
    fn blank_line_is_not_a_pipeline() {
        assert_eq!(Pipeline::parse(""), Ok(None));
        assert_eq!(Pipeline::parse("   \t "), Ok(None));
    }

    #[test]
    fn empty_segment_is_rejected() {
        assert_eq!(Pipeline::parse("ls | | wc"), Err(ParseError::EmptyCommand));
        assert_eq!(Pipeline::parse("| wc"), Err(ParseError::EmptyCommand));
        assert_eq!(Pipeline::parse("ls |"), Err(ParseError::EmptyCommand));
    }

    #[test]
    fn argument_limit() {
        let line = vec!["x"; MAX_ARGS + 1].join(" ");
        assert_eq!(
            Pipeline::parse(&line),
            Err(ParseError::TooManyArguments { limit: MAX_ARGS })
        );
        let line = vec!["x"; MAX_ARGS].join(" ");
        assert!(Pipeline::parse(&line).unwrap().is_some());
    }

    #[test]
    fn stage_limit() {
        let line = vec!["true"; MAX_STAGES + 1].join("|");
        assert_eq!(
            Pipeline::parse(&line),
            Err(ParseError::TooManyStages { limit: MAX_STAGES })
        );
    }

    #[test]
    fn command_drops_empty_tokens() {
        let cmd = Command::new(["echo", "", "hi"]).unwrap();
        assert_eq!(cmd.argv(), ["echo", "hi"]);
        assert_eq!(Command::new(Vec::<String>::new()), Err(ParseError::EmptyCommand));
    }

    #[test]
    fn display_round_trips_spacing() {
        let pipeline = Pipeline::parse("printf  x|sort").unwrap().unwrap();
        assert_eq!(pipeline.to_string(), "printf x | sort");
    }
}
