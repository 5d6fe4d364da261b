//! Shell configuration and command-line parsing
//!
//! There are no config files; everything comes from the command line.

use crate::history::{DEFAULT_CAPACITY, MAX_ENTRY_LEN};
use crate::pipeline::StagingMode;
use std::path::PathBuf;
use thiserror::Error;

/// Prompt printed before every interactive read.
pub const DEFAULT_PROMPT: &str = "$ ";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown option: {0}")]
    UnknownOption(String),
    #[error("option {0} requires a value")]
    MissingValue(&'static str),
    #[error("invalid history size: {0} (expected a positive integer)")]
    InvalidHistorySize(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub prompt: String,
    pub history_capacity: usize,
    /// Input lines longer than this many bytes are cut.
    pub max_line_len: usize,
    pub staging: StagingMode,
    pub verbose: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        ShellConfig {
            prompt: DEFAULT_PROMPT.to_string(),
            history_capacity: DEFAULT_CAPACITY,
            max_line_len: MAX_ENTRY_LEN,
            staging: StagingMode::default(),
            verbose: false,
        }
    }
}

/// What the process was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Read lines from stdin until `exit` or end of input.
    Interactive,
    /// `-c <line>`: run one line and exit with its status.
    Command(String),
    /// Read lines from a file, without prompting.
    Script(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub config: ShellConfig,
    pub mode: Mode,
    pub help: bool,
    pub version: bool,
}

/// Parse `args` (including the program name at index 0).
pub fn parse_args(args: &[String]) -> Result<CliArgs, ConfigError> {
    let mut cli = CliArgs {
        config: ShellConfig::default(),
        mode: Mode::Interactive,
        help: false,
        version: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" => {
                // Everything after -c is the line to run
                if i + 1 >= args.len() {
                    return Err(ConfigError::MissingValue("-c"));
                }
                cli.mode = Mode::Command(args[i + 1..].join(" "));
                break;
            }
            "--sequential" => cli.config.staging = StagingMode::Sequential,
            "-v" | "--verbose" => cli.config.verbose = true,
            "--history-size" => {
                let value = args
                    .get(i + 1)
                    .ok_or(ConfigError::MissingValue("--history-size"))?;
                cli.config.history_capacity = match value.parse::<usize>() {
                    Ok(n) if n > 0 => n,
                    _ => return Err(ConfigError::InvalidHistorySize(value.clone())),
                };
                i += 1;
            }
            "-h" | "--help" => cli.help = true,
            "-V" | "--version" => cli.version = true,
            flag if flag.starts_with('-') => {
                return Err(ConfigError::UnknownOption(flag.to_string()));
            }
            path => {
                cli.mode = Mode::Script(PathBuf::from(path));
                cli.config.prompt.clear();
            }
        }
        i += 1;
    }

    Ok(cli)
}
