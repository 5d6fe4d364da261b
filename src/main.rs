//! bashlite - a minimal pipeline shell
//!
//! Usage:
//!   bashlite              Start the interactive loop
//!   bashlite -c "cmd"     Execute a single line
//!   bashlite script.sh    Execute lines from a file

use bashlite::config::{parse_args, Mode, ShellConfig};
use bashlite::repl::{self, EditorSource, LineSource, ReaderSource, ReplError};
use bashlite::{signals, Outcome, Shell};
use std::env;
use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::Path;
use std::process::ExitCode;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_help() {
    println!(
        r#"bashlite {} - a minimal pipeline shell

USAGE:
    bashlite [OPTIONS]                 Start the interactive loop on stdin
    bashlite [OPTIONS] <script>        Execute lines from a file
    bashlite [OPTIONS] -c <command>    Execute a single line

OPTIONS:
    --sequential            Run pipeline stages one after another instead of
                            all at once (output between stages must fit in
                            the pipe buffer)
    --history-size <N>      Number of commands kept by `history` (default 10)
    -v, --verbose           Trace pipeline stages on stderr
    -h, --help              Show this help message
    -V, --version           Show version

SYNTAX:
    cmd arg ...             Run a program found on PATH
    cmd1 | cmd2 | ...       Connect stdout of each stage to stdin of the next

BUILTINS (only when alone on a line):
    cd <dir>                Change the working directory
    history                 List recent commands as `<n>: <line>`
    exit                    Leave the shell
"#,
        VERSION
    );
}

fn print_version() {
    println!("bashlite {}", VERSION);
}

/// Clamp a shell status into a process exit code
fn exit_code(status: i32) -> ExitCode {
    ExitCode::from((status & 0xff) as u8)
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("bashlite: {}", e);
            eprintln!("Try 'bashlite --help' for more information.");
            return ExitCode::from(2);
        }
    };

    if cli.help {
        print_help();
        return ExitCode::SUCCESS;
    }

    if cli.version {
        print_version();
        return ExitCode::SUCCESS;
    }

    if let Err(e) = signals::setup_signal_handlers() {
        eprintln!("bashlite: failed to install SIGINT handler: {}", e);
    }

    let mut shell = Shell::new(&cli.config);

    match cli.mode {
        Mode::Command(line) => execute_command(&mut shell, &line),
        Mode::Script(path) => execute_script(&mut shell, &path, &cli.config),
        Mode::Interactive => run_interactive(&mut shell, &cli.config),
    }
}

/// Execute a single line and exit with its status
fn execute_command(shell: &mut Shell, line: &str) -> ExitCode {
    match shell.run_line(line, &mut io::stdout()) {
        Outcome::Exit => ExitCode::SUCCESS,
        Outcome::Continue(status) => exit_code(status),
    }
}

/// Execute a script file line by line, without prompting
fn execute_script(shell: &mut Shell, path: &Path, config: &ShellConfig) -> ExitCode {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("bashlite: {}: {}", path.display(), e);
            return exit_code(127);
        }
    };
    let mut source =
        ReaderSource::new(BufReader::new(file), io::sink()).line_limit(config.max_line_len);
    run_loop(shell, &mut source, config)
}

/// Line editor on a terminal, plain reader otherwise
fn run_interactive(shell: &mut Shell, config: &ShellConfig) -> ExitCode {
    if io::stdin().is_terminal() {
        match EditorSource::new() {
            Ok(mut source) => return run_loop(shell, &mut source, config),
            Err(e) => eprintln!("bashlite: {}; falling back to plain input", e),
        }
    }
    let stdin = io::stdin();
    let mut source = ReaderSource::new(stdin.lock(), io::stdout()).line_limit(config.max_line_len);
    run_loop(shell, &mut source, config)
}

fn run_loop<S: LineSource>(shell: &mut Shell, source: &mut S, config: &ShellConfig) -> ExitCode {
    match repl::run(shell, source, config, &mut io::stdout()) {
        Ok(end) => exit_code(end.status()),
        Err(e) => report_fatal(e),
    }
}

fn report_fatal(e: ReplError) -> ExitCode {
    eprintln!("bashlite: {}", e);
    ExitCode::FAILURE
}
