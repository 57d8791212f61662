//! Purpose: `canvasctl` CLI entry point.
//! Role: Binary crate root; parses args, runs one canvas operation, reports the result.
//! Invariants: Results go to stdout; diagnostics go to stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code` (usage errors exit 2).
//! Invariants: Unrecognized flags are dropped before parsing (see `args`).
#![allow(clippy::result_large_err)]
use std::path::PathBuf;

use clap::{
    Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint,
    error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use tracing_subscriber::EnvFilter;

mod args;
mod command_dispatch;
mod report;

use canvasctl::api::{Error, ErrorKind, ImportMode, to_exit_code};
use canvasctl::config::Settings;

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            eprintln!("{}", report::error_text(&err));
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    let settings = Settings::from_env();
    let mut command = Cli::command();
    command.build();
    let argv = args::retain_known_flags(&command, std::env::args_os());

    let cli = match Cli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint(clap_error_hint(&err)));
            }
        },
    };

    command_dispatch::dispatch_command(cli.command, cli.url, &settings)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "canvasctl",
    version,
    about = "Drive an Excalidraw-compatible canvas server over HTTP",
    long_about = None,
    after_help = r#"EXAMPLES
  $ canvasctl health
  $ canvasctl create --data '{"type":"rectangle","x":100,"y":100,"width":200,"height":80}'
  $ canvasctl export --out scene.json
  $ canvasctl import --in scene.json --mode sync
  $ canvasctl clear --url http://localhost:3000

ENVIRONMENT
  EXPRESS_SERVER_URL   Canvas server base URL (default: http://localhost:3000)
  RUST_LOG             Log filter for stderr diagnostics (default: warn)"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        help = "Canvas server base URL (default: $EXPRESS_SERVER_URL or http://localhost:3000)",
        value_hint = ValueHint::Url
    )]
    url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct PayloadArgs {
    #[arg(long, value_name = "JSON", help = "Element JSON given inline")]
    data: Option<String>,
    #[arg(
        long,
        value_name = "PATH",
        help = "Read element JSON from a file",
        value_hint = ValueHint::FilePath
    )]
    file: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ImportModeCli {
    /// Append to the elements already on the canvas
    Batch,
    /// Replace everything on the canvas
    Sync,
}

impl From<ImportModeCli> for ImportMode {
    fn from(mode: ImportModeCli) -> Self {
        match mode {
            ImportModeCli::Batch => ImportMode::Batch,
            ImportModeCli::Sync => ImportMode::Sync,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Check that the canvas server is reachable")]
    Health,
    #[command(about = "Remove every element from the canvas")]
    Clear,
    #[command(about = "Create one element from --data or --file")]
    Create {
        #[command(flatten)]
        payload: PayloadArgs,
    },
    #[command(about = "Print one element by id")]
    Get {
        #[arg(long, help = "Element id")]
        id: String,
    },
    #[command(about = "Replace fields of one element by id")]
    Update {
        #[arg(long, help = "Element id")]
        id: String,
        #[command(flatten)]
        payload: PayloadArgs,
    },
    #[command(about = "Delete one element by id")]
    Delete {
        #[arg(long, help = "Element id")]
        id: String,
    },
    #[command(about = "Import elements from a JSON file")]
    Import {
        #[arg(
            long = "in",
            value_name = "PATH",
            help = "JSON file holding an element array or {\"elements\": [...]}",
            value_hint = ValueHint::FilePath
        )]
        input: PathBuf,
        #[arg(long, value_enum, default_value = "batch", help = "Import mode")]
        mode: ImportModeCli,
    },
    #[command(about = "Export all elements as JSON")]
    Export {
        #[arg(
            long,
            value_name = "PATH",
            help = "Write {\"elements\": [...]} to a file instead of stdout",
            value_hint = ValueHint::FilePath
        )]
        out: Option<PathBuf>,
    },
    #[command(about = "Generate shell completions")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn clap_error_summary(err: &clap::Error) -> String {
    // Keep the first paragraph; missing-argument errors list the flags on following lines.
    let rendered = err.to_string();
    let parts: Vec<&str> = rendered
        .lines()
        .map(str::trim)
        .skip_while(|line| line.is_empty())
        .take_while(|line| !line.is_empty() && !line.starts_with("Usage:"))
        .collect();
    let Some(&first) = parts.first() else {
        return "invalid arguments".to_string();
    };
    let first = first.strip_prefix("error:").map(str::trim).unwrap_or(first);
    std::iter::once(first)
        .chain(parts.iter().skip(1).copied())
        .collect::<Vec<_>>()
        .join(" ")
}

fn clap_error_hint(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let usage = rendered
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: "))
        .map(str::trim);

    let Some(usage) = usage else {
        return "Try `canvasctl --help`.".to_string();
    };

    let tokens: Vec<&str> = usage.split_whitespace().collect();
    let subcommand = tokens
        .iter()
        .position(|token| *token == "canvasctl")
        .and_then(|pos| tokens.get(pos + 1))
        .filter(|token| !token.starts_with('-') && !token.starts_with('<') && !token.starts_with('['));

    match subcommand {
        Some(name) => format!("Usage: {usage}\nTry `canvasctl {name} --help`."),
        None => format!("Usage: {usage}\nTry `canvasctl --help`."),
    }
}
