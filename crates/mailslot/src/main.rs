mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, resolve_level, LogFormat, LogLevel};

#[derive(Parser, Debug)]
#[command(name = "mailslot", version, about = "Single-slot message relay CLI")]
struct Cli {
    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level [default: info for serve, warn otherwise].
    #[arg(long, value_name = "LEVEL", env = "MAILSLOT_LOG", global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    let level = resolve_level(cli.log_level, matches!(cli.command, Command::Serve(_)));
    init_logging(cli.log_format, level);

    match cmd::run(cli.command) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
