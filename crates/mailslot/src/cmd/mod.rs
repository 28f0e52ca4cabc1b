use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod read;
pub mod send;
pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Host a relay registry on a Unix domain socket.
    Serve(ServeArgs),
    /// Send one message to a channel.
    Send(SendArgs),
    /// Read the pending message on a channel.
    Read(ReadArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command) -> CliResult<i32> {
    match command {
        Command::Serve(args) => serve::run(args),
        Command::Send(args) => send::run(args),
        Command::Read(args) => read::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Socket path to bind.
    pub path: PathBuf,
    /// Maximum number of device instances.
    #[arg(long, default_value_t = mailslot_core::DEFAULT_MAX_INSTANCES)]
    pub max_instances: u32,
    /// Slot capacity in bytes.
    #[arg(long, default_value_t = mailslot_core::DEFAULT_MESSAGE_CAPACITY)]
    pub capacity: usize,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Socket path of the relay to connect to.
    pub path: PathBuf,
    /// Channel id to send on (non-zero).
    pub channel: u64,
    /// Message to deposit (at most the slot capacity in bytes).
    pub message: String,
    /// Device instance to open.
    #[arg(long, short = 'i', default_value_t = 0)]
    pub instance: u32,
}

#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Socket path of the relay to connect to.
    pub path: PathBuf,
    /// Channel id to read from (non-zero).
    pub channel: u64,
    /// Device instance to open.
    #[arg(long, short = 'i', default_value_t = 0)]
    pub instance: u32,
    /// Receive buffer size in bytes; a pending message longer than this
    /// fails instead of truncating. Raise it when the relay was served
    /// with a larger --capacity.
    #[arg(long, default_value_t = mailslot_core::DEFAULT_MESSAGE_CAPACITY as u32)]
    pub max_len: u32,
    /// Output format.
    #[arg(long, value_enum, default_value = "raw")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Emit version information as JSON.
    #[arg(long)]
    pub json: bool,
}
