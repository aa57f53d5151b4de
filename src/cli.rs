use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
pub struct Args {
    /// Credentials file, written by `login` and read by everything else.
    #[clap(long, env = "SUNPOLL_CONFIG", default_value = "sunpoll.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Request a passcode over SMS, verify it, and store the credentials.
    Login(LoginArgs),

    /// Fetch one snapshot and render it.
    Snapshot,

    /// Poll the gateway on a fixed interval.
    Poll(PollArgs),

    /// Check whether the stored credentials are still accepted.
    Check,

    /// Raw endpoint access for troubleshooting.
    Debug(DebugArgs),
}

#[derive(Parser)]
pub struct LoginArgs {
    /// Phone number on the Sunrun account, for example `+15551234567`.
    /// Falls back to the one stored in the credentials file.
    #[clap(long, env = "SUNPOLL_PHONE")]
    pub phone: Option<String>,
}

#[derive(Parser)]
pub struct PollArgs {
    /// Polling period in seconds. The gateway data refreshes slowly, so
    /// there is little point in going below the default.
    #[clap(long = "interval-secs", env = "SUNPOLL_INTERVAL_SECS", default_value = "3600")]
    pub interval_secs: u64,
}

#[derive(Parser)]
pub struct DebugArgs {
    #[command(subcommand)]
    pub command: DebugCommand,
}

#[derive(Subcommand)]
pub enum DebugCommand {
    /// Dump the daily cumulative-production records for the last 30 days.
    Cumulative,

    /// Dump today's minute-resolution telemetry.
    Minute,

    /// Dump the product offerings.
    Offerings,
}
