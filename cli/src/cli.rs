//! # CLI Interface
//!
//! Defines the command-line argument structure for `warden` using `clap`
//! derive. Subcommands: `init`, `action-id`, `encode`, `inspect`,
//! `simulate` and `version`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use warden_protocol::abi::Selector;
use warden_protocol::ledger::amount;
use warden_protocol::Address;

/// Warden vault tooling.
///
/// Builds and inspects vault calldata, derives permission ids, and runs
/// scripted calls against a simulated vault.
#[derive(Parser, Debug)]
#[command(
    name = "warden",
    about = "Warden capability-gated vault tooling",
    version,
    propagate_version = true
)]
pub struct WardenCli {
    /// Default log filter, used when `RUST_LOG` is unset.
    #[arg(
        long,
        global = true,
        env = "WARDEN_LOG",
        default_value = crate::logging::DEFAULT_FILTER
    )]
    pub log_level: String,

    /// Log output format: `pretty` or `json`.
    #[arg(long, global = true, default_value = "pretty")]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the `warden` binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a sample deployment file.
    Init(InitArgs),
    /// Print the action id for a (selector, principal, target) triple.
    ActionId(ActionIdArgs),
    /// Encode action data, or full `execute` calldata with `--target`.
    #[command(subcommand)]
    Encode(EncodeCommand),
    /// Decode `execute` calldata and report what it would run.
    Inspect(InspectArgs),
    /// Run a call script against a vault built from a deployment file.
    Simulate(SimulateArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `init` subcommand.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Where to write the deployment file.
    #[arg(long, short = 'o', default_value = "warden.json")]
    pub out: PathBuf,

    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `action-id` subcommand.
#[derive(Args, Debug)]
pub struct ActionIdArgs {
    /// `withdraw`, `sweepFunds`, `execute`, or a 4-byte hex selector.
    #[arg(long, value_parser = parse_selector)]
    pub selector: Selector,

    /// Caller the permission is granted to.
    #[arg(long)]
    pub principal: Address,

    /// Contract the permission applies to.
    #[arg(long)]
    pub target: Address,
}

/// Actions `encode` can build.
#[derive(Subcommand, Debug)]
pub enum EncodeCommand {
    /// `withdraw(token, recipient, amount)`.
    Withdraw(EncodeWithdrawArgs),
    /// `sweepFunds(receiver, token)`.
    Sweep(EncodeSweepArgs),
}

/// Arguments for `encode withdraw`.
#[derive(Args, Debug)]
pub struct EncodeWithdrawArgs {
    /// Token to withdraw.
    #[arg(long)]
    pub token: Address,

    /// Who receives the tokens.
    #[arg(long)]
    pub recipient: Address,

    /// Amount in smallest units. Underscores allowed.
    #[arg(long, value_parser = amount::parse)]
    pub amount: u128,

    /// Wrap the action in `execute(target, data)` calldata.
    #[arg(long)]
    pub target: Option<Address>,
}

/// Arguments for `encode sweep`.
#[derive(Args, Debug)]
pub struct EncodeSweepArgs {
    /// Who receives the full balance.
    #[arg(long)]
    pub receiver: Address,

    /// Token to sweep.
    #[arg(long)]
    pub token: Address,

    /// Wrap the action in `execute(target, data)` calldata.
    #[arg(long)]
    pub target: Option<Address>,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// `execute` calldata as hex, with or without `0x`.
    pub calldata: String,
}

/// Arguments for the `simulate` subcommand.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Deployment file (JSON).
    #[arg(long, short = 'c', env = "WARDEN_CONFIG")]
    pub config: PathBuf,

    /// Call script (JSON).
    #[arg(long, short = 's')]
    pub script: PathBuf,
}

/// Accepts a function name or a hex selector.
pub fn parse_selector(s: &str) -> Result<Selector, String> {
    match s {
        "withdraw" => Ok(Selector::WITHDRAW),
        "sweep" | "sweepFunds" => Ok(Selector::SWEEP),
        "execute" => Ok(Selector::EXECUTE),
        other => other.parse(),
    }
}
