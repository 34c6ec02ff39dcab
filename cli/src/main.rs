// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Warden CLI
//!
//! Entry point for the `warden` binary. Parses CLI arguments, initializes
//! logging and runs one subcommand:
//!
//! - `init`: write a sample deployment file
//! - `action-id`: derive a permission id
//! - `encode`: build action data or `execute` calldata
//! - `inspect`: decode `execute` calldata and flag smuggling
//! - `simulate`: run a call script against a simulated vault
//! - `version`: print build version information

mod cli;
mod deployment;
mod inspect;
mod logging;
mod simulate;

use anyhow::{bail, Context, Result};
use clap::Parser;

use warden_contracts::{Action, ActionId, ExecuteCall, SweepArgs, WithdrawArgs};
use warden_protocol::Address;

use cli::{Commands, EncodeCommand, WardenCli};
use deployment::Deployment;
use logging::LogFormat;
use simulate::Script;

fn main() -> Result<()> {
    let cli = WardenCli::parse();
    logging::init_logging(&cli.log_level, LogFormat::from_str_lossy(&cli.log_format));

    match cli.command {
        Commands::Init(args) => init_deployment(args),
        Commands::ActionId(args) => {
            let id = ActionId::derive(args.selector, args.principal, args.target);
            println!("{id}");
            Ok(())
        }
        Commands::Encode(cmd) => {
            println!("0x{}", hex::encode(encode(cmd)));
            Ok(())
        }
        Commands::Inspect(args) => inspect_calldata(&args.calldata),
        Commands::Simulate(args) => run_simulation(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Writes the sample deployment, refusing to clobber an existing file.
fn init_deployment(args: cli::InitArgs) -> Result<()> {
    if args.out.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            args.out.display()
        );
    }
    let sample = Deployment::sample();
    sample.save(&args.out)?;
    tracing::info!(path = %args.out.display(), vault = %sample.vault, "deployment file written");
    println!("Deployment written to {}", args.out.display());
    Ok(())
}

/// Action data, or `execute` calldata when a target is given.
fn encode(cmd: EncodeCommand) -> Vec<u8> {
    let (action, target): (Action, Option<Address>) = match cmd {
        EncodeCommand::Withdraw(a) => (
            Action::Withdraw(WithdrawArgs {
                token: a.token,
                recipient: a.recipient,
                amount: a.amount,
            }),
            a.target,
        ),
        EncodeCommand::Sweep(a) => (
            Action::Sweep(SweepArgs {
                receiver: a.receiver,
                token: a.token,
            }),
            a.target,
        ),
    };
    let data = action.encode();
    match target {
        Some(target) => ExecuteCall::encode(target, &data).to_vec(),
        None => data.to_vec(),
    }
}

fn inspect_calldata(raw: &str) -> Result<()> {
    let calldata = simulate::decode_hex(raw).context("calldata is not valid hex")?;
    let report = inspect::inspect(&calldata).context("calldata does not decode as execute")?;
    if report.smuggling_suspected {
        tracing::warn!(
            offset = report.action_offset,
            decoded = %report.action.selector(),
            "envelope does not match the action it carries"
        );
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_simulation(args: cli::SimulateArgs) -> Result<()> {
    let deployment = Deployment::load(&args.config)?;
    let script = Script::load(&args.script)?;
    tracing::info!(
        config = %args.config.display(),
        steps = script.steps.len(),
        "running simulation"
    );
    let report = simulate::run(&deployment, &script)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_version() {
    println!("warden    {}", env!("CARGO_PKG_VERSION"));
    println!("protocol  {}", warden_protocol::config::PROTOCOL_VERSION);
    println!("rustc     {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
