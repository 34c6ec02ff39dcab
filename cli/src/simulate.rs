//! # Scripted Simulation
//!
//! Builds a vault from a [`Deployment`] on a [`ManualClock`] and feeds it a
//! list of raw `execute` calls. Each step first advances the clock, then
//! hands the calldata to the vault exactly as an external caller would.
//! Vault errors are outcomes, not failures of the simulation.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use warden_contracts::{CallContext, VaultError, VaultEvent};
use warden_protocol::clock::{Clock, ManualClock};
use warden_protocol::ledger::BalanceEntry;
use warden_protocol::Address;

use crate::deployment::Deployment;

/// One scripted call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Optional name shown in the report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Seconds to move the clock forward before the call.
    #[serde(default)]
    pub advance_secs: u64,
    /// Authenticated caller.
    pub caller: Address,
    /// `execute` calldata, hex.
    pub calldata: String,
}

/// A call script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// Calls, in order.
    pub steps: Vec<Step>,
}

impl Script {
    /// Reads and parses a script file.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("invalid script {}", path.display()))
    }
}

/// What one step did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    /// Zero-based step index.
    pub step: usize,
    /// The step's label, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Simulated time of the call.
    pub at: DateTime<Utc>,
    /// Who called.
    pub caller: Address,
    /// Whether the call succeeded.
    pub ok: bool,
    /// Error tag of the outermost error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    /// Error tag of the innermost error, when it differs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<&'static str>,
    /// Full error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StepOutcome {
    fn new(step: usize, label: Option<String>, at: DateTime<Utc>, caller: Address) -> Self {
        Self {
            step,
            label,
            at,
            caller,
            ok: true,
            error: None,
            cause: None,
            message: None,
        }
    }

    fn failed(mut self, err: &VaultError) -> Self {
        let root = err.root_cause();
        self.ok = false;
        self.error = Some(err.kind());
        if !std::ptr::eq(root, err) {
            self.cause = Some(root.kind());
        }
        self.message = Some(err.to_string());
        self
    }
}

/// Everything the simulation produced.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// The vault's address.
    pub vault: Address,
    /// Per-step outcomes.
    pub outcomes: Vec<StepOutcome>,
    /// Vault balance of every listed token.
    pub vault_balances: Vec<BalanceEntry>,
    /// All non-zero balances.
    pub balances: Vec<BalanceEntry>,
    /// Last successful withdrawal (creation time if none).
    pub last_withdrawal: DateTime<Utc>,
    /// The vault's event log.
    pub events: Vec<VaultEvent>,
}

/// Runs `script` against a fresh vault built from `deployment`.
pub fn run(deployment: &Deployment, script: &Script) -> Result<Report> {
    let clock = ManualClock::new(deployment.start);
    let mut vault = deployment
        .build(clock.clone())
        .context("failed to deploy vault")?;

    let mut outcomes = Vec::with_capacity(script.steps.len());
    for (index, step) in script.steps.iter().enumerate() {
        i64::try_from(step.advance_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|by| clock.advance(by))
            .with_context(|| format!("step {index}: advance_secs out of range"))?;

        let calldata = decode_hex(&step.calldata)
            .with_context(|| format!("step {index}: calldata is not valid hex"))?;
        let outcome = StepOutcome::new(index, step.label.clone(), clock.now(), step.caller);
        let outcome = match vault.handle_calldata(&CallContext::external(step.caller), &calldata) {
            Ok(_) => outcome,
            Err(err) => outcome.failed(&err),
        };
        tracing::info!(step = index, ok = outcome.ok, error = ?outcome.error, "step done");
        outcomes.push(outcome);
    }

    let vault_balances = deployment
        .tokens
        .iter()
        .map(|token| BalanceEntry {
            token: *token,
            holder: vault.address(),
            amount: vault.balance(*token),
        })
        .collect();

    Ok(Report {
        vault: vault.address(),
        outcomes,
        vault_balances,
        balances: vault.ledger().entries(),
        last_withdrawal: vault.last_withdrawal_timestamp(),
        events: vault.events().to_vec(),
    })
}

/// Decodes hex with or without a `0x` prefix.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let s = s.trim();
    hex::decode(s.strip_prefix("0x").unwrap_or(s))
}
