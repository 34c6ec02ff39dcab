//! # Deployment File
//!
//! A JSON description of one vault: its address, the tokens it holds, the
//! withdrawal limits, initial deposits and the permission grants. Amounts
//! are decimal strings.
//!
//! ```json
//! {
//!   "vault": "0x00000000000000000000000000000000000007a0",
//!   "deployer": "0x00000000000000000000000000000000000000de",
//!   "start": "2026-01-01T00:00:00Z",
//!   "tokens": ["0x0000000000000000000000000000000000000070"],
//!   "limits": { "max_amount": "1000000000000000000", "waiting_period": 1296000 },
//!   "deposits": [{ "from": "0x…de", "token": "0x…70", "amount": "10000000000000000000" }],
//!   "permissions": [{ "selector": "0xd9caed12", "principal": "0x…91" }]
//! }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use warden_contracts::{ActionId, CallContext, Vault, VaultError, WithdrawalLimits};
use warden_protocol::abi::Selector;
use warden_protocol::clock::{Clock, ManualClock};
use warden_protocol::ledger::BalanceSheet;
use warden_protocol::Address;

/// Tokens moved into the vault at deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    /// Funder. Minted `amount` before the transfer.
    pub from: Address,
    /// Token deposited.
    pub token: Address,
    /// Amount in smallest units.
    #[serde(with = "warden_protocol::ledger::amount")]
    pub amount: u128,
}

/// One `(selector, principal, target)` permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// Operation granted.
    pub selector: Selector,
    /// Who may invoke it.
    pub principal: Address,
    /// Where. Defaults to the vault itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Address>,
}

/// A complete vault deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// The vault's own address.
    pub vault: Address,
    /// Who calls `init`.
    pub deployer: Address,
    /// Simulated creation time.
    #[serde(default = "default_start")]
    pub start: DateTime<Utc>,
    /// Tokens to report balances for.
    #[serde(default)]
    pub tokens: Vec<Address>,
    /// Withdrawal cap and cooldown.
    #[serde(default)]
    pub limits: WithdrawalLimits,
    /// Funding applied before `init`.
    #[serde(default)]
    pub deposits: Vec<Deposit>,
    /// Grants passed to `init`.
    #[serde(default)]
    pub permissions: Vec<Grant>,
}

fn default_start() -> DateTime<Utc> {
    Utc.timestamp_opt(0, 0).single().unwrap_or(DateTime::<Utc>::MIN_UTC)
}

impl Deployment {
    /// The deployment `warden init` writes: one token, a funded vault, a
    /// player allowed to withdraw and a sweeper allowed to sweep.
    pub fn sample() -> Self {
        let token = Address::from_low_u64_be(0x70);
        let deployer = Address::from_low_u64_be(0xde);
        Self {
            vault: Address::from_low_u64_be(0x7a0),
            deployer,
            start: Utc
                .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
                .single()
                .unwrap_or_else(default_start),
            tokens: vec![token],
            limits: WithdrawalLimits::default(),
            deposits: vec![Deposit {
                from: deployer,
                token,
                amount: 10_000_000_000_000_000_000,
            }],
            permissions: vec![
                Grant {
                    selector: Selector::WITHDRAW,
                    principal: Address::from_low_u64_be(0x91),
                    target: None,
                },
                Grant {
                    selector: Selector::SWEEP,
                    principal: Address::from_low_u64_be(0x5e),
                    target: None,
                },
            ],
        }
    }

    /// Reads and parses a deployment file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read deployment file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid deployment file {}", path.display()))
    }

    /// Writes the deployment as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json + "\n")
            .with_context(|| format!("failed to write deployment file {}", path.display()))
    }

    /// Action ids for every grant, with missing targets filled in.
    pub fn action_ids(&self) -> Vec<ActionId> {
        self.permissions
            .iter()
            .map(|g| ActionId::derive(g.selector, g.principal, g.target.unwrap_or(self.vault)))
            .collect()
    }

    /// Builds the vault on `clock`: create, fund, init.
    pub fn build(&self, clock: ManualClock) -> Result<Vault<BalanceSheet, ManualClock>, VaultError> {
        clock.set(self.start);
        tracing::info!(vault = %self.vault, start = %clock.now(), "deploying vault");

        let mut vault = Vault::new(self.vault, self.limits, BalanceSheet::new(), clock);
        for deposit in &self.deposits {
            vault
                .ledger_mut()
                .mint(deposit.token, deposit.from, deposit.amount)?;
            vault.deposit(deposit.from, deposit.token, deposit.amount)?;
        }
        vault.init(&CallContext::external(self.deployer), self.action_ids())?;
        Ok(vault)
    }
}
