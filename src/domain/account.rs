use crate::domain::money::{Mxn, Usd};
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const ALIAS_MIN_LEN: usize = 3;
pub const ALIAS_MAX_LEN: usize = 32;

/// An opaque account address. The engine never inspects its contents beyond
/// equality and ordering (ordering is used for deterministic lock order).
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Address(pub String);

impl Address {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(addr: &str) -> Self {
        Self(addr.to_string())
    }
}

/// How a sender addresses the recipient of a remittance.
///
/// An alias is resolved to a concrete account exactly once, at creation time,
/// and never re-resolved afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    ByAlias(String),
    ByAccount(Address),
}

/// Checks the alias character and length policy: lowercase ascii letters,
/// digits and underscore, between 3 and 32 characters.
pub fn validate_alias(alias: &str) -> Result<()> {
    if alias.len() < ALIAS_MIN_LEN || alias.len() > ALIAS_MAX_LEN {
        return Err(EngineError::InvalidAlias(alias.to_string()));
    }
    if !alias
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
    {
        return Err(EngineError::InvalidAlias(alias.to_string()));
    }
    Ok(())
}

/// Per-account profile: available balance, alias, and lifetime accumulators.
///
/// Created lazily on first deposit, alias registration or remittance; never
/// deleted. `total_sent`, `total_received` and `remittance_count` only grow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub account: Address,
    pub username: Option<String>,
    pub balance: Usd,
    pub total_sent: Usd,
    pub total_received: Mxn,
    pub remittance_count: u64,
    pub is_registered: bool,
    pub is_verified: bool,
}

impl UserProfile {
    pub fn new(account: Address) -> Self {
        Self {
            account,
            username: None,
            balance: Usd::ZERO,
            total_sent: Usd::ZERO,
            total_received: Mxn::ZERO,
            remittance_count: 0,
            is_registered: false,
            is_verified: false,
        }
    }

    /// Credits the available balance.
    pub fn credit(&mut self, amount: Usd) {
        self.balance += amount;
    }

    /// Debits the available balance if sufficient.
    pub fn debit(&mut self, amount: Usd) -> Result<()> {
        if self.balance >= amount {
            self.balance -= amount;
            Ok(())
        } else {
            Err(EngineError::InsufficientBalance)
        }
    }
}
