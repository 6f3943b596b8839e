use crate::domain::account::Address;
use crate::domain::money::{Mxn, Quote, Usd};
use serde::{Deserialize, Serialize};

/// Lifecycle of a remittance.
///
/// `Claimed`, `Expired` and `Cancelled` are terminal; no transition leaves
/// them. Every transition site matches this enum exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemittanceStatus {
    Pending,
    Locked,
    ReadyForPickup,
    Claimed,
    Expired,
    Cancelled,
}

impl RemittanceStatus {
    pub fn is_terminal(self) -> bool {
        match self {
            Self::Pending | Self::Locked | Self::ReadyForPickup => false,
            Self::Claimed | Self::Expired | Self::Cancelled => true,
        }
    }
}

/// One remittance, keyed by its human-shareable code. Records are mutated in
/// place by status transitions and never deleted, so history stays queryable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remittance {
    pub code: String,
    pub sender: Address,
    pub recipient: Address,
    pub amount_usd: Usd,
    pub amount_mxn: Mxn,
    pub fee: Usd,
    /// Creation time, seconds.
    pub timestamp: u64,
    /// The alias string as the sender supplied it, kept for display even if
    /// the alias is later pointed elsewhere.
    pub recipient_alias: Option<String>,
    pub status: RemittanceStatus,
    /// Mirror of `status == Claimed`, kept for backward-compatible readers.
    pub is_claimed: bool,
    /// The cashout point (or direct recipient) that processed the payout.
    pub cashout_point: Option<Address>,
}

impl Remittance {
    pub fn new(
        code: String,
        sender: Address,
        recipient: Address,
        recipient_alias: Option<String>,
        amount_usd: Usd,
        quote: Quote,
        timestamp: u64,
    ) -> Self {
        Self {
            code,
            sender,
            recipient,
            amount_usd,
            amount_mxn: quote.amount_mxn,
            fee: quote.fee,
            timestamp,
            recipient_alias,
            status: RemittanceStatus::Pending,
            is_claimed: false,
            cashout_point: None,
        }
    }

    /// Principal minus the platform fee taken at creation. This is what a
    /// cancel or expiry reclaim refunds, and what a claim reimburses.
    pub fn net_usd(&self) -> Usd {
        self.amount_usd - self.fee
    }

    /// Whether the expiration window has passed at `now`.
    pub fn is_expired_at(&self, now: u64, expiration_secs: u64) -> bool {
        !self.status.is_terminal() && now >= self.timestamp.saturating_add(expiration_secs)
    }

    /// The status as observed at `now`: an over-age non-terminal record reads
    /// as `Expired` even before the transition is persisted by a reclaim.
    pub fn effective_status(&self, now: u64, expiration_secs: u64) -> RemittanceStatus {
        if self.is_expired_at(now, expiration_secs) {
            RemittanceStatus::Expired
        } else {
            self.status
        }
    }
}
