use crate::domain::account::Address;
use crate::domain::money::{BasisPoints, ExchangeRate, Usd};
use serde::Serialize;

/// Default claim window: 7 days.
pub const DEFAULT_EXPIRATION_SECS: u64 = 7 * 24 * 60 * 60;

/// Process-wide engine state. Constructed explicitly with the administrator
/// account, initial rate and initial fee; there is no implicit default.
#[derive(Debug, Clone)]
pub struct PlatformState {
    /// `None` once ownership has been renounced.
    pub owner: Option<Address>,
    pub paused: bool,
    pub exchange_rate: ExchangeRate,
    pub platform_fee: BasisPoints,
    /// Accumulated platform fees awaiting withdrawal by the owner.
    pub platform_balance: Usd,
    pub total_remittances: u64,
    pub total_volume: Usd,
    pub expiration_secs: u64,
}

impl PlatformState {
    pub fn new(
        owner: Address,
        exchange_rate: ExchangeRate,
        platform_fee: BasisPoints,
        expiration_secs: u64,
    ) -> Self {
        Self {
            owner: Some(owner),
            paused: false,
            exchange_rate,
            platform_fee,
            platform_balance: Usd::ZERO,
            total_remittances: 0,
            total_volume: Usd::ZERO,
            expiration_secs,
        }
    }

    pub fn is_owner(&self, caller: &Address) -> bool {
        self.owner.as_ref() == Some(caller)
    }
}

/// Point-in-time platform totals exposed to read-only callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total_remittances: u64,
    pub total_volume: Usd,
    pub platform_balance: Usd,
    pub exchange_rate: ExchangeRate,
    pub platform_fee: BasisPoints,
}
