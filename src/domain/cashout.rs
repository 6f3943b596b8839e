use crate::domain::account::Address;
use crate::domain::money::{BasisPoints, Mxn, Usd};
use serde::{Deserialize, Serialize};

/// A registered physical payout location.
///
/// Points accumulate claimable proceeds in `balance` (source-currency
/// reimbursement, net of their own fee) and lifetime destination-currency
/// volume in `total_processed`. Records are never deleted; `is_active` gates
/// eligibility instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashoutPoint {
    pub owner: Address,
    pub name: String,
    pub location: String,
    pub fee_pct: BasisPoints,
    pub total_processed: Mxn,
    pub balance: Usd,
    pub is_active: bool,
    pub is_verified: bool,
}

impl CashoutPoint {
    pub fn new(owner: Address, name: String, location: String, fee_pct: BasisPoints) -> Self {
        Self {
            owner,
            name,
            location,
            fee_pct,
            total_processed: Mxn::ZERO,
            balance: Usd::ZERO,
            is_active: true,
            is_verified: false,
        }
    }
}
