use crate::error::{EngineError, Result};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Implied decimals of source-currency (USD) amounts.
pub const USD_DECIMALS: u32 = 6;
/// Implied decimals of destination-currency (MXN) amounts.
pub const MXN_DECIMALS: u32 = 2;
/// Implied decimals of the exchange rate (MXN per USD).
pub const RATE_DECIMALS: u32 = 2;
/// Basis-point denominator: 10000 == 100%.
pub const BPS_DENOMINATOR: u128 = 10_000;

const USD_UNIT: u128 = 1_000_000;

/// A source-currency amount in micros (6 implied decimals).
///
/// All engine arithmetic is integer fixed-point with floor division; the
/// `Decimal` conversions exist only for the parsing/formatting boundary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Usd(pub u128);

/// A destination-currency amount in centavos (2 implied decimals).
///
/// This is the canonical convention for every producer and consumer of MXN
/// values: `net_micros * rate_centi / 10^6` lands directly on centavos.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Mxn(pub u128);

impl Usd {
    pub const ZERO: Self = Self(0);

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Converts a human-entered decimal amount (e.g. `100.50`) to micros,
    /// truncating any digits beyond the sixth decimal place.
    pub fn from_decimal(value: Decimal) -> Result<Self> {
        if value.is_sign_negative() {
            return Err(EngineError::InvalidAmount);
        }
        let micros = value
            .checked_mul(Decimal::from(USD_UNIT as u64))
            .ok_or(EngineError::InvalidAmount)?
            .trunc();
        micros.to_u128().map(Self).ok_or(EngineError::InvalidAmount)
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::from_i128_with_scale(self.0 as i128, USD_DECIMALS)
    }
}

impl Mxn {
    pub const ZERO: Self = Self(0);

    pub fn to_decimal(self) -> Decimal {
        Decimal::from_i128_with_scale(self.0 as i128, MXN_DECIMALS)
    }
}

impl fmt::Display for Usd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl fmt::Display for Mxn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl Add for Usd {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Usd {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Usd {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Usd {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl AddAssign for Mxn {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

/// Exchange rate in destination-per-source with 2 implied decimals
/// (1750 == 17.50 MXN per USD). Zero rates are rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate(u64);

impl ExchangeRate {
    pub fn new(centi: u64) -> Result<Self> {
        if centi == 0 {
            return Err(EngineError::InvalidRate);
        }
        Ok(Self(centi))
    }

    pub fn centi(self) -> u64 {
        self.0
    }
}

/// A fee expressed in basis points, validated to at most 10000 (100%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BasisPoints(u32);

impl BasisPoints {
    pub fn new(bps: u32) -> Result<Self> {
        if bps as u128 > BPS_DENOMINATOR {
            return Err(EngineError::InvalidFee);
        }
        Ok(Self(bps))
    }

    pub fn bps(self) -> u32 {
        self.0
    }

    /// Floor share of `amount` at this fee rate.
    pub fn of(self, amount: Usd) -> Usd {
        Usd(amount.0 * self.0 as u128 / BPS_DENOMINATOR)
    }
}

/// The result of pricing a remittance at the current rate and platform fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub net_usd: Usd,
    pub amount_mxn: Mxn,
    pub fee: Usd,
}

/// Prices `amount` at `rate` after taking the platform fee.
///
/// Decimal reconciliation: micros (6dp) times a centi rate (2dp) carries 8
/// implied decimals; dividing by 10^6 yields centavos (2dp). A zero amount
/// prices to an all-zero quote.
pub fn quote(amount: Usd, rate: ExchangeRate, fee_pct: BasisPoints) -> Result<Quote> {
    if rate.0 == 0 {
        return Err(EngineError::InvalidRate);
    }
    let fee = fee_pct.of(amount);
    let net_usd = amount - fee;
    let amount_mxn = Mxn(net_usd.0 * rate.0 as u128 / USD_UNIT);
    Ok(Quote {
        net_usd,
        amount_mxn,
        fee,
    })
}
