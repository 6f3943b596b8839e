//! Domain entities, value objects and storage ports of the settlement engine.

pub mod account;
pub mod cashout;
pub mod money;
pub mod platform;
pub mod ports;
pub mod remittance;
