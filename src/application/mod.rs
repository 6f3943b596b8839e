//! Application layer: the `RemittanceEngine` orchestrating every operation
//! over the domain's storage ports, plus the keyed lock registry that gives
//! per-record linearizability.

pub mod engine;
pub mod locks;
