//! Inbound/outbound adapters around the engine.

pub mod csv;
