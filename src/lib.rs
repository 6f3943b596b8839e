//! Settlement engine for a peer-to-peer USD→MXN cash remittance product:
//! alias registry, cashout-point registry, fixed-point fee/exchange
//! arithmetic and the remittance claim/cancel state machine, behind
//! storage-agnostic async ports.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
