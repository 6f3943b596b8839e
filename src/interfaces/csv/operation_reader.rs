use crate::domain::account::{Address, Recipient};
use crate::error::{EngineError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Deposit,
    RegisterAlias,
    RegisterPoint,
    Create,
    Lock,
    Ready,
    Claim,
    Cancel,
    Reclaim,
    WithdrawPoint,
}

/// One row of an operation file: `op, account, arg1, arg2, arg3, amount`.
///
/// The positional args depend on the op (alias, recipient, code, point name,
/// location, fee bps); `amount` is a human decimal converted to micros by
/// the driver.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Operation {
    pub op: OpKind,
    pub account: String,
    pub arg1: Option<String>,
    pub arg2: Option<String>,
    pub arg3: Option<String>,
    pub amount: Option<Decimal>,
}

/// A recipient column prefixed with `addr:` addresses an account directly;
/// anything else is treated as an alias.
pub fn parse_recipient(value: &str) -> Recipient {
    match value.strip_prefix("addr:") {
        Some(account) => Recipient::ByAccount(Address::from(account)),
        None => Recipient::ByAlias(value.to_string()),
    }
}

/// Reads operations from a CSV source.
///
/// Wraps `csv::Reader` and yields `Result<Operation>` lazily, so large files
/// stream without loading everything into memory. Whitespace is trimmed and
/// short records are tolerated.
pub struct OperationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OperationReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn operations(self) -> impl Iterator<Item = Result<Operation>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(EngineError::from))
    }
}
