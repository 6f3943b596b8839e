use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tlalix_engine::application::engine::{EngineConfig, RemittanceEngine};
use tlalix_engine::domain::account::Address;
use tlalix_engine::domain::money::{BasisPoints, ExchangeRate, Usd};
use tlalix_engine::domain::ports::Clock;
use tlalix_engine::infrastructure::in_memory::{
    InMemoryAliasStore, InMemoryCashoutStore, InMemoryProfileStore, InMemoryRemittanceStore,
};

pub const OWNER: &str = "admin";
pub const RATE: u64 = 1750;
pub const FEE_BPS: u32 = 150;
pub const EXPIRATION_SECS: u64 = 3_600;

/// A test clock the scenarios advance by hand.
#[derive(Clone, Default)]
pub struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub fn advance(&self, secs: u64) {
        self.0.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn addr(account: &str) -> Address {
    Address::from(account)
}

/// In-memory engine at 17.50 MXN/USD, 1.5% platform fee, 1h claim window.
pub fn engine() -> (Arc<RemittanceEngine>, ManualClock) {
    let clock = ManualClock::default();
    let engine = RemittanceEngine::new(
        Box::new(InMemoryProfileStore::new()),
        Box::new(InMemoryAliasStore::new()),
        Box::new(InMemoryRemittanceStore::new()),
        Box::new(InMemoryCashoutStore::new()),
        Box::new(clock.clone()),
        EngineConfig {
            owner: addr(OWNER),
            exchange_rate: ExchangeRate::new(RATE).unwrap(),
            platform_fee: BasisPoints::new(FEE_BPS).unwrap(),
            expiration_secs: EXPIRATION_SECS,
        },
    );
    (Arc::new(engine), clock)
}

pub async fn fund(engine: &RemittanceEngine, account: &str, micros: u128) {
    engine.deposit(&addr(account), Usd(micros)).await.unwrap();
}
