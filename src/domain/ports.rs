use crate::domain::account::{Address, UserProfile};
use crate::domain::cashout::CashoutPoint;
use crate::domain::remittance::Remittance;
use crate::error::Result;
use async_trait::async_trait;

pub type ProfileStoreBox = Box<dyn ProfileStore>;
pub type AliasStoreBox = Box<dyn AliasStore>;
pub type RemittanceStoreBox = Box<dyn RemittanceStore>;
pub type CashoutStoreBox = Box<dyn CashoutStore>;
pub type ClockBox = Box<dyn Clock>;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn store(&self, profile: UserProfile) -> Result<()>;
    async fn get(&self, account: &Address) -> Result<Option<UserProfile>>;
    async fn all(&self) -> Result<Vec<UserProfile>>;
}

/// Alias bindings. `bind` is the atomic check-and-insert that makes alias
/// registration linearizable regardless of backend: once an alias maps to an
/// account it is never rebound to a different one.
#[async_trait]
pub trait AliasStore: Send + Sync {
    /// Binds `alias` to `account`. Idempotent for the same account; fails
    /// with `AliasTaken` if the alias is bound to a different account.
    async fn bind(&self, alias: &str, account: &Address) -> Result<()>;
    async fn resolve(&self, alias: &str) -> Result<Option<Address>>;
}

#[async_trait]
pub trait RemittanceStore: Send + Sync {
    /// Inserts a new record, failing with `CodeTaken` if the code has ever
    /// been used. The check and the insert are one atomic step.
    async fn insert(&self, remittance: Remittance) -> Result<()>;
    /// Overwrites an existing record after a status transition.
    async fn store(&self, remittance: Remittance) -> Result<()>;
    async fn get(&self, code: &str) -> Result<Option<Remittance>>;
    async fn contains(&self, code: &str) -> Result<bool>;
    /// Codes of remittances the account sent or receives.
    async fn codes_for(&self, account: &Address) -> Result<Vec<String>>;
}

#[async_trait]
pub trait CashoutStore: Send + Sync {
    async fn store(&self, point: CashoutPoint) -> Result<()>;
    async fn get(&self, owner: &Address) -> Result<Option<CashoutPoint>>;
    async fn all(&self) -> Result<Vec<CashoutPoint>>;
}

/// Time source. Every operation captures the clock exactly once so a record
/// cannot flip between fresh and expired mid-call.
pub trait Clock: Send + Sync {
    /// Seconds since an arbitrary epoch.
    fn now(&self) -> u64;
}

/// Wall-clock seconds since the Unix epoch.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}
