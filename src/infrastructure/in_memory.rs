use crate::domain::account::{Address, UserProfile};
use crate::domain::cashout::CashoutPoint;
use crate::domain::ports::{AliasStore, CashoutStore, ProfileStore, RemittanceStore};
use crate::domain::remittance::Remittance;
use crate::error::{EngineError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory profile store.
///
/// `Clone` shares the underlying map, so a store handed to the engine can
/// still be inspected from tests.
#[derive(Default, Clone)]
pub struct InMemoryProfileStore {
    profiles: Arc<RwLock<HashMap<Address, UserProfile>>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn store(&self, profile: UserProfile) -> Result<()> {
        let mut profiles = self.profiles.write().await;
        profiles.insert(profile.account.clone(), profile);
        Ok(())
    }

    async fn get(&self, account: &Address) -> Result<Option<UserProfile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(account).cloned())
    }

    async fn all(&self) -> Result<Vec<UserProfile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles.values().cloned().collect())
    }
}

/// In-memory alias bindings. The taken-check and the insert happen under one
/// write lock, which is what makes `bind` safe against concurrent callers.
#[derive(Default, Clone)]
pub struct InMemoryAliasStore {
    aliases: Arc<RwLock<HashMap<String, Address>>>,
}

impl InMemoryAliasStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AliasStore for InMemoryAliasStore {
    async fn bind(&self, alias: &str, account: &Address) -> Result<()> {
        let mut aliases = self.aliases.write().await;
        match aliases.get(alias) {
            Some(bound) if bound != account => Err(EngineError::AliasTaken),
            Some(_) => Ok(()),
            None => {
                aliases.insert(alias.to_string(), account.clone());
                Ok(())
            }
        }
    }

    async fn resolve(&self, alias: &str) -> Result<Option<Address>> {
        let aliases = self.aliases.read().await;
        Ok(aliases.get(alias).cloned())
    }
}

/// In-memory remittance store with a per-account code index so
/// `codes_for` stays a lookup rather than a scan.
#[derive(Default, Clone)]
pub struct InMemoryRemittanceStore {
    remittances: Arc<RwLock<HashMap<String, Remittance>>>,
    by_account: Arc<RwLock<HashMap<Address, Vec<String>>>>,
}

impl InMemoryRemittanceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RemittanceStore for InMemoryRemittanceStore {
    async fn insert(&self, remittance: Remittance) -> Result<()> {
        let mut remittances = self.remittances.write().await;
        if remittances.contains_key(&remittance.code) {
            return Err(EngineError::CodeTaken);
        }
        let mut by_account = self.by_account.write().await;
        by_account
            .entry(remittance.sender.clone())
            .or_default()
            .push(remittance.code.clone());
        if remittance.recipient != remittance.sender {
            by_account
                .entry(remittance.recipient.clone())
                .or_default()
                .push(remittance.code.clone());
        }
        remittances.insert(remittance.code.clone(), remittance);
        Ok(())
    }

    async fn store(&self, remittance: Remittance) -> Result<()> {
        let mut remittances = self.remittances.write().await;
        remittances.insert(remittance.code.clone(), remittance);
        Ok(())
    }

    async fn get(&self, code: &str) -> Result<Option<Remittance>> {
        let remittances = self.remittances.read().await;
        Ok(remittances.get(code).cloned())
    }

    async fn contains(&self, code: &str) -> Result<bool> {
        let remittances = self.remittances.read().await;
        Ok(remittances.contains_key(code))
    }

    async fn codes_for(&self, account: &Address) -> Result<Vec<String>> {
        let by_account = self.by_account.read().await;
        Ok(by_account.get(account).cloned().unwrap_or_default())
    }
}

/// A thread-safe in-memory cashout point store.
#[derive(Default, Clone)]
pub struct InMemoryCashoutStore {
    points: Arc<RwLock<HashMap<Address, CashoutPoint>>>,
}

impl InMemoryCashoutStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CashoutStore for InMemoryCashoutStore {
    async fn store(&self, point: CashoutPoint) -> Result<()> {
        let mut points = self.points.write().await;
        points.insert(point.owner.clone(), point);
        Ok(())
    }

    async fn get(&self, owner: &Address) -> Result<Option<CashoutPoint>> {
        let points = self.points.read().await;
        Ok(points.get(owner).cloned())
    }

    async fn all(&self) -> Result<Vec<CashoutPoint>> {
        let points = self.points.read().await;
        Ok(points.values().cloned().collect())
    }
}
