use crate::application::locks::{LockRegistry, account_key, code_key};
use crate::domain::account::{Address, Recipient, UserProfile, validate_alias};
use crate::domain::cashout::CashoutPoint;
use crate::domain::money::{BasisPoints, ExchangeRate, Quote, Usd, quote};
use crate::domain::platform::{PlatformState, Stats};
use crate::domain::ports::{
    AliasStoreBox, CashoutStoreBox, ClockBox, ProfileStoreBox, RemittanceStoreBox,
};
use crate::domain::remittance::{Remittance, RemittanceStatus};
use crate::error::{EngineError, Result};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Explicit initialization parameters: administrator account, initial rate,
/// initial fee and claim window.
pub struct EngineConfig {
    pub owner: Address,
    pub exchange_rate: ExchangeRate,
    pub platform_fee: BasisPoints,
    pub expiration_secs: u64,
}

/// The remittance settlement engine.
///
/// Owns the storage ports and the process-wide platform state, and is the
/// single entry point for every operation. Methods take `&self`; share the
/// engine across tasks with an `Arc`. Per-record linearizability comes from
/// the keyed lock registry: the remittance code is locked first, then the
/// accounts an operation touches, in sorted order.
pub struct RemittanceEngine {
    profiles: ProfileStoreBox,
    aliases: AliasStoreBox,
    remittances: RemittanceStoreBox,
    cashouts: CashoutStoreBox,
    clock: ClockBox,
    platform: RwLock<PlatformState>,
    locks: LockRegistry,
}

impl RemittanceEngine {
    pub fn new(
        profiles: ProfileStoreBox,
        aliases: AliasStoreBox,
        remittances: RemittanceStoreBox,
        cashouts: CashoutStoreBox,
        clock: ClockBox,
        config: EngineConfig,
    ) -> Self {
        Self {
            profiles,
            aliases,
            remittances,
            cashouts,
            clock,
            platform: RwLock::new(PlatformState::new(
                config.owner,
                config.exchange_rate,
                config.platform_fee,
                config.expiration_secs,
            )),
            locks: LockRegistry::new(),
        }
    }

    // Pause state is snapshot once per call; a toggle that lands mid-call
    // applies to the next call.
    async fn ensure_not_paused(&self) -> Result<()> {
        if self.platform.read().await.paused {
            Err(EngineError::Paused)
        } else {
            Ok(())
        }
    }

    async fn ensure_owner(&self, caller: &Address) -> Result<()> {
        if self.platform.read().await.is_owner(caller) {
            Ok(())
        } else {
            Err(EngineError::NotAuthorized)
        }
    }

    async fn profile_or_new(&self, account: &Address) -> Result<UserProfile> {
        Ok(self
            .profiles
            .get(account)
            .await?
            .unwrap_or_else(|| UserProfile::new(account.clone())))
    }

    // ---- identity registry ----

    /// Funds an account's available balance from outside the engine.
    pub async fn deposit(&self, account: &Address, amount: Usd) -> Result<()> {
        self.ensure_not_paused().await?;
        if amount.is_zero() {
            return Err(EngineError::InvalidAmount);
        }
        let _guard = self.locks.acquire(&account_key(account)).await;
        let mut profile = self.profile_or_new(account).await?;
        profile.credit(amount);
        self.profiles.store(profile).await?;
        debug!(account = %account, amount = %amount, "deposit");
        Ok(())
    }

    /// Binds `alias` to the caller. Idempotent for the same caller; an alias
    /// bound to a different account is never rebound.
    pub async fn register_alias(&self, caller: &Address, alias: &str) -> Result<()> {
        self.ensure_not_paused().await?;
        validate_alias(alias)?;
        self.aliases.bind(alias, caller).await?;
        let _guard = self.locks.acquire(&account_key(caller)).await;
        let mut profile = self.profile_or_new(caller).await?;
        profile.username = Some(alias.to_string());
        profile.is_registered = true;
        self.profiles.store(profile).await?;
        info!(alias, account = %caller, "alias registered");
        Ok(())
    }

    /// Owner-set monotonic trust flag; there is no un-verify path.
    pub async fn verify_user(&self, caller: &Address, account: &Address) -> Result<()> {
        self.ensure_owner(caller).await?;
        let _guard = self.locks.acquire(&account_key(account)).await;
        let mut profile = self.profile_or_new(account).await?;
        profile.is_verified = true;
        self.profiles.store(profile).await?;
        Ok(())
    }

    // ---- cashout point registry ----

    /// Registers the caller as a cashout point, or updates name, location
    /// and fee on re-registration. Balance and flags are preserved.
    pub async fn register_cashout_point(
        &self,
        caller: &Address,
        name: String,
        location: String,
        fee_bps: u32,
    ) -> Result<()> {
        self.ensure_not_paused().await?;
        let fee_pct = BasisPoints::new(fee_bps)?;
        let _guard = self.locks.acquire(&account_key(caller)).await;
        let point = match self.cashouts.get(caller).await? {
            Some(mut existing) => {
                existing.name = name;
                existing.location = location;
                existing.fee_pct = fee_pct;
                existing
            }
            None => CashoutPoint::new(caller.clone(), name, location, fee_pct),
        };
        self.cashouts.store(point).await?;
        info!(owner = %caller, "cashout point registered");
        Ok(())
    }

    /// Toggled by the point's owner or the platform owner.
    pub async fn set_cashout_active(
        &self,
        caller: &Address,
        point_owner: &Address,
        active: bool,
    ) -> Result<()> {
        self.ensure_not_paused().await?;
        let _guard = self.locks.acquire(&account_key(point_owner)).await;
        let mut point = self
            .cashouts
            .get(point_owner)
            .await?
            .ok_or(EngineError::NotFound)?;
        let is_admin = self.platform.read().await.is_owner(caller);
        if caller != &point.owner && !is_admin {
            return Err(EngineError::NotAuthorized);
        }
        point.is_active = active;
        self.cashouts.store(point).await?;
        Ok(())
    }

    pub async fn verify_cashout_point(&self, caller: &Address, point_owner: &Address) -> Result<()> {
        self.ensure_owner(caller).await?;
        let _guard = self.locks.acquire(&account_key(point_owner)).await;
        let mut point = self
            .cashouts
            .get(point_owner)
            .await?
            .ok_or(EngineError::NotFound)?;
        point.is_verified = true;
        self.cashouts.store(point).await?;
        Ok(())
    }

    /// Pays out the point's accumulated balance externally and zeros it.
    pub async fn withdraw_point_balance(&self, caller: &Address) -> Result<Usd> {
        self.ensure_not_paused().await?;
        let _guard = self.locks.acquire(&account_key(caller)).await;
        let mut point = self
            .cashouts
            .get(caller)
            .await?
            .ok_or(EngineError::NotFound)?;
        if point.balance.is_zero() {
            return Err(EngineError::NothingToWithdraw);
        }
        let amount = point.balance;
        point.balance = Usd::ZERO;
        self.cashouts.store(point).await?;
        info!(owner = %caller, amount = %amount, "cashout point balance withdrawn");
        Ok(amount)
    }

    // ---- remittance ledger ----

    /// Creates a remittance: resolves the recipient, prices the amount at
    /// the current rate and fee, debits the sender and persists the record
    /// as `Pending` — all under the code and sender locks, so either every
    /// effect lands or none does.
    pub async fn create_remittance(
        &self,
        sender: &Address,
        amount: Usd,
        recipient: Recipient,
        code: &str,
    ) -> Result<Remittance> {
        self.ensure_not_paused().await?;
        if amount.is_zero() {
            return Err(EngineError::InvalidAmount);
        }
        let (recipient, recipient_alias) = match recipient {
            Recipient::ByAccount(account) => (account, None),
            // An alias that does not resolve rejects the call. The historic
            // behavior of falling back to the sender's own account is a bug,
            // not a policy.
            Recipient::ByAlias(alias) => (
                self.aliases
                    .resolve(&alias)
                    .await?
                    .ok_or(EngineError::RecipientNotFound)?,
                Some(alias),
            ),
        };
        let (rate, fee_pct) = {
            let platform = self.platform.read().await;
            (platform.exchange_rate, platform.platform_fee)
        };
        let priced = quote(amount, rate, fee_pct)?;

        let _code_guard = self.locks.acquire(&code_key(code)).await;
        let _sender_guard = self.locks.acquire(&account_key(sender)).await;
        let mut profile = self.profile_or_new(sender).await?;
        if profile.balance < amount {
            return Err(EngineError::InsufficientBalance);
        }
        let remittance = Remittance::new(
            code.to_string(),
            sender.clone(),
            recipient,
            recipient_alias,
            amount,
            priced,
            self.clock.now(),
        );
        self.remittances.insert(remittance.clone()).await?;
        profile.debit(amount)?;
        profile.total_sent += amount;
        profile.remittance_count += 1;
        self.profiles.store(profile).await?;
        {
            let mut platform = self.platform.write().await;
            platform.platform_balance += priced.fee;
            platform.total_remittances += 1;
            platform.total_volume += amount;
        }
        info!(code, sender = %sender, amount = %amount, "remittance created");
        Ok(remittance)
    }

    /// Marks a pending remittance as in-process. Sender only; a locked
    /// remittance stays cancellable but is not claimable.
    pub async fn lock_remittance(&self, caller: &Address, code: &str) -> Result<Remittance> {
        self.ensure_not_paused().await?;
        let now = self.clock.now();
        let expiration = self.platform.read().await.expiration_secs;
        let _guard = self.locks.acquire(&code_key(code)).await;
        let mut remittance = self
            .remittances
            .get(code)
            .await?
            .ok_or(EngineError::NotFound)?;
        if caller != &remittance.sender {
            return Err(EngineError::NotAuthorized);
        }
        if remittance.is_expired_at(now, expiration) {
            return Err(EngineError::NotEligible);
        }
        match remittance.status {
            RemittanceStatus::Pending => {}
            RemittanceStatus::Locked
            | RemittanceStatus::ReadyForPickup
            | RemittanceStatus::Claimed
            | RemittanceStatus::Expired
            | RemittanceStatus::Cancelled => return Err(EngineError::NotEligible),
        }
        remittance.status = RemittanceStatus::Locked;
        self.remittances.store(remittance.clone()).await?;
        Ok(remittance)
    }

    /// An active cashout point confirms it holds cash for the code.
    pub async fn mark_ready_for_pickup(&self, caller: &Address, code: &str) -> Result<Remittance> {
        self.ensure_not_paused().await?;
        let now = self.clock.now();
        let expiration = self.platform.read().await.expiration_secs;
        let _guard = self.locks.acquire(&code_key(code)).await;
        let mut remittance = self
            .remittances
            .get(code)
            .await?
            .ok_or(EngineError::NotFound)?;
        match self.cashouts.get(caller).await? {
            Some(point) if point.is_active => {}
            _ => return Err(EngineError::NotEligible),
        }
        if remittance.is_expired_at(now, expiration) {
            return Err(EngineError::NotEligible);
        }
        match remittance.status {
            RemittanceStatus::Pending | RemittanceStatus::Locked => {}
            RemittanceStatus::ReadyForPickup
            | RemittanceStatus::Claimed
            | RemittanceStatus::Expired
            | RemittanceStatus::Cancelled => return Err(EngineError::NotEligible),
        }
        remittance.status = RemittanceStatus::ReadyForPickup;
        self.remittances.store(remittance.clone()).await?;
        Ok(remittance)
    }

    /// Claims a remittance for payout. The caller must be an active cashout
    /// point, or the recipient claiming directly.
    ///
    /// The whole read-check-write runs under the code lock, so of any number
    /// of concurrent claims on one code exactly one succeeds and the rest
    /// observe `Claimed`.
    pub async fn claim_remittance(&self, caller: &Address, code: &str) -> Result<Remittance> {
        self.ensure_not_paused().await?;
        let now = self.clock.now();
        let expiration = self.platform.read().await.expiration_secs;
        let _code_guard = self.locks.acquire(&code_key(code)).await;
        let mut remittance = self
            .remittances
            .get(code)
            .await?
            .ok_or(EngineError::NotFound)?;
        if remittance.is_claimed {
            return Err(EngineError::AlreadyClaimed);
        }
        if remittance.is_expired_at(now, expiration) {
            return Err(EngineError::NotEligible);
        }
        match remittance.status {
            RemittanceStatus::Pending | RemittanceStatus::ReadyForPickup => {}
            RemittanceStatus::Locked => return Err(EngineError::NotEligible),
            RemittanceStatus::Claimed => return Err(EngineError::AlreadyClaimed),
            RemittanceStatus::Expired | RemittanceStatus::Cancelled => {
                return Err(EngineError::NotEligible);
            }
        }

        let mut keys = vec![account_key(caller), account_key(&remittance.recipient)];
        let _account_guards = self.locks.acquire_all(&mut keys).await;
        let net = remittance.net_usd();
        let mut recipient_profile = self.profile_or_new(&remittance.recipient).await?;
        match self.cashouts.get(caller).await? {
            Some(mut point) if point.is_active => {
                // Second fee layer: the point's cut comes out of the payout
                // leg, never the principal.
                let point_fee = point.fee_pct.of(net);
                point.balance += net - point_fee;
                point.total_processed += remittance.amount_mxn;
                self.cashouts.store(point).await?;
            }
            _ if caller == &remittance.recipient => {
                recipient_profile.credit(net);
            }
            _ => return Err(EngineError::NotEligible),
        }
        recipient_profile.total_received += remittance.amount_mxn;
        remittance.status = RemittanceStatus::Claimed;
        remittance.is_claimed = true;
        remittance.cashout_point = Some(caller.clone());
        self.remittances.store(remittance.clone()).await?;
        self.profiles.store(recipient_profile).await?;
        info!(code, claimed_by = %caller, payout = %remittance.amount_mxn, "remittance claimed");
        Ok(remittance)
    }

    /// Cancels a pending or locked remittance and refunds the principal
    /// minus the platform fee already taken at creation.
    pub async fn cancel_remittance(&self, caller: &Address, code: &str) -> Result<Remittance> {
        self.ensure_not_paused().await?;
        let now = self.clock.now();
        let expiration = self.platform.read().await.expiration_secs;
        let _code_guard = self.locks.acquire(&code_key(code)).await;
        let mut remittance = self
            .remittances
            .get(code)
            .await?
            .ok_or(EngineError::NotFound)?;
        if caller != &remittance.sender {
            return Err(EngineError::NotAuthorized);
        }
        if remittance.is_expired_at(now, expiration) {
            return Err(EngineError::NotCancellable);
        }
        match remittance.status {
            RemittanceStatus::Pending | RemittanceStatus::Locked => {}
            RemittanceStatus::ReadyForPickup
            | RemittanceStatus::Claimed
            | RemittanceStatus::Expired
            | RemittanceStatus::Cancelled => return Err(EngineError::NotCancellable),
        }
        let _sender_guard = self.locks.acquire(&account_key(caller)).await;
        let mut profile = self.profile_or_new(caller).await?;
        profile.credit(remittance.net_usd());
        remittance.status = RemittanceStatus::Cancelled;
        self.remittances.store(remittance.clone()).await?;
        self.profiles.store(profile).await?;
        info!(code, sender = %caller, "remittance cancelled");
        Ok(remittance)
    }

    /// Persists the expiry of an over-age remittance and refunds the sender.
    ///
    /// Expiry is evaluated lazily everywhere else; this is the one call that
    /// writes the `Expired` state, and it refunds in the same atomic unit,
    /// so a stored `Expired` always means the sender got the net principal
    /// back exactly once.
    pub async fn reclaim_expired(&self, caller: &Address, code: &str) -> Result<Remittance> {
        self.ensure_not_paused().await?;
        let now = self.clock.now();
        let expiration = self.platform.read().await.expiration_secs;
        let _code_guard = self.locks.acquire(&code_key(code)).await;
        let mut remittance = self
            .remittances
            .get(code)
            .await?
            .ok_or(EngineError::NotFound)?;
        if caller != &remittance.sender {
            return Err(EngineError::NotAuthorized);
        }
        if !remittance.is_expired_at(now, expiration) {
            return Err(EngineError::NotEligible);
        }
        let _sender_guard = self.locks.acquire(&account_key(caller)).await;
        let mut profile = self.profile_or_new(caller).await?;
        profile.credit(remittance.net_usd());
        remittance.status = RemittanceStatus::Expired;
        self.remittances.store(remittance.clone()).await?;
        self.profiles.store(profile).await?;
        info!(code, sender = %caller, "expired remittance reclaimed");
        Ok(remittance)
    }

    // ---- access & pause control ----

    pub async fn update_exchange_rate(&self, caller: &Address, rate_centi: u64) -> Result<()> {
        self.ensure_owner(caller).await?;
        let rate = ExchangeRate::new(rate_centi)?;
        self.platform.write().await.exchange_rate = rate;
        info!(rate = rate_centi, "exchange rate updated");
        Ok(())
    }

    pub async fn update_platform_fee(&self, caller: &Address, fee_bps: u32) -> Result<()> {
        self.ensure_owner(caller).await?;
        let fee = BasisPoints::new(fee_bps)?;
        self.platform.write().await.platform_fee = fee;
        info!(fee_bps, "platform fee updated");
        Ok(())
    }

    /// Flips the global circuit breaker. User-facing mutations fail with
    /// `Paused` while set; queries and administrative operations do not.
    pub async fn toggle_pause(&self, caller: &Address) -> Result<bool> {
        self.ensure_owner(caller).await?;
        let mut platform = self.platform.write().await;
        platform.paused = !platform.paused;
        info!(paused = platform.paused, "pause toggled");
        Ok(platform.paused)
    }

    pub async fn transfer_ownership(&self, caller: &Address, new_owner: Address) -> Result<()> {
        self.ensure_owner(caller).await?;
        self.platform.write().await.owner = Some(new_owner);
        Ok(())
    }

    /// Irreversible: the owner becomes the none sentinel and every
    /// owner-gated operation fails from then on.
    pub async fn renounce_ownership(&self, caller: &Address) -> Result<()> {
        self.ensure_owner(caller).await?;
        self.platform.write().await.owner = None;
        Ok(())
    }

    pub async fn withdraw_platform_fees(&self, caller: &Address) -> Result<Usd> {
        self.ensure_owner(caller).await?;
        let mut platform = self.platform.write().await;
        if platform.platform_balance.is_zero() {
            return Err(EngineError::NothingToWithdraw);
        }
        let amount = platform.platform_balance;
        platform.platform_balance = Usd::ZERO;
        info!(amount = %amount, "platform fees withdrawn");
        Ok(amount)
    }

    // ---- queries (side-effect-free) ----

    pub async fn get_remittance(&self, code: &str) -> Result<Option<Remittance>> {
        self.remittances.get(code).await
    }

    pub async fn is_code_available(&self, code: &str) -> Result<bool> {
        Ok(!self.remittances.contains(code).await?)
    }

    pub async fn get_user(&self, account: &Address) -> Result<Option<UserProfile>> {
        self.profiles.get(account).await
    }

    pub async fn get_user_by_alias(&self, alias: &str) -> Result<Option<UserProfile>> {
        match self.aliases.resolve(alias).await? {
            Some(account) => self.profiles.get(&account).await,
            None => Ok(None),
        }
    }

    /// Codes of every remittance the account sent or receives.
    pub async fn get_user_remittances(&self, account: &Address) -> Result<Vec<String>> {
        self.remittances.codes_for(account).await
    }

    pub async fn get_all_cashout_points(&self) -> Result<Vec<CashoutPoint>> {
        self.cashouts.all().await
    }

    pub async fn get_all_profiles(&self) -> Result<Vec<UserProfile>> {
        self.profiles.all().await
    }

    pub async fn get_stats(&self) -> Stats {
        let platform = self.platform.read().await;
        Stats {
            total_remittances: platform.total_remittances,
            total_volume: platform.total_volume,
            platform_balance: platform.platform_balance,
            exchange_rate: platform.exchange_rate,
            platform_fee: platform.platform_fee,
        }
    }

    /// Pure preview of a quote at the current rate and fee.
    pub async fn calculate_receive_amount(&self, amount: Usd) -> Result<Quote> {
        let (rate, fee_pct) = {
            let platform = self.platform.read().await;
            (platform.exchange_rate, platform.platform_fee)
        };
        quote(amount, rate, fee_pct)
    }

    pub async fn expiration_secs(&self) -> u64 {
        self.platform.read().await.expiration_secs
    }
}
