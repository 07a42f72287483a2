//! The serialized front door over the ledger, the exchange, and the store.
//!
//! One mutex guards the whole mutable state; each mutating call runs
//! materialize-then-mutate, persists everything it touched in a single write
//! batch, and only then emits events. If the commit fails, the in-memory
//! state is reloaded from the store so memory never runs ahead of disk.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use coffer_exchange::{DepositOutcome, RedeemOutcome, ReserveBook, ReserveExchange};
use coffer_ledger::{AccrualLedger, BurnOutcome, MintOutcome, RateChange, TransferOutcome};
use coffer_store::{Store, SCHEMA_VERSION};
use coffer_types::{Amount, Clock, HolderAddress, Rate};

use crate::allowance::AllowanceTable;
use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::event::{CofferEvent, EventBus};
use crate::gate::{Capability, CapabilityGate};

/// Mutable state guarded by the service lock.
struct ServiceState {
    ledger: AccrualLedger,
    reserve: ReserveBook,
    allowances: AllowanceTable,
}

/// Point-in-time totals for operators and the summary endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summary {
    pub holders: u64,
    pub total_principal: Amount,
    pub global_rate: Rate,
    pub vault_reserve: Amount,
}

/// The coffer service.
///
/// Construction loads state from the store or writes genesis; afterwards the
/// service is the only writer. Time comes from the injected [`Clock`], the
/// authorization verdicts from the injected [`CapabilityGate`].
pub struct CofferService {
    state: Mutex<ServiceState>,
    exchange: ReserveExchange,
    store: Arc<dyn Store>,
    gate: Arc<dyn CapabilityGate>,
    clock: Arc<dyn Clock>,
    events: EventBus,
}

impl CofferService {
    /// Open the service over `store`.
    ///
    /// A store that already carries a global rate is loaded as-is (the
    /// config's `initial_rate` and genesis seeds are ignored); an empty store
    /// gets genesis state written in one batch.
    pub fn open(
        config: &ServiceConfig,
        store: Arc<dyn Store>,
        gate: Arc<dyn CapabilityGate>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ServiceError> {
        let exchange = ReserveExchange::new(config.vault()?);
        let state = match store.get_global_rate()? {
            Some(rate) => Self::load_state(store.as_ref(), rate)?,
            None => Self::genesis_state(store.as_ref(), config)?,
        };
        Ok(Self {
            state: Mutex::new(state),
            exchange,
            store,
            gate,
            clock,
            events: EventBus::new(),
        })
    }

    fn load_state(store: &dyn Store, rate: Rate) -> Result<ServiceState, ServiceError> {
        let version = store.get_schema_version()?;
        if version != SCHEMA_VERSION {
            return Err(ServiceError::Config(format!(
                "store schema version {version} is not supported (expected {SCHEMA_VERSION})"
            )));
        }
        let accounts: HashMap<_, _> = store.iter_accounts()?.into_iter().collect();
        let reserves: HashMap<_, _> = store.iter_reserves()?.into_iter().collect();
        let ledger = AccrualLedger::from_accounts(rate, accounts)?;
        tracing::info!(
            holders = ledger.account_count(),
            rate = %ledger.global_rate(),
            "ledger state loaded"
        );
        Ok(ServiceState {
            ledger,
            reserve: ReserveBook::from_balances(reserves),
            allowances: AllowanceTable::new(),
        })
    }

    fn genesis_state(
        store: &dyn Store,
        config: &ServiceConfig,
    ) -> Result<ServiceState, ServiceError> {
        let rate = Rate::new(config.initial_rate);
        let mut reserve = ReserveBook::new();
        for (address, amount) in config.genesis_balances()? {
            reserve.credit(&address, amount)?;
        }

        let mut batch = store.begin_write()?;
        batch.put_schema_version(SCHEMA_VERSION)?;
        batch.put_global_rate(rate)?;
        for (address, balance) in reserve.iter() {
            batch.put_reserve(address, *balance)?;
        }
        batch.commit()?;
        tracing::info!(rate = %rate, "genesis state written");

        Ok(ServiceState {
            ledger: AccrualLedger::new(rate),
            reserve,
            allowances: AllowanceTable::new(),
        })
    }

    /// Register an event listener. Listeners must be attached before the
    /// service is shared.
    pub fn subscribe(&mut self, listener: Box<dyn Fn(&CofferEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    /// The vault address this service exchanges against.
    pub fn vault(&self) -> &HolderAddress {
        self.exchange.vault()
    }

    // ── Exchange operations ─────────────────────────────────────────────

    /// Deposit reserve; the holder receives the same number of units, locked
    /// at the current global rate.
    pub fn deposit(
        &self,
        holder: &HolderAddress,
        amount: Amount,
    ) -> Result<DepositOutcome, ServiceError> {
        let now = self.clock.now();
        let mut state = self.state();
        let outcome = {
            let ServiceState {
                ledger, reserve, ..
            } = &mut *state;
            self.exchange.deposit(ledger, reserve, holder, amount, now)?
        };
        self.persist(&mut state, &[holder], &[holder, self.exchange.vault()], false)?;
        tracing::info!(holder = %holder, amount = %outcome.deposited, rate = %outcome.locked_rate, "deposit");
        self.events.emit(&CofferEvent::Deposited {
            holder: holder.clone(),
            amount: outcome.deposited,
            locked_rate: outcome.locked_rate,
        });
        Ok(outcome)
    }

    /// Redeem units for reserve. `Amount::MAX` redeems the entire current
    /// balance, accrued interest included.
    pub fn redeem(
        &self,
        holder: &HolderAddress,
        amount: Amount,
    ) -> Result<RedeemOutcome, ServiceError> {
        let now = self.clock.now();
        let mut state = self.state();
        let outcome = {
            let ServiceState {
                ledger, reserve, ..
            } = &mut *state;
            self.exchange.redeem(ledger, reserve, holder, amount, now)?
        };
        self.persist(&mut state, &[holder], &[holder, self.exchange.vault()], false)?;
        tracing::info!(holder = %holder, payout = %outcome.redeemed, "redeem");
        self.events.emit(&CofferEvent::Redeemed {
            holder: holder.clone(),
            payout: outcome.redeemed,
        });
        Ok(outcome)
    }

    /// Move reserve from an external funder into the vault.
    pub fn top_up(&self, from: &HolderAddress, amount: Amount) -> Result<(), ServiceError> {
        let mut state = self.state();
        self.exchange.top_up(&mut state.reserve, from, amount)?;
        self.persist(&mut state, &[], &[from, self.exchange.vault()], false)?;
        tracing::info!(from = %from, amount = %amount, "vault top-up");
        self.events.emit(&CofferEvent::ReserveFunded {
            from: from.clone(),
            amount,
        });
        Ok(())
    }

    // ── Transfers ───────────────────────────────────────────────────────

    /// Move units between holders. `Amount::MAX` moves the sender's entire
    /// current balance.
    pub fn transfer(
        &self,
        from: &HolderAddress,
        to: &HolderAddress,
        amount: Amount,
    ) -> Result<TransferOutcome, ServiceError> {
        let now = self.clock.now();
        let mut state = self.state();
        let outcome = state.ledger.transfer(from, to, amount, now)?;
        self.persist(&mut state, &[from, to], &[], false)?;
        tracing::info!(
            from = %from,
            to = %to,
            amount = %outcome.amount,
            rate_inherited = outcome.rate_inherited,
            "transfer"
        );
        self.events.emit(&CofferEvent::Transferred {
            from: from.clone(),
            to: to.clone(),
            amount: outcome.amount,
            rate_inherited: outcome.rate_inherited,
        });
        Ok(outcome)
    }

    /// Set the allowance `owner` grants `spender`. Allowances live in memory
    /// only and reset on restart.
    pub fn approve(&self, owner: &HolderAddress, spender: &HolderAddress, amount: Amount) {
        let mut state = self.state();
        state.allowances.approve(owner, spender, amount);
        tracing::debug!(owner = %owner, spender = %spender, amount = %amount, "approve");
    }

    /// The remaining allowance `owner` grants `spender`.
    pub fn allowance(&self, owner: &HolderAddress, spender: &HolderAddress) -> Amount {
        self.state().allowances.allowance(owner, spender)
    }

    /// Move units on the owner's behalf, within the spender's allowance.
    /// The whole-balance sentinel resolves against the owner's balance and
    /// must fit the allowance like any other amount.
    pub fn transfer_from(
        &self,
        spender: &HolderAddress,
        from: &HolderAddress,
        to: &HolderAddress,
        amount: Amount,
    ) -> Result<TransferOutcome, ServiceError> {
        let now = self.clock.now();
        let mut state = self.state();

        // Resolve the sentinel up front: the allowance must cover the amount
        // that will actually move.
        let resolved = if amount.is_max() {
            state.ledger.balance_of_checked(from, now)?
        } else {
            amount
        };
        let available = state.allowances.allowance(from, spender);
        if !available.is_max() && resolved > available {
            return Err(ServiceError::AllowanceExceeded {
                spender: spender.clone(),
                needed: resolved,
                available,
            });
        }

        let outcome = state.ledger.transfer(from, to, amount, now)?;
        self.persist(&mut state, &[from, to], &[], false)?;
        // Only a committed transfer consumes allowance.
        state.allowances.spend(from, spender, outcome.amount);
        tracing::info!(
            spender = %spender,
            from = %from,
            to = %to,
            amount = %outcome.amount,
            "transfer_from"
        );
        self.events.emit(&CofferEvent::Transferred {
            from: from.clone(),
            to: to.clone(),
            amount: outcome.amount,
            rate_inherited: outcome.rate_inherited,
        });
        Ok(outcome)
    }

    // ── Privileged operations ───────────────────────────────────────────

    /// Mint units directly to a holder. Requires [`Capability::MintAndBurn`].
    pub fn mint(
        &self,
        caller: &HolderAddress,
        to: &HolderAddress,
        amount: Amount,
    ) -> Result<MintOutcome, ServiceError> {
        self.authorize(caller, Capability::MintAndBurn)?;
        let now = self.clock.now();
        let mut state = self.state();
        let outcome = state.ledger.mint(to, amount, now)?;
        self.persist(&mut state, &[to], &[], false)?;
        tracing::info!(caller = %caller, to = %to, amount = %outcome.minted, "mint");
        self.events.emit(&CofferEvent::Minted {
            to: to.clone(),
            amount: outcome.minted,
            locked_rate: outcome.locked_rate,
        });
        Ok(outcome)
    }

    /// Burn units from a holder. Requires [`Capability::MintAndBurn`].
    /// `Amount::MAX` burns the holder's entire current balance.
    pub fn burn(
        &self,
        caller: &HolderAddress,
        from: &HolderAddress,
        amount: Amount,
    ) -> Result<BurnOutcome, ServiceError> {
        self.authorize(caller, Capability::MintAndBurn)?;
        let now = self.clock.now();
        let mut state = self.state();
        let outcome = state.ledger.burn(from, amount, now)?;
        self.persist(&mut state, &[from], &[], false)?;
        tracing::info!(caller = %caller, from = %from, amount = %outcome.burned, "burn");
        self.events.emit(&CofferEvent::Burned {
            from: from.clone(),
            amount: outcome.burned,
        });
        Ok(outcome)
    }

    /// Lower the global rate (equal re-submission is an accepted no-op).
    /// Requires [`Capability::ManageRate`].
    pub fn set_rate(
        &self,
        caller: &HolderAddress,
        new_rate: Rate,
    ) -> Result<RateChange, ServiceError> {
        self.authorize(caller, Capability::ManageRate)?;
        let mut state = self.state();
        let change = state.ledger.set_rate(new_rate)?;
        self.persist(&mut state, &[], &[], true)?;
        tracing::info!(caller = %caller, previous = %change.previous, current = %change.current, "global rate changed");
        self.events.emit(&CofferEvent::RateChanged {
            previous: change.previous,
            current: change.current,
        });
        Ok(change)
    }

    // ── Views ───────────────────────────────────────────────────────────

    /// The holder's observed balance right now, accrued interest included.
    pub fn balance_of(&self, holder: &HolderAddress) -> Amount {
        let now = self.clock.now();
        self.state().ledger.balance_of(holder, now)
    }

    /// The holder's materialized principal (excludes pending interest).
    pub fn principal_balance_of(&self, holder: &HolderAddress) -> Amount {
        self.state().ledger.principal_of(holder)
    }

    /// The rate the holder is locked at, `None` until their first touch.
    pub fn user_rate(&self, holder: &HolderAddress) -> Option<Rate> {
        self.state().ledger.rate_of(holder)
    }

    pub fn global_rate(&self) -> Rate {
        self.state().ledger.global_rate()
    }

    /// The holder's reserve-asset balance.
    pub fn reserve_balance_of(&self, holder: &HolderAddress) -> Amount {
        self.state().reserve.balance_of(holder)
    }

    /// The vault's reserve-asset balance.
    pub fn vault_reserve(&self) -> Amount {
        let state = self.state();
        state.reserve.balance_of(self.exchange.vault())
    }

    pub fn summary(&self) -> Summary {
        let state = self.state();
        Summary {
            holders: state.ledger.account_count() as u64,
            total_principal: state.ledger.total_principal(),
            global_rate: state.ledger.global_rate(),
            vault_reserve: state.reserve.balance_of(self.exchange.vault()),
        }
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn authorize(
        &self,
        principal: &HolderAddress,
        capability: Capability,
    ) -> Result<(), ServiceError> {
        if self.gate.allows(principal, capability) {
            return Ok(());
        }
        tracing::warn!(principal = %principal, capability = %capability, "unauthorized");
        Err(ServiceError::Unauthorized {
            principal: principal.clone(),
            capability,
        })
    }

    fn state(&self) -> MutexGuard<'_, ServiceState> {
        self.state.lock().expect("coffer state lock poisoned")
    }

    /// Write everything the finished operation touched in one batch. A
    /// failed commit reloads memory from the store before surfacing the
    /// error, so the in-memory mutation is rolled back too.
    fn persist(
        &self,
        state: &mut ServiceState,
        accounts: &[&HolderAddress],
        reserves: &[&HolderAddress],
        rate: bool,
    ) -> Result<(), ServiceError> {
        let result = self.try_persist(state, accounts, reserves, rate);
        if result.is_err() {
            if let Err(reload_err) = self.reload(state) {
                tracing::error!(error = %reload_err, "state reload after failed commit");
            }
        }
        result
    }

    fn try_persist(
        &self,
        state: &ServiceState,
        accounts: &[&HolderAddress],
        reserves: &[&HolderAddress],
        rate: bool,
    ) -> Result<(), ServiceError> {
        let mut batch = self.store.begin_write()?;
        for address in accounts {
            if let Some(account) = state.ledger.account(address) {
                batch.put_account(address, &account)?;
            }
        }
        for address in reserves {
            batch.put_reserve(address, state.reserve.balance_of(address))?;
        }
        if rate {
            batch.put_global_rate(state.ledger.global_rate())?;
        }
        batch.commit()?;
        Ok(())
    }

    fn reload(&self, state: &mut ServiceState) -> Result<(), ServiceError> {
        let rate = self
            .store
            .get_global_rate()?
            .ok_or_else(|| coffer_store::StoreError::NotFound("global_rate".to_string()))?;
        let accounts: HashMap<_, _> = self.store.iter_accounts()?.into_iter().collect();
        let reserves: HashMap<_, _> = self.store.iter_reserves()?.into_iter().collect();
        state.ledger = AccrualLedger::from_accounts(rate, accounts)?;
        state.reserve = ReserveBook::from_balances(reserves);
        Ok(())
    }
}
