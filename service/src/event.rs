//! Events emitted after committed operations for subscribers.

use coffer_types::{Amount, HolderAddress, Rate};

/// Service-level events observers can subscribe to via the [`EventBus`].
///
/// Events are emitted only after the durable commit succeeds, so a listener
/// never sees state the store does not hold.
#[derive(Clone, Debug)]
pub enum CofferEvent {
    /// Reserve came in, units went out.
    Deposited {
        holder: HolderAddress,
        amount: Amount,
        locked_rate: Rate,
    },
    /// Units were burned and reserve paid out.
    Redeemed {
        holder: HolderAddress,
        payout: Amount,
    },
    /// External reserve was moved into the vault.
    ReserveFunded {
        from: HolderAddress,
        amount: Amount,
    },
    /// Units were minted directly (privileged path).
    Minted {
        to: HolderAddress,
        amount: Amount,
        locked_rate: Rate,
    },
    /// Units were burned directly (privileged path).
    Burned {
        from: HolderAddress,
        amount: Amount,
    },
    /// Units moved between holders.
    Transferred {
        from: HolderAddress,
        to: HolderAddress,
        amount: Amount,
        /// Whether the recipient picked up the sender's locked rate.
        rate_inherited: bool,
    },
    /// The global rate was lowered (or re-submitted).
    RateChanged { previous: Rate, current: Rate },
}

/// Synchronous fan-out event bus.
///
/// Listeners are invoked inline on the emitting thread, while the service
/// lock is held; keep handlers fast.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&CofferEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&CofferEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &CofferEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
