//! Capability-based authorization at the service boundary.
//!
//! The ledger core never sees a caller identity; whether a principal may
//! mint, burn, or move the global rate is decided here, before the core is
//! touched. The gate is a trait so deployments can plug in whatever policy
//! source they run (static config, an external ACL service, a test stub).

use coffer_types::HolderAddress;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// The privileged operations a principal can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Create and destroy ledger units directly.
    MintAndBurn,
    /// Lower the global accrual rate.
    ManageRate,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::MintAndBurn => write!(f, "mint_and_burn"),
            Capability::ManageRate => write!(f, "manage_rate"),
        }
    }
}

/// Answers "does this principal hold this capability?".
pub trait CapabilityGate: Send + Sync {
    fn allows(&self, principal: &HolderAddress, capability: Capability) -> bool;
}

/// A static role table: one optional owner who holds everything, plus
/// explicit per-principal grants.
#[derive(Debug, Default)]
pub struct RoleTable {
    owner: Option<HolderAddress>,
    grants: HashMap<HolderAddress, HashSet<Capability>>,
}

impl RoleTable {
    /// An empty table that denies everyone.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table whose owner holds every capability.
    pub fn with_owner(owner: HolderAddress) -> Self {
        Self {
            owner: Some(owner),
            grants: HashMap::new(),
        }
    }

    pub fn grant(&mut self, principal: HolderAddress, capability: Capability) {
        self.grants.entry(principal).or_default().insert(capability);
    }

    pub fn revoke(&mut self, principal: &HolderAddress, capability: Capability) {
        if let Some(set) = self.grants.get_mut(principal) {
            set.remove(&capability);
            if set.is_empty() {
                self.grants.remove(principal);
            }
        }
    }
}

impl CapabilityGate for RoleTable {
    fn allows(&self, principal: &HolderAddress, capability: Capability) -> bool {
        if self.owner.as_ref() == Some(principal) {
            return true;
        }
        self.grants
            .get(principal)
            .is_some_and(|set| set.contains(&capability))
    }
}
