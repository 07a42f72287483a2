//! Serialized service layer for the coffer ledger.
//!
//! [`CofferService`] is the single front door: it owns the mutable state
//! behind one lock, checks capabilities at the boundary, persists every
//! mutation as one atomic batch, and fans out events to subscribers.

pub mod allowance;
pub mod config;
pub mod error;
pub mod event;
pub mod gate;
pub mod logging;
pub mod service;

pub use allowance::AllowanceTable;
pub use config::{GenesisReserve, ServiceConfig};
pub use error::ServiceError;
pub use event::{CofferEvent, EventBus};
pub use gate::{Capability, CapabilityGate, RoleTable};
pub use logging::{init_logging, LogFormat};
pub use service::{CofferService, Summary};
