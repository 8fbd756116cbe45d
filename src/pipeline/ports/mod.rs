//! Port contracts for the pipeline movement core.
//!
//! Ports define infrastructure-agnostic interfaces used by movement
//! services.

pub mod board;
pub mod contact_store;
pub mod notifier;

pub use board::BoardSync;
pub use contact_store::{ContactPatch, ContactStore, ContactStoreError, ContactStoreResult};
pub use notifier::Notifier;
