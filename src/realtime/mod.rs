//! Debounced reconciliation of realtime change notifications.
//!
//! The backend pushes a change notification for every insert, update, and
//! delete on the watched collections, with no ordering relative to local
//! writes. This module coalesces those bursts into at most one consumer
//! refetch per quiescence window, holding back a little longer for stage
//! changes so a just-confirmed optimistic move can settle before a refetch
//! could show it overwritten. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
