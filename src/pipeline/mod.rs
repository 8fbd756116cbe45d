//! Contact movement for the Stagehand pipeline board.
//!
//! This module implements the optimistic-update protocol for dragging a
//! contact between pipeline stages: the local view is updated before the
//! backend confirms, failed persistence is retried with backoff, and
//! exhausted moves are rolled back to the original stage. The module follows
//! hexagonal architecture:
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
