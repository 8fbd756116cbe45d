//! Stagehand: optimistic pipeline-movement core for a CRM kanban board.
//!
//! This crate provides the client-side state machine that moves a contact
//! between pipeline stages optimistically (before the backend confirms),
//! retries failed persistence with backoff, reverts on exhaustion, and
//! reconciles local state against a debounced realtime change feed.
//!
//! # Architecture
//!
//! Stagehand follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory fakes, etc.)
//!
//! # Modules
//!
//! - [`pipeline`]: Contact movement state machine and board view model
//! - [`realtime`]: Debounced reconciliation of realtime change notifications

pub mod pipeline;
pub mod realtime;
