//! Adapter implementations for realtime ports.

pub mod memory;
