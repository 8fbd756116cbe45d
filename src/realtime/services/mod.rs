//! Orchestration services for realtime reconciliation.

mod debouncer;
mod sync;

pub use debouncer::{DebounceWindows, ReconciliationDebouncer};
pub use sync::RealtimeSync;
