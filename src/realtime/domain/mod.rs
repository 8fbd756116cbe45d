//! Domain types for realtime change notifications.

mod change;

pub use change::{ChangeEvent, ChangeKind, Collection, RecordImage};
