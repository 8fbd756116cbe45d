//! In-memory adapters for movement and board tests.

mod contact_store;
mod notifier;

pub use contact_store::{InMemoryContactStore, UpdateProbe};
pub use notifier::{Notice, NoticeKind, RecordingNotifier};
