//! Unit tests for realtime reconciliation.
//!
//! Debounce timing runs on a paused tokio clock so windows elapse
//! deterministically.

mod sync_tests;

use crate::realtime::domain::{ChangeEvent, Collection, RecordImage};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Shared counter probe for the refetch callback.
pub struct RefetchProbe {
    fired: Arc<AtomicUsize>,
}

impl RefetchProbe {
    pub fn new() -> Self {
        Self {
            fired: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn callback(&self) -> Arc<dyn Fn() + Send + Sync> {
        let fired = Arc::clone(&self.fired);
        Arc::new(move || {
            fired.fetch_add(1, Ordering::SeqCst);
        })
    }

    pub fn count(&self) -> usize {
        self.fired.load(Ordering::SeqCst)
    }
}

/// A contact insert notification.
pub fn contact_insert() -> ChangeEvent {
    ChangeEvent::insert(Collection::Contacts, RecordImage::new("c-1"))
}

/// A contact update that does not change the stage.
pub fn contact_rename() -> ChangeEvent {
    ChangeEvent::update(
        Collection::Contacts,
        RecordImage::new("c-1").with_stage("s-1"),
        RecordImage::new("c-1").with_stage("s-1"),
    )
}

/// A contact update that moves the contact between stages.
pub fn contact_stage_change() -> ChangeEvent {
    ChangeEvent::update(
        Collection::Contacts,
        RecordImage::new("c-1").with_stage("s-1"),
        RecordImage::new("c-1").with_stage("s-2"),
    )
}

/// A dashboard layout update.
pub fn dashboard_update() -> ChangeEvent {
    ChangeEvent::update(
        Collection::DashboardConfigs,
        RecordImage::new("d-1"),
        RecordImage::new("d-1"),
    )
}
