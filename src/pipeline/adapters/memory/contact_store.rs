//! In-memory contact store with scriptable failures.

use async_trait::async_trait;
use mockable::Clock;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use crate::pipeline::{
    domain::{Contact, ContactId},
    ports::{ContactPatch, ContactStore, ContactStoreError, ContactStoreResult},
};

/// Thread-safe in-memory contact store.
///
/// Failures can be scripted globally or per contact, which is how the
/// movement tests drive the retry and revert paths without a real backend.
pub struct InMemoryContactStore<C>
where
    C: Clock + Send + Sync,
{
    clock: Arc<C>,
    state: Arc<RwLock<StoreState>>,
}

#[derive(Debug, Default)]
struct StoreState {
    contacts: HashMap<ContactId, Contact>,
    fail_next: u32,
    fail_always: bool,
    per_contact_failures: HashMap<ContactId, u32>,
    latency: Option<Duration>,
    update_log: Vec<UpdateProbe>,
}

/// One observed `update_contact` call, with its virtual arrival instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateProbe {
    /// Contact the update targeted.
    pub contact_id: ContactId,
    /// Instant the call reached the store.
    pub at: tokio::time::Instant,
}

impl<C> Clone for InMemoryContactStore<C>
where
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            clock: Arc::clone(&self.clock),
            state: Arc::clone(&self.state),
        }
    }
}

impl<C> InMemoryContactStore<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an empty store.
    #[must_use]
    pub fn new(clock: Arc<C>) -> Self {
        Self {
            clock,
            state: Arc::new(RwLock::new(StoreState::default())),
        }
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seeds a contact.
    pub fn insert(&self, contact: Contact) {
        self.write_state().contacts.insert(contact.id(), contact);
    }

    /// Scripts the next `count` updates (for any contact) to fail.
    pub fn fail_next_updates(&self, count: u32) {
        self.write_state().fail_next = count;
    }

    /// Scripts every subsequent update to fail until switched off.
    pub fn set_fail_always(&self, fail: bool) {
        self.write_state().fail_always = fail;
    }

    /// Scripts the next `count` updates targeting `contact_id` to fail.
    pub fn fail_updates_for(&self, contact_id: ContactId, count: u32) {
        self.write_state()
            .per_contact_failures
            .insert(contact_id, count);
    }

    /// Delays every update by `latency` before it resolves.
    pub fn set_latency(&self, latency: Duration) {
        self.write_state().latency = Some(latency);
    }

    /// Returns every observed update call in arrival order.
    #[must_use]
    pub fn update_log(&self) -> Vec<UpdateProbe> {
        self.read_state().update_log.clone()
    }

    /// Returns how many update calls the store has observed.
    #[must_use]
    pub fn update_count(&self) -> usize {
        self.read_state().update_log.len()
    }

    /// Returns the stored contact, if present.
    #[must_use]
    pub fn find(&self, contact_id: ContactId) -> Option<Contact> {
        self.read_state().contacts.get(&contact_id).cloned()
    }
}

/// Decides whether the next scripted failure fires, consuming it.
fn consume_failure(state: &mut StoreState, contact_id: ContactId) -> bool {
    if state.fail_always {
        return true;
    }
    if let Some(remaining) = state.per_contact_failures.get_mut(&contact_id)
        && *remaining > 0
    {
        *remaining -= 1;
        return true;
    }
    if state.fail_next > 0 {
        state.fail_next -= 1;
        return true;
    }
    false
}

#[async_trait]
impl<C> ContactStore for InMemoryContactStore<C>
where
    C: Clock + Send + Sync,
{
    async fn update_contact(
        &self,
        contact_id: ContactId,
        patch: ContactPatch,
    ) -> ContactStoreResult<Contact> {
        let latency = self.read_state().latency;
        if let Some(delay) = latency {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.write_state();
        state.update_log.push(UpdateProbe {
            contact_id,
            at: tokio::time::Instant::now(),
        });

        if consume_failure(&mut state, contact_id) {
            return Err(ContactStoreError::persistence(std::io::Error::other(
                "scripted update failure",
            )));
        }

        // Apply to a copy first so a rejected field leaves the record
        // untouched (all-or-nothing).
        let mut contact = state
            .contacts
            .get(&contact_id)
            .ok_or(ContactStoreError::NotFound(contact_id))?
            .clone();

        if let Some(stage_id) = patch.stage_id() {
            contact.move_to_stage(stage_id, self.clock.as_ref());
        }
        if let Some(name) = patch.name() {
            contact
                .rename(name, self.clock.as_ref())
                .map_err(ContactStoreError::persistence)?;
        }
        if let Some(list_id) = patch.list_id() {
            contact.move_to_list(list_id, self.clock.as_ref());
        }

        state.contacts.insert(contact_id, contact.clone());
        Ok(contact)
    }

    async fn list_contacts(&self) -> ContactStoreResult<Vec<Contact>> {
        Ok(self.read_state().contacts.values().cloned().collect())
    }
}
