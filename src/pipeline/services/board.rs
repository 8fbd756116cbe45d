//! Local board view model with a confirmed-moves overlay.
//!
//! [`PipelineBoard`] is the consumer side of the movement protocol: it owns
//! the contact list the UI renders and implements the three [`BoardSync`]
//! callbacks. Because the realtime feed gives no ordering relative to local
//! writes, a refetched snapshot may predate a move the backend already
//! confirmed; the board therefore keeps an overlay of confirmed moves and
//! reapplies them onto every snapshot until the snapshot reflects them.
//!
//! The overlay entry records the local confirmation time, and the merge
//! prefers local state only while it is newer than the snapshot row's own
//! change timestamp. A row the backend stamped after our confirmation wins
//! outright: some other client moved the contact again.

use crate::pipeline::{
    domain::{Contact, ContactId, ListId, StageId},
    ports::BoardSync,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Delay between a confirmed move and the follow-up snapshot refetch.
const CONFIRM_RESYNC_DELAY: Duration = Duration::from_millis(500);

/// Board-side contact state shared with the UI.
pub struct PipelineBoard<C>
where
    C: Clock + Send + Sync,
{
    clock: Arc<C>,
    resync: Option<Arc<dyn Fn() + Send + Sync>>,
    resync_delay: Duration,
    state: Mutex<BoardState>,
}

#[derive(Default)]
struct BoardState {
    contacts: HashMap<ContactId, Contact>,
    confirmed: HashMap<ContactId, ConfirmedMove>,
    active_list: Option<ListId>,
}

#[derive(Debug, Clone, Copy)]
struct ConfirmedMove {
    stage_id: StageId,
    confirmed_at: DateTime<Utc>,
}

impl<C> PipelineBoard<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an empty board.
    #[must_use]
    pub fn new(clock: Arc<C>) -> Self {
        Self {
            clock,
            resync: None,
            resync_delay: CONFIRM_RESYNC_DELAY,
            state: Mutex::new(BoardState::default()),
        }
    }

    /// Installs a callback invoked shortly after each confirmed move, used
    /// to trigger a snapshot refetch once the backend write has settled.
    ///
    /// Requires a tokio runtime when moves are confirmed.
    #[must_use]
    pub fn with_resync(mut self, resync: Arc<dyn Fn() + Send + Sync>) -> Self {
        self.resync = Some(resync);
        self
    }

    fn lock_state(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Restricts the board to one list, or shows every contact when `None`.
    ///
    /// Switching lists clears the contact map and the confirmed overlay; the
    /// next snapshot repopulates the board.
    pub fn set_active_list(&self, list_id: Option<ListId>) {
        let mut state = self.lock_state();
        if state.active_list == list_id {
            return;
        }
        state.active_list = list_id;
        state.contacts.clear();
        state.confirmed.clear();
    }

    /// Replaces board contents with a fetched snapshot, reapplying confirmed
    /// moves the snapshot does not yet reflect.
    pub fn apply_snapshot(&self, snapshot: Vec<Contact>) {
        let mut state = self.lock_state();
        let mut next = HashMap::with_capacity(snapshot.len());

        for contact in snapshot {
            if let Some(list_id) = state.active_list
                && contact.list_id() != list_id
            {
                continue;
            }
            let contact_id = contact.id();
            let overlay = state
                .confirmed
                .get(&contact_id)
                .map(|entry| (entry.stage_id, entry.confirmed_at));
            let merged = match overlay {
                // The backend now reflects the move; the overlay is spent.
                Some((stage_id, _)) if contact.stage_id() == stage_id => {
                    state.confirmed.remove(&contact_id);
                    contact
                }
                // Stale snapshot row: keep the confirmed position.
                Some((stage_id, confirmed_at)) if confirmed_at > contact.updated_at() => {
                    contact.with_stage(stage_id)
                }
                // The backend has a newer write than our confirmation.
                Some(_) => {
                    state.confirmed.remove(&contact_id);
                    contact
                }
                None => contact,
            };
            next.insert(contact_id, merged);
        }

        state
            .confirmed
            .retain(|contact_id, _| next.contains_key(contact_id));
        state.contacts = next;
    }

    /// Returns the contact as currently rendered, if present.
    #[must_use]
    pub fn contact(&self, contact_id: ContactId) -> Option<Contact> {
        self.lock_state().contacts.get(&contact_id).cloned()
    }

    /// Returns the contacts occupying `stage_id`, ordered by name.
    #[must_use]
    pub fn contacts_in_stage(&self, stage_id: StageId) -> Vec<Contact> {
        let state = self.lock_state();
        let mut contacts: Vec<Contact> = state
            .contacts
            .values()
            .filter(|contact| contact.stage_id() == stage_id)
            .cloned()
            .collect();
        contacts.sort_by(|a, b| a.name().cmp(b.name()));
        contacts
    }

    /// Returns the number of contacts on the board.
    #[must_use]
    pub fn contact_count(&self) -> usize {
        self.lock_state().contacts.len()
    }

    /// Returns `true` while a confirmed move for the contact has not yet
    /// been observed in a snapshot.
    #[must_use]
    pub fn has_confirmed_overlay(&self, contact_id: ContactId) -> bool {
        self.lock_state().confirmed.contains_key(&contact_id)
    }

    fn set_local_stage(&self, contact_id: ContactId, stage_id: StageId) {
        let mut state = self.lock_state();
        if let Some(contact) = state.contacts.get_mut(&contact_id) {
            contact.move_to_stage(stage_id, self.clock.as_ref());
        }
    }

    fn schedule_resync(&self) {
        if let Some(resync) = &self.resync {
            let resync = Arc::clone(resync);
            let delay = self.resync_delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                resync();
            });
        }
    }
}

impl<C> BoardSync for PipelineBoard<C>
where
    C: Clock + Send + Sync,
{
    fn apply_optimistic(&self, contact_id: ContactId, new_stage: StageId) {
        self.set_local_stage(contact_id, new_stage);
    }

    fn apply_revert(&self, contact_id: ContactId, original_stage: StageId) {
        self.set_local_stage(contact_id, original_stage);
        self.lock_state().confirmed.remove(&contact_id);
    }

    fn apply_confirmed(&self, contact_id: ContactId, new_stage: StageId) {
        {
            let mut state = self.lock_state();
            if let Some(contact) = state.contacts.get_mut(&contact_id) {
                contact.move_to_stage(new_stage, self.clock.as_ref());
            }
            state.confirmed.insert(
                contact_id,
                ConfirmedMove {
                    stage_id: new_stage,
                    confirmed_at: self.clock.utc(),
                },
            );
        }
        self.schedule_resync();
    }
}
