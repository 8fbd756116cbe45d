//! Optimistic contact-movement state machine.
//!
//! [`MovementController`] owns the per-contact movement records, the
//! in-flight and failed tracking sets, and the retry timers. A move is
//! reflected on the board immediately through [`BoardSync::apply_optimistic`]
//! and then persisted in the background; transient failures retry with
//! backoff, exhausted failures roll the board back. Public operations never
//! return errors: every failure terminates in a locally handled outcome
//! (a board callback plus a toast), so consumers only implement the three
//! [`BoardSync`] callbacks.
//!
//! Each activation of an attempt sequence captures an epoch stored on the
//! movement record. Any resolution arriving after the record was cancelled
//! or superseded carries a stale epoch and is discarded, which closes the
//! window where a late network response could revive dead state.

use crate::pipeline::{
    domain::{ContactId, MovePhase, MovementRecord, RetryPolicy, StageId},
    ports::{BoardSync, ContactPatch, ContactStore, ContactStoreError, Notifier},
};
use mockable::Clock;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

const MOVED_MESSAGE: &str = "Contact moved";
const MOVED_TOAST: Duration = Duration::from_millis(1500);
const RECOVERED_MESSAGE: &str = "Contact moved after retry";
const RECOVERED_TOAST: Duration = Duration::from_millis(2000);
const REVERTED_MESSAGE: &str = "Could not move contact; position restored";
const CANCELLED_MESSAGE: &str = "Move cancelled";

/// Orchestrates optimistic stage moves against a remote contact store.
///
/// Cheap to clone; clones share the same movement state. All timers and
/// records are instance-scoped and released by [`cleanup`](Self::cleanup).
/// Methods must be called from within a tokio runtime.
pub struct MovementController<S, B, N, C>
where
    S: ContactStore + 'static,
    B: BoardSync + 'static,
    N: Notifier + 'static,
    C: Clock + Send + Sync + 'static,
{
    inner: Arc<ControllerInner<S, B, N, C>>,
}

impl<S, B, N, C> Clone for MovementController<S, B, N, C>
where
    S: ContactStore + 'static,
    B: BoardSync + 'static,
    N: Notifier + 'static,
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ControllerInner<S, B, N, C> {
    store: Arc<S>,
    board: Arc<B>,
    notifier: Arc<N>,
    clock: Arc<C>,
    policy: RetryPolicy,
    state: Mutex<ControllerState>,
}

#[derive(Default)]
struct ControllerState {
    moving: HashSet<ContactId>,
    failed: HashSet<ContactId>,
    records: HashMap<ContactId, MovementRecord>,
    attempt_tasks: HashMap<ContactId, JoinHandle<()>>,
    badge_timers: HashMap<ContactId, JoinHandle<()>>,
    next_epoch: u64,
}

impl ControllerState {
    fn allocate_epoch(&mut self) -> u64 {
        self.next_epoch = self.next_epoch.wrapping_add(1);
        self.next_epoch
    }

    /// Returns `true` when the stored record still belongs to the sequence
    /// activation identified by `epoch`.
    fn record_matches(&self, contact_id: ContactId, epoch: u64) -> bool {
        self.records
            .get(&contact_id)
            .is_some_and(|record| record.epoch() == epoch)
    }

    fn abort_attempt_task(&mut self, contact_id: ContactId) {
        if let Some(task) = self.attempt_tasks.remove(&contact_id) {
            task.abort();
        }
    }

    fn abort_badge_timer(&mut self, contact_id: ContactId) {
        if let Some(task) = self.badge_timers.remove(&contact_id) {
            task.abort();
        }
    }
}

impl<S, B, N, C> ControllerInner<S, B, N, C> {
    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S, B, N, C> MovementController<S, B, N, C>
where
    S: ContactStore + 'static,
    B: BoardSync + 'static,
    N: Notifier + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a controller with the default retry policy.
    #[must_use]
    pub fn new(store: Arc<S>, board: Arc<B>, notifier: Arc<N>, clock: Arc<C>) -> Self {
        Self::with_policy(store, board, notifier, clock, RetryPolicy::default())
    }

    /// Creates a controller with an explicit retry policy.
    #[must_use]
    pub fn with_policy(
        store: Arc<S>,
        board: Arc<B>,
        notifier: Arc<N>,
        clock: Arc<C>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                store,
                board,
                notifier,
                clock,
                policy,
                state: Mutex::new(ControllerState::default()),
            }),
        }
    }

    /// Requests a move of `contact_id` from `original_stage` to `new_stage`.
    ///
    /// The optimistic callback fires synchronously before this returns;
    /// persistence proceeds in the background. A contact that is already
    /// mid-move, or a move to the stage the contact already occupies, is a
    /// silent no-op.
    pub fn move_contact(
        &self,
        contact_id: ContactId,
        new_stage: StageId,
        original_stage: StageId,
    ) {
        let epoch = {
            let mut state = self.inner.lock_state();
            if state.moving.contains(&contact_id) {
                tracing::debug!(%contact_id, "move rejected: contact already in flight");
                return;
            }
            if new_stage == original_stage {
                tracing::debug!(%contact_id, %new_stage, "move rejected: contact already in stage");
                return;
            }
            state.abort_attempt_task(contact_id);
            let epoch = state.allocate_epoch();
            state.records.insert(
                contact_id,
                MovementRecord::new(
                    original_stage,
                    new_stage,
                    epoch,
                    self.inner.clock.as_ref(),
                ),
            );
            // In flight from the caller's perspective immediately, not only
            // once the spawned sequence is first polled. A contact is never
            // in both tracking sets.
            state.moving.insert(contact_id);
            state.failed.remove(&contact_id);
            epoch
        };

        tracing::debug!(%contact_id, %original_stage, %new_stage, "starting contact move");
        self.inner.board.apply_optimistic(contact_id, new_stage);
        self.spawn_attempts(contact_id, new_stage, original_stage, 0, epoch);
    }

    /// Restarts a terminally failed move at attempt zero.
    ///
    /// Re-applies the optimistic update towards the stage the failed move
    /// was attempting to reach. Silent no-op when the contact has no failed
    /// movement record.
    pub fn retry_failed_move(&self, contact_id: ContactId) {
        let (from_stage, to_stage, epoch) = {
            let mut state = self.inner.lock_state();
            let Some(record) = state.records.get(&contact_id) else {
                tracing::debug!(%contact_id, "retry rejected: no movement record");
                return;
            };
            if record.phase() != MovePhase::Failed {
                tracing::debug!(%contact_id, "retry rejected: move not in failed state");
                return;
            }
            let from_stage = record.from_stage();
            let to_stage = record.to_stage();
            state.abort_badge_timer(contact_id);
            state.failed.remove(&contact_id);
            state.moving.insert(contact_id);
            let epoch = state.allocate_epoch();
            if let Some(entry) = state.records.get_mut(&contact_id) {
                entry.restart(epoch, self.inner.clock.as_ref());
            }
            (from_stage, to_stage, epoch)
        };

        tracing::debug!(%contact_id, %to_stage, "retrying failed move");
        self.inner.board.apply_optimistic(contact_id, to_stage);
        self.spawn_attempts(contact_id, to_stage, from_stage, 0, epoch);
    }

    /// Cancels a pending or failed move and reverts the board.
    ///
    /// Timers are cancelled before any other state mutation so a retry
    /// firing concurrently cannot resolve a cancelled move. Silent no-op
    /// when the contact has no movement record.
    pub fn cancel_move(&self, contact_id: ContactId) {
        let from_stage = {
            let mut state = self.inner.lock_state();
            if !state.records.contains_key(&contact_id) {
                tracing::debug!(%contact_id, "cancel rejected: no movement record");
                return;
            }
            state.abort_attempt_task(contact_id);
            state.abort_badge_timer(contact_id);
            let Some(record) = state.records.remove(&contact_id) else {
                return;
            };
            state.moving.remove(&contact_id);
            state.failed.remove(&contact_id);
            record.from_stage()
        };

        tracing::debug!(%contact_id, %from_stage, "move cancelled");
        self.inner.board.apply_revert(contact_id, from_stage);
        self.inner.notifier.info(CANCELLED_MESSAGE, None);
    }

    /// Returns `true` while a persistence attempt or backoff window is
    /// pending for the contact.
    #[must_use]
    pub fn is_moving(&self, contact_id: ContactId) -> bool {
        self.inner.lock_state().moving.contains(&contact_id)
    }

    /// Returns `true` while the contact shows a failed-move badge.
    #[must_use]
    pub fn has_failed(&self, contact_id: ContactId) -> bool {
        self.inner.lock_state().failed.contains(&contact_id)
    }

    /// Cancels every pending timer and clears all movement state.
    ///
    /// Intended for component teardown; invokes no callbacks.
    pub fn cleanup(&self) {
        let mut state = self.inner.lock_state();
        for (_, task) in state.attempt_tasks.drain() {
            task.abort();
        }
        for (_, task) in state.badge_timers.drain() {
            task.abort();
        }
        state.records.clear();
        state.moving.clear();
        state.failed.clear();
    }

    fn spawn_attempts(
        &self,
        contact_id: ContactId,
        to_stage: StageId,
        from_stage: StageId,
        start_attempt: u32,
        epoch: u64,
    ) {
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            run_attempts(inner, contact_id, to_stage, from_stage, start_attempt, epoch).await;
        });
        let mut state = self.inner.lock_state();
        // The sequence may already have finished on another worker; a
        // finished handle would only go stale in the map.
        if !handle.is_finished() {
            state.attempt_tasks.insert(contact_id, handle);
        }
    }
}

/// Runs the persistence attempt sequence for one activation.
///
/// Strictly sequential per contact: each iteration performs one store call
/// and either finishes or sleeps out the backoff window before re-entering.
async fn run_attempts<S, B, N, C>(
    inner: Arc<ControllerInner<S, B, N, C>>,
    contact_id: ContactId,
    to_stage: StageId,
    from_stage: StageId,
    start_attempt: u32,
    epoch: u64,
) where
    S: ContactStore + 'static,
    B: BoardSync + 'static,
    N: Notifier + 'static,
    C: Clock + Send + Sync + 'static,
{
    let mut attempt = start_attempt;
    loop {
        if !begin_attempt(&inner, contact_id, epoch) {
            return;
        }

        let result = inner
            .store
            .update_contact(contact_id, ContactPatch::new().with_stage(to_stage))
            .await;

        match result {
            Ok(_) => {
                finish_success(&inner, contact_id, to_stage, epoch, attempt);
                return;
            }
            Err(err) if attempt < inner.policy.max_retries() => {
                let delay = inner.policy.delay_for(attempt);
                if !schedule_retry(&inner, contact_id, epoch) {
                    return;
                }
                tracing::warn!(
                    %contact_id,
                    attempt,
                    ?delay,
                    error = %err,
                    "contact update failed; retry scheduled"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                finish_failure(&inner, contact_id, from_stage, epoch, &err);
                return;
            }
        }
    }
}

/// Marks the contact in flight for the next attempt.
///
/// Returns `false` when the activation was cancelled or superseded.
fn begin_attempt<S, B, N, C>(
    inner: &ControllerInner<S, B, N, C>,
    contact_id: ContactId,
    epoch: u64,
) -> bool {
    let mut state = inner.lock_state();
    if !state.record_matches(contact_id, epoch) {
        return false;
    }
    state.moving.insert(contact_id);
    state.failed.remove(&contact_id);
    true
}

/// Bumps the attempt counter ahead of the backoff sleep.
///
/// Returns `false` when the activation was cancelled or superseded.
fn schedule_retry<S, B, N, C>(
    inner: &ControllerInner<S, B, N, C>,
    contact_id: ContactId,
    epoch: u64,
) -> bool
where
    C: Clock + Send + Sync,
{
    let mut state = inner.lock_state();
    if !state.record_matches(contact_id, epoch) {
        return false;
    }
    if let Some(record) = state.records.get_mut(&contact_id) {
        record.record_retry(inner.clock.as_ref());
    }
    true
}

fn finish_success<S, B, N, C>(
    inner: &Arc<ControllerInner<S, B, N, C>>,
    contact_id: ContactId,
    to_stage: StageId,
    epoch: u64,
    attempt: u32,
) where
    B: BoardSync,
    N: Notifier,
{
    {
        let mut state = inner.lock_state();
        if !state.record_matches(contact_id, epoch) {
            return;
        }
        state.moving.remove(&contact_id);
        state.records.remove(&contact_id);
        state.attempt_tasks.remove(&contact_id);
    }

    tracing::debug!(%contact_id, %to_stage, attempt, "contact move persisted");
    inner.board.apply_confirmed(contact_id, to_stage);
    if attempt > 0 {
        inner
            .notifier
            .success(RECOVERED_MESSAGE, Some(RECOVERED_TOAST));
    } else {
        inner.notifier.success(MOVED_MESSAGE, Some(MOVED_TOAST));
    }
}

fn finish_failure<S, B, N, C>(
    inner: &Arc<ControllerInner<S, B, N, C>>,
    contact_id: ContactId,
    from_stage: StageId,
    epoch: u64,
    err: &ContactStoreError,
) where
    S: ContactStore + 'static,
    B: BoardSync + 'static,
    N: Notifier + 'static,
    C: Clock + Send + Sync + 'static,
{
    {
        let mut state = inner.lock_state();
        if !state.record_matches(contact_id, epoch) {
            return;
        }
        state.moving.remove(&contact_id);
        state.failed.insert(contact_id);
        if let Some(record) = state.records.get_mut(&contact_id) {
            record.mark_failed();
        }
        state.attempt_tasks.remove(&contact_id);
        schedule_badge_clear(&mut state, inner, contact_id, epoch);
    }

    tracing::error!(%contact_id, error = %err, "contact move exhausted retries; reverting");
    inner.board.apply_revert(contact_id, from_stage);
    inner.notifier.error(REVERTED_MESSAGE, None);
}

/// Arms the fixed-delay auto-clear of the failure badge.
///
/// A pure timeout: only an explicit retry or cancel disarms it. The timer
/// drops the failed record of its own activation; a record a newer move
/// already replaced is left alone.
fn schedule_badge_clear<S, B, N, C>(
    state: &mut ControllerState,
    inner: &Arc<ControllerInner<S, B, N, C>>,
    contact_id: ContactId,
    epoch: u64,
) where
    S: ContactStore + 'static,
    B: BoardSync + 'static,
    N: Notifier + 'static,
    C: Clock + Send + Sync + 'static,
{
    let ttl = inner.policy.failure_badge_ttl();
    let timer_inner = Arc::clone(inner);
    let handle = tokio::spawn(async move {
        tokio::time::sleep(ttl).await;
        let mut timer_state = timer_inner.lock_state();
        timer_state.failed.remove(&contact_id);
        if timer_state.record_matches(contact_id, epoch) {
            timer_state.records.remove(&contact_id);
        }
        timer_state.badge_timers.remove(&contact_id);
    });
    state.badge_timers.insert(contact_id, handle);
}
