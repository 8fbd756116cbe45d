//! Movement lifecycle state and retry policy.

use super::StageId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::time::Duration;

/// Lifecycle phase of a tracked movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovePhase {
    /// A persistence attempt is pending or waiting out a backoff window.
    Attempting,
    /// Retries are exhausted; the move was reverted and awaits an explicit
    /// retry or cancel.
    Failed,
}

/// Per-contact movement state.
///
/// Exactly one record exists per contact with an active or failed move. The
/// record survives terminal failure so an explicit retry or cancel can
/// recover the original from/to stages; it is dropped on terminal success,
/// cancel, or controller teardown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementRecord {
    from_stage: StageId,
    to_stage: StageId,
    attempt: u32,
    phase: MovePhase,
    requested_at: DateTime<Utc>,
    epoch: u64,
}

impl MovementRecord {
    /// Creates a record for a freshly requested move at attempt zero.
    #[must_use]
    pub fn new(from_stage: StageId, to_stage: StageId, epoch: u64, clock: &impl Clock) -> Self {
        Self {
            from_stage,
            to_stage,
            attempt: 0,
            phase: MovePhase::Attempting,
            requested_at: clock.utc(),
            epoch,
        }
    }

    /// Returns the stage the contact occupied before the move.
    #[must_use]
    pub const fn from_stage(&self) -> StageId {
        self.from_stage
    }

    /// Returns the stage the move is attempting to reach.
    #[must_use]
    pub const fn to_stage(&self) -> StageId {
        self.to_stage
    }

    /// Returns the number of attempts performed so far.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Returns the current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> MovePhase {
        self.phase
    }

    /// Returns the timestamp of the most recent attempt or restart.
    #[must_use]
    pub const fn requested_at(&self) -> DateTime<Utc> {
        self.requested_at
    }

    /// Returns the activation epoch guarding this record.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Records a scheduled retry: bumps the attempt counter and refreshes
    /// the timestamp.
    pub fn record_retry(&mut self, clock: &impl Clock) {
        self.attempt = self.attempt.saturating_add(1);
        self.requested_at = clock.utc();
    }

    /// Marks the record as terminally failed.
    pub const fn mark_failed(&mut self) {
        self.phase = MovePhase::Failed;
    }

    /// Rearms a failed record for a fresh attempt sequence under a new
    /// epoch.
    pub fn restart(&mut self, epoch: u64, clock: &impl Clock) {
        self.attempt = 0;
        self.phase = MovePhase::Attempting;
        self.requested_at = clock.utc();
        self.epoch = epoch;
    }
}

/// Retry and backoff policy for contact movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff: Vec<Duration>,
    failure_badge_ttl: Duration,
}

impl RetryPolicy {
    /// Creates a policy with explicit limits.
    ///
    /// An empty backoff schedule falls back to the default final delay.
    #[must_use]
    pub const fn new(max_retries: u32, backoff: Vec<Duration>, failure_badge_ttl: Duration) -> Self {
        Self {
            max_retries,
            backoff,
            failure_badge_ttl,
        }
    }

    /// Returns the number of retries allowed after the initial attempt.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns how long a failure badge stays visible before auto-clearing.
    #[must_use]
    pub const fn failure_badge_ttl(&self) -> Duration {
        self.failure_badge_ttl
    }

    /// Returns the backoff delay preceding the retry after `attempt`.
    ///
    /// Attempts beyond the schedule reuse the final delay.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let index = usize::try_from(attempt).unwrap_or(usize::MAX);
        self.backoff
            .get(index)
            .or_else(|| self.backoff.last())
            .copied()
            .unwrap_or(FINAL_BACKOFF)
    }
}

const FINAL_BACKOFF: Duration = Duration::from_millis(2000);

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: vec![
                Duration::from_millis(500),
                Duration::from_millis(1000),
                FINAL_BACKOFF,
            ],
            failure_badge_ttl: Duration::from_millis(5000),
        }
    }
}
