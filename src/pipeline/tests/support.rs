//! Shared fakes and fixtures for movement tests.

use crate::pipeline::domain::{ContactId, StageId};
use crate::pipeline::ports::BoardSync;
use std::sync::{Mutex, PoisonError};

/// One observed board callback, in invocation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardCall {
    /// `apply_optimistic` with the target stage.
    Optimistic(ContactId, StageId),
    /// `apply_revert` with the original stage.
    Revert(ContactId, StageId),
    /// `apply_confirmed` with the persisted stage.
    Confirmed(ContactId, StageId),
}

/// Board fake that records every callback.
#[derive(Debug, Default)]
pub struct RecordingBoard {
    calls: Mutex<Vec<BoardCall>>,
}

impl RecordingBoard {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every recorded call in invocation order.
    pub fn calls(&self) -> Vec<BoardCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns how many optimistic callbacks were recorded.
    pub fn optimistic_count(&self) -> usize {
        self.count(|call| matches!(call, BoardCall::Optimistic(_, _)))
    }

    /// Returns how many revert callbacks were recorded.
    pub fn revert_count(&self) -> usize {
        self.count(|call| matches!(call, BoardCall::Revert(_, _)))
    }

    /// Returns how many confirm callbacks were recorded.
    pub fn confirmed_count(&self) -> usize {
        self.count(|call| matches!(call, BoardCall::Confirmed(_, _)))
    }

    fn count(&self, predicate: impl Fn(&BoardCall) -> bool) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|call| predicate(call))
            .count()
    }
}

impl BoardSync for RecordingBoard {
    fn apply_optimistic(&self, contact_id: ContactId, new_stage: StageId) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(BoardCall::Optimistic(contact_id, new_stage));
    }

    fn apply_revert(&self, contact_id: ContactId, original_stage: StageId) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(BoardCall::Revert(contact_id, original_stage));
    }

    fn apply_confirmed(&self, contact_id: ContactId, new_stage: StageId) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(BoardCall::Confirmed(contact_id, new_stage));
    }
}
