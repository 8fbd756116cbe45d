//! Consumer-side synchronisation port for the pipeline board.

use crate::pipeline::domain::{ContactId, StageId};

/// One-directional state sync into the board view model.
///
/// The movement controller never reads or writes the consumer's contact
/// list directly; these three callbacks are the sole synchronisation
/// mechanism. They stay distinct because the three invocation points carry
/// different invariants: pre-commit, rollback, and post-commit.
pub trait BoardSync: Send + Sync {
    /// Reflects a requested move before the backend has confirmed it.
    ///
    /// Invoked synchronously from `move_contact`, before any persistence
    /// attempt starts.
    fn apply_optimistic(&self, contact_id: ContactId, new_stage: StageId);

    /// Rolls a contact back to its pre-move stage after an exhausted or
    /// cancelled move.
    fn apply_revert(&self, contact_id: ContactId, original_stage: StageId);

    /// Confirms that a move has been persisted by the backend.
    fn apply_confirmed(&self, contact_id: ContactId, new_stage: StageId);
}
