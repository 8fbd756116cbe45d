//! Domain types for pipeline contacts and stage movement.

mod contact;
mod error;
mod ids;
mod movement;

pub use contact::{Contact, PersistedContactData, PipelineStage};
pub use error::PipelineDomainError;
pub use ids::{ContactId, ListId, StageId};
pub use movement::{MovePhase, MovementRecord, RetryPolicy};
