//! Contact entity and pipeline stage descriptor.

use super::{ContactId, ListId, PipelineDomainError, StageId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A contact on the pipeline board.
///
/// The movement core mutates only `stage_id`; every other field is owned by
/// the wider CRM and carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    id: ContactId,
    name: String,
    stage_id: StageId,
    list_id: ListId,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedContactData {
    /// Persisted contact identifier.
    pub id: ContactId,
    /// Persisted display name.
    pub name: String,
    /// Persisted stage membership.
    pub stage_id: StageId,
    /// Persisted list membership.
    pub list_id: ListId,
    /// Persisted latest change timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// Creates a new contact in the given stage and list.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::EmptyContactName`] when the name is
    /// empty after trimming.
    pub fn new(
        name: impl Into<String>,
        stage_id: StageId,
        list_id: ListId,
        clock: &impl Clock,
    ) -> Result<Self, PipelineDomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(PipelineDomainError::EmptyContactName);
        }
        Ok(Self {
            id: ContactId::new(),
            name,
            stage_id,
            list_id,
            updated_at: clock.utc(),
        })
    }

    /// Reconstructs a contact from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedContactData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            stage_id: data.stage_id,
            list_id: data.list_id,
            updated_at: data.updated_at,
        }
    }

    /// Returns the contact identifier.
    #[must_use]
    pub const fn id(&self) -> ContactId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stage the contact currently occupies.
    #[must_use]
    pub const fn stage_id(&self) -> StageId {
        self.stage_id
    }

    /// Returns the list the contact belongs to.
    #[must_use]
    pub const fn list_id(&self) -> ListId {
        self.list_id
    }

    /// Returns the latest change timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Moves the contact to a stage, refreshing the change timestamp.
    pub fn move_to_stage(&mut self, stage_id: StageId, clock: &impl Clock) {
        self.stage_id = stage_id;
        self.updated_at = clock.utc();
    }

    /// Renames the contact, refreshing the change timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::EmptyContactName`] when the name is
    /// empty after trimming.
    pub fn rename(
        &mut self,
        name: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), PipelineDomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(PipelineDomainError::EmptyContactName);
        }
        self.name = name;
        self.updated_at = clock.utc();
        Ok(())
    }

    /// Moves the contact to another list, refreshing the change timestamp.
    pub fn move_to_list(&mut self, list_id: ListId, clock: &impl Clock) {
        self.list_id = list_id;
        self.updated_at = clock.utc();
    }

    /// Returns the contact with its stage replaced, without touching the
    /// change timestamp.
    ///
    /// Used when reapplying a locally confirmed move onto a fetched snapshot
    /// row: the row keeps its backend timestamp so later merges still compare
    /// against the backend's view of freshness.
    #[must_use]
    pub fn with_stage(mut self, stage_id: StageId) -> Self {
        self.stage_id = stage_id;
        self
    }
}

/// A stage column on the pipeline board.
///
/// Immutable from the movement core's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStage {
    id: StageId,
    name: String,
    position: u32,
    color: String,
}

impl PipelineStage {
    /// Creates a stage with the given ordering position and display colour.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::EmptyStageName`] when the name is empty
    /// after trimming.
    pub fn new(
        name: impl Into<String>,
        position: u32,
        color: impl Into<String>,
    ) -> Result<Self, PipelineDomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(PipelineDomainError::EmptyStageName);
        }
        Ok(Self {
            id: StageId::new(),
            name,
            position,
            color: color.into(),
        })
    }

    /// Returns the stage identifier.
    #[must_use]
    pub const fn id(&self) -> StageId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the ordering key within the board.
    #[must_use]
    pub const fn position(&self) -> u32 {
        self.position
    }

    /// Returns the display colour.
    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }
}
