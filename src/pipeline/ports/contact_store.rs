//! Persistence gateway port for contact records.

use crate::pipeline::domain::{Contact, ContactId, ListId, StageId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for contact store operations.
pub type ContactStoreResult<T> = Result<T, ContactStoreError>;

/// Partial-fields update for a single contact.
///
/// Single-record upsert semantics: the store applies every populated field
/// or none of them. The movement core only ever populates `stage_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPatch {
    stage_id: Option<StageId>,
    name: Option<String>,
    list_id: Option<ListId>,
}

impl ContactPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the target stage.
    #[must_use]
    pub const fn with_stage(mut self, stage_id: StageId) -> Self {
        self.stage_id = Some(stage_id);
        self
    }

    /// Sets a new display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets a new list membership.
    #[must_use]
    pub const fn with_list(mut self, list_id: ListId) -> Self {
        self.list_id = Some(list_id);
        self
    }

    /// Returns the target stage, if set.
    #[must_use]
    pub const fn stage_id(&self) -> Option<StageId> {
        self.stage_id
    }

    /// Returns the new display name, if set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the new list membership, if set.
    #[must_use]
    pub const fn list_id(&self) -> Option<ListId> {
        self.list_id
    }

    /// Returns `true` when no field is populated.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.stage_id.is_none() && self.name.is_none() && self.list_id.is_none()
    }
}

/// Contact persistence contract.
///
/// The backing store is remote and fallible; callers own retry policy.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Applies a partial update to a single contact and returns the stored
    /// record. All-or-nothing; there are no multi-record transactions.
    ///
    /// # Errors
    ///
    /// Returns [`ContactStoreError::NotFound`] when the contact does not
    /// exist, or [`ContactStoreError::Persistence`] on transport or storage
    /// failure.
    async fn update_contact(
        &self,
        contact_id: ContactId,
        patch: ContactPatch,
    ) -> ContactStoreResult<Contact>;

    /// Returns a snapshot of every stored contact.
    ///
    /// # Errors
    ///
    /// Returns [`ContactStoreError::Persistence`] on transport or storage
    /// failure.
    async fn list_contacts(&self) -> ContactStoreResult<Vec<Contact>>;
}

/// Errors returned by contact store implementations.
#[derive(Debug, Clone, Error)]
pub enum ContactStoreError {
    /// The contact was not found.
    #[error("contact not found: {0}")]
    NotFound(ContactId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ContactStoreError {
    /// Wraps a persistence error.
    #[must_use]
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
