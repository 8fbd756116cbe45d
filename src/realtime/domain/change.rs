//! Change notifications pushed by the realtime feed.

use serde::{Deserialize, Serialize};

/// Watched entity collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Contact records.
    Contacts,
    /// Contact lists.
    Lists,
    /// Sales agents.
    Agents,
    /// Pipeline stage columns.
    PipelineStages,
    /// Contact tags.
    Tags,
    /// User-defined contact fields.
    CustomFields,
    /// Per-user dashboard layout. Watched but never triggers a refetch;
    /// the dashboard consumes its own changes.
    DashboardConfigs,
}

impl Collection {
    /// Every collection the reconciliation layer subscribes to.
    pub const ALL: [Self; 7] = [
        Self::Contacts,
        Self::Lists,
        Self::Agents,
        Self::PipelineStages,
        Self::Tags,
        Self::CustomFields,
        Self::DashboardConfigs,
    ];

    /// Returns the backing table name.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Contacts => "contacts",
            Self::Lists => "lists",
            Self::Agents => "agents",
            Self::PipelineStages => "pipeline_stages",
            Self::Tags => "tags",
            Self::CustomFields => "custom_fields",
            Self::DashboardConfigs => "dashboard_configs",
        }
    }

    /// Returns the subscription channel name.
    #[must_use]
    pub const fn channel(self) -> &'static str {
        match self {
            Self::Contacts => "contacts-changes",
            Self::Lists => "lists-changes",
            Self::Agents => "agents-changes",
            Self::PipelineStages => "stages-changes",
            Self::Tags => "tags-changes",
            Self::CustomFields => "fields-changes",
            Self::DashboardConfigs => "dashboard-changes",
        }
    }
}

/// Kind of mutation a notification describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    /// A row was inserted.
    Insert,
    /// A row was updated.
    Update,
    /// A row was deleted.
    Delete,
}

/// Wire-level row image carried in a notification.
///
/// The feed serialises whole rows; the reconciliation layer only needs the
/// identifier and the stage-identifying field to classify the change, so
/// those are lifted out and every remaining column rides along as loose
/// JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordImage {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stage_id: Option<String>,
    #[serde(flatten)]
    rest: serde_json::Map<String, serde_json::Value>,
}

impl RecordImage {
    /// Creates an image for a row without stage membership.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            stage_id: None,
            rest: serde_json::Map::new(),
        }
    }

    /// Decodes an image from a serialised row as the feed delivers it.
    ///
    /// # Errors
    ///
    /// Returns the deserialisation error when the row is not an object or
    /// lacks a string `id` field.
    pub fn from_row(row: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(row)
    }

    /// Sets the stage-identifying field.
    #[must_use]
    pub fn with_stage(mut self, stage_id: impl Into<String>) -> Self {
        self.stage_id = Some(stage_id.into());
        self
    }

    /// Returns the row identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the stage-identifying field, if the row carries one.
    #[must_use]
    pub fn stage_id(&self) -> Option<&str> {
        self.stage_id.as_deref()
    }

    /// Returns another column of the row, if the feed delivered one.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.rest.get(name)
    }
}

/// One push notification from the realtime feed.
///
/// Delivery is best-effort, at-least-once, and unordered relative to local
/// writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    collection: Collection,
    kind: ChangeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    old: Option<RecordImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    new: Option<RecordImage>,
}

impl ChangeEvent {
    /// Creates an insert notification.
    #[must_use]
    pub const fn insert(collection: Collection, new: RecordImage) -> Self {
        Self {
            collection,
            kind: ChangeKind::Insert,
            old: None,
            new: Some(new),
        }
    }

    /// Creates an update notification with before and after images.
    #[must_use]
    pub const fn update(collection: Collection, old: RecordImage, new: RecordImage) -> Self {
        Self {
            collection,
            kind: ChangeKind::Update,
            old: Some(old),
            new: Some(new),
        }
    }

    /// Creates a delete notification.
    #[must_use]
    pub const fn delete(collection: Collection, old: RecordImage) -> Self {
        Self {
            collection,
            kind: ChangeKind::Delete,
            old: Some(old),
            new: None,
        }
    }

    /// Returns the collection the change belongs to.
    #[must_use]
    pub const fn collection(&self) -> Collection {
        self.collection
    }

    /// Returns the mutation kind.
    #[must_use]
    pub const fn kind(&self) -> ChangeKind {
        self.kind
    }

    /// Returns the before image, if present.
    #[must_use]
    pub const fn old(&self) -> Option<&RecordImage> {
        self.old.as_ref()
    }

    /// Returns the after image, if present.
    #[must_use]
    pub const fn new_image(&self) -> Option<&RecordImage> {
        self.new.as_ref()
    }

    /// Returns `true` for a contact update whose before and after images
    /// differ in the stage-identifying field.
    #[must_use]
    pub fn is_stage_transition(&self) -> bool {
        if self.collection != Collection::Contacts || self.kind != ChangeKind::Update {
            return false;
        }
        match (&self.old, &self.new) {
            (Some(old), Some(new)) => old.stage_id() != new.stage_id(),
            _ => false,
        }
    }
}
