//! Notification entity
//!
//! Notifications live only in the primary store: they have no graph
//! projection and no natural key.

use crate::entity::CatalogEntity;
use crate::id::EntityId;
use crate::kind::EntityKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-facing notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Store-assigned id (`None` before first insert)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    /// Recipient user id
    pub user_id: EntityId,
    /// Notification body
    pub message: String,
    /// Creation time
    pub created: DateTime<Utc>,
    /// Whether the recipient has read it
    #[serde(default)]
    pub read: bool,
}

impl CatalogEntity for Notification {
    const KIND: EntityKind = EntityKind::Notification;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn assign_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}
