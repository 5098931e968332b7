//! Bulk-import audit records
//!
//! One report is created per batch attempt and never mutated afterwards.
//! Reports are persisted through the primary store (their own collection)
//! on success and failure alike; the `success` flag and message distinguish
//! the two paths.

use crate::entity::CatalogEntity;
use crate::id::EntityId;
use crate::kind::EntityKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit record for one bulk-import batch attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Store-assigned id (`None` before the report itself is persisted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    /// Where the records came from (upload name, feed url, job id)
    pub source: String,
    /// Entity kind the batch targeted
    pub kind: EntityKind,
    /// Records submitted to the batch (after parse filtering)
    pub attempted: u64,
    /// Records resolved successfully (inserted or matched to existing)
    pub succeeded: u64,
    /// Ids affected by the batch (inserted or matched existing)
    pub affected_ids: Vec<EntityId>,
    /// Whether the batch as a whole succeeded
    pub success: bool,
    /// Human-readable outcome, including the failure message on error
    pub message: String,
    /// Original file name, when the source was a file
    #[serde(default)]
    pub file_name: Option<String>,
    /// Original file size in bytes, when known
    #[serde(default)]
    pub file_size: Option<u64>,
    /// When the batch attempt ran
    pub created_at: DateTime<Utc>,
}

impl ImportReport {
    /// Build a successful report
    pub fn succeeded(
        source: impl Into<String>,
        kind: EntityKind,
        attempted: u64,
        affected_ids: Vec<EntityId>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            source: source.into(),
            kind,
            attempted,
            succeeded: affected_ids.len() as u64,
            affected_ids,
            success: true,
            message: message.into(),
            file_name: None,
            file_size: None,
            created_at: Utc::now(),
        }
    }

    /// Build a failed report carrying the batch-level error message
    pub fn failed(
        source: impl Into<String>,
        kind: EntityKind,
        attempted: u64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            source: source.into(),
            kind,
            attempted,
            succeeded: 0,
            affected_ids: Vec::new(),
            success: false,
            message: message.into(),
            file_name: None,
            file_size: None,
            created_at: Utc::now(),
        }
    }

    /// Attach original file identity
    pub fn with_file(mut self, name: impl Into<String>, size: u64) -> Self {
        self.file_name = Some(name.into());
        self.file_size = Some(size);
        self
    }
}

/// Reports live in their own primary-store collection. They are never
/// cached and never projected to the secondary index.
impl CatalogEntity for ImportReport {
    const KIND: EntityKind = EntityKind::ImportReport;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn assign_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_succeeded_counts_affected() {
        let ids = vec![EntityId::generate(), EntityId::generate()];
        let report = ImportReport::succeeded("feed-a", EntityKind::Genre, 3, ids.clone(), "ok");
        assert!(report.success);
        assert_eq!(report.attempted, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.affected_ids, ids);
    }

    #[test]
    fn test_failed_has_no_ids() {
        let report = ImportReport::failed("feed-a", EntityKind::Book, 10, "primary unavailable");
        assert!(!report.success);
        assert_eq!(report.succeeded, 0);
        assert!(report.affected_ids.is_empty());
        assert!(report.message.contains("primary unavailable"));
    }

    #[test]
    fn test_with_file() {
        let report = ImportReport::failed("upload", EntityKind::Genre, 0, "empty")
            .with_file("genres.ndjson", 2048);
        assert_eq!(report.file_name.as_deref(), Some("genres.ndjson"));
        assert_eq!(report.file_size, Some(2048));
    }
}
