//! Review entity

use crate::entity::{CatalogEntity, GraphProjection, PropertyMap};
use crate::id::EntityId;
use crate::kind::EntityKind;
use crate::model::embed::BookEmbed;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// A reader's review of a book
///
/// Projects into the secondary index as a `RATED` edge from the reader node
/// to the book node, carrying the rating and timestamp. The `rating` field
/// is graph-projected, so rating updates push a fresh edge merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Store-assigned id (`None` before first insert)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    /// Reviewed book (embedded, read-optimized)
    pub book: BookEmbed,
    /// Id of the reviewing reader
    pub reader_id: EntityId,
    /// Star rating, 1 through 5
    pub rating: u8,
    /// Review text
    #[serde(default)]
    pub body: Option<String>,
    /// When the review was posted
    pub posted: DateTime<Utc>,
}

impl CatalogEntity for Review {
    const KIND: EntityKind = EntityKind::Review;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn assign_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn graph_projection(&self) -> Option<GraphProjection> {
        // Edge identity comes from reader and book, not the review id, so a
        // projection is available as soon as those references exist.
        self.id?;
        let mut properties = PropertyMap::new();
        properties.insert("rating".to_string(), json!(self.rating));
        properties.insert("timestamp".to_string(), json!(self.posted.timestamp()));
        Some(GraphProjection::Edge {
            from_label: "Reader",
            from_id: self.reader_id,
            to_label: "Book",
            to_id: self.book.id,
            rel_type: "RATED",
            properties,
        })
    }

    fn graph_projected_fields() -> &'static [&'static str] {
        &["rating"]
    }
}
