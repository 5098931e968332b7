//! Book entity

use crate::entity::{CatalogEntity, GraphProjection, PropertyMap};
use crate::id::EntityId;
use crate::kind::EntityKind;
use crate::model::embed::{AuthorEmbed, GenreEmbed};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// A catalog book
///
/// Authors and genres are carried as embeds so reads need no joins; the
/// canonical Author/Genre documents remain the source of truth for the
/// projected `name` fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Store-assigned id (`None` before first insert)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    /// Book title (natural key for deduplication)
    pub title: String,
    /// ISBN, if known
    #[serde(default)]
    pub isbn: Option<String>,
    /// Publication date
    #[serde(default)]
    pub published: Option<NaiveDate>,
    /// Back-cover summary
    #[serde(default)]
    pub summary: Option<String>,
    /// Embedded author references
    #[serde(default)]
    pub authors: Vec<AuthorEmbed>,
    /// Embedded genre references
    #[serde(default)]
    pub genres: Vec<GenreEmbed>,
    /// Running average rating across reviews
    #[serde(default)]
    pub rating_avg: f64,
    /// Number of reviews contributing to the average
    #[serde(default)]
    pub rating_count: u64,
}

impl Book {
    /// Build a book with just a title, id unassigned
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            isbn: None,
            published: None,
            summary: None,
            authors: Vec::new(),
            genres: Vec::new(),
            rating_avg: 0.0,
            rating_count: 0,
        }
    }
}

impl CatalogEntity for Book {
    const KIND: EntityKind = EntityKind::Book;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn assign_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn validate(&self) -> crate::Result<()> {
        if self.title.is_empty() {
            return Err(crate::Error::MissingField {
                kind: Self::KIND,
                field: "title",
            });
        }
        Ok(())
    }

    fn natural_key(&self) -> Option<&str> {
        if self.title.is_empty() {
            None
        } else {
            Some(&self.title)
        }
    }

    fn natural_key_field() -> Option<&'static str> {
        Some("title")
    }

    fn graph_projection(&self) -> Option<GraphProjection> {
        let id = self.id?;
        let mut properties = PropertyMap::new();
        properties.insert("title".to_string(), json!(self.title));
        Some(GraphProjection::Node {
            label: "Book",
            id,
            properties,
        })
    }

    fn graph_projected_fields() -> &'static [&'static str] {
        &["title"]
    }
}
