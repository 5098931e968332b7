//! Author entity

use crate::entity::{CatalogEntity, GraphProjection, PropertyMap};
use crate::id::EntityId;
use crate::kind::EntityKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// A book author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    /// Store-assigned id (`None` before first insert)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    /// Author name (natural key for deduplication)
    pub name: String,
    /// Short biography
    #[serde(default)]
    pub biography: Option<String>,
    /// Birth date
    #[serde(default)]
    pub born: Option<NaiveDate>,
    /// Death date, if deceased
    #[serde(default)]
    pub died: Option<NaiveDate>,
}

impl Author {
    /// Build an author with just a name, id unassigned
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            biography: None,
            born: None,
            died: None,
        }
    }
}

impl CatalogEntity for Author {
    const KIND: EntityKind = EntityKind::Author;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn assign_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn validate(&self) -> crate::Result<()> {
        if self.name.is_empty() {
            return Err(crate::Error::MissingField {
                kind: Self::KIND,
                field: "name",
            });
        }
        Ok(())
    }

    fn natural_key(&self) -> Option<&str> {
        if self.name.is_empty() {
            None
        } else {
            Some(&self.name)
        }
    }

    fn natural_key_field() -> Option<&'static str> {
        Some("name")
    }

    fn graph_projection(&self) -> Option<GraphProjection> {
        let id = self.id?;
        let mut properties = PropertyMap::new();
        properties.insert("name".to_string(), json!(self.name));
        Some(GraphProjection::Node {
            label: "Author",
            id,
            properties,
        })
    }

    fn graph_projected_fields() -> &'static [&'static str] {
        &["name"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_requires_id() {
        let author = Author::named("Ursula K. Le Guin");
        assert!(author.graph_projection().is_none());
    }

    #[test]
    fn test_projection_carries_name() {
        let mut author = Author::named("Ursula K. Le Guin");
        author.assign_id(EntityId::generate());
        match author.graph_projection().unwrap() {
            GraphProjection::Node {
                label, properties, ..
            } => {
                assert_eq!(label, "Author");
                assert_eq!(properties["name"], json!("Ursula K. Le Guin"));
            }
            other => panic!("expected node projection, got {:?}", other),
        }
    }

    #[test]
    fn test_natural_key_empty_name() {
        let author = Author::named("");
        assert!(author.natural_key().is_none());
    }
}
