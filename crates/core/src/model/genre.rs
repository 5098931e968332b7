//! Genre entity

use crate::entity::{CatalogEntity, GraphProjection, PropertyMap};
use crate::id::EntityId;
use crate::kind::EntityKind;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// A book genre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    /// Store-assigned id (`None` before first insert)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    /// Genre name (natural key for deduplication)
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
}

impl Genre {
    /// Build a genre with just a name, id unassigned
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
        }
    }
}

impl CatalogEntity for Genre {
    const KIND: EntityKind = EntityKind::Genre;

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
            label: "Genre",
            id,
            properties,
        })
    }

    fn graph_projected_fields() -> &'static [&'static str] {
        &["name"]
    }
}
