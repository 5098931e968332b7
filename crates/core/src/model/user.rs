//! User entity with role variants
//!
//! One identity with role-specific extra state: the role is a tagged union
//! carrying only the fields relevant to that role, selected by an explicit
//! `role` tag in the document rather than runtime type inspection.

use crate::entity::{CatalogEntity, GraphProjection, PropertyMap};
use crate::id::EntityId;
use crate::kind::EntityKind;
use crate::model::embed::ShelfEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Role-specific user state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum UserRole {
    /// Platform administrator
    Admin {
        /// Granted permission names
        #[serde(default)]
        permissions: Vec<String>,
    },
    /// Reading user with a personal shelf
    Reader {
        /// Shelved books (embedded, read-optimized)
        #[serde(default)]
        shelf: Vec<ShelfEntry>,
    },
    /// Verified reviewer
    Reviewer {
        /// Whether the reviewer identity has been verified
        #[serde(default)]
        verified: bool,
        /// Number of published reviews
        #[serde(default)]
        review_count: u64,
    },
}

/// A platform user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned id (`None` before first insert)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    /// Login name (natural key for deduplication)
    pub username: String,
    /// Contact email
    pub email: String,
    /// Account creation time
    pub joined: DateTime<Utc>,
    /// Role tag plus role-specific state
    #[serde(flatten)]
    pub role: UserRole,
}

impl User {
    /// Build a reader with an empty shelf, id unassigned
    pub fn reader(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            email: email.into(),
            joined: Utc::now(),
            role: UserRole::Reader { shelf: Vec::new() },
        }
    }
}

impl CatalogEntity for User {
    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn assign_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn validate(&self) -> crate::Result<()> {
        if self.username.is_empty() {
            return Err(crate::Error::MissingField {
                kind: Self::KIND,
                field: "username",
            });
        }
        Ok(())
    }

    fn natural_key(&self) -> Option<&str> {
        if self.username.is_empty() {
            None
        } else {
            Some(&self.username)
        }
    }

    fn natural_key_field() -> Option<&'static str> {
        Some("username")
    }

    /// Every user projects as a `Reader` node: the graph models people and
    /// their rating edges, and the role tag is irrelevant to traversal.
    fn graph_projection(&self) -> Option<GraphProjection> {
        let id = self.id?;
        let mut properties = PropertyMap::new();
        properties.insert("username".to_string(), json!(self.username));
        Some(GraphProjection::Node {
            label: "Reader",
            id,
            properties,
        })
    }

    fn graph_projected_fields() -> &'static [&'static str] {
        &["username"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_tag_serialization() {
        let user = User::reader("sylvie", "sylvie@example.com");
        let doc = serde_json::to_value(&user).unwrap();
        assert_eq!(doc["role"], json!("reader"));
        assert!(doc["shelf"].is_array());
    }

    #[test]
    fn test_role_tag_deserialization_selects_variant() {
        let doc = json!({
            "username": "admin1",
            "email": "admin@example.com",
            "joined": Utc::now(),
            "role": "admin",
            "permissions": ["manage_users"]
        });
        let user: User = serde_json::from_value(doc).unwrap();
        match user.role {
            UserRole::Admin { permissions } => assert_eq!(permissions, vec!["manage_users"]),
            other => panic!("expected admin role, got {:?}", other),
        }
    }

    #[test]
    fn test_reviewer_defaults() {
        let doc = json!({
            "username": "critic",
            "email": "critic@example.com",
            "joined": Utc::now(),
            "role": "reviewer"
        });
        let user: User = serde_json::from_value(doc).unwrap();
        match user.role {
            UserRole::Reviewer {
                verified,
                review_count,
            } => {
                assert!(!verified);
                assert_eq!(review_count, 0);
            }
            other => panic!("expected reviewer role, got {:?}", other),
        }
    }

    #[test]
    fn test_all_roles_project_as_reader_node() {
        let mut user = User::reader("sylvie", "sylvie@example.com");
        user.assign_id(EntityId::generate());
        user.role = UserRole::Admin {
            permissions: vec![],
        };
        match user.graph_projection().unwrap() {
            GraphProjection::Node { label, .. } => assert_eq!(label, "Reader"),
            other => panic!("expected node projection, got {:?}", other),
        }
    }
}
