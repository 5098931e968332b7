//! Entity kinds and cache key construction
//!
//! The kind discriminates the catalog entity families and provides the
//! primary-store collection name, the secondary-index node label, and the
//! cache key namespace.

use crate::id::EntityId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog entity family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Book authors
    Author,
    /// Catalog books
    Book,
    /// Book genres
    Genre,
    /// Platform users (admin / reader / reviewer variants)
    User,
    /// Reader reviews of books
    Review,
    /// User-facing notifications
    Notification,
    /// Bulk-import audit reports
    ImportReport,
}

impl EntityKind {
    /// All kinds that own a primary-store collection
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Author,
        EntityKind::Book,
        EntityKind::Genre,
        EntityKind::User,
        EntityKind::Review,
        EntityKind::Notification,
        EntityKind::ImportReport,
    ];

    /// Lowercase stable name, used as the cache key namespace
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Author => "author",
            EntityKind::Book => "book",
            EntityKind::Genre => "genre",
            EntityKind::User => "user",
            EntityKind::Review => "review",
            EntityKind::Notification => "notification",
            EntityKind::ImportReport => "import_report",
        }
    }

    /// Primary-store collection name (collection per entity kind)
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Author => "authors",
            EntityKind::Book => "books",
            EntityKind::Genre => "genres",
            EntityKind::User => "users",
            EntityKind::Review => "reviews",
            EntityKind::Notification => "notifications",
            EntityKind::ImportReport => "import_reports",
        }
    }

    /// Secondary-index node label, if this kind is represented in the graph
    ///
    /// Users project as `Reader` nodes (the person in the recommendation
    /// graph, regardless of role tag). Reviews project as edges rather than
    /// nodes, and notifications are not indexed at all.
    pub fn node_label(&self) -> Option<&'static str> {
        match self {
            EntityKind::Author => Some("Author"),
            EntityKind::Book => Some("Book"),
            EntityKind::Genre => Some("Genre"),
            EntityKind::User => Some("Reader"),
            EntityKind::Review | EntityKind::Notification | EntityKind::ImportReport => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deterministic cache key: `<kind>:<id>`
///
/// Built purely from the entity kind and id. No other fields participate,
/// so the same key always addresses the same logical entity regardless of
/// which call path populated it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build the key for an entity
    pub fn new(kind: EntityKind, id: &EntityId) -> Self {
        Self(format!("{}:{}", kind.as_str(), id))
    }

    /// The key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_format() {
        let id = EntityId::generate();
        let key = CacheKey::new(EntityKind::Book, &id);
        assert_eq!(key.as_str(), format!("book:{}", id));
    }

    #[test]
    fn test_cache_key_deterministic() {
        let id = EntityId::generate();
        assert_eq!(
            CacheKey::new(EntityKind::Genre, &id),
            CacheKey::new(EntityKind::Genre, &id)
        );
    }

    #[test]
    fn test_cache_key_namespaced_by_kind() {
        let id = EntityId::generate();
        assert_ne!(
            CacheKey::new(EntityKind::Author, &id),
            CacheKey::new(EntityKind::User, &id)
        );
    }

    #[test]
    fn test_collection_names_unique() {
        let mut names: Vec<_> = EntityKind::ALL.iter().map(|k| k.collection()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), EntityKind::ALL.len());
    }

    #[test]
    fn test_node_labels() {
        assert_eq!(EntityKind::User.node_label(), Some("Reader"));
        assert_eq!(EntityKind::Review.node_label(), None);
        assert_eq!(EntityKind::Notification.node_label(), None);
    }
}
