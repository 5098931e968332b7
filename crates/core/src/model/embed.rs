//! Denormalized embeds
//!
//! Partial copies of canonical entities stored inside other entities for
//! read efficiency. Each embed documents which source fields are projected;
//! when one of those fields changes on the source entity, the copies are
//! stale until the owning documents are rewritten or re-read.

use crate::id::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Embedded author reference (projected fields: `name`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorEmbed {
    /// Id of the canonical [`crate::Author`]
    pub id: EntityId,
    /// Copied author name
    pub name: String,
}

/// Embedded genre reference (projected fields: `name`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreEmbed {
    /// Id of the canonical [`crate::Genre`]
    pub id: EntityId,
    /// Copied genre name
    pub name: String,
}

/// Embedded book reference (projected fields: `title`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookEmbed {
    /// Id of the canonical [`crate::Book`]
    pub id: EntityId,
    /// Copied book title
    pub title: String,
}

/// A book on a reader's shelf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelfEntry {
    /// The shelved book
    pub book: BookEmbed,
    /// When the book was added to the shelf
    pub added: DateTime<Utc>,
}
