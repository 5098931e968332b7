//! Core types for the shelfsync write coordinator
//!
//! This crate defines the foundational types used throughout the system:
//! - EntityId: Opaque identifier assigned by the primary store on insert
//! - EntityKind: Discriminates the catalog entity families
//! - CacheKey: Deterministic `<kind>:<id>` cache addressing
//! - CatalogEntity: Per-entity configuration consumed by the coordinator
//! - GraphProjection: Denormalized node/edge view pushed to the secondary index
//! - FieldUpdate: Named-field partial updates
//! - Domain model: Author, Book, Genre, User (role variants), Review, Notification
//! - ImportReport: Per-batch bulk-import audit record
//! - Error: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entity;
pub mod error;
pub mod id;
pub mod kind;
pub mod model;
pub mod report;

pub use entity::{CatalogEntity, FieldUpdate, GraphProjection, PropertyMap};
pub use error::{Error, Result};
pub use id::EntityId;
pub use kind::{CacheKey, EntityKind};
pub use model::{
    Author, AuthorEmbed, Book, BookEmbed, Genre, GenreEmbed, Notification, Review, ShelfEntry,
    User, UserRole,
};
pub use report::ImportReport;
