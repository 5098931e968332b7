//! Catalog domain model
//!
//! Canonical entity shapes held by the primary store, plus the denormalized
//! embeds stored inside other entities to avoid joins on read.
//!
//! Embeds are read-optimized copies of canonical data: an embed's id must
//! always resolve to a live entity in the primary store, but no foreign key
//! enforces this. The projected fields documented on each embed type are the
//! ones the coordinator keeps eventually consistent.

mod author;
mod book;
mod embed;
mod genre;
mod notification;
mod review;
mod user;

pub use author::Author;
pub use book::Book;
pub use embed::{AuthorEmbed, BookEmbed, GenreEmbed, ShelfEntry};
pub use genre::Genre;
pub use notification::Notification;
pub use review::Review;
pub use user::{User, UserRole};
