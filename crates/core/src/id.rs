//! Opaque entity identifiers
//!
//! Identifiers are assigned by the primary store on first insert and are
//! immutable afterwards. Callers never supply their own ids; the coordinator
//! rejects inserts that arrive with one already set.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier for a catalog entity
///
/// Wraps a UUID v4. The same id addresses the entity in the primary store
/// (document key), the secondary index (node id property, stored as a plain
/// string) and the cache (key suffix).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Generate a fresh random id (primary store insert path only)
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an id from its string representation
    ///
    /// Accepts standard UUID format. Returns `None` for malformed input;
    /// callers on the fatal path map that to [`crate::Error::MalformedId`].
    pub fn from_string(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }

    /// Raw bytes of this id
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_unique() {
        let a = EntityId::generate();
        let b = EntityId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_string_round_trip() {
        let id = EntityId::generate();
        let parsed = EntityId::from_string(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_from_string_rejects_garbage() {
        assert!(EntityId::from_string("not-a-uuid").is_none());
        assert!(EntityId::from_string("").is_none());
    }

    #[test]
    fn test_serde_transparent() {
        let id = EntityId::generate();
        let json = serde_json::to_string(&id).unwrap();
        // Serializes as a bare string, not a wrapper object
        assert_eq!(json, format!("\"{}\"", id));
        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
