//! Natural-key deduplication
//!
//! Re-importing an overlapping dataset must never create duplicates, and
//! the primary store enforces no uniqueness constraint of its own, so the
//! pipeline computes the net-new set up front: collapse the input to one
//! record per distinct key, fetch the entities already holding those keys,
//! and insert only the difference.

use shelfsync_core::{CatalogEntity, Result};
use shelfsync_stores::PrimaryStore;
use std::collections::HashSet;
use tracing::warn;

/// The net-new/existing split for one batch
#[derive(Debug, Clone)]
pub struct DedupPlan<E> {
    /// Entities already in the primary store whose key appears in the input
    pub existing: Vec<E>,
    /// Distinct input records with no existing counterpart
    pub to_insert: Vec<E>,
    /// Input records dropped for having no natural key
    pub skipped_no_key: usize,
    /// Input records dropped as later occurrences of a key (first one wins)
    pub duplicate_keys: usize,
}

/// Compute the dedup plan for a batch of parsed records
///
/// Kinds without a natural key cannot be deduplicated; their whole input
/// becomes `to_insert`. Existing documents that no longer deserialize are
/// skipped with a warning, which errs on the side of re-inserting rather
/// than losing input records.
pub fn dedup_plan<E: CatalogEntity>(
    primary: &dyn PrimaryStore,
    records: Vec<E>,
) -> Result<DedupPlan<E>> {
    let Some(field) = E::natural_key_field() else {
        return Ok(DedupPlan {
            existing: Vec::new(),
            to_insert: records,
            skipped_no_key: 0,
            duplicate_keys: 0,
        });
    };

    let mut skipped_no_key = 0;
    let mut duplicate_keys = 0;
    let mut seen = HashSet::new();
    let mut distinct = Vec::new();
    for record in records {
        let key = match record.natural_key() {
            Some(key) => key.to_string(),
            None => {
                skipped_no_key += 1;
                continue;
            }
        };
        if seen.insert(key) {
            distinct.push(record);
        } else {
            duplicate_keys += 1;
        }
    }

    let keys: Vec<String> = distinct
        .iter()
        .filter_map(|r| r.natural_key().map(str::to_string))
        .collect();
    let mut existing = Vec::new();
    let mut existing_keys = HashSet::new();
    for doc in primary.find_by_natural_keys(E::KIND, field, &keys)? {
        match serde_json::from_value::<E>(doc) {
            Ok(entity) => {
                if let Some(key) = entity.natural_key() {
                    existing_keys.insert(key.to_string());
                }
                existing.push(entity);
            }
            Err(e) => {
                warn!(
                    target: "shelfsync::import",
                    kind = %E::KIND,
                    error = %e,
                    "skipping undecodable existing document during dedup"
                );
            }
        }
    }

    let to_insert = distinct
        .into_iter()
        .filter(|r| r.natural_key().is_some_and(|key| !existing_keys.contains(key)))
        .collect();

    Ok(DedupPlan {
        existing,
        to_insert,
        skipped_no_key,
        duplicate_keys,
    })
}
