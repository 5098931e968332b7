//! NDJSON import pipeline
//!
//! One JSON object per line. A malformed line never aborts the stream: it
//! is logged, counted, and skipped. Batch-level failures (unreadable
//! stream, primary store errors) abort the whole attempt and are surfaced,
//! but every attempt, successful or not, persists an [`ImportReport`] to
//! the primary store's report collection as the audit trail.

use crate::dedupe::dedup_plan;
use shelfsync_core::{CatalogEntity, EntityId, EntityKind, ImportReport};
use shelfsync_coordinator::WriteCoordinator;
use shelfsync_stores::PrimaryStore;
use std::io::BufRead;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Identity of the originating file, carried into the report
#[derive(Debug, Clone)]
pub struct FileMeta {
    /// Original file name
    pub name: String,
    /// File size in bytes
    pub size: u64,
}

impl FileMeta {
    /// Build file metadata
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// Batch-level import failures
///
/// Per-line parse failures are not errors; they are counted in the outcome.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The record stream itself could not be read
    #[error("import stream read failed: {0}")]
    Stream(#[from] std::io::Error),
    /// The primary store rejected the batch
    #[error("batch write failed: {0}")]
    Batch(#[from] shelfsync_core::Error),
}

/// Result of one successful batch attempt
#[derive(Debug, Clone)]
pub struct ImportOutcome<E> {
    /// Existing entities matched by key plus the newly inserted set
    pub entities: Vec<E>,
    /// Entities written to the primary store by this attempt
    pub inserted: usize,
    /// Input records matched to existing entities (no write issued)
    pub matched_existing: usize,
    /// Lines that failed to parse and were skipped
    pub parse_failures: usize,
    /// Parsed records dropped for having no natural key
    pub skipped_no_key: usize,
    /// Id of the persisted report, when report persistence succeeded
    pub report_id: Option<EntityId>,
    /// Human-readable outcome summary
    pub status: String,
}

struct ParsedBatch<E> {
    records: Vec<E>,
    parse_failures: usize,
}

/// Drives NDJSON batches through dedup and the coordinator's batch insert
pub struct ImportPipeline {
    coordinator: Arc<WriteCoordinator>,
    primary: Arc<dyn PrimaryStore>,
}

impl ImportPipeline {
    /// Build a pipeline over the coordinator and its primary store
    pub fn new(coordinator: Arc<WriteCoordinator>, primary: Arc<dyn PrimaryStore>) -> Self {
        Self {
            coordinator,
            primary,
        }
    }

    /// Import one NDJSON stream of entities of kind `E`
    ///
    /// `source` names where the records came from (upload name, feed url,
    /// job id) and is recorded on the report.
    pub fn import_lines<E: CatalogEntity>(
        &self,
        reader: impl BufRead,
        source: &str,
        file: Option<FileMeta>,
    ) -> Result<ImportOutcome<E>, ImportError> {
        let parsed = match parse_ndjson::<E>(reader) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.persist_failed::<E>(source, &file, 0, &e.to_string());
                return Err(e.into());
            }
        };
        let attempted = parsed.records.len() as u64;

        let (existing, inserted_entities, skipped_no_key) =
            match self.run_batch(parsed.records) {
                Ok(out) => out,
                Err(e) => {
                    self.persist_failed::<E>(source, &file, attempted, &e.to_string());
                    return Err(ImportError::Batch(e));
                }
            };

        let inserted = inserted_entities.len();
        let matched_existing = existing.len();
        let status = format!(
            "imported {} new {}, matched {} existing, skipped {} malformed line(s)",
            inserted,
            E::KIND.collection(),
            matched_existing,
            parsed.parse_failures
        );
        info!(
            target: "shelfsync::import",
            source,
            kind = %E::KIND,
            inserted,
            matched_existing,
            parse_failures = parsed.parse_failures,
            "batch import complete"
        );

        let mut entities = existing;
        entities.extend(inserted_entities);
        let affected_ids: Vec<EntityId> = entities.iter().filter_map(|e| e.id()).collect();

        let mut report =
            ImportReport::succeeded(source, E::KIND, attempted, affected_ids, status.clone());
        if let Some(file) = &file {
            report = report.with_file(file.name.clone(), file.size);
        }
        let report_id = self.persist_report(&report);

        Ok(ImportOutcome {
            entities,
            inserted,
            matched_existing,
            parse_failures: parsed.parse_failures,
            skipped_no_key,
            report_id,
            status,
        })
    }

    /// Dedup against the primary store and insert the difference
    ///
    /// An empty difference returns the existing entities with no write.
    fn run_batch<E: CatalogEntity>(
        &self,
        records: Vec<E>,
    ) -> shelfsync_core::Result<(Vec<E>, Vec<E>, usize)> {
        let plan = dedup_plan(self.primary.as_ref(), records)?;
        let inserted = if plan.to_insert.is_empty() {
            Vec::new()
        } else {
            self.coordinator.insert_many(plan.to_insert)?
        };
        Ok((plan.existing, inserted, plan.skipped_no_key))
    }

    fn persist_failed<E: CatalogEntity>(
        &self,
        source: &str,
        file: &Option<FileMeta>,
        attempted: u64,
        message: &str,
    ) {
        let mut report = ImportReport::failed(source, E::KIND, attempted, message);
        if let Some(file) = file {
            report = report.with_file(file.name.clone(), file.size);
        }
        self.persist_report(&report);
    }

    /// Write a report to its collection; failures are logged, never raised
    ///
    /// On the failure path the original import error must win, and on the
    /// success path a lost report must not retroactively fail the batch.
    fn persist_report(&self, report: &ImportReport) -> Option<EntityId> {
        let doc = match serde_json::to_value(report) {
            Ok(doc) => doc,
            Err(e) => {
                error!(target: "shelfsync::import", error = %e, "report serialization failed");
                return None;
            }
        };
        let mut session = self.primary.session();
        let id = match session.insert_one(EntityKind::ImportReport, doc) {
            Ok(id) => id,
            Err(e) => {
                session.abort();
                error!(target: "shelfsync::import", error = %e, "report persistence failed");
                return None;
            }
        };
        match session.commit() {
            Ok(()) => Some(id),
            Err(e) => {
                error!(target: "shelfsync::import", error = %e, "report persistence failed");
                None
            }
        }
    }
}

/// Parse a stream line by line, isolating per-line failures
///
/// Records carrying a client-supplied id are rejected per line as well: ids
/// are assigned by the primary store, never imported.
fn parse_ndjson<E: CatalogEntity>(reader: impl BufRead) -> std::io::Result<ParsedBatch<E>> {
    let mut records = Vec::new();
    let mut parse_failures = 0;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<E>(trimmed) {
            Ok(record) if record.id().is_some() => {
                warn!(
                    target: "shelfsync::import",
                    kind = %E::KIND,
                    line = line_no + 1,
                    "rejecting record with client-supplied id"
                );
                parse_failures += 1;
            }
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(
                    target: "shelfsync::import",
                    kind = %E::KIND,
                    line = line_no + 1,
                    error = %e,
                    "skipping malformed line"
                );
                parse_failures += 1;
            }
        }
    }
    Ok(ParsedBatch {
        records,
        parse_failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfsync_core::Genre;
    use shelfsync_stores::testing::FlakyPrimaryStore;
    use shelfsync_stores::{
        CacheStore, GraphStore, MemoryCacheStore, MemoryGraphStore, MemoryPrimaryStore,
    };
    use std::io::Cursor;

    struct Fixture {
        primary: Arc<MemoryPrimaryStore>,
        pipeline: ImportPipeline,
    }

    fn fixture() -> Fixture {
        let primary = Arc::new(MemoryPrimaryStore::new());
        let coordinator = Arc::new(WriteCoordinator::new(
            Arc::clone(&primary) as Arc<dyn PrimaryStore>,
            Arc::new(MemoryGraphStore::new()) as Arc<dyn GraphStore>,
            Arc::new(MemoryCacheStore::new()) as Arc<dyn CacheStore>,
        ));
        let pipeline = ImportPipeline::new(coordinator, Arc::clone(&primary) as Arc<dyn PrimaryStore>);
        Fixture { primary, pipeline }
    }

    #[test]
    fn test_malformed_lines_are_isolated() {
        let fx = fixture();
        let ndjson = "{\"name\":\"Fantasy\"}\nnot json at all\n{\"name\":\"Sci-Fi\"}\n";

        let outcome: ImportOutcome<Genre> = fx
            .pipeline
            .import_lines(Cursor::new(ndjson), "feed-a", None)
            .unwrap();

        assert_eq!(outcome.inserted, 2);
        assert_eq!(outcome.parse_failures, 1);
        assert_eq!(fx.primary.count(EntityKind::Genre), 2);
    }

    #[test]
    fn test_reimport_is_idempotent() {
        let fx = fixture();
        let ndjson = "{\"name\":\"Fiction\"}\n{\"name\":\"Sci-Fi\"}\n";

        let first: ImportOutcome<Genre> = fx
            .pipeline
            .import_lines(Cursor::new(ndjson), "feed-a", None)
            .unwrap();
        let second: ImportOutcome<Genre> = fx
            .pipeline
            .import_lines(Cursor::new(ndjson), "feed-a", None)
            .unwrap();

        assert_eq!(first.inserted, 2);
        assert_eq!(second.inserted, 0);
        assert_eq!(second.matched_existing, 2);
        assert_eq!(fx.primary.count(EntityKind::Genre), 2);

        // The second run resolves to the same ids the first one assigned
        let mut first_ids: Vec<_> = first.entities.iter().filter_map(|g| g.id).collect();
        let mut second_ids: Vec<_> = second.entities.iter().filter_map(|g| g.id).collect();
        first_ids.sort_unstable();
        second_ids.sort_unstable();
        assert_eq!(first_ids, second_ids);
    }

    #[test]
    fn test_duplicate_lines_collapse_to_one_document() {
        let fx = fixture();
        let ndjson = "{\"name\":\"Fantasy\"}\n{\"name\":\"Fantasy\"}\n";

        let outcome: ImportOutcome<Genre> = fx
            .pipeline
            .import_lines(Cursor::new(ndjson), "feed-a", None)
            .unwrap();
        assert_eq!(outcome.inserted, 1);
        assert_eq!(fx.primary.count(EntityKind::Genre), 1);
    }

    #[test]
    fn test_client_supplied_id_is_rejected_per_line() {
        let fx = fixture();
        let ndjson = format!(
            "{{\"id\":\"{}\",\"name\":\"Fantasy\"}}\n{{\"name\":\"Sci-Fi\"}}\n",
            EntityId::generate()
        );

        let outcome: ImportOutcome<Genre> = fx
            .pipeline
            .import_lines(Cursor::new(ndjson), "feed-a", None)
            .unwrap();
        assert_eq!(outcome.inserted, 1);
        assert_eq!(outcome.parse_failures, 1);
    }

    #[test]
    fn test_success_persists_report() {
        let fx = fixture();
        let ndjson = "{\"name\":\"Fantasy\"}\n";

        let outcome: ImportOutcome<Genre> = fx
            .pipeline
            .import_lines(
                Cursor::new(ndjson),
                "upload",
                Some(FileMeta::new("genres.ndjson", 19)),
            )
            .unwrap();

        let report_id = outcome.report_id.expect("report persisted");
        let doc = fx
            .primary
            .find_by_id(EntityKind::ImportReport, &report_id)
            .unwrap()
            .unwrap();
        let report: ImportReport = serde_json::from_value(doc).unwrap();
        assert!(report.success);
        assert_eq!(report.attempted, 1);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.file_name.as_deref(), Some("genres.ndjson"));
    }

    #[test]
    fn test_primary_outage_fails_the_batch() {
        let primary = Arc::new(FlakyPrimaryStore::new(Arc::new(MemoryPrimaryStore::new())));
        let coordinator = Arc::new(WriteCoordinator::new(
            Arc::clone(&primary) as Arc<dyn PrimaryStore>,
            Arc::new(MemoryGraphStore::new()) as Arc<dyn GraphStore>,
            Arc::new(MemoryCacheStore::new()) as Arc<dyn CacheStore>,
        ));
        let pipeline =
            ImportPipeline::new(coordinator, Arc::clone(&primary) as Arc<dyn PrimaryStore>);

        primary.set_down(true);
        let result: Result<ImportOutcome<Genre>, _> =
            pipeline.import_lines(Cursor::new("{\"name\":\"Fantasy\"}\n"), "feed-a", None);
        assert!(matches!(result, Err(ImportError::Batch(_))));

        // Nothing was written once the store recovers
        primary.set_down(false);
        assert_eq!(primary.inner().count(EntityKind::Genre), 0);
    }

    #[test]
    fn test_empty_stream_imports_nothing_but_reports() {
        let fx = fixture();
        let outcome: ImportOutcome<Genre> = fx
            .pipeline
            .import_lines(Cursor::new(""), "feed-a", None)
            .unwrap();
        assert_eq!(outcome.inserted, 0);
        assert!(outcome.entities.is_empty());
        assert!(outcome.report_id.is_some());
        assert_eq!(fx.primary.count(EntityKind::ImportReport), 1);
    }
}
