//! Bulk import pipeline for shelfsync
//!
//! Consumes NDJSON record streams (one JSON object per line), isolates
//! per-line parse failures, deduplicates against existing primary-store
//! entities by natural key, and submits the net-new set through the write
//! coordinator's batch insert path. Every batch attempt leaves a persisted
//! [`shelfsync_core::ImportReport`], on success and failure alike.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dedupe;
pub mod pipeline;

pub use dedupe::{dedup_plan, DedupPlan};
pub use pipeline::{FileMeta, ImportError, ImportOutcome, ImportPipeline};
