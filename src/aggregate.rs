//! Result aggregation and duplicate suppression
//!
//! Records stream in as pages are scraped and come out in the exact order
//! they were emitted: suite order, then scraper order, then page-visitation
//! order, then per-page emission order. Dedup is a single-pass stateful
//! filter over that stream; the seen-set spans the whole run, while the
//! dedup options come from whichever scraper emitted the record.

use crate::config::EffectiveConfig;
use crate::suite::Record;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Streaming record collector with optional duplicate suppression
#[derive(Debug, Default)]
pub struct ResultAggregator {
    records: Vec<Record>,
    seen: HashSet<String>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers one record to the result set
    ///
    /// With `ignore_duplicates` off this is a pass-through. With it on, the
    /// record is kept only if its dedup key is new; the first occurrence
    /// wins and keeps its original position.
    pub fn push(&mut self, record: Record, config: &EffectiveConfig) {
        if !config.ignore_duplicates {
            self.records.push(record);
            return;
        }

        let key = match &config.id_field {
            Some(field) => id_key(&record, field),
            None => structural_key(&record),
        };

        if self.seen.insert(key) {
            self.records.push(record);
        } else {
            tracing::debug!("Suppressing duplicate item");
        }
    }

    /// Number of records kept so far
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consumes the aggregator, yielding the final ordered result set
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

/// Dedup key for structural equality: a hash of the canonical JSON encoding
fn structural_key(record: &Record) -> String {
    let canonical = serde_json::to_string(record).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    format!("sha:{}", hex::encode(hasher.finalize()))
}

/// Dedup key from the configured id field
///
/// A record without that field falls back to the structural key, so records
/// that never carry an id still dedup by full equality.
fn id_key(record: &Record, field: &str) -> String {
    match record.get(field) {
        Some(value) => format!("id:{}", value),
        None => structural_key(record),
    }
}
