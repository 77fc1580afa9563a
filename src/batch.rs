//! Validation of many `{kind, fields}` envelopes at once.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ValidationConfig;
use crate::error::EnvelopeError;
use crate::records::{Record, RecordKind};

/// One envelope that could not be turned into a record
#[derive(Debug)]
pub struct BatchFailure {
    /// Zero-based position in the input (array index or line number)
    pub index: usize,
    pub error: EnvelopeError,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub records: Vec<Record>,
    pub failures: Vec<BatchFailure>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct BatchSummary {
    pub accepted: usize,
    pub rejected: usize,
    pub per_kind: HashMap<RecordKind, usize>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn summary(&self) -> BatchSummary {
        let mut per_kind = HashMap::new();
        for record in &self.records {
            *per_kind.entry(record.kind()).or_insert(0) += 1;
        }
        BatchSummary {
            accepted: self.records.len(),
            rejected: self.failures.len(),
            per_kind,
        }
    }
}

/// Split input into envelopes: a JSON array, or one JSON value per line.
/// Blank lines are skipped.
pub fn parse_envelopes(content: &str) -> Vec<(usize, Result<Value, EnvelopeError>)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    if content.trim_start().starts_with('[') {
        return match serde_json::from_str::<Vec<Value>>(content) {
            Ok(items) => items.into_iter().map(Ok).enumerate().collect(),
            Err(e) => vec![(0, Err(EnvelopeError::Json(e)))],
        };
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| (i, serde_json::from_str(line).map_err(EnvelopeError::Json)))
        .collect()
}

pub fn validate_batch(content: &str, config: &ValidationConfig) -> BatchReport {
    let mut report = BatchReport::default();

    for (index, envelope) in parse_envelopes(content) {
        match envelope.and_then(|value| Record::from_envelope(&value, config)) {
            Ok(record) => {
                debug!("Accepted {} {}", record.kind(), record.id());
                report.records.push(record);
            }
            Err(error) => {
                warn!("Rejected envelope #{}: {}", index, error);
                report.failures.push(BatchFailure { index, error });
            }
        }
    }

    report
}
