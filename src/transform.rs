//! Normalization of raw source observations into canonical records.
//!
//! Every raw row either survives as an [`ObservationRecord`] or is dropped
//! with an explicit reason; nothing is silently swallowed. The per-batch
//! kept/dropped split feeds the end-of-run summary.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, warn};
use rust_decimal::Decimal;

use crate::data::RawObservation;
use crate::domain::{ObservationRecord, TransformStats};

/// FRED publishes this token in place of a value when no data exists for a
/// date. Policy: such rows are not stored at all. "No row" means "no data",
/// never "zero" and never NULL.
pub const MISSING_SENTINEL: &str = ".";

/// Why a raw row was discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    MissingValue,
    UnparseableDate(String),
    UnparseableValue(String),
    DuplicateDate(NaiveDate),
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::MissingValue => f.write_str("missing-value sentinel"),
            DropReason::UnparseableDate(raw) => write!(f, "unparseable date '{raw}'"),
            DropReason::UnparseableValue(raw) => write!(f, "unparseable value '{raw}'"),
            DropReason::DuplicateDate(date) => write!(f, "duplicate date {date}"),
        }
    }
}

/// A discarded raw row together with its reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRecord {
    pub raw: RawObservation,
    pub reason: DropReason,
}

/// The output of normalizing one series' fetched slice.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    /// Surviving records, ascending by date, one per date.
    pub records: Vec<ObservationRecord>,
    pub dropped: Vec<DroppedRecord>,
}

impl NormalizedBatch {
    pub fn stats(&self) -> TransformStats {
        let mut stats = TransformStats { kept: self.records.len(), ..Default::default() };
        for d in &self.dropped {
            match d.reason {
                DropReason::MissingValue => stats.missing += 1,
                DropReason::UnparseableDate(_) | DropReason::UnparseableValue(_) => {
                    stats.invalid += 1
                }
                DropReason::DuplicateDate(_) => stats.duplicates += 1,
            }
        }
        stats
    }
}

/// Normalize one series' raw observations.
///
/// Rules, per row:
/// - the missing-value sentinel (or an empty value) drops the row
/// - an unparseable date or value drops the row with a warning; a bad row
///   never aborts the series
/// - a date already seen in this batch drops the row (first occurrence wins)
///
/// Surviving rows are stamped with `processed_at` and returned in ascending
/// date order regardless of input order.
pub fn normalize(
    series_id: &str,
    raw: Vec<RawObservation>,
    processed_at: DateTime<Utc>,
) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();
    let mut seen: HashSet<NaiveDate> = HashSet::new();

    for obs in raw {
        let trimmed = obs.value.trim();
        if trimmed.is_empty() || trimmed == MISSING_SENTINEL {
            debug!("{series_id}: no data for {}", obs.date);
            batch.dropped.push(DroppedRecord { raw: obs, reason: DropReason::MissingValue });
            continue;
        }

        let date = match NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => {
                warn!("{series_id}: skipping row with unparseable date '{}'", obs.date);
                let reason = DropReason::UnparseableDate(obs.date.clone());
                batch.dropped.push(DroppedRecord { raw: obs, reason });
                continue;
            }
        };

        let value = match Decimal::from_str(trimmed) {
            Ok(v) => v,
            Err(_) => {
                warn!("{series_id}: skipping {date} with unparseable value '{trimmed}'");
                let reason = DropReason::UnparseableValue(obs.value.clone());
                batch.dropped.push(DroppedRecord { raw: obs, reason });
                continue;
            }
        };

        if !seen.insert(date) {
            warn!("{series_id}: dropping duplicate row for {date}");
            batch.dropped.push(DroppedRecord { raw: obs, reason: DropReason::DuplicateDate(date) });
            continue;
        }

        batch.records.push(ObservationRecord { date, value, processed_at });
    }

    batch.records.sort_by_key(|r| r.date);
    batch
}
