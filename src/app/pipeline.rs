//! The incremental ETL pipeline.
//!
//! One run walks the registry in fixed order and, per series:
//! metadata upsert -> watermark lookup -> fetch -> normalize -> load.
//! A failure in one series is recorded and never stops the rest.

use chrono::Utc;
use log::{error, info};

use crate::data::fred::SeriesSource;
use crate::data::registry::SeriesSpec;
use crate::domain::{RunSummary, SeriesOutcome, SeriesState};
use crate::error::EtlError;
use crate::store::SeriesSink;
use crate::transform;

/// Run the pipeline over `series`, one series at a time, in order.
///
/// When `full` is set, stored watermarks are ignored and full history is
/// re-fetched; the upsert path makes that safe to repeat.
pub fn run_etl<S, K>(series: &[&SeriesSpec], source: &S, sink: &mut K, full: bool) -> RunSummary
where
    S: SeriesSource + ?Sized,
    K: SeriesSink + ?Sized,
{
    let started_at = Utc::now();
    let mut outcomes = Vec::with_capacity(series.len());

    for spec in series {
        let outcome = process_series(spec, source, sink, full);
        match &outcome.error {
            None => info!(
                "{}: done ({} inserted, {} updated, {} dropped)",
                outcome.series_id,
                outcome.counts.inserted,
                outcome.counts.updated,
                outcome.transform.dropped(),
            ),
            Some(err) => error!(
                "{}: failed during {}: {err}",
                outcome.series_id,
                outcome.failed_during.unwrap_or(SeriesState::Pending),
            ),
        }
        outcomes.push(outcome);
    }

    RunSummary { started_at, finished_at: Utc::now(), outcomes }
}

fn process_series<S, K>(spec: &SeriesSpec, source: &S, sink: &mut K, full: bool) -> SeriesOutcome
where
    S: SeriesSource + ?Sized,
    K: SeriesSink + ?Sized,
{
    let mut outcome = SeriesOutcome::new(spec.series_id);
    match run_series(spec, source, sink, full, &mut outcome) {
        Ok(()) => outcome.state = SeriesState::Done,
        Err(err) => {
            outcome.failed_during = Some(outcome.state);
            outcome.error = Some(err.to_string());
            outcome.state = SeriesState::Failed;
        }
    }
    outcome
}

fn run_series<S, K>(
    spec: &SeriesSpec,
    source: &S,
    sink: &mut K,
    full: bool,
    outcome: &mut SeriesOutcome,
) -> Result<(), EtlError>
where
    S: SeriesSource + ?Sized,
    K: SeriesSink + ?Sized,
{
    // Metadata is upserted unconditionally so descriptive fields stay fresh
    // even when the series has no new data.
    sink.upsert_metadata(&spec.metadata())?;
    outcome.state = SeriesState::MetadataSynced;

    let watermark =
        if full { None } else { sink.latest_observation_date(spec.series_id)? };

    outcome.state = SeriesState::Fetching;
    // The fetch starts AT the watermark date, not the day after: the source
    // may have revised the newest stored value since the last run.
    let raw = source.fetch_observations(spec.series_id, watermark)?;
    match watermark {
        Some(d) => info!("{}: watermark {d}, fetched {} rows", spec.series_id, raw.len()),
        None => info!("{}: no stored rows, fetched full history ({} rows)", spec.series_id, raw.len()),
    }

    outcome.state = SeriesState::Transforming;
    let batch = transform::normalize(spec.series_id, raw, Utc::now());
    outcome.transform = batch.stats();

    outcome.state = SeriesState::Loading;
    if batch.records.is_empty() {
        info!("{}: nothing to load", spec.series_id);
        return Ok(());
    }
    outcome.counts = sink.upsert_observations(spec.series_id, &batch.records)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use chrono::NaiveDate;

    use super::*;
    use crate::data::fred::RawObservation;
    use crate::data::registry;
    use crate::domain::{ObservationRecord, SeriesMetadata, UpsertCounts};

    fn raw(date: &str, value: &str) -> RawObservation {
        RawObservation { date: date.to_string(), value: value.to_string() }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn spec(series_id: &'static str) -> SeriesSpec {
        SeriesSpec {
            series_id,
            name: "Test Series",
            description: "Test series",
            units: "Percent",
            frequency: "Monthly",
            seasonal_adjustment: "Not Seasonally Adjusted",
            observation_start: "2020-01-01",
        }
    }

    struct MockSource {
        data: Vec<RawObservation>,
        requested_starts: RefCell<Vec<(String, Option<NaiveDate>)>>,
        fail_for: Option<&'static str>,
    }

    impl MockSource {
        fn returning(data: Vec<RawObservation>) -> Self {
            Self { data, requested_starts: RefCell::new(Vec::new()), fail_for: None }
        }
    }

    impl SeriesSource for MockSource {
        fn fetch_observations(
            &self,
            series_id: &str,
            start: Option<NaiveDate>,
        ) -> Result<Vec<RawObservation>, EtlError> {
            self.requested_starts.borrow_mut().push((series_id.to_string(), start));
            if self.fail_for == Some(series_id) {
                return Err(EtlError::SourceUnavailable("connection refused".to_string()));
            }
            Ok(self.data.clone())
        }
    }

    #[derive(Default)]
    struct MockSink {
        watermarks: HashMap<String, NaiveDate>,
        metadata: Vec<SeriesMetadata>,
        loads: Vec<(String, Vec<ObservationRecord>)>,
        fail_load_for: Option<&'static str>,
    }

    impl SeriesSink for MockSink {
        fn upsert_metadata(&mut self, meta: &SeriesMetadata) -> Result<(), EtlError> {
            self.metadata.push(meta.clone());
            Ok(())
        }

        fn latest_observation_date(
            &mut self,
            series_id: &str,
        ) -> Result<Option<NaiveDate>, EtlError> {
            Ok(self.watermarks.get(series_id).copied())
        }

        fn upsert_observations(
            &mut self,
            series_id: &str,
            records: &[ObservationRecord],
        ) -> Result<UpsertCounts, EtlError> {
            if self.fail_load_for == Some(series_id) {
                return Err(EtlError::Storage("connection dropped mid-batch".to_string()));
            }
            self.loads.push((series_id.to_string(), records.to_vec()));
            Ok(UpsertCounts { inserted: records.len() as u64, updated: 0 })
        }
    }

    #[test]
    fn cold_start_requests_full_history() {
        let source = MockSource::returning(vec![raw("2020-01-01", "1.0")]);
        let mut sink = MockSink::default();
        let s = spec("GDP");

        let summary = run_etl(&[&s], &source, &mut sink, false);

        assert_eq!(source.requested_starts.borrow()[0], ("GDP".to_string(), None));
        assert_eq!(summary.succeeded(), 1);
    }

    #[test]
    fn incremental_fetch_starts_at_watermark_inclusive() {
        let source = MockSource::returning(vec![raw("2024-06-01", "2.0")]);
        let mut sink = MockSink::default();
        sink.watermarks.insert("GDP".to_string(), date("2024-06-01"));
        let s = spec("GDP");

        run_etl(&[&s], &source, &mut sink, false);

        // Exactly the watermark date, never watermark + 1.
        assert_eq!(
            source.requested_starts.borrow()[0],
            ("GDP".to_string(), Some(date("2024-06-01")))
        );
    }

    #[test]
    fn full_flag_ignores_watermark() {
        let source = MockSource::returning(vec![raw("2020-01-01", "1.0")]);
        let mut sink = MockSink::default();
        sink.watermarks.insert("GDP".to_string(), date("2024-06-01"));
        let s = spec("GDP");

        run_etl(&[&s], &source, &mut sink, true);

        assert_eq!(source.requested_starts.borrow()[0], ("GDP".to_string(), None));
    }

    #[test]
    fn metadata_is_synced_before_fetch_even_when_fetch_fails() {
        let mut source = MockSource::returning(Vec::new());
        source.fail_for = Some("GDP");
        let mut sink = MockSink::default();
        let s = spec("GDP");

        let summary = run_etl(&[&s], &source, &mut sink, false);

        assert_eq!(sink.metadata.len(), 1);
        assert_eq!(sink.metadata[0].series_id, "GDP");
        let outcome = &summary.outcomes[0];
        assert_eq!(outcome.state, SeriesState::Failed);
        assert_eq!(outcome.failed_during, Some(SeriesState::Fetching));
    }

    #[test]
    fn one_series_failure_does_not_stop_the_others() {
        let source = MockSource::returning(vec![raw("2020-01-01", "1.0")]);
        let mut sink = MockSink::default();
        sink.fail_load_for = Some("B");
        let (a, b, c) = (spec("A"), spec("B"), spec("C"));

        let summary = run_etl(&[&a, &b, &c], &source, &mut sink, false);

        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.failed(), 1);
        let loaded: Vec<_> = sink.loads.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(loaded, ["A", "C"]);
        let b_outcome = &summary.outcomes[1];
        assert_eq!(b_outcome.state, SeriesState::Failed);
        assert_eq!(b_outcome.failed_during, Some(SeriesState::Loading));
        assert!(b_outcome.error.as_deref().unwrap().contains("storage error"));
    }

    #[test]
    fn missing_sentinel_rows_never_reach_the_sink() {
        let source = MockSource::returning(vec![
            raw("2024-01-01", "1.5"),
            raw("2024-02-01", "."),
            raw("2024-03-01", "1.7"),
        ]);
        let mut sink = MockSink::default();
        let s = spec("MHHNGSP");

        let summary = run_etl(&[&s], &source, &mut sink, false);

        let (_, records) = &sink.loads[0];
        let dates: Vec<_> = records.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date("2024-01-01"), date("2024-03-01")]);
        assert_eq!(summary.outcomes[0].transform.missing, 1);
    }

    #[test]
    fn empty_slice_skips_the_load_call() {
        let source = MockSource::returning(vec![raw("2024-02-01", ".")]);
        let mut sink = MockSink::default();
        let s = spec("GDP");

        let summary = run_etl(&[&s], &source, &mut sink, false);

        assert!(sink.loads.is_empty());
        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.outcomes[0].counts, UpsertCounts::default());
    }

    #[test]
    fn series_are_processed_in_registry_order() {
        let source = MockSource::returning(Vec::new());
        let mut sink = MockSink::default();
        let selected = registry::select(&[]).unwrap();

        let summary = run_etl(&selected, &source, &mut sink, false);

        let processed: Vec<_> =
            summary.outcomes.iter().map(|o| o.series_id.as_str()).collect();
        let expected: Vec<_> = registry::BUILTIN.iter().map(|s| s.series_id).collect();
        assert_eq!(processed, expected);
    }
}
