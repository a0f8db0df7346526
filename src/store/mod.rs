//! PostgreSQL persistence for series metadata and observations.
//!
//! The orchestrator talks to storage through the [`SeriesSink`] trait;
//! [`Store`] is the production implementation over a blocking client.

pub mod schema;

use chrono::NaiveDate;
use log::info;
use postgres::{Client, NoTls};

use crate::domain::{ObservationRecord, SeriesMetadata, UpsertCounts};
use crate::error::EtlError;

const UPSERT_METADATA: &str = "
INSERT INTO series_metadata
    (series_id, series_name, description, units, frequency,
     seasonal_adjustment, observation_start, created_at, updated_at)
VALUES ($1, $2, $3, $4, $5, $6, $7, now(), now())
ON CONFLICT (series_id) DO UPDATE SET
    series_name         = EXCLUDED.series_name,
    description         = EXCLUDED.description,
    units               = EXCLUDED.units,
    frequency           = EXCLUDED.frequency,
    seasonal_adjustment = EXCLUDED.seasonal_adjustment,
    observation_start   = EXCLUDED.observation_start,
    updated_at          = now()
";

// xmax is 0 only for a freshly inserted row version, so one statement
// reports the insert-vs-update split.
const UPSERT_OBSERVATION: &str = "
INSERT INTO economic_observations
    (series_id, date, value, processed_at, created_at, updated_at)
VALUES ($1, $2, $3, $4, now(), now())
ON CONFLICT (series_id, date) DO UPDATE SET
    value        = EXCLUDED.value,
    processed_at = EXCLUDED.processed_at,
    updated_at   = now()
RETURNING (xmax = 0) AS inserted
";

const LATEST_DATE: &str = "
SELECT MAX(date) FROM economic_observations WHERE series_id = $1
";

/// Sink for metadata and observation upserts, plus the watermark query the
/// incremental algorithm needs.
pub trait SeriesSink {
    /// Insert the metadata row or refresh its mutable fields. `created_at`
    /// is never touched on update.
    fn upsert_metadata(&mut self, meta: &SeriesMetadata) -> Result<(), EtlError>;

    /// Highest stored observation date for this series, `None` before the
    /// first load.
    fn latest_observation_date(&mut self, series_id: &str) -> Result<Option<NaiveDate>, EtlError>;

    /// Upsert one series' batch atomically: every record applies or none
    /// do. Returns the insert/update split.
    fn upsert_observations(
        &mut self,
        series_id: &str,
        records: &[ObservationRecord],
    ) -> Result<UpsertCounts, EtlError>;
}

pub struct Store {
    client: Client,
}

impl Store {
    /// Connect and make sure the pipeline tables exist.
    pub fn connect(params: &str) -> Result<Self, EtlError> {
        info!("connecting to database");
        let mut client = Client::connect(params, NoTls)?;
        client.batch_execute(schema::CREATE_TABLES)?;
        Ok(Self { client })
    }
}

impl SeriesSink for Store {
    fn upsert_metadata(&mut self, meta: &SeriesMetadata) -> Result<(), EtlError> {
        self.client.execute(
            UPSERT_METADATA,
            &[
                &meta.series_id,
                &meta.series_name,
                &meta.description,
                &meta.units,
                &meta.frequency,
                &meta.seasonal_adjustment,
                &meta.observation_start,
            ],
        )?;
        Ok(())
    }

    fn latest_observation_date(&mut self, series_id: &str) -> Result<Option<NaiveDate>, EtlError> {
        let row = self.client.query_one(LATEST_DATE, &[&series_id])?;
        Ok(row.get(0))
    }

    fn upsert_observations(
        &mut self,
        series_id: &str,
        records: &[ObservationRecord],
    ) -> Result<UpsertCounts, EtlError> {
        let mut counts = UpsertCounts::default();
        let mut tx = self.client.transaction()?;
        let stmt = tx.prepare(UPSERT_OBSERVATION)?;
        for rec in records {
            let row = tx.query_one(&stmt, &[&series_id, &rec.date, &rec.value, &rec.processed_at])?;
            if row.get::<_, bool>(0) {
                counts.inserted += 1;
            } else {
                counts.updated += 1;
            }
        }
        tx.commit()?;
        Ok(counts)
    }
}
