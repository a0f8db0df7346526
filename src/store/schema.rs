//! SQL DDL for the two pipeline tables.
//!
//! Applied with `CREATE TABLE IF NOT EXISTS` on every connect, so a fresh
//! database bootstraps itself and an existing one is left untouched.

/// The two-table star: series metadata plus observations.
///
/// `economic_observations` enforces the invariants the upsert logic leans
/// on: at most one row per (series_id, date), restrict-on-delete toward the
/// metadata table, cascade-on-update should a series identifier ever be
/// renamed.
pub const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS series_metadata (
    series_id           TEXT PRIMARY KEY,
    series_name         TEXT NOT NULL,
    description         TEXT NOT NULL,
    units               TEXT NOT NULL,
    frequency           TEXT NOT NULL,
    seasonal_adjustment TEXT NOT NULL,
    observation_start   DATE,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS economic_observations (
    series_id    TEXT NOT NULL
                 REFERENCES series_metadata (series_id)
                 ON DELETE RESTRICT
                 ON UPDATE CASCADE,
    date         DATE NOT NULL,
    value        NUMERIC(20, 6) NOT NULL,
    processed_at TIMESTAMPTZ NOT NULL,
    created_at   TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at   TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (series_id, date)
);
";
