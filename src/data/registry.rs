//! Built-in registry of the FRED series this pipeline tracks.
//!
//! The registry is an explicit immutable table handed to the orchestrator,
//! not a module-level singleton: tests and partial runs work off a slice of
//! these entries.

use chrono::NaiveDate;
use log::warn;

use crate::domain::SeriesMetadata;
use crate::error::EtlError;

/// One registry row: a series identifier plus its descriptive metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesSpec {
    pub series_id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub units: &'static str,
    pub frequency: &'static str,
    pub seasonal_adjustment: &'static str,
    /// Earliest available observation, `YYYY-MM-DD`.
    pub observation_start: &'static str,
}

impl SeriesSpec {
    /// Build the metadata record for the upsert step.
    pub fn metadata(&self) -> SeriesMetadata {
        let observation_start = match NaiveDate::parse_from_str(self.observation_start, "%Y-%m-%d")
        {
            Ok(date) => Some(date),
            Err(_) => {
                warn!(
                    "{}: unparseable observation_start '{}', storing NULL",
                    self.series_id, self.observation_start
                );
                None
            }
        };
        SeriesMetadata {
            series_id: self.series_id.to_string(),
            series_name: self.name.to_string(),
            description: self.description.to_string(),
            units: self.units.to_string(),
            frequency: self.frequency.to_string(),
            seasonal_adjustment: self.seasonal_adjustment.to_string(),
            observation_start,
        }
    }
}

/// The series loaded on every run, in fixed processing order.
pub const BUILTIN: &[SeriesSpec] = &[
    SeriesSpec {
        series_id: "GDP",
        name: "Gross Domestic Product (Nominal)",
        description: "Gross Domestic Product, 1 Decimal",
        units: "Billions of Dollars",
        frequency: "Quarterly",
        seasonal_adjustment: "Seasonally Adjusted Annual Rate",
        observation_start: "1947-01-01",
    },
    SeriesSpec {
        series_id: "GDPC1",
        name: "Real Gross Domestic Product",
        description: "Real Gross Domestic Product, 3 Decimal",
        units: "Billions of Chained 2017 Dollars",
        frequency: "Quarterly",
        seasonal_adjustment: "Seasonally Adjusted Annual Rate",
        observation_start: "1947-01-01",
    },
    SeriesSpec {
        series_id: "CPIAUCSL",
        name: "Consumer Price Index for All Urban Consumers: All Items",
        description: "Consumer Price Index for All Urban Consumers: All Items in U.S. City Average, Seasonally Adjusted, Index 1982-1984=100",
        units: "Index 1982-1984=100",
        frequency: "Monthly",
        seasonal_adjustment: "Seasonally Adjusted",
        observation_start: "1947-01-01",
    },
    SeriesSpec {
        series_id: "UNRATE",
        name: "Unemployment Rate",
        description: "Unemployment Rate, Seasonally Adjusted",
        units: "Percent",
        frequency: "Monthly",
        seasonal_adjustment: "Seasonally Adjusted",
        observation_start: "1948-01-01",
    },
    SeriesSpec {
        series_id: "INDPRO",
        name: "Industrial Production Index",
        description: "Industrial Production Index, Seasonally Adjusted",
        units: "Index 2017=100",
        frequency: "Monthly",
        seasonal_adjustment: "Seasonally Adjusted",
        observation_start: "1919-01-01",
    },
    SeriesSpec {
        series_id: "DCOILWTICO",
        name: "Crude Oil Prices: West Texas Intermediate (WTI) - Cushing, Oklahoma",
        description: "Crude Oil Prices: West Texas Intermediate (WTI) - Cushing, Oklahoma, Dollars per Barrel",
        units: "Dollars per Barrel",
        frequency: "Daily",
        seasonal_adjustment: "Not Seasonally Adjusted",
        observation_start: "1986-01-02",
    },
    SeriesSpec {
        series_id: "MHHNGSP",
        name: "Henry Hub Natural Gas Spot Price",
        description: "Henry Hub Natural Gas Spot Price, Dollars per Million BTU",
        units: "Dollars per Million BTU",
        frequency: "Monthly",
        seasonal_adjustment: "Not Seasonally Adjusted",
        observation_start: "1997-01-01",
    },
    SeriesSpec {
        series_id: "FEDFUNDS",
        name: "Federal Funds Effective Rate",
        description: "Federal Funds Effective Rate, Percent",
        units: "Percent",
        frequency: "Daily",
        seasonal_adjustment: "Not Seasonally Adjusted",
        observation_start: "1954-07-01",
    },
];

/// Resolve a `--series` filter against the registry, preserving registry
/// order. An empty filter selects everything; an identifier the registry
/// does not know is rejected before any network or database work starts.
pub fn select(filter: &[String]) -> Result<Vec<&'static SeriesSpec>, EtlError> {
    if filter.is_empty() {
        return Ok(BUILTIN.iter().collect());
    }
    for id in filter {
        if !BUILTIN.iter().any(|s| s.series_id == id) {
            return Err(EtlError::UnknownSeries(id.clone()));
        }
    }
    Ok(BUILTIN
        .iter()
        .filter(|s| filter.iter().any(|id| id == s.series_id))
        .collect())
}
