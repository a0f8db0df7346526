//! FRED API client for series observations.

use chrono::NaiveDate;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::EtlError;

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const PAGE_LIMIT: usize = 100_000;

/// One raw observation exactly as FRED returns it. Both fields are strings;
/// `value` may be the missing-data token `"."`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawObservation {
    pub date: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    count: usize,
    observations: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct FredErrorBody {
    error_message: String,
}

/// Source of raw observations for one series.
///
/// `start` is inclusive: `fetch_observations(id, Some(d))` must return the
/// observation for `d` itself when the source has one. `None` means full
/// history. Observations come back in ascending date order.
pub trait SeriesSource {
    fn fetch_observations(
        &self,
        series_id: &str,
        start: Option<NaiveDate>,
    ) -> Result<Vec<RawObservation>, EtlError>;
}

pub struct FredClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FredClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    fn fetch_page(
        &self,
        series_id: &str,
        start: Option<NaiveDate>,
        offset: usize,
    ) -> Result<ObservationsResponse, EtlError> {
        let mut req = self.client.get(&self.base_url).query(&[
            ("series_id", series_id),
            ("api_key", &self.api_key),
            ("file_type", "json"),
            ("sort_order", "asc"),
            ("limit", &PAGE_LIMIT.to_string()),
            ("offset", &offset.to_string()),
        ]);

        if let Some(date) = start {
            req = req.query(&[("observation_start", &date.to_string())]);
        }

        let resp = req
            .send()
            .map_err(|e| EtlError::SourceUnavailable(format!("FRED request failed: {e}")))?;

        let status = resp.status();
        if status == StatusCode::BAD_REQUEST {
            // FRED answers 400 both for a nonexistent series and for other
            // rejected parameters; the body's error_message tells them apart.
            let detail = resp
                .json::<FredErrorBody>()
                .map(|b| b.error_message)
                .unwrap_or_default();
            if detail.contains("series does not exist") {
                return Err(EtlError::UnknownSeries(series_id.to_string()));
            }
            return Err(EtlError::SourceUnavailable(format!(
                "FRED rejected request for {series_id}: {detail}"
            )));
        }
        if !status.is_success() {
            return Err(EtlError::SourceUnavailable(format!(
                "FRED request for {series_id} failed with status {status}."
            )));
        }

        resp.json().map_err(|e| {
            EtlError::MalformedResponse(format!("Failed to parse FRED response for {series_id}: {e}"))
        })
    }
}

impl SeriesSource for FredClient {
    fn fetch_observations(
        &self,
        series_id: &str,
        start: Option<NaiveDate>,
    ) -> Result<Vec<RawObservation>, EtlError> {
        let mut out: Vec<RawObservation> = Vec::new();
        loop {
            let page = self.fetch_page(series_id, start, out.len())?;
            if page.observations.is_empty() {
                break;
            }
            out.extend(page.observations);
            if out.len() >= page.count {
                break;
            }
        }
        Ok(out)
    }
}
