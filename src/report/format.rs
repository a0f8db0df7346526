//! Formatted terminal output for the end-of-run summary.

use crate::domain::{RunSummary, SeriesState};

/// Format the full run summary: one line per series, then aggregates.
pub fn format_run_summary(summary: &RunSummary) -> String {
    let mut out = String::new();

    out.push_str("=== fred-ingest - ETL run summary ===\n");
    for o in &summary.outcomes {
        match o.state {
            SeriesState::Done => {
                out.push_str(&format!(
                    "{:<12} done    {} inserted, {} updated, {} dropped\n",
                    o.series_id,
                    o.counts.inserted,
                    o.counts.updated,
                    o.transform.dropped(),
                ));
            }
            _ => {
                let phase = o.failed_during.unwrap_or(SeriesState::Pending);
                let reason = o.error.as_deref().unwrap_or("unknown error");
                out.push_str(&format!(
                    "{:<12} FAILED  during {phase}: {reason}\n",
                    o.series_id
                ));
            }
        }
    }

    let counts = summary.total_counts();
    let transform = summary.total_transform();
    out.push_str(&format!(
        "\n{} succeeded, {} failed | {} inserted, {} updated, {} dropped\n",
        summary.succeeded(),
        summary.failed(),
        counts.inserted,
        counts.updated,
        transform.dropped(),
    ));

    let elapsed = summary.finished_at - summary.started_at;
    out.push_str(&format!(
        "Elapsed: {:.1}s\n",
        elapsed.num_milliseconds() as f64 / 1000.0
    ));

    out
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};

    use super::*;
    use crate::domain::{RunSummary, SeriesOutcome, SeriesState};

    #[test]
    fn summary_lists_each_series_and_totals() {
        let mut done = SeriesOutcome::new("GDP");
        done.state = SeriesState::Done;
        done.counts.inserted = 312;
        done.counts.updated = 1;
        done.transform.missing = 2;

        let mut failed = SeriesOutcome::new("UNRATE");
        failed.state = SeriesState::Failed;
        failed.failed_during = Some(SeriesState::Fetching);
        failed.error = Some("source unavailable: connection refused".to_string());

        let started_at = Utc::now();
        let summary = RunSummary {
            started_at,
            finished_at: started_at + TimeDelta::seconds(3),
            outcomes: vec![done, failed],
        };

        let text = format_run_summary(&summary);
        assert!(text.contains("GDP"));
        assert!(text.contains("312 inserted, 1 updated, 2 dropped"));
        assert!(text.contains("FAILED  during fetch: source unavailable: connection refused"));
        assert!(text.contains("1 succeeded, 1 failed"));
        assert!(text.contains("Elapsed: 3.0s"));
    }
}
