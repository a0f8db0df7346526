//! Error taxonomy for one pipeline run.
//!
//! Record-level problems (an unparseable date, the missing-value sentinel)
//! are *not* errors here; they are [`crate::transform::DropReason`]s carried
//! in the per-series transform report. `EtlError` covers the failures that
//! abort a series step or the process itself.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EtlError {
    /// Missing or invalid startup configuration.
    #[error("{0}")]
    Config(String),

    /// Network, auth, or rate-limit failure talking to the source API.
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// The source API does not know this series identifier.
    #[error("unknown series '{0}'")]
    UnknownSeries(String),

    /// The source responded, but the payload could not be parsed.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Constraint violation, connection loss, or any other database failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// End-of-run outcome when at least one series failed. The series that
    /// succeeded stay committed; this only shapes the process exit status.
    #[error("{failed} of {attempted} series failed")]
    RunIncomplete { failed: usize, attempted: usize },
}

impl From<postgres::Error> for EtlError {
    fn from(err: postgres::Error) -> Self {
        EtlError::Storage(err.to_string())
    }
}

impl EtlError {
    /// Process exit code reported by the binary for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            EtlError::RunIncomplete { .. } => 1,
            EtlError::Config(_) => 2,
            EtlError::SourceUnavailable(_)
            | EtlError::UnknownSeries(_)
            | EtlError::MalformedResponse(_) => 4,
            EtlError::Storage(_) => 5,
        }
    }
}
