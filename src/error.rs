use serde::Serialize;
use thiserror::Error;

/// Failure of a single probe.
///
/// `ResolutionFailure` applies to the whole host; `ConnectionError` is local to
/// one port and never aborts a scan.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeError {
    #[error("cannot resolve host: {host}")]
    ResolutionFailure { host: String },

    #[error("error probing port {port}: {detail}")]
    ConnectionError { port: u16, detail: String },
}

impl ProbeError {
    /// Port the error is attached to, if any.
    pub fn port(&self) -> Option<u16> {
        match self {
            ProbeError::ResolutionFailure { .. } => None,
            ProbeError::ConnectionError { port, .. } => Some(*port),
        }
    }
}

/// Errors that stop a range scan before any probe runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("invalid scan request: {0}")]
    InvalidRequest(String),

    #[error("cannot resolve host: {host}")]
    Resolution { host: String },
}
