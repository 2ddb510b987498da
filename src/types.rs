use crate::error::{ProbeError, ScanError};
use serde::{Serialize, Serializer};
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

/// Upper bound on concurrent probes accepted by [`ScanRequest`].
pub const MAX_WORKERS: usize = 200;

/// Parameters for one range scan. Built once per invocation and consumed by a single scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub host: String,
    pub port_start: u16,
    pub port_end: u16,
    pub timeout: Duration,
    pub worker_count: usize,
}

impl ScanRequest {
    /// Build a request, rejecting anything `validate` would reject.
    pub fn new(
        host: impl Into<String>,
        port_start: u16,
        port_end: u16,
        timeout: Duration,
        worker_count: usize,
    ) -> Result<Self, ScanError> {
        let req = Self {
            host: host.into(),
            port_start,
            port_end,
            timeout,
            worker_count,
        };
        req.validate()?;
        Ok(req)
    }

    /// Check host, port bounds, ordering, timeout and worker budget.
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.host.trim().is_empty() {
            return Err(ScanError::InvalidRequest("host must not be empty".into()));
        }
        if self.port_start == 0 || self.port_end == 0 {
            return Err(ScanError::InvalidRequest(
                "ports must be between 1 and 65535".into(),
            ));
        }
        if self.port_start > self.port_end {
            return Err(ScanError::InvalidRequest(format!(
                "start port {} is greater than end port {}",
                self.port_start, self.port_end
            )));
        }
        if self.timeout.is_zero() {
            return Err(ScanError::InvalidRequest(
                "timeout must be greater than zero".into(),
            ));
        }
        if self.worker_count == 0 || self.worker_count > MAX_WORKERS {
            return Err(ScanError::InvalidRequest(format!(
                "worker count must be between 1 and {MAX_WORKERS}"
            )));
        }
        Ok(())
    }

    /// Number of ports in the inclusive range.
    pub fn port_count(&self) -> u64 {
        u64::from(self.port_end) - u64::from(self.port_start) + 1
    }
}

/// Terminal state of one probe.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PortState {
    Open,
    Closed,
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortState::Open => write!(f, "open"),
            PortState::Closed => write!(f, "closed"),
        }
    }
}

/// Outcome of probing one port.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub port: u16,
    pub state: PortState,
}

/// Aggregated result of one range scan, handed to the caller once every task has finished.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub host: String,
    pub address: IpAddr,
    /// Ascending, no duplicates.
    pub open_ports: Vec<u16>,
    /// Sorted by port.
    pub errors: Vec<ProbeError>,
    #[serde(rename = "duration_secs", serialize_with = "serialize_secs")]
    pub duration: Duration,
    pub scanned_total: u64,
    pub scanned_done: u64,
    pub cancelled: bool,
    pub started_at: String,
}

impl ScanOutcome {
    pub fn open_count(&self) -> usize {
        self.open_ports.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

fn serialize_secs<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}
