//! Library crate for portprobe: a bounded-concurrency TCP connect scanner for one host.
pub mod error;
pub mod logging;
pub mod ports;
pub mod probe;
pub mod scanner;
pub mod types;

pub use error::{ProbeError, ScanError};
pub use probe::probe;
pub use scanner::{scan_range, scan_range_with_cancel};
pub use types::{PortState, ProbeResult, ScanOutcome, ScanRequest, MAX_WORKERS};
