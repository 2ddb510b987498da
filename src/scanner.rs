use crate::error::{ProbeError, ScanError};
use crate::probe::{probe_addr, resolve_host};
use crate::types::{PortState, ProbeResult, ScanOutcome, ScanRequest};
use ::time::{format_description::well_known, OffsetDateTime};
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Scan every port in the request's inclusive range and return the sorted open ports.
///
/// - Resolves the host once; a failed lookup fails the whole scan.
/// - Limits in-flight connects to `worker_count` using a `Semaphore`.
/// - Collects results in completion order and sorts only at the end.
/// - Per-port connection errors are accumulated, never fatal.
pub async fn scan_range(request: &ScanRequest) -> Result<ScanOutcome, ScanError> {
    scan_range_with_cancel(request, CancellationToken::new()).await
}

/// Variant that accepts a `CancellationToken` to stop dispatching new probes.
///
/// Probes already connecting run to completion, bounded by the request timeout.
pub async fn scan_range_with_cancel(
    request: &ScanRequest,
    cancel: CancellationToken,
) -> Result<ScanOutcome, ScanError> {
    request.validate()?;
    let address = resolve_host(&request.host)
        .await
        .map_err(|_| ScanError::Resolution {
            host: request.host.clone(),
        })?;
    debug!(host = %request.host, %address, "resolved scan target");

    let timeout = request.timeout;
    let outcome = run_pool(request, address, cancel, move |port| {
        probe_addr(SocketAddr::new(address, port), timeout)
    })
    .await;
    Ok(outcome)
}

/// Drive `prober` over the request's range through a bounded pool.
///
/// The join loop is the only writer of the aggregate; tasks just return their result.
pub(crate) async fn run_pool<P, Fut>(
    request: &ScanRequest,
    address: IpAddr,
    cancel: CancellationToken,
    prober: P,
) -> ScanOutcome
where
    P: Fn(u16) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<PortState, ProbeError>> + Send + 'static,
{
    let started_at = now_rfc3339();
    let start = Instant::now();
    let total = request.port_count();
    debug!(
        host = %request.host,
        start = request.port_start,
        end = request.port_end,
        workers = request.worker_count,
        timeout_ms = request.timeout.as_millis() as u64,
        "starting range scan"
    );

    let prober = Arc::new(prober);
    let sem = Arc::new(Semaphore::new(request.worker_count));
    let mut set = JoinSet::new();

    for port in request.port_start..=request.port_end {
        if cancel.is_cancelled() {
            break;
        }
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            permit = sem.clone().acquire_owned() => match permit {
                Ok(p) => p,
                Err(_) => break,
            },
        };
        let prober = prober.clone();
        let cancel = cancel.clone();

        set.spawn(async move {
            let _permit = permit;
            if cancel.is_cancelled() {
                return None;
            }
            Some(prober(port).await.map(|state| ProbeResult { port, state }))
        });
    }

    let mut open_ports = Vec::new();
    let mut errors = Vec::new();
    let mut scanned_done = 0u64;

    while let Some(joined) = set.join_next().await {
        let res = match joined {
            Ok(Some(res)) => res,
            Ok(None) => continue,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                warn!(error = %e, "probe task did not complete");
                continue;
            }
        };
        scanned_done += 1;
        match res {
            Ok(ProbeResult {
                port,
                state: PortState::Open,
            }) => open_ports.push(port),
            Ok(ProbeResult {
                state: PortState::Closed,
                ..
            }) => {}
            Err(e) => {
                warn!(port = ?e.port(), error = %e, "probe failed");
                errors.push(e);
            }
        }
    }

    open_ports.sort_unstable();
    open_ports.dedup();
    errors.sort_by_key(ProbeError::port);

    let outcome = ScanOutcome {
        host: request.host.clone(),
        address,
        open_ports,
        errors,
        duration: start.elapsed(),
        scanned_total: total,
        scanned_done,
        cancelled: cancel.is_cancelled(),
        started_at,
    };
    debug!(
        open = outcome.open_count(),
        errors = outcome.errors.len(),
        scanned = outcome.scanned_done,
        elapsed_ms = outcome.duration.as_millis() as u64,
        "range scan finished"
    );
    outcome
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
