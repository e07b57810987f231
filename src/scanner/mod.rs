//! Scanner module - drives the concurrent port scan.
//!
//! Fans one probe task out per port across the requested range, collects
//! outcomes as they complete, then runs the OS fingerprint once and
//! assembles the final report.

pub mod fingerprint;
pub mod probe;

use crate::types::{PortRange, Target};
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{debug, info};

pub use fingerprint::{fingerprint_os, OsGuess, RawSocketProbe, SynProbe};
pub use probe::probe_port;

/// Status of an open port.
///
/// Closed and filtered ports are not represented at all: a port that never
/// completed a handshake produces no outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PortStatus {
    /// Handshake completed and the service answered with data.
    OpenWithBanner,
    /// Handshake completed but nothing readable came back in time.
    OpenUnknown,
}

/// Result of probing a single open port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeOutcome {
    /// The port that accepted the connection.
    pub port: u16,
    /// Whether a banner was captured.
    pub status: PortStatus,
    /// Captured banner, already truncated to at most 50 characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.banner {
            Some(banner) => write!(f, "Porta {}: ABERTA - Banner: {}...", self.port, banner),
            None => write!(f, "Porta {}: ABERTA - Serviço desconhecido", self.port),
        }
    }
}

/// Per-probe timeout configuration.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Bound on the TCP connect attempt.
    pub connect_timeout: Duration,
    /// Bound on the banner read after a successful connect.
    pub read_timeout: Duration,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(1),
            read_timeout: Duration::from_secs(1),
        }
    }
}

/// Finalized scan results handed to the exporter.
///
/// Outcomes sit in completion order, not port order; probes race
/// independently and the collection is never sorted.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// The resolved scan target.
    pub target: Target,
    /// One entry per open port, in completion order.
    pub outcomes: Vec<ProbeOutcome>,
    /// Coarse OS guess appended after the scan barrier.
    pub os_guess: OsGuess,
}

impl ScanReport {
    /// Number of open ports discovered.
    pub fn open_count(&self) -> usize {
        self.outcomes.len()
    }

    /// Render the report as the sequence of display strings the exporter
    /// persists: one line per outcome in stored order, then the OS guess.
    pub fn display_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.outcomes.iter().map(ToString::to_string).collect();
        lines.push(format!("Detecção de SO: {}", self.os_guess));
        lines
    }
}

/// Execute a complete scan of the target across the port range.
///
/// Spawns one probe task per port up front, so every port in the range is
/// probed simultaneously with no concurrency cap, then waits for all of
/// them to settle before moving on. Each discovered outcome is handed to
/// `on_open` as it completes, so callers can stream console lines.
///
/// Once the last probe has settled, the OS fingerprint runs exactly once
/// (never concurrently with the probes) and the report is assembled.
pub async fn scan<F>(
    target: &Target,
    range: PortRange,
    opts: &ScanOptions,
    os_probe: &dyn SynProbe,
    mut on_open: F,
) -> ScanReport
where
    F: FnMut(&ProbeOutcome),
{
    let start = Instant::now();
    info!(target = %target.ip, range = %range, ports = range.len(), "starting scan");

    // JoinSet aborts whatever is still in flight if the scan future is
    // dropped (e.g. on Ctrl-C), so no sockets leak past a cancellation.
    let mut tasks = JoinSet::new();
    for port in range.iter() {
        let ip = target.ip;
        let opts = opts.clone();
        tasks.spawn(async move { probe_port(ip, port, &opts).await });
    }

    // Barrier join: drain every probe; results land in completion order.
    let mut outcomes = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        if let Ok(Some(outcome)) = joined {
            on_open(&outcome);
            outcomes.push(outcome);
        }
    }

    debug!(
        open = outcomes.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "probe fan-out settled"
    );

    let os_guess = fingerprint_os(os_probe, target.ip).await;

    ScanReport {
        target: target.clone(),
        outcomes,
        os_guess,
    }
}
