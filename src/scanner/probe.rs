//! Per-port connect-and-probe routine.
//!
//! Performs a full TCP connect scan against a single port: handshake, a
//! fixed HTTP probe to coax a response out of quiet services, then a short
//! bounded read for the banner. Completes the full handshake, so it needs no
//! special privileges.

use crate::scanner::{PortStatus, ProbeOutcome, ScanOptions};
use std::net::{IpAddr, SocketAddr};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// Fixed probe written after the handshake.
const PROBE_PAYLOAD: &[u8] = b"GET / HTTP/1.0\r\n\r\n";

/// Maximum bytes to read for a banner.
const MAX_BANNER_READ: usize = 1024;

/// Maximum banner length kept in an outcome, in characters.
pub const MAX_BANNER_CHARS: usize = 50;

/// Probe a single port, returning an outcome only if it is open.
///
/// Connect failures of any kind (refused, reset, timeout, unreachable) are
/// the expected majority case and yield `None` rather than an error; the
/// port is simply absent from the report. A successful handshake always
/// yields an outcome: `OpenWithBanner` when the service answered with data,
/// `OpenUnknown` otherwise.
///
/// Opens and closes exactly one connection per call; the stream drops on
/// every exit path. No retries.
pub async fn probe_port(target: IpAddr, port: u16, opts: &ScanOptions) -> Option<ProbeOutcome> {
    let addr = SocketAddr::new(target, port);

    let mut stream = match timeout(opts.connect_timeout, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => {
            trace!(port, error = %e, "connect failed");
            return None;
        }
        Err(_) => {
            trace!(port, "connect timed out");
            return None;
        }
    };

    // Write failures fall through to the read: services that speak first
    // (SSH, SMTP) may already have sent a banner on a half-dead pipe.
    if let Err(e) = stream.write_all(PROBE_PAYLOAD).await {
        trace!(port, error = %e, "probe write failed");
    }

    let mut buf = vec![0u8; MAX_BANNER_READ];
    let banner = match timeout(opts.read_timeout, stream.read(&mut buf)).await {
        Ok(Ok(n)) if n > 0 => {
            let text = String::from_utf8_lossy(&buf[..n]);
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(truncate_banner(trimmed))
            }
        }
        _ => None,
    };

    let outcome = match banner {
        Some(banner) => ProbeOutcome {
            port,
            status: PortStatus::OpenWithBanner,
            banner: Some(banner),
        },
        None => ProbeOutcome {
            port,
            status: PortStatus::OpenUnknown,
            banner: None,
        },
    };

    Some(outcome)
}

/// Cut a banner to its first [`MAX_BANNER_CHARS`] characters.
///
/// Operates on characters, not bytes, so a lossy-decoded multi-byte
/// replacement never gets split.
fn truncate_banner(text: &str) -> String {
    text.chars().take(MAX_BANNER_CHARS).collect()
}
