//! End-to-end scan tests against real local listeners.

use async_trait::async_trait;
use std::net::IpAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use vigia::error::FingerprintResult;
use vigia::scanner::{self, OsGuess, PortStatus, ScanOptions, SynProbe};
use vigia::types::{PortRange, Target};

/// Stub capability: no raw sockets in tests, the guess degrades.
struct NoReplyProbe;

#[async_trait]
impl SynProbe for NoReplyProbe {
    async fn reply_ttl(&self, _target: IpAddr) -> FingerprintResult<Option<u8>> {
        Ok(None)
    }
}

fn localhost() -> Target {
    Target::new("127.0.0.1", "127.0.0.1".parse().unwrap())
}

fn fast_opts() -> ScanOptions {
    ScanOptions {
        connect_timeout: Duration::from_millis(500),
        read_timeout: Duration::from_millis(300),
    }
}

/// Listener that reads whatever the probe sends, then answers with `reply`
/// after an optional delay. Serves connections until aborted.
async fn spawn_listener(reply: &'static [u8], delay: Duration) -> (u16, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 256];
                let _ = socket.read(&mut buf).await;
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                let _ = socket.write_all(reply).await;
            });
        }
    });

    (port, handle)
}

#[tokio::test]
async fn ssh_banner_end_to_end() {
    let (port, server) = spawn_listener(b"SSH-2.0-TestServer\r\n", Duration::ZERO).await;

    let report = scanner::scan(
        &localhost(),
        PortRange::single(port).unwrap(),
        &fast_opts(),
        &NoReplyProbe,
        |_| {},
    )
    .await;

    assert_eq!(report.outcomes.len(), 1);
    let outcome = &report.outcomes[0];
    assert_eq!(outcome.port, port);
    assert_eq!(outcome.status, PortStatus::OpenWithBanner);
    assert!(outcome
        .banner
        .as_deref()
        .unwrap()
        .starts_with("SSH-2.0-TestServer"));
    assert_eq!(report.os_guess, OsGuess::NoResponse);

    server.abort();
}

#[tokio::test]
async fn dead_range_yields_no_outcomes() {
    // 9000-9005 sits outside the ephemeral range other tests allocate
    // from; nothing listens there on loopback.
    let range = PortRange::new(9000, 9005).unwrap();

    let report = scanner::scan(&localhost(), range, &fast_opts(), &NoReplyProbe, |_| {}).await;

    assert!(report.outcomes.is_empty());
    assert_eq!(report.os_guess, OsGuess::NoResponse);
}

#[tokio::test]
async fn silent_listener_is_open_unknown() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = tokio::spawn(async move {
        loop {
            let Ok((_socket, _)) = listener.accept().await else {
                break;
            };
            // Hold the connection open without ever answering.
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
    });

    let report = scanner::scan(
        &localhost(),
        PortRange::single(port).unwrap(),
        &fast_opts(),
        &NoReplyProbe,
        |_| {},
    )
    .await;

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].status, PortStatus::OpenUnknown);
    assert!(report.outcomes[0].banner.is_none());

    server.abort();
}

#[tokio::test]
async fn long_banner_is_truncated() {
    static LONG_REPLY: &[u8] = &[b'A'; 120];
    let (port, server) = spawn_listener(LONG_REPLY, Duration::ZERO).await;

    let report = scanner::scan(
        &localhost(),
        PortRange::single(port).unwrap(),
        &fast_opts(),
        &NoReplyProbe,
        |_| {},
    )
    .await;

    let banner = report.outcomes[0].banner.as_deref().unwrap();
    assert_eq!(banner.chars().count(), 50);
    assert!(banner.chars().all(|c| c == 'A'));

    server.abort();
}

#[tokio::test]
async fn outcomes_stay_within_requested_range() {
    let (port, server) = spawn_listener(b"hello\r\n", Duration::ZERO).await;
    let range = PortRange::single(port).unwrap();

    let report = scanner::scan(&localhost(), range, &fast_opts(), &NoReplyProbe, |_| {}).await;

    assert!(report.outcomes.iter().all(|o| range.contains(o.port)));

    server.abort();
}

#[tokio::test]
async fn repeated_scans_find_the_same_outcome_set() {
    let (port_a, server_a) = spawn_listener(b"alpha\r\n", Duration::ZERO).await;
    let (port_b, server_b) = spawn_listener(b"beta\r\n", Duration::ZERO).await;

    let start = port_a.min(port_b);
    let end = port_a.max(port_b);
    let range = PortRange::new(start, end).unwrap();

    let mut sets = Vec::new();
    for _ in 0..2 {
        let report =
            scanner::scan(&localhost(), range, &fast_opts(), &NoReplyProbe, |_| {}).await;
        let mut found: Vec<(u16, PortStatus)> = report
            .outcomes
            .iter()
            .filter(|o| o.port == port_a || o.port == port_b)
            .map(|o| (o.port, o.status))
            .collect();
        found.sort_unstable_by_key(|(port, _)| *port);
        sets.push(found);
    }

    assert_eq!(sets[0], sets[1]);
    assert_eq!(
        sets[0],
        vec![
            (start, PortStatus::OpenWithBanner),
            (end, PortStatus::OpenWithBanner)
        ]
    );

    server_a.abort();
    server_b.abort();
}

#[tokio::test]
async fn outcomes_arrive_in_completion_order() {
    // The slow listener answers late; whichever port it holds, its outcome
    // must settle after the fast one, regardless of port numbering.
    let (slow_port, slow_server) =
        spawn_listener(b"slow service\r\n", Duration::from_millis(200)).await;
    let (fast_port, fast_server) = spawn_listener(b"fast service\r\n", Duration::ZERO).await;

    let range = PortRange::new(slow_port.min(fast_port), slow_port.max(fast_port)).unwrap();

    let report = scanner::scan(&localhost(), range, &fast_opts(), &NoReplyProbe, |_| {}).await;

    let positions: Vec<u16> = report
        .outcomes
        .iter()
        .map(|o| o.port)
        .filter(|p| *p == slow_port || *p == fast_port)
        .collect();

    assert_eq!(positions.len(), 2);
    assert_eq!(positions[0], fast_port);
    assert_eq!(positions[1], slow_port);

    slow_server.abort();
    fast_server.abort();
}

#[tokio::test]
async fn streamed_outcomes_match_the_report() {
    let (port, server) = spawn_listener(b"stream me\r\n", Duration::ZERO).await;

    let mut streamed = Vec::new();
    let report = scanner::scan(
        &localhost(),
        PortRange::single(port).unwrap(),
        &fast_opts(),
        &NoReplyProbe,
        |outcome| streamed.push(outcome.clone()),
    )
    .await;

    assert_eq!(streamed, report.outcomes);

    server.abort();
}
