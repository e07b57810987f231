//! TTL-based OS fingerprinting.
//!
//! Sends a single raw TCP SYN to a fixed port and classifies the target's
//! operating system from the TTL of whatever comes back. Network stacks ship
//! characteristic initial TTLs (64 for Linux/Unix, 128 for Windows), so one
//! sample is enough for a coarse guess.
//!
//! # Privileges Required
//!
//! Building raw packets needs root/administrator privileges. The raw-socket
//! access is modeled as a capability ([`SynProbe`]) handed to the core: when
//! the environment cannot grant it, the guess degrades instead of aborting
//! the scan.

use crate::error::{FingerprintError, FingerprintResult};
use async_trait::async_trait;
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::ipv4::{self, Ipv4Flags, Ipv4Packet, MutableIpv4Packet};
use pnet::packet::tcp::{self, MutableTcpPacket, TcpFlags, TcpPacket};
use pnet::packet::Packet;
use pnet::transport::{ipv4_packet_iter, transport_channel, TransportChannelType::Layer3};
use serde::Serialize;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Fixed destination port for the fingerprint probe.
const FINGERPRINT_PORT: u16 = 80;

/// Default wait for a reply carrying an IP header.
const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(1);

/// Coarse operating-system guess derived from a single TTL sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OsGuess {
    /// Initial TTL at or below 64.
    LinuxUnix,
    /// Initial TTL in 65-128.
    Windows,
    /// TTL above 128; no stack we recognize.
    Unknown,
    /// No reply within the timeout, or the probe could not be sent.
    NoResponse,
}

impl OsGuess {
    /// Classify a reply TTL.
    pub fn from_ttl(ttl: u8) -> Self {
        if ttl <= 64 {
            Self::LinuxUnix
        } else if ttl <= 128 {
            Self::Windows
        } else {
            Self::Unknown
        }
    }
}

impl fmt::Display for OsGuess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LinuxUnix => write!(f, "Linux/Unix"),
            Self::Windows => write!(f, "Windows"),
            Self::Unknown => write!(f, "Sistema desconhecido"),
            Self::NoResponse => write!(f, "Sem resposta"),
        }
    }
}

/// Raw-socket SYN capability the fingerprinter depends on.
///
/// The core never provisions elevated privileges itself; it is handed an
/// implementation of this trait. Tests substitute a stub.
#[async_trait]
pub trait SynProbe: Send + Sync {
    /// Send one TCP SYN to the fingerprint port and return the TTL of the
    /// first matching reply, or `None` when nothing came back in time.
    async fn reply_ttl(&self, target: IpAddr) -> FingerprintResult<Option<u8>>;
}

/// Derive an OS guess for the target using the given SYN capability.
///
/// Runs strictly after the port-scan barrier and blocks the calling flow
/// for up to the capability's reply timeout. Capability failures (missing
/// privileges, IPv6 target, channel errors) degrade the guess to
/// [`OsGuess::NoResponse`]; they never abort the scan.
pub async fn fingerprint_os(probe: &dyn SynProbe, target: IpAddr) -> OsGuess {
    match probe.reply_ttl(target).await {
        Ok(Some(ttl)) => {
            debug!(ttl, "fingerprint reply received");
            OsGuess::from_ttl(ttl)
        }
        Ok(None) => {
            debug!("no fingerprint reply within timeout");
            OsGuess::NoResponse
        }
        Err(e) => {
            warn!(error = %e, "OS fingerprint unavailable");
            OsGuess::NoResponse
        }
    }
}

/// [`SynProbe`] implementation over a raw IPv4 transport channel.
///
/// **Requires elevated privileges (root/sudo).**
pub struct RawSocketProbe {
    timeout: Duration,
}

impl RawSocketProbe {
    /// Create a probe waiting up to `timeout` for a reply.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for RawSocketProbe {
    fn default() -> Self {
        Self::new(DEFAULT_REPLY_TIMEOUT)
    }
}

#[async_trait]
impl SynProbe for RawSocketProbe {
    async fn reply_ttl(&self, target: IpAddr) -> FingerprintResult<Option<u8>> {
        let target_v4 = match target {
            IpAddr::V4(ip) => ip,
            IpAddr::V6(_) => return Err(FingerprintError::Ipv6Unsupported),
        };

        // pnet's transport receive is blocking; run the whole exchange off
        // the async executor.
        let timeout = self.timeout;
        tokio::task::spawn_blocking(move || syn_exchange(target_v4, timeout))
            .await
            .map_err(|e| FingerprintError::ChannelError(e.to_string()))?
    }
}

/// Send the SYN and wait for the first reply from the target on the probed
/// ports, returning its TTL.
fn syn_exchange(target: Ipv4Addr, timeout: Duration) -> FingerprintResult<Option<u8>> {
    let (mut tx, mut rx) =
        transport_channel(4096, Layer3(IpNextHeaderProtocols::Tcp)).map_err(|e| {
            if e.kind() == std::io::ErrorKind::PermissionDenied
                || e.to_string().to_lowercase().contains("permission")
            {
                FingerprintError::PermissionDenied
            } else {
                FingerprintError::ChannelError(e.to_string())
            }
        })?;

    let source_ip = local_source_ip(target);
    let source_port = rand_source_port();
    let packet = build_syn_packet(source_ip, target, source_port, FINGERPRINT_PORT)?;

    {
        let ip_packet = Ipv4Packet::new(&packet)
            .ok_or_else(|| FingerprintError::InvalidPacket("short IPv4 buffer".to_string()))?;
        tx.send_to(ip_packet, IpAddr::V4(target))
            .map_err(|e| FingerprintError::SendFailed(e.to_string()))?;
    }

    let mut iter = ipv4_packet_iter(&mut rx);
    let deadline = Instant::now() + timeout;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(None);
        }

        match iter.next_with_timeout(remaining) {
            Ok(Some((reply, addr))) => {
                if let Some(ttl) = match_reply(&reply, addr, target, source_port) {
                    return Ok(Some(ttl));
                }
            }
            Ok(None) => return Ok(None),
            Err(e) => return Err(FingerprintError::ChannelError(e.to_string())),
        }
    }
}

/// Extract the TTL when the captured packet is the target's answer to our
/// probe.
fn match_reply(reply: &Ipv4Packet<'_>, addr: IpAddr, target: Ipv4Addr, source_port: u16) -> Option<u8> {
    if addr != IpAddr::V4(target) || reply.get_source() != target {
        return None;
    }
    if reply.get_next_level_protocol() != IpNextHeaderProtocols::Tcp {
        return None;
    }

    let tcp = TcpPacket::new(reply.payload())?;
    if tcp.get_source() != FINGERPRINT_PORT || tcp.get_destination() != source_port {
        return None;
    }

    Some(reply.get_ttl())
}

/// Build a full IPv4 + TCP SYN packet.
fn build_syn_packet(
    source_ip: Ipv4Addr,
    target: Ipv4Addr,
    source_port: u16,
    dest_port: u16,
) -> FingerprintResult<Vec<u8>> {
    const IP_HEADER_SIZE: usize = 20;
    const TCP_HEADER_SIZE: usize = 20;

    let mut buffer = vec![0u8; IP_HEADER_SIZE + TCP_HEADER_SIZE];

    {
        let mut tcp_packet = MutableTcpPacket::new(&mut buffer[IP_HEADER_SIZE..])
            .ok_or_else(|| FingerprintError::InvalidPacket("failed to create TCP packet".to_string()))?;

        tcp_packet.set_source(source_port);
        tcp_packet.set_destination(dest_port);
        tcp_packet.set_sequence(rand::random());
        tcp_packet.set_acknowledgement(0);
        tcp_packet.set_data_offset(5);
        tcp_packet.set_reserved(0);
        tcp_packet.set_flags(TcpFlags::SYN);
        tcp_packet.set_window(65535);
        tcp_packet.set_urgent_ptr(0);

        let checksum = tcp::ipv4_checksum(&tcp_packet.to_immutable(), &source_ip, &target);
        tcp_packet.set_checksum(checksum);
    }

    {
        let mut ip_packet = MutableIpv4Packet::new(&mut buffer[..IP_HEADER_SIZE])
            .ok_or_else(|| FingerprintError::InvalidPacket("failed to create IP packet".to_string()))?;

        ip_packet.set_version(4);
        ip_packet.set_header_length(5);
        ip_packet.set_dscp(0);
        ip_packet.set_ecn(0);
        ip_packet.set_total_length((IP_HEADER_SIZE + TCP_HEADER_SIZE) as u16);
        ip_packet.set_identification(rand::random());
        ip_packet.set_flags(Ipv4Flags::DontFragment);
        ip_packet.set_fragment_offset(0);
        ip_packet.set_ttl(64);
        ip_packet.set_next_level_protocol(IpNextHeaderProtocols::Tcp);
        ip_packet.set_source(source_ip);
        ip_packet.set_destination(target);
        ip_packet.set_checksum(ipv4::checksum(&ip_packet.to_immutable()));
    }

    Ok(buffer)
}

/// Find the local IPv4 address the kernel would route to the target from,
/// via a connected UDP socket. Falls back to the unspecified address when
/// routing fails; the probe then goes unanswered and the guess degrades.
fn local_source_ip(target: Ipv4Addr) -> Ipv4Addr {
    if let Ok(socket) = std::net::UdpSocket::bind("0.0.0.0:0") {
        if socket
            .connect(SocketAddr::new(IpAddr::V4(target), FINGERPRINT_PORT))
            .is_ok()
        {
            if let Ok(SocketAddr::V4(local)) = socket.local_addr() {
                return *local.ip();
            }
        }
    }
    Ipv4Addr::UNSPECIFIED
}

/// Generate a random source port in the ephemeral range.
fn rand_source_port() -> u16 {
    use rand::Rng;
    rand::thread_rng().gen_range(49152..65535)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubProbe(Option<u8>);

    #[async_trait]
    impl SynProbe for StubProbe {
        async fn reply_ttl(&self, _target: IpAddr) -> FingerprintResult<Option<u8>> {
            Ok(self.0)
        }
    }

    struct FailingProbe;

    #[async_trait]
    impl SynProbe for FailingProbe {
        async fn reply_ttl(&self, _target: IpAddr) -> FingerprintResult<Option<u8>> {
            Err(FingerprintError::PermissionDenied)
        }
    }

    #[test]
    fn test_ttl_boundary_table() {
        assert_eq!(OsGuess::from_ttl(1), OsGuess::LinuxUnix);
        assert_eq!(OsGuess::from_ttl(64), OsGuess::LinuxUnix);
        assert_eq!(OsGuess::from_ttl(65), OsGuess::Windows);
        assert_eq!(OsGuess::from_ttl(128), OsGuess::Windows);
        assert_eq!(OsGuess::from_ttl(129), OsGuess::Unknown);
        assert_eq!(OsGuess::from_ttl(255), OsGuess::Unknown);
    }

    #[test]
    fn test_guess_display() {
        assert_eq!(OsGuess::LinuxUnix.to_string(), "Linux/Unix");
        assert_eq!(OsGuess::Windows.to_string(), "Windows");
        assert_eq!(OsGuess::Unknown.to_string(), "Sistema desconhecido");
        assert_eq!(OsGuess::NoResponse.to_string(), "Sem resposta");
    }

    #[tokio::test]
    async fn test_fingerprint_classifies_reply() {
        let target = IpAddr::V4(Ipv4Addr::LOCALHOST);
        assert_eq!(fingerprint_os(&StubProbe(Some(64)), target).await, OsGuess::LinuxUnix);
        assert_eq!(fingerprint_os(&StubProbe(Some(128)), target).await, OsGuess::Windows);
        assert_eq!(fingerprint_os(&StubProbe(Some(200)), target).await, OsGuess::Unknown);
    }

    #[tokio::test]
    async fn test_fingerprint_no_reply() {
        let target = IpAddr::V4(Ipv4Addr::LOCALHOST);
        assert_eq!(fingerprint_os(&StubProbe(None), target).await, OsGuess::NoResponse);
    }

    #[tokio::test]
    async fn test_fingerprint_degrades_without_privileges() {
        let target = IpAddr::V4(Ipv4Addr::LOCALHOST);
        assert_eq!(fingerprint_os(&FailingProbe, target).await, OsGuess::NoResponse);
    }

    #[tokio::test]
    async fn test_raw_probe_rejects_ipv6() {
        let probe = RawSocketProbe::default();
        let result = probe.reply_ttl("::1".parse().unwrap()).await;
        assert!(matches!(result, Err(FingerprintError::Ipv6Unsupported)));
    }

    #[test]
    fn test_syn_packet_layout() {
        let packet = build_syn_packet(
            Ipv4Addr::new(192, 168, 1, 10),
            Ipv4Addr::new(192, 168, 1, 1),
            50000,
            80,
        )
        .unwrap();
        assert_eq!(packet.len(), 40);

        let ip = Ipv4Packet::new(&packet).unwrap();
        assert_eq!(ip.get_version(), 4);
        assert_eq!(ip.get_ttl(), 64);
        assert_eq!(ip.get_next_level_protocol(), IpNextHeaderProtocols::Tcp);

        let tcp = TcpPacket::new(ip.payload()).unwrap();
        assert_eq!(tcp.get_source(), 50000);
        assert_eq!(tcp.get_destination(), 80);
        assert_eq!(tcp.get_flags(), TcpFlags::SYN);
    }
}
