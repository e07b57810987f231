//! Error types for vigia.
//!
//! Uses `thiserror` for ergonomic error definitions. Per-port connect and
//! read failures are expected and absorbed inside the probe; only setup,
//! export, and fingerprint-capability failures are modeled here. The
//! binary aggregates them through `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while acquiring or using the raw-socket SYN capability.
///
/// These never abort a scan: the fingerprint step catches them and degrades
/// the OS guess instead.
#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error("permission denied: raw socket access requires root/sudo privileges")]
    PermissionDenied,

    #[error("OS fingerprinting only supports IPv4 targets")]
    Ipv6Unsupported,

    #[error("raw socket error: {0}")]
    ChannelError(String),

    #[error("failed to send SYN probe: {0}")]
    SendFailed(String),

    #[error("invalid packet: {0}")]
    InvalidPacket(String),
}

/// Errors loading or saving application settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {}: {reason}", path.display())]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {}: {reason}", path.display())]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid settings format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Errors writing the CSV result artifact.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for fingerprint-capability operations.
pub type FingerprintResult<T> = Result<T, FingerprintError>;

/// Result type alias for settings operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
