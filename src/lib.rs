//! # Vigia - Host Reconnaissance Scanner
//!
//! Vigia discovers which TCP ports on a target accept connections, grabs a
//! short service banner from each, and estimates the target's operating
//! system from a single TTL sample.
//!
//! ## Features
//!
//! - **Connect Scanning**: full-handshake TCP probing, no privileges needed
//! - **Unbounded Fan-Out**: every port in the range probed simultaneously
//! - **Banner Grabbing**: fixed HTTP probe plus a short bounded read
//! - **OS Fingerprinting**: one raw SYN, classified by reply TTL
//! - **CSV Export**: single-column result artifact written at the end
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use vigia::scanner::{self, RawSocketProbe, ScanOptions};
//! use vigia::types::{PortRange, Target};
//!
//! #[tokio::main]
//! async fn main() {
//!     let target = Target::resolve("192.168.1.1").await.unwrap();
//!     let range: PortRange = "1-1024".parse().unwrap();
//!     let os_probe = RawSocketProbe::default();
//!
//!     let report = scanner::scan(
//!         &target,
//!         range,
//!         &ScanOptions::default(),
//!         &os_probe,
//!         |outcome| println!("{outcome}"),
//!     )
//!     .await;
//!
//!     println!("{} portas abertas", report.open_count());
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Validated port-range and target types
//! - [`scanner`] - Probe, coordinator, and TTL fingerprinter
//! - [`config`] - Settings file management
//! - [`output`] - Console rendering and CSV export
//! - [`error`] - Error types

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod types;

// Re-export commonly used types
pub use scanner::{
    OsGuess, PortStatus, ProbeOutcome, RawSocketProbe, ScanOptions, ScanReport, SynProbe,
};
pub use types::{PortRange, Target};
