//! Command-line interface definitions.
//!
//! Uses `clap` derive macros for declarative argument parsing. Defaults not
//! given here come from the settings file.

use clap::Parser;
use std::path::PathBuf;

/// A concurrent TCP port scanner with banner grabbing, TTL-based OS
/// detection and CSV export.
#[derive(Parser, Debug)]
#[command(name = "vigia")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scanner de portas com detecção de OS e exportação CSV", long_about = None)]
pub struct Args {
    /// Target IP address or hostname to scan
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Port range to scan as "<start>-<end>" (default: 1-1024)
    #[arg(short, long, value_name = "RANGE")]
    pub ports: Option<String>,

    /// Connect/read timeout per port in milliseconds (default: 1000)
    #[arg(short = 't', long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Path of the exported CSV file (default: resultados_scan.csv)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Skip writing the CSV artifact
    #[arg(long)]
    pub no_export: bool,

    /// Verbose output (debug logging)
    #[arg(short, long)]
    pub verbose: bool,
}

/// Check if running with root/admin privileges.
///
/// The raw-socket fingerprint probe needs them; without them the OS guess
/// degrades instead of failing the scan.
pub fn is_root() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_invocation() {
        let args = Args::parse_from(["vigia", "192.168.1.1"]);
        assert_eq!(args.target, "192.168.1.1");
        assert!(args.ports.is_none());
        assert!(!args.no_export);
    }

    #[test]
    fn test_ports_flag() {
        let args = Args::parse_from(["vigia", "example.com", "-p", "22-443"]);
        assert_eq!(args.ports.as_deref(), Some("22-443"));
    }

    #[test]
    fn test_output_override() {
        let args = Args::parse_from(["vigia", "10.0.0.1", "--output", "/tmp/out.csv", "--no-export"]);
        assert_eq!(args.output, Some(PathBuf::from("/tmp/out.csv")));
        assert!(args.no_export);
    }

    #[test]
    fn test_target_is_required() {
        assert!(Args::try_parse_from(["vigia"]).is_err());
    }
}
