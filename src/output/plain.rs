//! Console output.
//!
//! Prints the startup banner, per-port discovery lines, and the final OS
//! guess. The port lines keep the tool's original wording; everything is
//! written as it happens so slow scans still show progress.

use crate::scanner::{OsGuess, ProbeOutcome};
use crate::types::{PortRange, Target};
use console::style;

/// Startup banner art.
const BANNER_ART: &str = r#"
        👁️
       /   \
      /  👁️  \
     /   ---   \
    /  /     \  \
   /  /   👁️   \  \
  /  /         \  \
 /  /           \  \
/  /____________\  \
--------------------
Scanner Que Tudo Vê
"#;

/// Print the startup banner art.
pub fn print_banner() {
    println!("{}", style(BANNER_ART).cyan());
}

/// Print the pre-scan header line.
pub fn print_scan_header(target: &Target, range: &PortRange) {
    println!(
        "{} Escaneando {} de porta {} a {}...\n",
        style("[+]").green().bold(),
        style(target.to_string()).white().bold(),
        range.start(),
        range.end()
    );
}

/// Print one discovery line for an open port.
pub fn print_outcome(outcome: &ProbeOutcome) {
    println!("{}", outcome);
}

/// Print the final OS guess line.
pub fn print_os_guess(guess: OsGuess) {
    println!(
        "\n{} Sistema operacional estimado: {}",
        style("[+]").green().bold(),
        style(guess.to_string()).yellow()
    );
}

/// Print the interrupt notice.
pub fn print_interrupted() {
    println!(
        "\n{} Execução interrompida pelo usuário.",
        style("[!]").yellow().bold()
    );
}

/// Print an informational message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("[+]").green().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("[!]").yellow().bold(), msg);
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("[Erro]").red().bold(), msg);
}
