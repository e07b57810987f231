//! Output formatting module.
//!
//! Console rendering and the CSV exporter. The scanning core only hands
//! over a report; everything user-facing happens here.

mod csv_format;
mod plain;

pub use csv_format::export_csv;
pub use plain::{
    print_banner, print_error, print_info, print_interrupted, print_os_guess, print_outcome,
    print_scan_header, print_warning,
};
