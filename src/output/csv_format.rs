//! CSV export of scan results.
//!
//! Writes a single-column file: a `Resultado` header, one row per outcome
//! display string in the report's stored order, and the OS-guess line as the
//! final row. Written once, after the scan completes.

use crate::error::ExportError;
use crate::scanner::ScanReport;
use std::path::Path;

/// Export the report to a CSV file at `path`.
pub fn export_csv(report: &ScanReport, path: &Path) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["Resultado"])?;
    for line in report.display_lines() {
        wtr.write_record([line.as_str()])?;
    }

    wtr.flush()?;
    Ok(())
}
