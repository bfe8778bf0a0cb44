//! # Reporter Module
//!
//! Renders the run outcome into `report.txt` under the target root: the
//! summary counters first, then one kept/discarded/reason block per ledger
//! entry. Every kept path in the rendered report names a file that exists on
//! disk after the run.

use crate::core::pipeline::RunOutcome;
use crate::error::ReportError;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the report, created under the target root
pub const REPORT_FILE_NAME: &str = "report.txt";

/// Render the report text
pub fn render(outcome: &RunOutcome) -> String {
    let stats = &outcome.stats;
    let mut out = String::new();

    let _ = writeln!(out, "photo-organize report");
    let _ = writeln!(out, "=====================");
    let _ = writeln!(out);
    let _ = writeln!(out, "files scanned:             {}", stats.scanned);
    let _ = writeln!(out, "files copied:              {}", stats.copied);
    let _ = writeln!(out, "duplicates:                {}", stats.duplicates);
    let _ = writeln!(out, "name collisions:           {}", stats.collisions);
    let _ = writeln!(out, "comparison failures:       {}", stats.comparison_failures);
    let _ = writeln!(
        out,
        "pixel hashing unsupported: {}",
        stats.pixel_hash_unsupported()
    );

    if !stats.warnings.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "warnings");
        let _ = writeln!(out, "--------");
        for warning in &stats.warnings {
            let _ = writeln!(out, "- {}", warning);
        }
    }

    if !outcome.ledger.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "kept / discarded");
        let _ = writeln!(out, "----------------");
        for entry in &outcome.ledger {
            let _ = writeln!(out);
            let _ = writeln!(out, "kept:      {}", entry.kept.display());
            let _ = writeln!(out, "discarded: {}", entry.discarded.display());
            let _ = writeln!(out, "reason:    {}", entry.reason);
        }
    }

    out
}

/// Write the report under the target root and return its path
pub fn write_report(target_base: &Path, outcome: &RunOutcome) -> Result<PathBuf, ReportError> {
    let path = target_base.join(REPORT_FILE_NAME);
    fs::write(&path, render(outcome)).map_err(|e| ReportError::WriteFailed {
        path: path.clone(),
        source: e,
    })?;
    Ok(path)
}
