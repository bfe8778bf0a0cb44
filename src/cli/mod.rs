//! # CLI Module
//!
//! Command-line interface for the photo organizer.
//!
//! ## Usage
//! ```bash
//! # Organize a source tree into a date-structured archive
//! photo-organize ~/Unsorted ~/Archive
//!
//! # Verbose output
//! photo-organize ~/Unsorted ~/Archive --verbose
//!
//! # JSON output
//! photo-organize ~/Unsorted ~/Archive --output json
//! ```

use clap::{Parser, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photo_organizer::core::pipeline::{self, RunOutcome};
use photo_organizer::core::reporter;
use photo_organizer::core::scanner::{ScanConfig, WalkDirScanner};
use photo_organizer::error::{Result, SetupError};
use std::path::PathBuf;

/// Photo Organizer - copy a photo tree into a dated archive, once
#[derive(Parser, Debug)]
#[command(name = "photo-organize")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to read photos from
    source: PathBuf,

    /// Archive root to place photos under
    target: PathBuf,

    /// Include hidden files
    #[arg(long)]
    include_hidden: bool,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (discarded paths only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let term = Term::stderr();

    if !cli.source.exists() {
        return Err(SetupError::SourceNotFound { path: cli.source }.into());
    }
    if !cli.source.is_dir() {
        return Err(SetupError::SourceNotADirectory { path: cli.source }.into());
    }

    if matches!(cli.output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Photo Organizer").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let scanner = WalkDirScanner::new(ScanConfig {
        include_hidden: cli.include_hidden,
        ..Default::default()
    });
    let scan = scanner.scan(&cli.source)?;

    if cli.verbose {
        for error in &scan.errors {
            term.write_line(&format!("{} {}", style("warning:").yellow(), error))
                .ok();
        }
    }

    let progress = if matches!(cli.output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(scan.files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let outcome = pipeline::run(scan.files, &cli.target, |done, _total, path| {
        if let Some(ref pb) = progress {
            pb.set_position(done as u64);
            pb.set_message(
                path.file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
                    .to_string(),
            );
        }
    })?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let report_path = reporter::write_report(&cli.target, &outcome)?;

    match cli.output {
        OutputFormat::Pretty => print_pretty_results(&term, &outcome, &report_path, cli.verbose),
        OutputFormat::Json => print_json_results(&outcome, &report_path),
        OutputFormat::Minimal => print_minimal_results(&outcome),
    }

    Ok(())
}

fn print_pretty_results(
    term: &Term,
    outcome: &RunOutcome,
    report_path: &std::path::Path,
    verbose: bool,
) {
    let stats = &outcome.stats;

    term.write_line("").ok();
    term.write_line(&format!("{} Run Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} files scanned",
        style(stats.scanned).cyan()
    ))
    .ok();
    term.write_line(&format!("  {} files copied", style(stats.copied).cyan()))
        .ok();
    term.write_line(&format!(
        "  {} duplicates skipped or replaced",
        style(stats.duplicates).cyan()
    ))
    .ok();

    if stats.collisions > 0 {
        term.write_line(&format!(
            "  {} name collisions (existing files preserved)",
            style(stats.collisions).yellow()
        ))
        .ok();
    }

    if stats.pixel_hash_unsupported() > 0 {
        term.write_line(&format!(
            "  {} files compared by whole-file hash (pixel hashing unsupported)",
            style(stats.pixel_hash_unsupported()).dim()
        ))
        .ok();
    }

    if verbose && !outcome.ledger.is_empty() {
        term.write_line("").ok();
        term.write_line(&format!("{}", style("Decisions:").bold().underlined()))
            .ok();
        for entry in &outcome.ledger {
            term.write_line(&format!(
                "  {} {}",
                style("kept").green(),
                entry.kept.display()
            ))
            .ok();
            term.write_line(&format!(
                "  {} {} ({})",
                style("drop").dim(),
                entry.discarded.display(),
                entry.reason
            ))
            .ok();
        }
    }

    if !stats.warnings.is_empty() {
        term.write_line("").ok();
        for warning in &stats.warnings {
            term.write_line(&format!("  {} {}", style("warning:").yellow(), warning))
                .ok();
        }
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "{}",
        style(format!("Full report: {}", report_path.display())).dim()
    ))
    .ok();
}

fn print_json_results(outcome: &RunOutcome, report_path: &std::path::Path) {
    let stats = &outcome.stats;
    let output = serde_json::json!({
        "scanned": stats.scanned,
        "copied": stats.copied,
        "duplicates": stats.duplicates,
        "collisions": stats.collisions,
        "comparison_failures": stats.comparison_failures,
        "pixel_hash_unsupported": stats.pixel_hash_unsupported(),
        "warnings": stats.warnings,
        "report": report_path,
        "ledger": outcome.ledger.iter().map(|e| {
            serde_json::json!({
                "kept": e.kept,
                "discarded": e.discarded,
                "reason": e.reason.to_string(),
            })
        }).collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}

fn print_minimal_results(outcome: &RunOutcome) {
    for entry in &outcome.ledger {
        println!("{}", entry.discarded.display());
    }
}
