//! # Pipeline Module
//!
//! Drives the whole run: one file at a time, strictly in discovery order,
//! each fully resolved before the next begins. A fatal setup condition
//! aborts before any file is touched; every later failure is scoped to the
//! file it affects and degrades to a recorded outcome.
//!
//! Discovery order is whatever the walker produced; it is deliberately not
//! re-sorted, so it is also the tie-break order for incumbent-preference
//! decisions.

use crate::core::descriptor::FileDescriptor;
use crate::core::placer::{LedgerEntry, TargetPlacer};
use crate::error::SetupError;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Counters accumulated over a run
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunStatistics {
    /// Source files processed
    pub scanned: usize,
    /// Files whose bytes landed in the target tree (fresh copies and
    /// overwrites)
    pub copied: usize,
    /// Ledger entries recording duplicate content
    pub duplicates: usize,
    /// Ledger entries recording a name collision with distinct content
    pub collisions: usize,
    /// Comparisons that were inconclusive and fell to the incumbent
    pub comparison_failures: usize,
    /// Image-classified sources whose verdict needed the whole-file
    /// fallback, deduplicated per source file
    pub fallback_sources: HashSet<PathBuf>,
    /// Per-file failures that were absorbed rather than raised
    pub warnings: Vec<String>,
}

impl RunStatistics {
    /// The "pixel hashing unsupported" statistic
    pub fn pixel_hash_unsupported(&self) -> usize {
        self.fallback_sources.len()
    }
}

/// Everything a run produced
#[derive(Debug)]
pub struct RunOutcome {
    pub stats: RunStatistics,
    pub ledger: Vec<LedgerEntry>,
}

/// Run the full per-file loop over `sources`
///
/// Creating the target root is the only fatal step. After all placements
/// complete, every ledger entry whose kept path names a source that was
/// itself copied is rewritten to the realized on-disk path, so no rendered
/// ledger ever points into the source tree.
pub fn run<F>(
    mut sources: Vec<FileDescriptor>,
    target_base: &Path,
    mut on_progress: F,
) -> Result<RunOutcome, SetupError>
where
    F: FnMut(usize, usize, &Path),
{
    fs::create_dir_all(target_base).map_err(|e| SetupError::CreateTargetRoot {
        path: target_base.to_path_buf(),
        source: e,
    })?;

    let placer = TargetPlacer::new(target_base.to_path_buf());
    let total = sources.len();

    let mut stats = RunStatistics::default();
    let mut ledger: Vec<LedgerEntry> = Vec::new();
    // Source path -> realized target path, for ledger finalization
    let mut realized: HashMap<PathBuf, PathBuf> = HashMap::new();

    for (i, source) in sources.iter_mut().enumerate() {
        on_progress(i + 1, total, source.path());
        stats.scanned += 1;

        let outcome = match placer.place(source) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(source = %source.path().display(), error = %e, "file skipped");
                stats.warnings.push(e.to_string());
                continue;
            }
        };

        if outcome.copied {
            stats.copied += 1;
            realized.insert(source.path().to_path_buf(), outcome.final_path.clone());
        }

        if outcome.used_fallback {
            stats.fallback_sources.insert(source.path().to_path_buf());
        }

        if let Some(warning) = outcome.warning {
            stats.warnings.push(warning);
        }

        if let Some(entry) = outcome.ledger {
            use crate::core::placer::DiscardReason;
            match entry.reason {
                DiscardReason::Duplicate(_) => stats.duplicates += 1,
                DiscardReason::Collision => stats.collisions += 1,
                DiscardReason::ComparisonFailed => stats.comparison_failures += 1,
            }
            ledger.push(entry);
        }
    }

    // Finalize kept paths: a source that won its contention is now on disk
    // under its target name, and that is the path the ledger must show.
    for entry in &mut ledger {
        if let Some(final_path) = realized.get(&entry.kept) {
            entry.kept = final_path.clone();
        }
    }

    Ok(RunOutcome { stats, ledger })
}
