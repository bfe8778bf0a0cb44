//! # Placer Module
//!
//! Derives the deterministic target path for a source file and resolves any
//! occupant conflict.
//!
//! ## Target Layout
//! `<target>/<YYYY>/<MM>/<YYYY-MM-DD-HHMMSS>.<ext>`, extension case
//! preserved. The scheme is deliberately unversioned: two sources whose
//! capture instants coincide to the second contend for one path, and the
//! contention is settled by content comparison, never by appending a suffix.
//!
//! ## Conflict Policy
//! The incumbent wins unless the pair is an exact pixel match and the source
//! has strictly more pixels, in which case the occupant is overwritten in
//! place. Distinct content at a colliding name is never overwritten and
//! never renamed; the source is discarded with a ledger entry.

use crate::core::comparator::{ComparisonEngine, EvidenceTier, MatchReason};
use crate::core::descriptor::FileDescriptor;
use crate::core::metadata;
use crate::error::{CompareError, PlaceError};
use chrono::{DateTime, Datelike, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Why a file was discarded in favor of another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscardReason {
    /// The two files hold the same content
    Duplicate(MatchReason),
    /// Same target name, distinct content; the incumbent is preserved
    Collision,
    /// The comparison was inconclusive; the incumbent is kept
    ComparisonFailed,
}

impl std::fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscardReason::Duplicate(reason) => write!(f, "{}", reason),
            DiscardReason::Collision => {
                write!(f, "name collision, distinct content, existing preserved")
            }
            DiscardReason::ComparisonFailed => write!(f, "comparison failed, existing kept"),
        }
    }
}

/// One kept/discarded decision
///
/// `kept` may temporarily hold a source path when the source won an
/// overwrite; the coordinator rewrites it to the realized on-disk path once
/// all placements complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub kept: PathBuf,
    pub discarded: PathBuf,
    pub reason: DiscardReason,
}

/// What a single placement did
#[derive(Debug)]
pub struct PlaceOutcome {
    /// Whether the source's bytes landed in the target tree
    pub copied: bool,
    /// The computed target path for this source
    pub final_path: PathBuf,
    /// Ledger entry, when an occupant contention was resolved
    pub ledger: Option<LedgerEntry>,
    /// True when the verdict came from the whole-file stage for an
    /// image-classified source (feeds the "pixel hashing unsupported" count)
    pub used_fallback: bool,
    /// A failure that was absorbed rather than raised (e.g. overwrite failed
    /// and the incumbent was kept)
    pub warning: Option<String>,
}

/// Places source files into the date-structured target tree
pub struct TargetPlacer {
    target_base: PathBuf,
}

impl TargetPlacer {
    pub fn new(target_base: PathBuf) -> Self {
        Self { target_base }
    }

    /// Resolve the capture instant for a source file
    ///
    /// EXIF capture date when present, filesystem modification time
    /// otherwise. A file with neither is skipped upstream; modification time
    /// is always available for a statable file.
    fn capture_instant(source: &FileDescriptor) -> Result<NaiveDateTime, PlaceError> {
        if let Some(date) = metadata::capture_date(source.path()) {
            return Ok(date);
        }

        let modified = fs::metadata(source.path())
            .and_then(|m| m.modified())
            .map_err(|e| PlaceError::Stat {
                path: source.path().to_path_buf(),
                source: e,
            })?;

        Ok(DateTime::<Local>::from(modified).naive_local())
    }

    /// Compute the target path a source resolves to, creating the month
    /// directory if needed
    fn target_path(&self, source: &FileDescriptor) -> Result<PathBuf, PlaceError> {
        let instant = Self::capture_instant(source)?;

        let month_dir = self
            .target_base
            .join(format!("{:04}", instant.year()))
            .join(format!("{:02}", instant.month()));
        fs::create_dir_all(&month_dir).map_err(|e| PlaceError::CreateDir {
            path: month_dir.clone(),
            source: e,
        })?;

        let stem = instant.format("%Y-%m-%d-%H%M%S").to_string();
        let name = match source.path().extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}.{}", stem, ext),
            None => stem,
        };

        Ok(month_dir.join(name))
    }

    /// Place one source file
    pub fn place(&self, source: &mut FileDescriptor) -> Result<PlaceOutcome, PlaceError> {
        let target = self.target_path(source)?;

        if !target.exists() {
            fs::copy(source.path(), &target).map_err(|e| PlaceError::Copy {
                from: source.path().to_path_buf(),
                to: target.clone(),
                source: e,
            })?;
            debug!(source = %source.path().display(), target = %target.display(), "copied");
            return Ok(PlaceOutcome {
                copied: true,
                final_path: target,
                ledger: None,
                used_fallback: false,
                warning: None,
            });
        }

        self.resolve_occupant(source, target)
    }

    /// Settle a contention between the source and the file already at the
    /// target path
    fn resolve_occupant(
        &self,
        source: &mut FileDescriptor,
        target: PathBuf,
    ) -> Result<PlaceOutcome, PlaceError> {
        let outcome = FileDescriptor::from_path(&target)
            .map_err(|e| CompareError::Occupant {
                path: target.clone(),
                source: e,
            })
            .and_then(|mut occupant| {
                ComparisonEngine::compare(source, &mut occupant).map(|verdict| (verdict, occupant))
            });

        let (verdict, mut occupant) = match outcome {
            Ok(pair) => pair,
            Err(e) => {
                let message = e.to_string();
                warn!(
                    source = %source.path().display(),
                    target = %target.display(),
                    %message,
                    "comparison failed, keeping existing file"
                );
                return Ok(PlaceOutcome {
                    copied: false,
                    final_path: target.clone(),
                    ledger: Some(LedgerEntry {
                        kept: target,
                        discarded: source.path().to_path_buf(),
                        reason: DiscardReason::ComparisonFailed,
                    }),
                    used_fallback: false,
                    warning: Some(message),
                });
            }
        };

        let used_fallback = verdict.tier == EvidenceTier::File && source.is_image();

        if !verdict.is_duplicate {
            debug!(
                source = %source.path().display(),
                target = %target.display(),
                reason = %verdict.reason,
                "name collision with distinct content, existing preserved"
            );
            return Ok(PlaceOutcome {
                copied: false,
                final_path: target.clone(),
                ledger: Some(LedgerEntry {
                    kept: target,
                    discarded: source.path().to_path_buf(),
                    reason: DiscardReason::Collision,
                }),
                used_fallback,
                warning: None,
            });
        }

        let source_wins = verdict.reason == MatchReason::PixelHashMatch
            && Self::source_outresolves(source, &mut occupant);

        if !source_wins {
            debug!(
                source = %source.path().display(),
                target = %target.display(),
                reason = %verdict.reason,
                "duplicate discarded, existing kept"
            );
            return Ok(PlaceOutcome {
                copied: false,
                final_path: target.clone(),
                ledger: Some(LedgerEntry {
                    kept: target,
                    discarded: source.path().to_path_buf(),
                    reason: DiscardReason::Duplicate(verdict.reason),
                }),
                used_fallback,
                warning: None,
            });
        }

        Ok(self.overwrite_occupant(source, target, verdict.reason, used_fallback))
    }

    /// Replace the occupant with the source's bytes
    ///
    /// A failed write reverts the decision: the incumbent stands, the ledger
    /// records the source as discarded, and the failure degrades to a
    /// warning instead of aborting the run.
    fn overwrite_occupant(
        &self,
        source: &FileDescriptor,
        target: PathBuf,
        reason: MatchReason,
        used_fallback: bool,
    ) -> PlaceOutcome {
        match fs::copy(source.path(), &target) {
            Ok(_) => {
                debug!(
                    source = %source.path().display(),
                    target = %target.display(),
                    "higher-resolution duplicate replaced existing file"
                );
                PlaceOutcome {
                    copied: true,
                    final_path: target.clone(),
                    ledger: Some(LedgerEntry {
                        // Rewritten to the realized target path by the coordinator
                        kept: source.path().to_path_buf(),
                        discarded: target,
                        reason: DiscardReason::Duplicate(reason),
                    }),
                    used_fallback,
                    warning: None,
                }
            }
            Err(e) => {
                let message = format!(
                    "overwrite of {} failed ({}), existing file kept",
                    target.display(),
                    e
                );
                warn!(source = %source.path().display(), "{}", message);
                PlaceOutcome {
                    copied: false,
                    final_path: target.clone(),
                    ledger: Some(LedgerEntry {
                        kept: target,
                        discarded: source.path().to_path_buf(),
                        reason: DiscardReason::Duplicate(reason),
                    }),
                    used_fallback,
                    warning: Some(message),
                }
            }
        }
    }

    /// Resolution contest for exact pixel matches
    ///
    /// Unknown occupant resolution loses to a known positive source
    /// resolution; two unknowns favor the occupant; otherwise the strictly
    /// larger area wins and ties favor the occupant.
    fn source_outresolves(source: &mut FileDescriptor, occupant: &mut FileDescriptor) -> bool {
        let source_area = source
            .resolution()
            .map(|(w, h)| w as u64 * h as u64)
            .filter(|&area| area > 0);
        let occupant_area = occupant.resolution().map(|(w, h)| w as u64 * h as u64);

        match (source_area, occupant_area) {
            (Some(_), None) => true,
            (None, _) => false,
            (Some(s), Some(o)) => s > o,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::path::Path;
    use tempfile::TempDir;

    fn save_png(dir: &Path, name: &str, img: &RgbaImage) -> PathBuf {
        let path = dir.join(name);
        img.save(&path).unwrap();
        path
    }

    fn expected_target(base: &Path, source: &Path) -> PathBuf {
        let modified = fs::metadata(source).unwrap().modified().unwrap();
        let instant = DateTime::<Local>::from(modified).naive_local();
        let ext = source.extension().unwrap().to_str().unwrap();
        base.join(format!("{:04}", instant.year()))
            .join(format!("{:02}", instant.month()))
            .join(format!("{}.{}", instant.format("%Y-%m-%d-%H%M%S"), ext))
    }

    #[test]
    fn fresh_file_is_copied_to_month_directory() {
        let src_dir = TempDir::new().unwrap();
        let dst_dir = TempDir::new().unwrap();
        let img = RgbaImage::from_pixel(3, 3, Rgba([1, 1, 1, 255]));
        let source = save_png(src_dir.path(), "photo.png", &img);

        let placer = TargetPlacer::new(dst_dir.path().to_path_buf());
        let mut desc = FileDescriptor::from_path(&source).unwrap();
        let outcome = placer.place(&mut desc).unwrap();

        assert!(outcome.copied);
        assert!(outcome.ledger.is_none());
        assert_eq!(outcome.final_path, expected_target(dst_dir.path(), &source));
        assert!(outcome.final_path.exists());
    }

    #[test]
    fn extension_case_is_preserved() {
        let src_dir = TempDir::new().unwrap();
        let dst_dir = TempDir::new().unwrap();
        let img = RgbaImage::from_pixel(3, 3, Rgba([1, 1, 1, 255]));
        // Encode as PNG but name it with an uppercase extension
        let lower = save_png(src_dir.path(), "photo.png", &img);
        let source = src_dir.path().join("photo.PNG");
        fs::rename(lower, &source).unwrap();

        let placer = TargetPlacer::new(dst_dir.path().to_path_buf());
        let mut desc = FileDescriptor::from_path(&source).unwrap();
        let outcome = placer.place(&mut desc).unwrap();

        assert!(outcome
            .final_path
            .to_string_lossy()
            .ends_with(".PNG"));
    }

    #[test]
    fn byte_identical_duplicate_keeps_occupant() {
        let src_dir = TempDir::new().unwrap();
        let dst_dir = TempDir::new().unwrap();
        let img = RgbaImage::from_pixel(5, 5, Rgba([7, 7, 7, 255]));
        let first = save_png(src_dir.path(), "first.png", &img);
        let second = save_png(src_dir.path(), "second.png", &img);

        let placer = TargetPlacer::new(dst_dir.path().to_path_buf());
        let mut d1 = FileDescriptor::from_path(&first).unwrap();
        let target = placer.place(&mut d1).unwrap().final_path;

        let mut d2 = FileDescriptor::from_path(&second).unwrap();
        let outcome = placer.place(&mut d2).unwrap();

        assert!(!outcome.copied);
        let entry = outcome.ledger.unwrap();
        assert_eq!(entry.kept, target);
        assert_eq!(entry.discarded, second);
        assert!(matches!(entry.reason, DiscardReason::Duplicate(_)));
    }

    #[test]
    fn higher_resolution_pixel_match_overwrites_occupant() {
        let src_dir = TempDir::new().unwrap();
        let dst_dir = TempDir::new().unwrap();
        let small = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
        let large = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        let small_path = save_png(src_dir.path(), "small.png", &small);
        let large_path = save_png(src_dir.path(), "large.png", &large);

        let placer = TargetPlacer::new(dst_dir.path().to_path_buf());
        let mut d_small = FileDescriptor::from_path(&small_path).unwrap();
        let target = placer.place(&mut d_small).unwrap().final_path;

        // Place the larger copy at the same target path
        let mut d_large = FileDescriptor::from_path(&large_path).unwrap();
        let outcome = placer.resolve_occupant(&mut d_large, target.clone()).unwrap();

        assert!(outcome.copied);
        let entry = outcome.ledger.unwrap();
        assert_eq!(entry.kept, large_path);
        assert_eq!(entry.discarded, target);
        assert_eq!(
            entry.reason,
            DiscardReason::Duplicate(MatchReason::PixelHashMatch)
        );
        assert_eq!(image::image_dimensions(&target).unwrap(), (4, 4));
    }

    #[test]
    fn lower_resolution_pixel_match_keeps_occupant() {
        let src_dir = TempDir::new().unwrap();
        let dst_dir = TempDir::new().unwrap();
        let small = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255]));
        let large = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]));
        let small_path = save_png(src_dir.path(), "small.png", &small);
        let large_path = save_png(src_dir.path(), "large.png", &large);

        let placer = TargetPlacer::new(dst_dir.path().to_path_buf());
        let mut d_large = FileDescriptor::from_path(&large_path).unwrap();
        let target = placer.place(&mut d_large).unwrap().final_path;

        let mut d_small = FileDescriptor::from_path(&small_path).unwrap();
        let outcome = placer.resolve_occupant(&mut d_small, target.clone()).unwrap();

        assert!(!outcome.copied);
        assert_eq!(image::image_dimensions(&target).unwrap(), (4, 4));
    }

    #[test]
    fn distinct_content_collision_preserves_occupant() {
        let src_dir = TempDir::new().unwrap();
        let dst_dir = TempDir::new().unwrap();
        let red = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        let blue = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]));
        let red_path = save_png(src_dir.path(), "red.png", &red);
        let blue_path = save_png(src_dir.path(), "blue.png", &blue);

        let placer = TargetPlacer::new(dst_dir.path().to_path_buf());
        let mut d_red = FileDescriptor::from_path(&red_path).unwrap();
        let target = placer.place(&mut d_red).unwrap().final_path;
        let occupant_bytes = fs::read(&target).unwrap();

        let mut d_blue = FileDescriptor::from_path(&blue_path).unwrap();
        let outcome = placer.resolve_occupant(&mut d_blue, target.clone()).unwrap();

        assert!(!outcome.copied);
        assert_eq!(outcome.ledger.unwrap().reason, DiscardReason::Collision);
        assert_eq!(fs::read(&target).unwrap(), occupant_bytes);
    }

    #[test]
    fn inconclusive_comparison_keeps_occupant_with_warning() {
        let src_dir = TempDir::new().unwrap();
        let dst_dir = TempDir::new().unwrap();
        let img = RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255]));
        let good = save_png(src_dir.path(), "good.png", &img);

        // Occupant claims PNG but holds garbage: decoding it errors
        let target_dir = dst_dir.path().join("2023").join("01");
        fs::create_dir_all(&target_dir).unwrap();
        let target = target_dir.join("2023-01-01-100000.png");
        fs::write(&target, b"garbage that is not a png").unwrap();

        let placer = TargetPlacer::new(dst_dir.path().to_path_buf());
        let mut d = FileDescriptor::from_path(&good).unwrap();
        let outcome = placer.resolve_occupant(&mut d, target.clone()).unwrap();

        assert!(!outcome.copied);
        assert!(outcome.warning.is_some());
        let entry = outcome.ledger.unwrap();
        assert_eq!(entry.kept, target);
        assert_eq!(entry.reason, DiscardReason::ComparisonFailed);
    }

    #[test]
    fn failed_overwrite_reverts_to_the_incumbent() {
        let src_dir = TempDir::new().unwrap();
        let dst_dir = TempDir::new().unwrap();
        let small = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
        let small_path = save_png(src_dir.path(), "small.png", &small);

        let placer = TargetPlacer::new(dst_dir.path().to_path_buf());
        let mut d_small = FileDescriptor::from_path(&small_path).unwrap();
        let target = placer.place(&mut d_small).unwrap().final_path;
        let occupant_bytes = fs::read(&target).unwrap();

        // The source won the contention but its bytes are gone by write time
        let vanished = src_dir.path().join("vanished.png");
        let source = FileDescriptor::new(vanished.clone(), 64);
        let outcome =
            placer.overwrite_occupant(&source, target.clone(), MatchReason::PixelHashMatch, false);

        assert!(!outcome.copied);
        assert!(outcome.warning.is_some());
        let entry = outcome.ledger.unwrap();
        assert_eq!(entry.kept, target);
        assert_eq!(entry.discarded, vanished);
        assert_eq!(
            entry.reason,
            DiscardReason::Duplicate(MatchReason::PixelHashMatch)
        );
        // The incumbent's bytes are untouched
        assert_eq!(fs::read(&target).unwrap(), occupant_bytes);
    }

    #[test]
    fn image_fallback_comparison_sets_used_fallback() {
        let src_dir = TempDir::new().unwrap();
        let dst_dir = TempDir::new().unwrap();
        let first = src_dir.path().join("a.cr2");
        let second = src_dir.path().join("b.cr2");
        fs::write(&first, b"raw payload").unwrap();
        fs::write(&second, b"raw payload").unwrap();

        let placer = TargetPlacer::new(dst_dir.path().to_path_buf());
        let mut d1 = FileDescriptor::from_path(&first).unwrap();
        let target = placer.place(&mut d1).unwrap().final_path;

        let mut d2 = FileDescriptor::from_path(&second).unwrap();
        let outcome = placer.resolve_occupant(&mut d2, target).unwrap();

        assert!(outcome.used_fallback);
        assert!(!outcome.copied);
    }
}
