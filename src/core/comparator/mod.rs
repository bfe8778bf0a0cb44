//! # Comparator Module
//!
//! Decides whether two files hold the same photo, and explains the verdict.
//!
//! ## The Cascade
//! Evidence is consulted cheapest-first and the first conclusive stage wins:
//! 1. A missing occupant is trivially not a duplicate
//! 2. Two zero-byte files are trivially identical
//! 3. Image pairs: EXIF signature pre-filter, then normalized pixel digest
//!    with a digest match confirmed against the exact pixel streams, then
//!    size + whole-file digest for formats the decoder rejects
//! 4. Everything else: size, then whole-file digest
//!
//! A pixel verdict of duplicate always rests on exact stream equality; the
//! digest alone never discards anything.
//!
//! Verdicts are symmetric: comparing A against B and B against A yields the
//! same duplicate/non-duplicate answer.

use crate::core::descriptor::FileDescriptor;
use crate::core::hasher::{self, PixelDigest};
use crate::error::CompareError;
use serde::{Deserialize, Serialize};

/// Why the cascade reached its verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchReason {
    SizeMismatch,
    ExifMismatch,
    PixelHashMatch,
    PixelHashMismatch,
    FileHashMatch,
    FileHashMismatch,
    TargetNotFound,
}

impl std::fmt::Display for MatchReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchReason::SizeMismatch => write!(f, "file sizes differ"),
            MatchReason::ExifMismatch => write!(f, "EXIF signatures differ"),
            MatchReason::PixelHashMatch => write!(f, "identical pixel content"),
            MatchReason::PixelHashMismatch => write!(f, "pixel content differs"),
            MatchReason::FileHashMatch => write!(f, "identical file content"),
            MatchReason::FileHashMismatch => write!(f, "file content differs"),
            MatchReason::TargetNotFound => write!(f, "target not present"),
        }
    }
}

/// Which comparison stage produced the final verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvidenceTier {
    None,
    Exif,
    Pixel,
    File,
}

/// Verdict of a single comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonOutcome {
    pub is_duplicate: bool,
    pub reason: MatchReason,
    pub tier: EvidenceTier,
}

impl ComparisonOutcome {
    fn new(is_duplicate: bool, reason: MatchReason, tier: EvidenceTier) -> Self {
        Self {
            is_duplicate,
            reason,
            tier,
        }
    }
}

/// The duplicate decision cascade
pub struct ComparisonEngine;

impl ComparisonEngine {
    /// Compare a source file against an occupant
    ///
    /// An error means the comparison is inconclusive, not that the run
    /// should stop; the caller resolves it by keeping the incumbent.
    pub fn compare(
        a: &mut FileDescriptor,
        b: &mut FileDescriptor,
    ) -> Result<ComparisonOutcome, CompareError> {
        if !b.path().exists() {
            return Ok(ComparisonOutcome::new(
                false,
                MatchReason::TargetNotFound,
                EvidenceTier::None,
            ));
        }

        // No content is trivially identical content
        if a.size() == 0 && b.size() == 0 {
            return Ok(ComparisonOutcome::new(
                true,
                MatchReason::FileHashMatch,
                EvidenceTier::File,
            ));
        }

        if a.is_image() && b.is_image() {
            Self::compare_images(a, b)
        } else {
            Self::compare_bytes(a, b)
        }
    }

    fn compare_images(
        a: &mut FileDescriptor,
        b: &mut FileDescriptor,
    ) -> Result<ComparisonOutcome, CompareError> {
        // EXIF pre-filter: only a difference between two resolved signatures
        // is conclusive. Absent or equal signatures fall through.
        let sig_a = a.exif_signature().map(str::to_owned);
        let sig_b = b.exif_signature();
        if let (Some(sa), Some(sb)) = (sig_a.as_deref(), sig_b) {
            if sa != sb {
                return Ok(ComparisonOutcome::new(
                    false,
                    MatchReason::ExifMismatch,
                    EvidenceTier::Exif,
                ));
            }
        }

        // Either side undecodable means whole-file fallback for both
        let da = match a.pixel_digest()? {
            PixelDigest::Unsupported => return Self::compare_bytes(a, b),
            PixelDigest::Supported(digest) => digest,
        };
        let db = match b.pixel_digest()? {
            PixelDigest::Unsupported => return Self::compare_bytes(a, b),
            PixelDigest::Supported(digest) => digest,
        };

        if da != db {
            return Ok(ComparisonOutcome::new(
                false,
                MatchReason::PixelHashMismatch,
                EvidenceTier::Pixel,
            ));
        }

        // The digest samples large images, so a match is only a candidate;
        // nothing is called a duplicate without exact stream equality
        if hasher::pixel_streams_match(a.path(), b.path())? {
            Ok(ComparisonOutcome::new(
                true,
                MatchReason::PixelHashMatch,
                EvidenceTier::Pixel,
            ))
        } else {
            Ok(ComparisonOutcome::new(
                false,
                MatchReason::PixelHashMismatch,
                EvidenceTier::Pixel,
            ))
        }
    }

    fn compare_bytes(
        a: &mut FileDescriptor,
        b: &mut FileDescriptor,
    ) -> Result<ComparisonOutcome, CompareError> {
        if a.size() != b.size() {
            return Ok(ComparisonOutcome::new(
                false,
                MatchReason::SizeMismatch,
                EvidenceTier::File,
            ));
        }

        let da = a.file_digest()?;
        let db = b.file_digest()?;

        if da == db {
            Ok(ComparisonOutcome::new(
                true,
                MatchReason::FileHashMatch,
                EvidenceTier::File,
            ))
        } else {
            Ok(ComparisonOutcome::new(
                false,
                MatchReason::FileHashMismatch,
                EvidenceTier::File,
            ))
        }
    }
}
