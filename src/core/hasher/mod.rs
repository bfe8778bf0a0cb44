//! # Hasher Module
//!
//! Computes the content evidence the comparison cascade relies on:
//!
//! - **Pixel digest** - a blake3 hash over the decoded pixel stream sampled
//!   to a fixed raster. Container or metadata edits and exact rescales of
//!   the same picture hash identically. The digest is a pre-filter only:
//!   images above the raster size hash a sample grid, so a digest match is
//!   confirmed with [`pixel_streams_match`] before anything is discarded
//! - **Exact stream confirmation** - full pixel-stream equality at native
//!   resolution, with the larger image of an unequal pair downsampled to the
//!   smaller's dimensions so an exact integer upscale still confirms
//! - **File digest** - a blake3 hash over the raw bytes, the fallback of
//!   last resort for formats that cannot be decoded
//!
//! Formats the decoder does not understand (camera raw, unknown containers)
//! are reported as [`PixelDigest::Unsupported`] rather than an error, so the
//! caller can fall back to whole-file hashing.

use crate::error::HashError;
use image::{imageops::FilterType, DynamicImage, ImageError};
use std::fs::File;
use std::io;
use std::path::Path;

/// Edge length of the canonical raster pixel digests are computed over.
///
/// Nearest-neighbor sampling to a fixed square makes an exact integer
/// upscale of an image hash the same as the original, which is what lets the
/// placer keep the higher-resolution copy of the same picture.
const NORMALIZED_EDGE: u32 = 64;

/// Outcome of a pixel digest computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelDigest {
    /// The file decoded; digest over its normalized pixel stream
    Supported(blake3::Hash),
    /// The decoder does not understand this format
    Unsupported,
}

fn decode(path: &Path) -> Result<Option<DynamicImage>, HashError> {
    match image::open(path) {
        Ok(img) => Ok(Some(img)),
        Err(ImageError::Unsupported(_)) => Ok(None),
        Err(ImageError::IoError(e)) => Err(HashError::IoError {
            path: path.to_path_buf(),
            source: e,
        }),
        Err(e) => Err(HashError::DecodeError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

/// Compute the pixel digest for an image file
///
/// Unknown formats yield `Ok(PixelDigest::Unsupported)`. A file that claims
/// a decodable format but fails to decode is an error; the comparison that
/// needed it is inconclusive.
pub fn pixel_digest(path: &Path) -> Result<PixelDigest, HashError> {
    let img = match decode(path)? {
        Some(img) => img,
        None => return Ok(PixelDigest::Unsupported),
    };

    let normalized = img
        .resize_exact(NORMALIZED_EDGE, NORMALIZED_EDGE, FilterType::Nearest)
        .to_rgba8();

    Ok(PixelDigest::Supported(blake3::hash(normalized.as_raw())))
}

/// Confirm that two files hold pixel-identical pictures
///
/// Equal dimensions compare the native pixel streams directly. Unequal
/// dimensions downsample the larger image to the smaller's dimensions with
/// nearest-neighbor sampling, which inverts an exact integer upscale, and
/// compare the resulting streams. Called only after the digest pre-filter
/// matched, so a file that no longer decodes here is an error.
pub fn pixel_streams_match(a: &Path, b: &Path) -> Result<bool, HashError> {
    let img_a = decode(a)?.ok_or_else(|| HashError::DecodeError {
        path: a.to_path_buf(),
        reason: "unsupported format".to_string(),
    })?;
    let img_b = decode(b)?.ok_or_else(|| HashError::DecodeError {
        path: b.to_path_buf(),
        reason: "unsupported format".to_string(),
    })?;

    let area = |img: &DynamicImage| img.width() as u64 * img.height() as u64;

    let (img_a, img_b) = if (img_a.width(), img_a.height()) == (img_b.width(), img_b.height()) {
        (img_a, img_b)
    } else if area(&img_a) >= area(&img_b) {
        let reduced = img_a.resize_exact(img_b.width(), img_b.height(), FilterType::Nearest);
        (reduced, img_b)
    } else {
        let reduced = img_b.resize_exact(img_a.width(), img_a.height(), FilterType::Nearest);
        (img_a, reduced)
    };

    Ok(img_a.to_rgba8().as_raw() == img_b.to_rgba8().as_raw())
}

/// Compute the whole-file digest, streamed from disk
pub fn file_digest(path: &Path) -> Result<blake3::Hash, HashError> {
    let mut file = File::open(path).map_err(|e| HashError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut hasher = blake3::Hasher::new();
    io::copy(&mut file, &mut hasher).map_err(|e| HashError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(hasher.finalize())
}
