//! # Metadata Module
//!
//! Extracts EXIF metadata from photo files.
//!
//! ## Extracted Facts
//! - Capture date, with tag priority DateTimeOriginal > DateTimeDigitized > DateTime
//! - EXIF signature: a cheap string fingerprint over a fixed tag set
//! - Pixel dimensions, from the image header with EXIF tags as fallback
//!
//! Extraction never fails hard: a file without usable metadata simply
//! reports `None` and callers fall back (modification time for dates, the
//! pixel stage for comparisons).

use chrono::NaiveDateTime;
use exif::{Exif, In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Tags consulted for the capture date, in priority order
const DATE_TAGS: [Tag; 3] = [Tag::DateTimeOriginal, Tag::DateTimeDigitized, Tag::DateTime];

fn read_exif(path: &Path) -> Option<Exif> {
    let file = File::open(path).ok()?;
    let mut bufreader = BufReader::new(&file);
    Reader::new().read_from_container(&mut bufreader).ok()
}

/// Extract the capture date from EXIF data
///
/// Returns `None` when the file has no readable EXIF block, none of the date
/// tags are present, or the value does not parse as an EXIF timestamp.
pub fn capture_date(path: &Path) -> Option<NaiveDateTime> {
    let exif = read_exif(path)?;

    for tag in DATE_TAGS {
        if let Some(field) = exif.get_field(tag, In::PRIMARY) {
            if let Some(s) = ascii_value(&field.value) {
                // EXIF date format: "YYYY:MM:DD HH:MM:SS"
                if let Ok(date) = NaiveDateTime::parse_from_str(&s, "%Y:%m:%d %H:%M:%S") {
                    return Some(date);
                }
            }
        }
    }

    None
}

/// Build the EXIF signature used as a cheap comparison pre-filter
///
/// The signature joins a fixed tag set - capture timestamp, make, model,
/// width, height - with missing tags rendered empty. It resolves to `None`
/// only when the file carries no readable EXIF block at all. Two resolved
/// signatures that differ are enough to call two photos distinct without
/// decoding any pixels.
pub fn exif_signature(path: &Path) -> Option<String> {
    let exif = read_exif(path)?;

    let date = DATE_TAGS
        .iter()
        .find_map(|&tag| exif.get_field(tag, In::PRIMARY))
        .and_then(|f| ascii_value(&f.value))
        .unwrap_or_default();
    let make = exif
        .get_field(Tag::Make, In::PRIMARY)
        .and_then(|f| ascii_value(&f.value))
        .unwrap_or_default();
    let model = exif
        .get_field(Tag::Model, In::PRIMARY)
        .and_then(|f| ascii_value(&f.value))
        .unwrap_or_default();
    let width = exif
        .get_field(Tag::PixelXDimension, In::PRIMARY)
        .and_then(|f| u32_value(&f.value))
        .map(|v| v.to_string())
        .unwrap_or_default();
    let height = exif
        .get_field(Tag::PixelYDimension, In::PRIMARY)
        .and_then(|f| u32_value(&f.value))
        .map(|v| v.to_string())
        .unwrap_or_default();

    Some(format!("{}|{}|{}|{}|{}", date, make, model, width, height))
}

/// Extract pixel dimensions as (width, height)
///
/// Reads the image header first, which is cheap and format-accurate, and
/// falls back to the EXIF dimension tags for formats the image crate cannot
/// probe.
pub fn resolution(path: &Path) -> Option<(u32, u32)> {
    if let Ok(dims) = image::image_dimensions(path) {
        return Some(dims);
    }

    let exif = read_exif(path)?;
    let width = exif
        .get_field(Tag::PixelXDimension, In::PRIMARY)
        .and_then(|f| u32_value(&f.value))?;
    let height = exif
        .get_field(Tag::PixelYDimension, In::PRIMARY)
        .and_then(|f| u32_value(&f.value))?;
    Some((width, height))
}

/// Helper to extract a trimmed string from an EXIF ASCII value
fn ascii_value(value: &Value) -> Option<String> {
    if let Value::Ascii(ref vec) = value {
        if let Some(bytes) = vec.first() {
            if let Ok(s) = std::str::from_utf8(bytes) {
                let trimmed = s.trim_end_matches('\0').trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}

/// Helper to extract u32 from various EXIF value types
fn u32_value(value: &Value) -> Option<u32> {
    match value {
        Value::Long(vec) => vec.first().copied(),
        Value::Short(vec) => vec.first().map(|v| *v as u32),
        _ => None,
    }
}
