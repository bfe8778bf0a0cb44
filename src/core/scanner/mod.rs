//! # Scanner Module
//!
//! Discovers photo files in the source tree.
//!
//! ## Supported Formats
//! - JPEG (.jpg, .jpeg)
//! - PNG (.png)
//! - GIF (.gif)
//! - Camera raw (.raw, .cr2, .nef, .arw, .orf, .rw2, .pef, .dng)
//! - HEIC (.heic, .heif) - iPhone photos
//!
//! ## Example
//! ```rust,ignore
//! use photo_organizer::core::scanner::{ScanConfig, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default());
//! let result = scanner.scan(Path::new("/Users/photos"))?;
//! ```

mod filter;
mod walker;

pub use filter::{is_photo_path, PhotoFilter, PHOTO_EXTENSIONS};
pub use walker::{ScanConfig, WalkDirScanner};

use crate::core::descriptor::FileDescriptor;
use crate::error::ScanError;

/// Result of a scan operation
#[derive(Debug)]
pub struct ScanResult {
    /// Discovered files, in walk order
    pub files: Vec<FileDescriptor>,
    /// Errors that occurred during scanning (non-fatal)
    pub errors: Vec<ScanError>,
}
