//! File filtering logic for the scanner.

use std::path::Path;

/// Extensions treated as photo files, matched case-insensitively.
///
/// Covers the common container formats plus camera raw formats.
pub const PHOTO_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "raw", "cr2", "nef", "arw", "orf", "rw2", "pef", "dng", "heic",
    "heif",
];

/// Check whether a path carries a photo extension
///
/// This is the single image/non-image classification used everywhere: by the
/// scanner to admit source files and by descriptors to pick the comparison
/// cascade.
pub fn is_photo_path(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => {
            let ext_lower = ext.to_lowercase();
            PHOTO_EXTENSIONS.contains(&ext_lower.as_str())
        }
        None => false,
    }
}

/// Filters files during the source walk
pub struct PhotoFilter {
    /// Whether to include hidden files
    include_hidden: bool,
}

impl PhotoFilter {
    /// Create a new filter with default settings
    pub fn new() -> Self {
        Self {
            include_hidden: false,
        }
    }

    /// Include hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        if !self.include_hidden {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    return false;
                }
            }
        }

        is_photo_path(path)
    }
}

impl Default for PhotoFilter {
    fn default() -> Self {
        Self::new()
    }
}
