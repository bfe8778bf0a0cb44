//! Directory walking implementation using walkdir.

use super::{filter::PhotoFilter, ScanResult};
use crate::core::descriptor::FileDescriptor;
use crate::error::ScanError;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Configuration for the directory scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_hidden: false,
            max_depth: None,
        }
    }
}

/// Scanner implementation using the walkdir crate
///
/// Files are returned in walk order; the run processes them in exactly this
/// order, so it is also the tie-break order for incumbent-preference
/// decisions.
pub struct WalkDirScanner {
    config: ScanConfig,
    filter: PhotoFilter,
}

impl WalkDirScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let filter = PhotoFilter::new().with_hidden(config.include_hidden);
        Self { config, filter }
    }

    /// Recursively discover photo files under `root`
    ///
    /// A missing or non-directory root is an error; anything that goes wrong
    /// below the root is recorded in the result and the walk continues.
    pub fn scan(&self, root: &Path) -> Result<ScanResult, ScanError> {
        if !root.exists() || !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut files = Vec::new();
        let mut errors = Vec::new();

        let mut walker = WalkDir::new(root).follow_links(self.config.follow_symlinks);
        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        for entry_result in walker {
            match entry_result {
                Ok(entry) => {
                    let path = entry.path();

                    if path.is_dir() {
                        continue;
                    }

                    if !self.filter.should_include(path) {
                        continue;
                    }

                    match fs::metadata(path) {
                        Ok(metadata) => {
                            files.push(FileDescriptor::new(path.to_path_buf(), metadata.len()));
                        }
                        Err(e) => {
                            errors.push(ScanError::ReadDirectory {
                                path: path.to_path_buf(),
                                source: e,
                            });
                        }
                    }
                }
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();

                    let error = if e.io_error().map(|e| e.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path }
                    } else {
                        ScanError::ReadDirectory {
                            path,
                            source: std::io::Error::other(e.to_string()),
                        }
                    };

                    errors.push(error);
                }
            }
        }

        Ok(ScanResult { files, errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn create_test_photo(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        // Minimal JPEG header; the scanner only looks at the extension
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
        path
    }

    #[test]
    fn scan_empty_directory_returns_empty_vec() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = WalkDirScanner::new(ScanConfig::default());

        let result = scanner.scan(temp_dir.path()).unwrap();

        assert!(result.files.is_empty());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn scan_finds_single_photo() {
        let temp_dir = TempDir::new().unwrap();
        create_test_photo(temp_dir.path(), "photo.jpg");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(temp_dir.path()).unwrap();

        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].path().ends_with("photo.jpg"));
        assert_eq!(result.files[0].size(), 4);
    }

    #[test]
    fn scan_excludes_non_image_files() {
        let temp_dir = TempDir::new().unwrap();
        create_test_photo(temp_dir.path(), "photo.jpg");
        File::create(temp_dir.path().join("document.txt")).unwrap();
        File::create(temp_dir.path().join("movie.mp4")).unwrap();

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(temp_dir.path()).unwrap();

        assert_eq!(result.files.len(), 1);
    }

    #[test]
    fn scan_traverses_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();

        create_test_photo(temp_dir.path(), "root.jpg");
        create_test_photo(&subdir, "nested.png");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(temp_dir.path()).unwrap();

        assert_eq!(result.files.len(), 2);
    }

    #[test]
    fn scan_excludes_hidden_files_by_default() {
        let temp_dir = TempDir::new().unwrap();
        create_test_photo(temp_dir.path(), "visible.jpg");
        create_test_photo(temp_dir.path(), ".hidden.jpg");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(temp_dir.path()).unwrap();

        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].path().ends_with("visible.jpg"));
    }

    #[test]
    fn scan_nonexistent_directory_is_an_error() {
        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(Path::new("/nonexistent/path/12345"));

        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
    }
}
