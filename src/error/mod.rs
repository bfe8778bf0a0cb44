//! # Error Module
//!
//! Error types for the photo organizer.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Fatal and per-file failures are distinct types** - `SetupError` aborts
//!   a run before any file is touched; `ScanError`, `HashError`,
//!   `CompareError` and `PlaceError` are scoped to a single file and degrade
//!   to a recorded outcome
//! - **Include context** - paths, file names, what went wrong

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum OrganizerError {
    #[error("Setup error: {0}")]
    Setup(#[from] SetupError),

    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Report generation error: {0}")]
    Report(#[from] ReportError),
}

/// Fatal conditions detected before any file is processed
///
/// These abort the whole run; nothing in the target tree has been modified
/// when one is raised.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Source directory not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("Source is not a directory: {path}")]
    SourceNotADirectory { path: PathBuf },

    #[error("Failed to create target root {path}: {source}")]
    CreateTargetRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while discovering source files
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while computing digests
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to decode image {path}: {reason}")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Failed to read file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur during a single comparison
///
/// A comparison error is inconclusive, never fatal: the caller resolves it by
/// keeping the incumbent and recording the outcome in the ledger.
#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Hashing failed: {0}")]
    Hash(#[from] HashError),

    #[error("Failed to inspect occupant {path}: {source}")]
    Occupant {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Per-file placement failures
///
/// The affected file is skipped; the run continues and the target tree is
/// left in its last known-good state.
#[derive(Error, Debug)]
pub enum PlaceError {
    #[error("Failed to stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while writing the run report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, OrganizerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_error_includes_path() {
        let error = SetupError::SourceNotFound {
            path: PathBuf::from("/photos/vacation"),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/vacation"));
    }

    #[test]
    fn hash_error_includes_path_and_reason() {
        let error = HashError::DecodeError {
            path: PathBuf::from("/photos/broken.jpg"),
            reason: "invalid JPEG".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/broken.jpg"));
        assert!(message.contains("invalid JPEG"));
    }

    #[test]
    fn place_error_includes_both_paths() {
        let error = PlaceError::Copy {
            from: PathBuf::from("/src/a.jpg"),
            to: PathBuf::from("/dst/b.jpg"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        let message = error.to_string();
        assert!(message.contains("/src/a.jpg"));
        assert!(message.contains("/dst/b.jpg"));
    }
}
