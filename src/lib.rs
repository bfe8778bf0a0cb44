//! # Photo Organizer
//!
//! Copies a photo collection into a date-structured archive without keeping
//! redundant copies of visually or byte-identical photos.
//!
//! ## Core Philosophy
//! - **Never silently overwrite** - distinct content at a colliding name is
//!   preserved and the collision is reported
//! - **Show WHY** - every discarded file gets a ledger entry with the reason
//! - **One file's failure never aborts the run** - errors degrade to a
//!   recorded outcome and the filesystem stays in its last known-good state
//!
//! ## Architecture
//! The library is the UI-agnostic engine; the `photo-organize` binary layers
//! a CLI on top of it:
//! - `core` - scanning, comparison, placement, run coordination, reporting
//! - `error` - error types separating fatal setup failures from per-file ones

pub mod core;
pub mod error;

// Re-export commonly used types at the crate root
pub use error::{OrganizerError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
