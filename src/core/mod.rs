//! # Core Module
//!
//! The UI-agnostic organizing engine.
//!
//! ## Modules
//! - `scanner` - Discovers photos in the source tree
//! - `descriptor` - Per-file facts with lazily-cached digests
//! - `metadata` - Extracts EXIF dates, signatures and dimensions
//! - `hasher` - Pixel-stream and whole-file digests
//! - `comparator` - Decides whether two files hold the same photo
//! - `placer` - Derives target paths and resolves occupant conflicts
//! - `pipeline` - Drives the per-file run loop and the ledger
//! - `reporter` - Renders the run report

pub mod comparator;
pub mod descriptor;
pub mod hasher;
pub mod metadata;
pub mod pipeline;
pub mod placer;
pub mod reporter;
pub mod scanner;

// Re-export commonly used types
pub use comparator::{ComparisonEngine, ComparisonOutcome, EvidenceTier, MatchReason};
pub use descriptor::FileDescriptor;
pub use pipeline::{RunOutcome, RunStatistics};
pub use placer::{DiscardReason, LedgerEntry, TargetPlacer};
