//! # photo-organize CLI
//!
//! Command-line interface for the photo organizer.
//!
//! ## Usage
//! ```bash
//! photo-organize ~/Unsorted ~/Archive
//! photo-organize ~/Unsorted ~/Archive --verbose --output json
//! ```

mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    photo_organizer::init_tracing();

    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
