//! # file-dedup CLI
//!
//! Command-line interface for the duplicate file cleaner.
//!
//! ## Usage
//! ```bash
//! file-dedup scan ~/Data --priority archive=100 --report dupes.csv
//! file-dedup clean ~/Data --priority archive=100 --yes
//! ```

mod cli;

use duplicate_file_cleaner::Result;

fn main() -> Result<()> {
    duplicate_file_cleaner::init_tracing();
    cli::run()
}
