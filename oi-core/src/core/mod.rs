//! Shared error and label types
//!
//! - `FetchError`: provider/fetch failures (all map to the `fail` outcome)
//! - `ExporterError`: setup and exposition failures
//! - `OptionType`, `ScrapeStatus`: closed label value sets

pub mod errors;
pub mod types;

// Re-export commonly used types
pub use errors::{ExporterError, FetchError};
pub use types::{OptionType, ScrapeStatus};
