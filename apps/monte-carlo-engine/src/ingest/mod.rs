//! Trade outcome ingestion.

mod loader;

pub use loader::{LoadError, LoadedOutcomes, load_outcomes, parse_delimited, parse_json};
