//! Cross-cutting utilities: settings and error types.

pub mod config;
pub mod errors;

pub use config::Settings;
pub use errors::{ExtractionError, OracleError};
