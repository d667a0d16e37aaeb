//! JSON output helpers.
//!
//! Successful commands print the value they produced; failures print the
//! error object shared with the wire format.

use anyhow::{Context, Result};
use serde::Serialize;
use vmctl_common::ErrorBody;

/// Format the JSON error object printed when a command fails.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    serde_json::to_string_pretty(&ErrorBody::new(message, code))
        .context("JSON serialization failed")
}

/// Renders command results as pretty-printed JSON on stdout.
pub struct JsonRenderer;

impl JsonRenderer {
    /// Print any serializable value.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<()> {
        let text = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
        println!("{text}");
        Ok(())
    }
}
