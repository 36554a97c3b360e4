//! Output serialization
//!
//! Renders the final record sequence as a JSON array or delimited text and
//! writes it to stdout or a file. Serialization is fully buffered: a
//! mid-stream failure produces no partial output.

mod csv;
mod json;

use crate::config::EffectiveConfig;
use crate::suite::Record;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors from rendering or writing output
///
/// Fatal at output time; by then every traversal has already run, so the
/// caller gets the error with nothing half-written.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("Unknown output format '{0}'")]
    UnknownFormat(String),

    #[error("Failed to render output: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders the record sequence in the configured format
pub fn serialize(
    records: &[Record],
    config: &EffectiveConfig,
) -> Result<Vec<u8>, SerializationError> {
    match config.format.as_str() {
        "json" => json::render(records),
        "csv" => csv::render(records, config),
        other => Err(SerializationError::UnknownFormat(other.to_string())),
    }
}

/// Writes rendered output to `path`, or to stdout when no path is given
pub fn write_to(bytes: &[u8], path: Option<&Path>) -> Result<(), SerializationError> {
    match path {
        Some(path) => {
            std::fs::write(path, bytes)?;
            tracing::info!("Wrote {} bytes to {}", bytes.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}
