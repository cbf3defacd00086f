//! Structured error types for the Nota renderer.
//!
//! The renderer trusts the shape of the records it is handed, so most
//! variants cover the world around it: JSON input, typeface and image assets,
//! and the external symbol encoder.

use std::path::PathBuf;

/// The unified error type returned by all public Nota API functions.
#[derive(Debug, thiserror::Error)]
pub enum NotaError {
    /// JSON input (a record, a batch, or a config file) failed to parse.
    #[error("Failed to parse input: {source}{}", format_hint(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// A typeface could not be loaded, parsed, or embedded.
    #[error("Font error: {0}")]
    Font(String),

    /// A background template or stamp image could not be decoded.
    #[error("Image error: {0}")]
    Image(String),

    /// The symbol encoder rejected the payload.
    #[error("Barcode error: {0}")]
    Barcode(String),

    /// The Indonesian words converter only accepts non-negative amounts.
    #[error("Cannot spell out negative amount {0}")]
    NegativeAmount(i64),

    /// An asset file could not be read from disk.
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for NotaError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the record schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        NotaError::Parse { source: e, hint }
    }
}

/// Read a whole asset file, attaching the path to any failure.
pub(crate) fn read_asset(path: &std::path::Path) -> Result<Vec<u8>, NotaError> {
    std::fs::read(path).map_err(|source| NotaError::Io {
        path: path.to_path_buf(),
        source,
    })
}
