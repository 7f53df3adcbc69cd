//! Output formats
//!
//! Text renderings of the pipeline's results. [treeviz] draws a mixture tree for people,
//! [json] serializes renderings for the drawing side.

pub mod json;
pub mod treeviz;

use std::fmt;

/// Error that can occur while formatting
#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    SerializationError(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
        }
    }
}

impl std::error::Error for FormatError {}
