//! JSON output for renderers

use super::FormatError;
use crate::moleco::composing::RenderedSegment;
use crate::moleco::pipeline::Rendering;

/// Pretty JSON of a whole rendering: tree, segments and unassigned share
pub fn rendering_to_json(rendering: &Rendering) -> Result<String, FormatError> {
    serde_json::to_string_pretty(rendering)
        .map_err(|e| FormatError::SerializationError(e.to_string()))
}

/// Compact JSON array of segments
pub fn segments_to_json(segments: &[RenderedSegment]) -> Result<String, FormatError> {
    serde_json::to_string(segments).map_err(|e| FormatError::SerializationError(e.to_string()))
}
