//! Swatch composition
//!
//!     Final stage: pairs each leaf of a normalized tree with its component's color. The result
//!     is a flat list of [RenderedSegment] in the order the leaves are written, which is all a
//!     renderer needs. Groups emit nothing of their own. Empty slots emit nothing either; the
//!     share they carry is reported by [unassigned_proportion].

use crate::moleco::color::{Color, ColorMap};
use crate::moleco::error::{ParseError, ParseResult};
use crate::moleco::normalization::NormalizedTree;
use serde::Serialize;

/// One drawable piece of a swatch
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderedSegment {
    /// 0-based index into the component table
    pub component_index: usize,
    /// Share of the whole swatch, in [0, 1]
    pub proportion: f64,
    pub color: Color,
    /// Number of groups enclosing the leaf, not counting the root group
    pub depth: usize,
}

/// Segments of every non-empty leaf in document order
pub fn compose(normalized: &NormalizedTree<'_>, colors: &ColorMap) -> ParseResult<Vec<RenderedSegment>> {
    let segments = normalized
        .leaves()
        .into_iter()
        .filter_map(|leaf| leaf.component.map(|index| (index, leaf)))
        .map(|(index, leaf)| {
            let color = colors
                .get(index)
                .ok_or_else(|| ParseError::UnknownComponentReference {
                    reference: (index + 1).to_string(),
                    offset: 0,
                    available: colors.len(),
                })?;
            Ok(RenderedSegment {
                component_index: index,
                proportion: leaf.proportion.absolute,
                color: *color,
                depth: leaf.depth,
            })
        })
        .collect::<ParseResult<Vec<_>>>()?;

    log::debug!("composed {} segments", segments.len());
    Ok(segments)
}

/// Total proportion per component; a component can appear in several segments
pub fn component_totals(segments: &[RenderedSegment], components: usize) -> Vec<f64> {
    let mut totals = vec![0.0; components];
    for segment in segments {
        if let Some(total) = totals.get_mut(segment.component_index) {
            *total += segment.proportion;
        }
    }
    totals
}

/// Share of the whole carried by empty slots, which produce no segment
pub fn unassigned_proportion(normalized: &NormalizedTree<'_>) -> f64 {
    normalized
        .leaves()
        .iter()
        .filter(|leaf| leaf.component.is_none())
        .map(|leaf| leaf.proportion.absolute)
        .sum()
}
