//! Pipeline
//!
//!     Chains the stages for callers that start from identifier text:
//!
//!         text ─ splitting ─ parsing ─ building ─► MixtureTree
//!         MixtureTree ─ normalization ─┐
//!         ComponentTable ─ color ──────┴─ composing ─► Vec<RenderedSegment>
//!
//!     [parse] stops at the tree; [process] runs everything. Each stage is also public on its
//!     own module for callers that need the intermediate results.

use crate::moleco::ast::{ComponentTable, MixtureTree, SubstanceIdentifier};
use crate::moleco::building::{build, flat};
use crate::moleco::color::{assign_colors_with, ColorOptions};
use crate::moleco::composing::{compose, unassigned_proportion, RenderedSegment};
use crate::moleco::error::ParseResult;
use crate::moleco::normalization::normalize;
use crate::moleco::parsing::{parse_grouping, parse_weighting};
use crate::moleco::splitting::{split, ParseOptions};
use serde::{Deserialize, Serialize};

/// Options for the whole pipeline
///
/// Color ranges are checked when [ColorOptions] is built or deserialized, so any `Options`
/// value reaching [process] holds usable ranges.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Options {
    pub parsing: ParseOptions,
    pub color: ColorOptions,
}

/// Output of [process]: the parsed tree and its segments
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rendering {
    pub tree: MixtureTree,
    pub segments: Vec<RenderedSegment>,
    /// Share of the whole held by empty slots, not covered by any segment
    pub unassigned: f64,
}

/// Parse an identifier with strict version checking
pub fn parse(text: &str) -> ParseResult<MixtureTree> {
    parse_with(text, &ParseOptions::default())
}

pub fn parse_with(text: &str, options: &ParseOptions) -> ParseResult<MixtureTree> {
    let split = split(text, options)?;
    let substances = split
        .components
        .iter()
        .map(|slice| SubstanceIdentifier::at(slice.text, slice.offset))
        .collect::<ParseResult<Vec<_>>>()?;
    let components = ComponentTable::new(substances);

    let Some(sections) = split.sections else {
        return Ok(flat(components));
    };
    let grouping = parse_grouping(
        sections.grouping.text,
        sections.grouping.offset,
        components.len(),
    )?;
    let weighting = parse_weighting(sections.weighting.text, sections.weighting.offset)?;
    build(components, grouping, weighting)
}

/// Parse, normalize, color and compose in one call
pub fn process(text: &str, options: &Options) -> ParseResult<Rendering> {
    let tree = parse_with(text, &options.parsing)?;
    let normalized = normalize(&tree);
    let colors = assign_colors_with(tree.components(), &options.color);
    let segments = compose(&normalized, &colors)?;
    let unassigned = unassigned_proportion(&normalized);
    Ok(Rendering {
        tree,
        segments,
        unassigned,
    })
}
