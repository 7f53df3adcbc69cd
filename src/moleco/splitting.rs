//! Identifier splitter
//!
//!     First stage of the pipeline. Recognizes the identifier format from its prefix, checks the
//!     version layer, and cuts the text into raw slices: one per substance, plus the raw
//!     grouping and weighting sections of a mixture. Nothing is interpreted beyond that; the
//!     slices keep their byte offsets so later stages can report positions in the full text.
//!
//! Formats
//!
//!         InChI=<version>/<body>
//!         MInChI=<version>/<component>&<component>...[/n<grouping>/g<weighting>]
//!
//!     Components of a mixture carry their own `/`-separated layers, so the sections are
//!     recognized from the end: the last chunk starts with `g`, the one before it with `n`.
//!     Hashed keys (`InChIKey=`, `MInChIKey=`) cannot be decoded back into structure and are
//!     rejected like any unknown prefix.

use crate::moleco::error::{ParseError, ParseResult, Section};
use serde::Deserialize;

const SUBSTANCE_PREFIX: &str = "InChI=";
const MIXTURE_PREFIX: &str = "MInChI=";
const KEY_PREFIXES: [&str; 2] = ["InChIKey=", "MInChIKey="];

/// Version accepted by strict parsing for standalone substances
pub const SUBSTANCE_VERSION: &str = "1S";
/// Version accepted by strict parsing for mixtures
pub const MIXTURE_VERSION: &str = "0.00.1S";

const GROUPING_MARKER: char = 'n';
const WEIGHTING_MARKER: char = 'g';

/// Options for the parsing stages
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Only accept the versions this crate was written against
    pub strict_version_check: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict_version_check: true,
        }
    }
}

impl ParseOptions {
    pub fn lax() -> Self {
        Self {
            strict_version_check: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Substance,
    Mixture,
}

/// A piece of the identifier text and where it starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice<'a> {
    pub text: &'a str,
    pub offset: usize,
}

impl<'a> Slice<'a> {
    fn new(text: &'a str, offset: usize) -> Self {
        Self { text, offset }
    }

    /// Byte offset just past the slice
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

/// Raw grouping and weighting sections, markers removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sections<'a> {
    pub grouping: Slice<'a>,
    pub weighting: Slice<'a>,
}

/// Result of splitting an identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIdentifier<'a> {
    pub format: Format,
    pub version: Slice<'a>,
    /// Raw substance slices in written order; never empty
    pub components: Vec<Slice<'a>>,
    pub sections: Option<Sections<'a>>,
}

/// Split an identifier into raw component and section slices
pub fn split<'a>(text: &'a str, options: &ParseOptions) -> ParseResult<SplitIdentifier<'a>> {
    let text = text.trim_end();

    if KEY_PREFIXES.iter().any(|prefix| text.starts_with(prefix)) {
        return Err(unsupported(text));
    }

    let split = if let Some(rest) = text.strip_prefix(MIXTURE_PREFIX) {
        split_mixture(text, rest, options)?
    } else if let Some(rest) = text.strip_prefix(SUBSTANCE_PREFIX) {
        split_substance(text, rest, options)?
    } else {
        return Err(unsupported(text));
    };

    log::debug!(
        "split {:?} identifier (version {}) into {} component(s){}",
        split.format,
        split.version.text,
        split.components.len(),
        if split.sections.is_some() {
            " with grouping and weighting"
        } else {
            ""
        }
    );
    Ok(split)
}

fn split_substance<'a>(
    text: &'a str,
    rest: &'a str,
    options: &ParseOptions,
) -> ParseResult<SplitIdentifier<'a>> {
    let start = SUBSTANCE_PREFIX.len();
    let (version, body) = version_and_body(text, rest, start, SUBSTANCE_VERSION, options)?;
    if body.text.is_empty() {
        return Err(ParseError::EmptyIdentifier {
            offset: body.offset,
        });
    }

    Ok(SplitIdentifier {
        format: Format::Substance,
        version,
        components: vec![body],
        sections: None,
    })
}

fn split_mixture<'a>(
    text: &'a str,
    rest: &'a str,
    options: &ParseOptions,
) -> ParseResult<SplitIdentifier<'a>> {
    let start = MIXTURE_PREFIX.len();
    let (version, body) = version_and_body(text, rest, start, MIXTURE_VERSION, options)?;

    let (components, sections) = split_sections(body)?;
    let components = split_components(components)?;

    Ok(SplitIdentifier {
        format: Format::Mixture,
        version,
        components,
        sections,
    })
}

/// Separate `<version>/<body>`, checking the version against `expected` in strict mode
fn version_and_body<'a>(
    text: &'a str,
    rest: &'a str,
    start: usize,
    expected: &str,
    options: &ParseOptions,
) -> ParseResult<(Slice<'a>, Slice<'a>)> {
    let (version, body, body_offset) = match rest.split_once('/') {
        Some((version, body)) => (version, body, start + version.len() + 1),
        None => (rest, "", text.len()),
    };

    let accepted = if options.strict_version_check {
        version == expected
    } else {
        !version.is_empty()
    };
    if !accepted {
        return Err(ParseError::UnsupportedFormat {
            found: text[..start + version.len()].to_string(),
        });
    }

    Ok((Slice::new(version, start), Slice::new(body, body_offset)))
}

/// Cut trailing `/n.../g...` chunks off a mixture body
fn split_sections(body: Slice<'_>) -> ParseResult<(Slice<'_>, Option<Sections<'_>>)> {
    let mut chunks: Vec<Slice<'_>> = Vec::new();
    let mut cursor = body.offset;
    for chunk in body.text.split('/') {
        chunks.push(Slice::new(chunk, cursor));
        cursor += chunk.len() + 1;
    }

    let count = chunks.len();
    let last = if count > 1 { chunks.last() } else { None };
    let before_last = if count > 2 { chunks.get(count - 2) } else { None };

    let weighting = marked(last, WEIGHTING_MARKER);
    let grouping = match weighting {
        Some(_) => marked(before_last, GROUPING_MARKER),
        None => marked(last, GROUPING_MARKER),
    };

    match (grouping, weighting) {
        (Some(grouping), Some(weighting)) => {
            let components_end = grouping.offset - 1;
            Ok((
                Slice::new(&body.text[..components_end - body.offset], body.offset),
                Some(Sections {
                    grouping: strip_marker(grouping),
                    weighting: strip_marker(weighting),
                }),
            ))
        }
        (Some(grouping), None) => Err(ParseError::IncompleteMixtureStructure {
            missing: Section::Weighting,
            offset: grouping.offset,
        }),
        (None, Some(weighting)) => Err(ParseError::IncompleteMixtureStructure {
            missing: Section::Grouping,
            offset: weighting.offset,
        }),
        (None, None) => Ok((body, None)),
    }
}

fn marked<'a>(chunk: Option<&Slice<'a>>, marker: char) -> Option<Slice<'a>> {
    chunk.filter(|chunk| chunk.text.starts_with(marker)).copied()
}

fn strip_marker(chunk: Slice<'_>) -> Slice<'_> {
    Slice::new(&chunk.text[1..], chunk.offset + 1)
}

fn split_components(components: Slice<'_>) -> ParseResult<Vec<Slice<'_>>> {
    let mut slices = Vec::new();
    let mut cursor = components.offset;
    for part in components.text.split('&') {
        if part.is_empty() {
            return Err(ParseError::EmptyIdentifier { offset: cursor });
        }
        slices.push(Slice::new(part, cursor));
        cursor += part.len() + 1;
    }
    Ok(slices)
}

/// Leading part of an unrecognized identifier, for the error message
fn unsupported(text: &str) -> ParseError {
    let head = text.split('/').next().unwrap_or(text);
    ParseError::UnsupportedFormat {
        found: head.chars().take(32).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moleco::testing::fixtures::{CAFFEINE, FORMALDEHYDE};

    fn texts<'a>(slices: &[Slice<'a>]) -> Vec<&'a str> {
        slices.iter().map(|slice| slice.text).collect()
    }

    #[test]
    fn test_substance() {
        let split = split(CAFFEINE, &ParseOptions::default()).unwrap();
        assert_eq!(split.format, Format::Substance);
        assert_eq!(split.components.len(), 1);
        assert_eq!(split.components[0].offset, 9);
        assert!(split.components[0].text.starts_with("C8H10N4O2/"));
        assert_eq!(split.sections, None);
    }

    #[test]
    fn test_mixture_with_sections() {
        let split = split(FORMALDEHYDE, &ParseOptions::default()).unwrap();
        assert_eq!(split.format, Format::Mixture);
        assert_eq!(
            texts(&split.components),
            vec!["CH2O/c1-2/h1H2", "CH4O/c1-2/h2H,1H3", "H2O/h1H2"]
        );

        let sections = split.sections.unwrap();
        assert_eq!(sections.grouping.text, "{{1&3}&2}");
        assert_eq!(sections.weighting.text, "{{37wf-2&}&10:15pp0}");
        assert_eq!(
            &FORMALDEHYDE[sections.weighting.offset..sections.weighting.end()],
            sections.weighting.text
        );
        for component in &split.components {
            assert_eq!(
                &FORMALDEHYDE[component.offset..component.end()],
                component.text
            );
        }
    }

    #[test]
    fn test_mixture_without_sections() {
        let split = split("MInChI=0.00.1S/H2O/h1H2&CH4O/c1-2/h2H,1H3", &ParseOptions::default())
            .unwrap();
        assert_eq!(
            texts(&split.components),
            vec!["H2O/h1H2", "CH4O/c1-2/h2H,1H3"]
        );
        assert_eq!(split.sections, None);
    }

    #[test]
    fn test_incomplete_structure() {
        let error = split("MInChI=0.00.1S/H2O/h1H2&CH4O/n{1&2}", &ParseOptions::default())
            .unwrap_err();
        assert_eq!(
            error,
            ParseError::IncompleteMixtureStructure {
                missing: Section::Weighting,
                offset: 29,
            }
        );

        let error = split("MInChI=0.00.1S/H2O&CH4O/g{1wf0&}", &ParseOptions::default())
            .unwrap_err();
        assert_eq!(error.kind(), "IncompleteMixtureStructure");
    }

    #[test]
    fn test_version_check() {
        let strict = ParseOptions::default();
        let lax = ParseOptions::lax();

        let error = split("InChI=1/H2O/h1H2", &strict).unwrap_err();
        assert_eq!(
            error,
            ParseError::UnsupportedFormat {
                found: "InChI=1".to_string(),
            }
        );
        assert!(split("InChI=1/H2O/h1H2", &lax).is_ok());
        assert!(split("MInChI=0.00.1B/H2O", &strict).is_err());
        assert!(split("MInChI=0.00.1B/H2O", &lax).is_ok());
        assert!(split("InChI=/H2O", &lax).is_err());
    }

    #[test]
    fn test_unsupported_prefixes() {
        for text in [
            "InChIKey=XLYOFNOQVPJJNP-UHFFFAOYSA-N",
            "MInChIKey=XLYOFNOQVPJJNP-UHFFFAOYSA-N",
            "SMILES=O",
            "",
        ] {
            let error = split(text, &ParseOptions::default()).unwrap_err();
            assert_eq!(error.kind(), "UnsupportedFormat", "text {text:?}");
        }
    }

    #[test]
    fn test_empty_identifiers() {
        assert_eq!(
            split("InChI=1S/", &ParseOptions::default()).unwrap_err(),
            ParseError::EmptyIdentifier { offset: 9 }
        );
        assert_eq!(
            split("MInChI=0.00.1S/H2O&&CH4O", &ParseOptions::default()).unwrap_err(),
            ParseError::EmptyIdentifier { offset: 19 }
        );
        assert_eq!(
            split("MInChI=0.00.1S/", &ParseOptions::default()).unwrap_err(),
            ParseError::EmptyIdentifier { offset: 15 }
        );
    }

    #[test]
    fn test_trailing_newline_ignored() {
        let split = split("InChI=1S/H2O/h1H2\n", &ParseOptions::default()).unwrap();
        assert_eq!(split.components[0].text, "H2O/h1H2");
    }
}
