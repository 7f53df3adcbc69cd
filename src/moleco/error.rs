//! Error types for identifier parsing and mixture construction
//!
//! Every stage reports the first failure it meets as a [`ParseError`]. Each variant carries
//! either a byte offset into the original identifier text or a [`NodePath`] into the mixture
//! structure, so callers can point at the exact spot that failed.

use std::fmt;

/// The part of a mixture identifier an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// The `&`-joined substance list.
    Components,
    /// The `/n` grouping section.
    Grouping,
    /// The `/g` weighting section.
    Weighting,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Components => write!(f, "components"),
            Section::Grouping => write!(f, "grouping section"),
            Section::Weighting => write!(f, "weighting section"),
        }
    }
}

/// Position of a node in a nested structure, as 0-based child indices from the root.
///
/// Displayed 1-based and dotted (`2.1` is the first child of the second top-level element),
/// which matches how people count positions in the notation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path of the `index`-th child of this node.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "root");
        }
        let dotted: Vec<String> = self.0.iter().map(|i| (i + 1).to_string()).collect();
        write!(f, "{}", dotted.join("."))
    }
}

/// Errors that can occur while parsing an identifier and building its mixture tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Missing, unknown or unsupported format/version prefix
    UnsupportedFormat { found: String },
    /// Only one of the grouping and weighting sections is present
    IncompleteMixtureStructure { missing: Section, offset: usize },
    /// A bracket without its partner
    UnbalancedGrouping { section: Section, offset: usize },
    /// A token where a separator or a bracket was required
    UnexpectedToken {
        section: Section,
        offset: usize,
        found: String,
    },
    /// Weight literal with a kind tag outside the known vocabulary
    UnknownWeightKind {
        tag: String,
        literal: String,
        offset: usize,
    },
    /// Weight literal whose mantissa or exponent is not a number
    MalformedWeight {
        literal: String,
        offset: usize,
        reason: String,
    },
    /// Grouping and weighting sections disagree on shape at `path`
    MixtureStructureMismatch {
        path: NodePath,
        grouping: String,
        weighting: String,
    },
    /// Grouping leaf that does not name a component of the table
    UnknownComponentReference {
        reference: String,
        offset: usize,
        available: usize,
    },
    /// A substance identifier with no text
    EmptyIdentifier { offset: usize },
}

impl ParseError {
    /// Byte offset into the identifier text, when the failure has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            ParseError::UnsupportedFormat { .. } | ParseError::MixtureStructureMismatch { .. } => {
                None
            }
            ParseError::IncompleteMixtureStructure { offset, .. }
            | ParseError::UnbalancedGrouping { offset, .. }
            | ParseError::UnexpectedToken { offset, .. }
            | ParseError::UnknownWeightKind { offset, .. }
            | ParseError::MalformedWeight { offset, .. }
            | ParseError::UnknownComponentReference { offset, .. }
            | ParseError::EmptyIdentifier { offset } => Some(*offset),
        }
    }

    /// Stable name of the error kind, as used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::UnsupportedFormat { .. } => "UnsupportedFormat",
            ParseError::IncompleteMixtureStructure { .. } => "IncompleteMixtureStructure",
            ParseError::UnbalancedGrouping { .. } => "UnbalancedGrouping",
            ParseError::UnexpectedToken { .. } => "UnexpectedToken",
            ParseError::UnknownWeightKind { .. } => "UnknownWeightKind",
            ParseError::MalformedWeight { .. } => "MalformedWeight",
            ParseError::MixtureStructureMismatch { .. } => "MixtureStructureMismatch",
            ParseError::UnknownComponentReference { .. } => "UnknownComponentReference",
            ParseError::EmptyIdentifier { .. } => "EmptyIdentifier",
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnsupportedFormat { found } => {
                write!(f, "Unsupported identifier format: {:?}", found)
            }
            ParseError::IncompleteMixtureStructure { missing, offset } => {
                write!(f, "Mixture structure without {} (at byte {})", missing, offset)
            }
            ParseError::UnbalancedGrouping { section, offset } => {
                write!(f, "Unbalanced bracket in {} at byte {}", section, offset)
            }
            ParseError::UnexpectedToken {
                section,
                offset,
                found,
            } => write!(
                f,
                "Unexpected {:?} in {} at byte {}",
                found, section, offset
            ),
            ParseError::UnknownWeightKind {
                tag,
                literal,
                offset,
            } => write!(
                f,
                "Unknown weight kind {:?} in {:?} at byte {}",
                tag, literal, offset
            ),
            ParseError::MalformedWeight {
                literal,
                offset,
                reason,
            } => write!(
                f,
                "Malformed weight {:?} at byte {}: {}",
                literal, offset, reason
            ),
            ParseError::MixtureStructureMismatch {
                path,
                grouping,
                weighting,
            } => write!(
                f,
                "Grouping and weighting disagree at {}: {} vs {}",
                path, grouping, weighting
            ),
            ParseError::UnknownComponentReference {
                reference,
                offset,
                available,
            } => write!(
                f,
                "Component reference {:?} at byte {} does not match any of the {} components",
                reference, offset, available
            ),
            ParseError::EmptyIdentifier { offset } => {
                write!(f, "Empty substance identifier at byte {}", offset)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Result alias used by every parsing and building stage
pub type ParseResult<T> = Result<T, ParseError>;
