//! # moleco
//!
//! Deterministic color encodings for chemical identifiers.
//!
//! A standard InChI string maps to one color. A MInChI mixture string maps to an ordered
//! sequence of proportionally sized, colored segments, one per referenced component.
//!
//! File Layout
//!
//! The core follows the data flow of one identifier through the system:
//!
//! src/moleco
//!   ├── splitting       Prefix/version check, component and section extraction
//!   ├── lexing          logos tokens for the bracket/ampersand sections
//!   ├── parsing         Generic nested-structure parser (grouping and weighting)
//!   ├── weight          Weight literals (`37wf-2`, `10:15pp0`, ...)
//!   ├── ast             Substances, component table, mixture tree
//!   ├── building        Merge-and-validate of the two parallel trees
//!   ├── normalization   Sibling proportions cascaded into absolute proportions
//!   ├── color           Identifier hash to OkLCh/sRGB color
//!   ├── composing       Rendered segments in document order
//!   ├── pipeline        The whole chain behind one call
//!   └── formats         Tree visualization and JSON output
//!
//! Every stage is a pure function of its input. No stage performs I/O.
//!
//! For reference fixtures and tree factories used by the tests, see the
//! [testing module](moleco::testing).

pub mod moleco;

pub use moleco::ast::{ComponentTable, MixtureNode, MixtureTree, SubstanceIdentifier};
pub use moleco::color::{assign_color, assign_colors, Color, ColorMap, ColorOptions, Scheme};
pub use moleco::composing::{compose, RenderedSegment};
pub use moleco::error::{ParseError, ParseResult};
pub use moleco::normalization::{normalize, NormalizedTree, PROPORTION_TOLERANCE};
pub use moleco::splitting::ParseOptions;
pub use moleco::pipeline::{parse, parse_with, process, Options, Rendering};
pub use moleco::weight::{WeightDescriptor, WeightKind};
