//! Data model of a parsed identifier
//!
//!     A parsed identifier is a [MixtureTree]: a [ComponentTable] holding one opaque
//!     [SubstanceIdentifier] per substance, and a root [MixtureNode] describing how the
//!     substances are grouped and weighted.
//!
//!     A standalone substance is the degenerate tree whose root is a single leaf.
//!
//! Depth
//!
//!     Depth counts the groups enclosing a node, not counting the root group. Children of the
//!     root group are at depth 0, and so is a root leaf. In `{1&{2&3}}` leaf 1 is at depth 0 and
//!     leaves 2 and 3 are at depth 1.

use crate::moleco::error::{ParseError, ParseResult};
use crate::moleco::weight::WeightDescriptor;
use serde::Serialize;
use std::fmt;

/// Opaque structural identifier of one substance, used for hashing and equality only.
///
/// For a standalone `InChI=1S/...` input this is the text after the version layer, so the
/// same substance compares equal whether it is given alone or inside a mixture.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SubstanceIdentifier(String);

impl SubstanceIdentifier {
    pub fn new(text: impl Into<String>) -> ParseResult<Self> {
        Self::at(text, 0)
    }

    /// Like [`SubstanceIdentifier::new`], reporting `offset` on failure
    pub fn at(text: impl Into<String>, offset: usize) -> ParseResult<Self> {
        let text = text.into();
        if text.is_empty() {
            return Err(ParseError::EmptyIdentifier { offset });
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SubstanceIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubstanceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Substances of one identifier in written order.
///
/// The notation references components 1-based; this API indexes them 0-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ComponentTable {
    substances: Vec<SubstanceIdentifier>,
}

impl ComponentTable {
    pub fn new(substances: Vec<SubstanceIdentifier>) -> Self {
        Self { substances }
    }

    pub fn len(&self) -> usize {
        self.substances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.substances.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SubstanceIdentifier> {
        self.substances.get(index)
    }

    /// Resolve a 1-based reference as written in the grouping section
    pub fn resolve(&self, reference: usize) -> Option<usize> {
        if reference >= 1 && reference <= self.substances.len() {
            Some(reference - 1)
        } else {
            None
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SubstanceIdentifier> {
        self.substances.iter()
    }

    pub fn as_slice(&self) -> &[SubstanceIdentifier] {
        &self.substances
    }
}

impl<'a> IntoIterator for &'a ComponentTable {
    type Item = &'a SubstanceIdentifier;
    type IntoIter = std::slice::Iter<'a, SubstanceIdentifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.substances.iter()
    }
}

/// One node of a mixture: a substance slot or a group of nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MixtureNode {
    /// `component` is `None` for an explicit empty slot
    Leaf {
        component: Option<usize>,
        weight: WeightDescriptor,
    },
    Group {
        children: Vec<MixtureNode>,
        weight: WeightDescriptor,
    },
}

impl MixtureNode {
    pub fn leaf(component: usize, weight: WeightDescriptor) -> Self {
        MixtureNode::Leaf {
            component: Some(component),
            weight,
        }
    }

    pub fn weight(&self) -> &WeightDescriptor {
        match self {
            MixtureNode::Leaf { weight, .. } | MixtureNode::Group { weight, .. } => weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, MixtureNode::Leaf { .. })
    }

    /// Children of a group; empty for a leaf
    pub fn children(&self) -> &[MixtureNode] {
        match self {
            MixtureNode::Leaf { .. } => &[],
            MixtureNode::Group { children, .. } => children,
        }
    }

    /// Number of leaves below this node, empty slots included
    pub fn leaf_count(&self) -> usize {
        match self {
            MixtureNode::Leaf { .. } => 1,
            MixtureNode::Group { children, .. } => children.iter().map(Self::leaf_count).sum(),
        }
    }
}

/// A leaf as seen by a pre-order walk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafEntry<'a> {
    pub component: Option<usize>,
    pub weight: &'a WeightDescriptor,
    pub depth: usize,
}

/// Parsed identifier: component table plus mixture structure. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixtureTree {
    components: ComponentTable,
    root: MixtureNode,
}

impl MixtureTree {
    /// Assemble a tree, checking that every leaf references an existing component
    pub fn from_parts(components: ComponentTable, root: MixtureNode) -> ParseResult<Self> {
        let tree = Self { components, root };
        if let Some(bad) = tree
            .leaves()
            .into_iter()
            .filter_map(|leaf| leaf.component)
            .find(|&index| index >= tree.components.len())
        {
            return Err(ParseError::UnknownComponentReference {
                reference: (bad + 1).to_string(),
                offset: 0,
                available: tree.components.len(),
            });
        }
        Ok(tree)
    }

    /// Tree of a standalone substance: one leaf, unknown weight
    pub fn single(substance: SubstanceIdentifier) -> Self {
        Self {
            components: ComponentTable::new(vec![substance]),
            root: MixtureNode::leaf(0, WeightDescriptor::Unknown),
        }
    }

    pub(crate) fn new_unchecked(components: ComponentTable, root: MixtureNode) -> Self {
        Self { components, root }
    }

    pub fn components(&self) -> &ComponentTable {
        &self.components
    }

    pub fn root(&self) -> &MixtureNode {
        &self.root
    }

    pub fn is_mixture(&self) -> bool {
        !self.root.is_leaf()
    }

    /// Leaves in left-to-right document order
    pub fn leaves(&self) -> Vec<LeafEntry<'_>> {
        let mut entries = Vec::new();
        match &self.root {
            MixtureNode::Leaf { .. } => collect_leaves(&self.root, 0, &mut entries),
            MixtureNode::Group { children, .. } => {
                for child in children {
                    collect_leaves(child, 0, &mut entries);
                }
            }
        }
        entries
    }

    /// Deepest leaf depth
    pub fn depth(&self) -> usize {
        self.leaves()
            .iter()
            .map(|leaf| leaf.depth)
            .max()
            .unwrap_or(0)
    }
}

fn collect_leaves<'a>(node: &'a MixtureNode, depth: usize, out: &mut Vec<LeafEntry<'a>>) {
    match node {
        MixtureNode::Leaf { component, weight } => out.push(LeafEntry {
            component: *component,
            weight,
            depth,
        }),
        MixtureNode::Group { children, .. } => {
            for child in children {
                collect_leaves(child, depth + 1, out);
            }
        }
    }
}

impl fmt::Display for MixtureTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::moleco::formats::treeviz::to_treeviz_str(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moleco::testing::factories::{group, leaf, table};

    #[test]
    fn test_empty_identifier_rejected() {
        assert_eq!(
            SubstanceIdentifier::at("", 17),
            Err(ParseError::EmptyIdentifier { offset: 17 })
        );
    }

    #[test]
    fn test_resolve_is_one_based() {
        let components = table(&["A", "B"]);
        assert_eq!(components.resolve(0), None);
        assert_eq!(components.resolve(1), Some(0));
        assert_eq!(components.resolve(2), Some(1));
        assert_eq!(components.resolve(3), None);
    }

    #[test]
    fn test_leaves_in_document_order_with_depth() {
        let tree = MixtureTree::from_parts(
            table(&["A", "B", "C"]),
            group(vec![leaf(0, ""), group(vec![leaf(1, ""), leaf(2, "")], "")], ""),
        )
        .unwrap();

        let leaves: Vec<(Option<usize>, usize)> = tree
            .leaves()
            .iter()
            .map(|leaf| (leaf.component, leaf.depth))
            .collect();
        assert_eq!(leaves, vec![(Some(0), 0), (Some(1), 1), (Some(2), 1)]);
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.root().leaf_count(), 3);
    }

    #[test]
    fn test_single_substance_tree() {
        let tree = MixtureTree::single(SubstanceIdentifier::new("H2O/h1H2").unwrap());
        assert!(!tree.is_mixture());
        assert_eq!(tree.leaves().len(), 1);
        assert_eq!(tree.leaves()[0].depth, 0);
    }

    #[test]
    fn test_from_parts_checks_references() {
        let error = MixtureTree::from_parts(table(&["A"]), group(vec![leaf(0, ""), leaf(3, "")], ""))
            .unwrap_err();
        assert_eq!(error.kind(), "UnknownComponentReference");
    }
}
