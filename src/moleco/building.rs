//! Mixture tree building
//!
//!     Merges the three outputs of the earlier stages into one [MixtureTree]: the component
//!     table, the grouping tree and the weighting tree. The two trees are walked together in
//!     pre-order and must have the same shape at every node: group against group with the same
//!     number of children, leaf against leaf. Any other pairing is reported with the path of
//!     the node where the shapes first diverge.
//!
//!     Grouping leaves are resolved against the component table here, since that is the first
//!     point where both are known. Weights are attached as parsed; turning them into numbers
//!     is the normalizer's job.

use crate::moleco::ast::{ComponentTable, MixtureNode, MixtureTree};
use crate::moleco::error::{NodePath, ParseError, ParseResult};
use crate::moleco::parsing::Nested;
use crate::moleco::weight::WeightDescriptor;

/// Merge a component table with its grouping and weighting trees
pub fn build(
    components: ComponentTable,
    grouping: Nested<usize>,
    weighting: Nested<WeightDescriptor>,
) -> ParseResult<MixtureTree> {
    let root = merge(&components, grouping, weighting, NodePath::root())?;
    let tree = MixtureTree::new_unchecked(components, root);
    log::debug!(
        "built mixture of {} components, {} leaves, depth {}",
        tree.components().len(),
        tree.root().leaf_count(),
        tree.depth()
    );
    Ok(tree)
}

/// Tree for a component list without grouping and weighting sections
///
/// One component is a standalone substance. Several form a flat group of unknown weights.
pub fn flat(components: ComponentTable) -> MixtureTree {
    if components.len() == 1 {
        let root = MixtureNode::leaf(0, WeightDescriptor::Unknown);
        return MixtureTree::new_unchecked(components, root);
    }
    let children = (0..components.len())
        .map(|index| MixtureNode::leaf(index, WeightDescriptor::Unknown))
        .collect();
    let root = MixtureNode::Group {
        children,
        weight: WeightDescriptor::Unknown,
    };
    MixtureTree::new_unchecked(components, root)
}

fn merge(
    components: &ComponentTable,
    grouping: Nested<usize>,
    weighting: Nested<WeightDescriptor>,
    path: NodePath,
) -> ParseResult<MixtureNode> {
    match (grouping, weighting) {
        (
            Nested::Leaf { payload, span },
            Nested::Leaf {
                payload: weight, ..
            },
        ) => {
            let component = payload
                .map(|reference| {
                    components
                        .resolve(reference)
                        .ok_or_else(|| ParseError::UnknownComponentReference {
                            reference: reference.to_string(),
                            offset: span.start,
                            available: components.len(),
                        })
                })
                .transpose()?;
            Ok(MixtureNode::Leaf {
                component,
                weight: weight.unwrap_or_default(),
            })
        }
        (
            Nested::Group {
                children: grouped, ..
            },
            Nested::Group {
                children: weighted,
                label,
                ..
            },
        ) if grouped.len() == weighted.len() => {
            let children = grouped
                .into_iter()
                .zip(weighted)
                .enumerate()
                .map(|(index, (grouping, weighting))| {
                    merge(components, grouping, weighting, path.child(index))
                })
                .collect::<ParseResult<Vec<_>>>()?;
            Ok(MixtureNode::Group {
                children,
                weight: label.unwrap_or_default(),
            })
        }
        (grouping, weighting) => Err(ParseError::MixtureStructureMismatch {
            path,
            grouping: grouping.shape(),
            weighting: weighting.shape(),
        }),
    }
}
