//! Weight normalization
//!
//!     Turns the weight descriptors of a [MixtureTree] into proportions that can be drawn.
//!     Every sibling set is resolved on its own into local proportions that sum to 1, whatever
//!     kinds and exponents its weights were written in. Local proportions are then multiplied
//!     down the tree: a node's absolute proportion is its local proportion times its parent's
//!     absolute proportion, so the leaves of the whole tree sum to 1 and every group carries the
//!     sum of its children.
//!
//! Policy
//!
//!     How unknown weights and mixed kinds are resolved is not fixed by the notation, so it sits
//!     behind [WeightPolicy]. The default, [ResidualSplit], works per sibling set:
//!
//!         1. All unknown: equal split.
//!         2. Siblings with an absolute kind take their fraction of the whole. Percentage points
//!            are read on the scale of the largest percentage exponent in the set, so
//!            `{5pp1&20pp0}` weighs 5% against 2%.
//!         3. The remaining siblings (relative kinds and unknown weights) share what is left,
//!            `max(0, 1 - Σ)`. Relative weights share it by magnitude; an unknown sibling counts
//!            as the mean relative magnitude, or as an equal part when no relative kind is
//!            present. With only relative and unknown siblings, the whole is shared this way.
//!         4. With nothing left to share, or nobody to share it with, the fractions are rescaled
//!            to sum to 1 and the remaining siblings get 0.
//!
//!     A sum of zero falls back to an equal split, so no proportion is ever NaN.
//!
//! Tolerance
//!
//!     Closure checks (leaves sum to 1, a group equals the sum of its children) hold within
//!     [PROPORTION_TOLERANCE].

use crate::moleco::ast::{MixtureNode, MixtureTree};
use crate::moleco::weight::{percentage_exponent, Weight, WeightDescriptor};
use serde::Serialize;

/// Tolerance for every equality check on proportions
pub const PROPORTION_TOLERANCE: f64 = 1e-9;

/// Resolves the weights of one sibling set into local proportions
pub trait WeightPolicy {
    /// Local proportions for `weights`, in the same order. Must sum to 1 for a non-empty set.
    fn split(&self, weights: &[WeightDescriptor]) -> Vec<f64>;
}

/// Default policy: unknown siblings share the residual left by absolute weights
#[derive(Debug, Clone, Copy, Default)]
pub struct ResidualSplit;

impl WeightPolicy for ResidualSplit {
    fn split(&self, weights: &[WeightDescriptor]) -> Vec<f64> {
        let count = weights.len();
        if count == 0 {
            return Vec::new();
        }
        let known: Vec<&Weight> = weights.iter().filter_map(WeightDescriptor::weight).collect();
        if known.is_empty() {
            return equal_split(count);
        }

        let scale = percentage_exponent(known.iter().copied());
        let fractions: Vec<Option<f64>> = weights
            .iter()
            .map(|descriptor| descriptor.weight().and_then(|w| w.fraction_of_whole(scale)))
            .collect();
        let claimed: f64 = fractions.iter().flatten().sum();
        let residual = 1.0 - claimed;
        let sharing = fractions.iter().filter(|fraction| fraction.is_none()).count();

        if sharing > 0 && residual > PROPORTION_TOLERANCE {
            let shares = residual_shares(weights, residual);
            return fractions
                .iter()
                .zip(shares)
                .map(|(fraction, share)| fraction.unwrap_or(share))
                .collect();
        }
        rescale(fractions.iter().map(|fraction| fraction.unwrap_or(0.0)).collect())
    }
}

/// Split `residual` among siblings without a fraction of their own
///
/// Relative weights take a share proportional to their magnitude. Unknown siblings count as
/// the mean relative magnitude, or as 1 when there is none. Siblings with a fraction get 0.
fn residual_shares(weights: &[WeightDescriptor], residual: f64) -> Vec<f64> {
    let relative = |descriptor: &WeightDescriptor| {
        descriptor
            .weight()
            .filter(|weight| !weight.kind.is_absolute())
            .map(Weight::magnitude)
    };
    let magnitudes: Vec<f64> = weights.iter().filter_map(relative).collect();
    let mean = if magnitudes.is_empty() {
        1.0
    } else {
        magnitudes.iter().sum::<f64>() / magnitudes.len() as f64
    };

    let values: Vec<Option<f64>> = weights
        .iter()
        .map(|descriptor| match descriptor.weight() {
            None => Some(mean),
            Some(_) => relative(descriptor),
        })
        .collect();
    let total: f64 = values.iter().flatten().sum();
    let sharing = values.iter().flatten().count();

    values
        .into_iter()
        .map(|value| match value {
            None => 0.0,
            Some(_) if total <= PROPORTION_TOLERANCE || !total.is_finite() => {
                residual / sharing as f64
            }
            Some(value) => residual * value / total,
        })
        .collect()
}

fn equal_split(count: usize) -> Vec<f64> {
    vec![1.0 / count as f64; count]
}

fn rescale(values: Vec<f64>) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if total <= PROPORTION_TOLERANCE || !total.is_finite() {
        return equal_split(values.len());
    }
    values.into_iter().map(|value| value / total).collect()
}

/// Proportion of one node, relative to its parent and to the whole
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Proportion {
    pub local: f64,
    pub absolute: f64,
}

impl Proportion {
    pub const WHOLE: Proportion = Proportion {
        local: 1.0,
        absolute: 1.0,
    };
}

/// A mixture node annotated with its proportion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedNode {
    pub component: Option<usize>,
    pub weight: WeightDescriptor,
    pub proportion: Proportion,
    pub children: Vec<NormalizedNode>,
}

impl NormalizedNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// A leaf as seen by a pre-order walk of the normalized tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedLeaf {
    pub component: Option<usize>,
    pub proportion: Proportion,
    pub depth: usize,
}

/// Normalized view of a [MixtureTree]
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedTree<'t> {
    #[serde(skip)]
    tree: &'t MixtureTree,
    root: NormalizedNode,
}

impl<'t> NormalizedTree<'t> {
    pub fn tree(&self) -> &'t MixtureTree {
        self.tree
    }

    pub fn root(&self) -> &NormalizedNode {
        &self.root
    }

    /// Leaves in document order, empty slots included
    pub fn leaves(&self) -> Vec<NormalizedLeaf> {
        let mut leaves = Vec::new();
        if self.root.is_leaf() {
            collect_leaves(&self.root, 0, &mut leaves);
        } else {
            for child in &self.root.children {
                collect_leaves(child, 0, &mut leaves);
            }
        }
        leaves
    }

    /// Sum of the absolute proportions of every leaf; 1 within tolerance
    pub fn leaf_sum(&self) -> f64 {
        self.leaves()
            .iter()
            .map(|leaf| leaf.proportion.absolute)
            .sum()
    }

    /// Whether every group carries the sum of its children and the leaves sum to 1
    pub fn is_closed(&self) -> bool {
        (self.leaf_sum() - 1.0).abs() <= PROPORTION_TOLERANCE && node_is_closed(&self.root)
    }
}

fn collect_leaves(node: &NormalizedNode, depth: usize, out: &mut Vec<NormalizedLeaf>) {
    if node.is_leaf() {
        out.push(NormalizedLeaf {
            component: node.component,
            proportion: node.proportion,
            depth,
        });
        return;
    }
    for child in &node.children {
        collect_leaves(child, depth + 1, out);
    }
}

fn node_is_closed(node: &NormalizedNode) -> bool {
    if node.is_leaf() {
        return true;
    }
    let sum: f64 = node
        .children
        .iter()
        .map(|child| child.proportion.absolute)
        .sum();
    (sum - node.proportion.absolute).abs() <= PROPORTION_TOLERANCE
        && node.children.iter().all(node_is_closed)
}

/// Normalize with the default [ResidualSplit] policy
pub fn normalize(tree: &MixtureTree) -> NormalizedTree<'_> {
    normalize_with(tree, &ResidualSplit)
}

pub fn normalize_with<'t, P: WeightPolicy + ?Sized>(
    tree: &'t MixtureTree,
    policy: &P,
) -> NormalizedTree<'t> {
    let root = resolve(tree.root(), Proportion::WHOLE, policy);
    let normalized = NormalizedTree { tree, root };
    log::trace!(
        "normalized {} leaves, sum {}",
        normalized.leaves().len(),
        normalized.leaf_sum()
    );
    normalized
}

fn resolve<P: WeightPolicy + ?Sized>(
    node: &MixtureNode,
    proportion: Proportion,
    policy: &P,
) -> NormalizedNode {
    match node {
        MixtureNode::Leaf { component, weight } => NormalizedNode {
            component: *component,
            weight: *weight,
            proportion,
            children: Vec::new(),
        },
        MixtureNode::Group { children, weight } => {
            let weights: Vec<WeightDescriptor> =
                children.iter().map(|child| *child.weight()).collect();
            let locals = policy.split(&weights);
            let children = children
                .iter()
                .zip(locals)
                .map(|(child, local)| {
                    let proportion = Proportion {
                        local,
                        absolute: local * proportion.absolute,
                    };
                    resolve(child, proportion, policy)
                })
                .collect();
            NormalizedNode {
                component: None,
                weight: *weight,
                proportion,
                children,
            }
        }
    }
}
