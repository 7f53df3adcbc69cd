//! Factories for building mixture trees succinctly
//!
//! Weights are given as literals in the notation (`"60wf-2"`); an empty literal is an unknown
//! weight. Invalid literals panic, these are for tests only.

use crate::moleco::ast::{ComponentTable, MixtureNode, SubstanceIdentifier};
use crate::moleco::weight::WeightDescriptor;

/// Parse a weight literal, `""` being unknown
pub fn weight(literal: &str) -> WeightDescriptor {
    WeightDescriptor::parse_at(literal, 0)
        .unwrap_or_else(|error| panic!("bad weight literal {:?}: {}", literal, error))
}

/// Leaf referencing the 0-based component `index`
pub fn leaf(index: usize, weight_literal: &str) -> MixtureNode {
    MixtureNode::leaf(index, weight(weight_literal))
}

/// Explicit empty slot
pub fn empty(weight_literal: &str) -> MixtureNode {
    MixtureNode::Leaf {
        component: None,
        weight: weight(weight_literal),
    }
}

pub fn group(children: Vec<MixtureNode>, weight_literal: &str) -> MixtureNode {
    MixtureNode::Group {
        children,
        weight: weight(weight_literal),
    }
}

/// Component table from identifier texts
pub fn table(substances: &[&str]) -> ComponentTable {
    ComponentTable::new(
        substances
            .iter()
            .map(|text| SubstanceIdentifier::new(*text).expect("non-empty test identifier"))
            .collect(),
    )
}
