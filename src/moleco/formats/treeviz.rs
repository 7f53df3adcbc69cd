//! Treeviz formatter for mixture trees
//!
//! One line per node, nesting drawn with box connectors, so the structure of a mixture can be
//! read at a glance in logs and snapshot tests.
//!
//! So the format is :
//! <prefix><connector> <icon> <label> [<weight>]
//!
//! Example:
//!
//!   ⧉ mixture of 3 components
//!   ├─ ☰ group [?]
//!   │ ├─ • #1 CH2O/c1-2/h1H2 [37wf-2]
//!   │ └─ • #3 H2O/h1H2 [?]
//!   └─ • #2 CH4O/c1-2/h2H,1H3 [10:15pp0]
//!
//! Components are numbered 1-based as in the notation. Identifiers are truncated to 30
//! characters.
//!
//! Icons
//!     Root: ⧉
//!     Group: ☰
//!     Leaf: •
//!     Empty slot: ∅

use crate::moleco::ast::{MixtureNode, MixtureTree};

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

fn node_label(tree: &MixtureTree, node: &MixtureNode) -> String {
    match node {
        MixtureNode::Group { weight, .. } => format!("☰ group [{}]", weight),
        MixtureNode::Leaf {
            component: Some(index),
            weight,
        } => {
            let identifier = tree
                .components()
                .get(*index)
                .map(|substance| truncate(substance.as_str(), 30))
                .unwrap_or_default();
            format!("• #{} {} [{}]", index + 1, identifier, weight)
        }
        MixtureNode::Leaf {
            component: None,
            weight,
        } => format!("∅ empty slot [{}]", weight),
    }
}

fn format_node(
    tree: &MixtureTree,
    node: &MixtureNode,
    prefix: &str,
    is_last: bool,
    lines: &mut Vec<String>,
) {
    let connector = if is_last { "└─" } else { "├─" };
    lines.push(format!("{}{} {}", prefix, connector, node_label(tree, node)));

    let children = node.children();
    if !children.is_empty() {
        let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
        for (i, child) in children.iter().enumerate() {
            format_node(tree, child, &child_prefix, i == children.len() - 1, lines);
        }
    }
}

/// Render a mixture tree, one line per node
pub fn to_treeviz_str(tree: &MixtureTree) -> String {
    let root = tree.root();
    let mut lines = Vec::new();

    match root {
        MixtureNode::Leaf { .. } => {
            lines.push("⧉ substance".to_string());
            format_node(tree, root, "", true, &mut lines);
        }
        MixtureNode::Group { children, weight } => {
            let mut header = format!("⧉ mixture of {} components", tree.components().len());
            if weight.is_known() {
                header.push_str(&format!(" [{}]", weight));
            }
            lines.push(header);
            for (i, child) in children.iter().enumerate() {
                format_node(tree, child, "", i == children.len() - 1, &mut lines);
            }
        }
    }

    lines.join("\n")
}
