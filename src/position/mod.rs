// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assigns an x and centre-x coordinate to every node, including dummies.

mod barycentric;
mod brandes_kopf;
mod compact;

pub use barycentric::assign_barycentric;
pub use brandes_kopf::assign_brandes_kopf;
pub use compact::assign_compact;

use crate::graph::{GraphView, NodeIndex, NodeKind};
use crate::virtualize::Expanded;

/// The width, in abstract cells, of a node's box: `label.len() + 2` for explicit/implicit nodes
/// (room for the box-drawing border either side of the text), `1` for dummy nodes (drawn as a
/// bare point or vertical line through their cell, per the router and renderer).
pub fn node_widths(graph: &GraphView<'_>, expanded: &Expanded) -> Vec<usize> {
    (0..expanded.node_count())
        .map(|ix| {
            let index = NodeIndex::new(ix);
            match expanded.node(index).map(|n| n.kind()) {
                Some(NodeKind::Dummy) | None => 1,
                Some(_) => graph
                    .node(index)
                    .map(|n| n.label().chars().count() + 2)
                    .unwrap_or(1),
            }
        })
        .collect()
}

/// The x coordinate and centre-x coordinate assigned to each node, plus the total layout width.
#[derive(Clone, Debug)]
pub struct PositionAssignment {
    x: Vec<usize>,
    center_x: Vec<usize>,
    total_width: usize,
}

impl PositionAssignment {
    /// The left edge x coordinate of `node`.
    pub fn x(&self, node: NodeIndex) -> usize {
        self.x[node.index()]
    }

    /// The centre-x coordinate of `node`, used for routing.
    pub fn center_x(&self, node: NodeIndex) -> usize {
        self.center_x[node.index()]
    }

    /// The total width spanned by the layout, including the margin.
    pub fn total_width(&self) -> usize {
        self.total_width
    }
}

fn from_x_and_widths(x: Vec<usize>, widths: &[usize], margin: usize) -> PositionAssignment {
    let center_x = x
        .iter()
        .zip(widths.iter())
        .map(|(&x, &w)| x + w / 2)
        .collect();
    let total_width = x
        .iter()
        .zip(widths.iter())
        .map(|(&x, &w)| x + w)
        .max()
        .unwrap_or(0)
        + margin;
    PositionAssignment {
        x,
        center_x,
        total_width,
    }
}
