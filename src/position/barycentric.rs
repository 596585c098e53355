// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::graph::NodeIndex;
use crate::position::compact::assign_compact;
use crate::position::{from_x_and_widths, PositionAssignment};
use crate::virtualize::{Adjacency, Expanded};

/// Bounded number of relaxation passes.
const PASSES: usize = 4;

/// Starts from the compact layout, then for a bounded number of passes shifts each node toward
/// the average centre-x of its connected neighbours in the adjacent levels, clipped against its
/// left and right neighbours at minimum spacing.
pub fn assign_barycentric(expanded: &Expanded, widths: &[usize], node_spacing: usize) -> PositionAssignment {
    let compact = assign_compact(expanded, widths, node_spacing);
    let adjacency = expanded.adjacency();
    let mut center: Vec<f64> = (0..expanded.node_count())
        .map(|ix| compact.center_x(NodeIndex::new(ix)) as f64)
        .collect();

    for _ in 0..PASSES {
        for level in expanded.level_lists() {
            relax_level(level, &adjacency, widths, node_spacing, &mut center);
        }
    }

    let x: Vec<usize> = (0..expanded.node_count())
        .map(|ix| {
            let w = widths[ix] as f64;
            (center[ix] - w / 2.0).round().max(0.0) as usize
        })
        .collect();
    from_x_and_widths(x, widths, node_spacing)
}

fn relax_level(
    level: &[NodeIndex],
    adjacency: &Adjacency,
    widths: &[usize],
    node_spacing: usize,
    center: &mut [f64],
) {
    let mut desired: Vec<f64> = level
        .iter()
        .map(|&node| {
            let neighbours: Vec<NodeIndex> = adjacency
                .upper(node)
                .iter()
                .chain(adjacency.lower(node).iter())
                .copied()
                .collect();
            if neighbours.is_empty() {
                center[node.index()]
            } else {
                neighbours.iter().map(|n| center[n.index()]).sum::<f64>() / neighbours.len() as f64
            }
        })
        .collect();

    // Clip against left/right neighbours at minimum spacing, left to right then right to left,
    // so a desired position never pushes a node past its neighbour.
    for i in 1..level.len() {
        let min_gap = (widths[level[i - 1].index()] + widths[level[i].index()]) as f64 / 2.0
            + node_spacing as f64;
        if desired[i] < desired[i - 1] + min_gap {
            desired[i] = desired[i - 1] + min_gap;
        }
    }
    for i in (0..level.len().saturating_sub(1)).rev() {
        let min_gap = (widths[level[i].index()] + widths[level[i + 1].index()]) as f64 / 2.0
            + node_spacing as f64;
        if desired[i] > desired[i + 1] - min_gap {
            desired[i] = desired[i + 1] - min_gap;
        }
    }

    for (pos, &node) in level.iter().enumerate() {
        center[node.index()] = desired[pos].max(widths[node.index()] as f64 / 2.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle_breaker::break_cycles;
    use crate::graph::GraphBuilder;
    use crate::layer::assign_longest_path;
    use crate::position::node_widths;
    use crate::virtualize::virtualize;

    #[test]
    fn diamond_is_symmetric_ish() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("a").unwrap();
        let b = builder.add_node("b").unwrap();
        let c = builder.add_node("c").unwrap();
        let d = builder.add_node("d").unwrap();
        builder.add_edge(a, b, true, None::<String>).unwrap();
        builder.add_edge(a, c, true, None::<String>).unwrap();
        builder.add_edge(b, d, true, None::<String>).unwrap();
        builder.add_edge(c, d, true, None::<String>).unwrap();
        let graph = builder.build().unwrap();
        let cycles = break_cycles(&graph);
        let layers = assign_longest_path(&graph, &cycles);
        let expanded = virtualize(&graph, &cycles, &layers);
        let widths = node_widths(&graph, &expanded);

        let positions = assign_barycentric(&expanded, &widths, 2);
        // a should end up roughly centred between b and c.
        let mid = (positions.center_x(b) + positions.center_x(c)) / 2;
        let diff = (positions.center_x(a) as i64 - mid as i64).abs();
        assert!(diff <= 1, "expected a centred between b and c, diff={}", diff);
    }
}
