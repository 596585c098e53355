// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::cycle_breaker::CycleBreakResult;
use crate::graph::GraphView;
use crate::layer::LayerAssignment;
use crate::petgraph_support::topo::topo_order;

/// `level(v) = max(level(u) + 1)` over incoming edges, `0` for sources.
///
/// A single linear sweep in topological order over the acyclic graph induced by `cycles`
/// (self-loops and other reversed edges are skipped). Minimises height; may produce long edges
/// that later get expanded into dummy chains by the virtualiser.
pub fn assign_longest_path(graph: &GraphView<'_>, cycles: &CycleBreakResult) -> LayerAssignment {
    let n = graph.node_count();
    let mut levels = vec![0usize; n];
    let order = topo_order(graph, cycles);

    for &node in &order {
        let mut level = 0usize;
        for edge in graph.edges() {
            let (from, to) = cycles.effective_endpoints(graph, edge.index());
            if to != node || from == node {
                continue;
            }
            level = level.max(levels[from.index()] + 1);
        }
        levels[node.index()] = level;
    }

    LayerAssignment::from_levels(levels)
}
