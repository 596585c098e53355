// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A cycle-aware topological sort, for use once the cycle breaker has picked a reversed-edge
//! set that makes the graph acyclic.

use crate::cycle_breaker::CycleBreakResult;
use crate::graph::{GraphView, NodeIndex};

/// Returns a topological order over `graph`'s nodes, using `cycles`'s effective (post-reversal)
/// edge orientation.
///
/// Implemented as a DFS post-order traversal (mirrors the grounding crate's `TopoWithCycles`,
/// which uses `DfsPostOrder` over incoming-edge-free roots) reversed into forward topological
/// order; nodes are visited starting from sources, in insertion order, so the result is
/// deterministic given deterministic insertion order.
pub fn topo_order(graph: &GraphView<'_>, cycles: &CycleBreakResult) -> Vec<NodeIndex> {
    let n = graph.node_count();
    let mut children: Vec<Vec<NodeIndex>> = vec![Vec::new(); n];
    let mut indegree = vec![0usize; n];
    for edge in graph.edges() {
        let (from, to) = cycles.effective_endpoints(graph, edge.index());
        if from == to {
            continue;
        }
        children[from.index()].push(to);
        indegree[to.index()] += 1;
    }

    let mut order = Vec::with_capacity(n);
    let mut visited = vec![false; n];
    let mut stack: Vec<NodeIndex> = (0..n)
        .filter(|&ix| indegree[ix] == 0)
        .map(NodeIndex::new)
        .collect();

    // Explicit-stack post-order DFS, mirroring petgraph's `DfsPostOrder`: each frame tracks
    // which of its node's children have already been pushed, so a long chain never recurses one
    // native stack frame per node.
    fn dfs_post(
        root: NodeIndex,
        children: &[Vec<NodeIndex>],
        visited: &mut [bool],
        order: &mut Vec<NodeIndex>,
    ) {
        if visited[root.index()] {
            return;
        }
        visited[root.index()] = true;
        let mut frames: Vec<(NodeIndex, usize)> = vec![(root, 0)];
        while let Some(frame) = frames.last_mut() {
            let node = frame.0;
            if frame.1 < children[node.index()].len() {
                let child = children[node.index()][frame.1];
                frame.1 += 1;
                if !visited[child.index()] {
                    visited[child.index()] = true;
                    frames.push((child, 0));
                }
            } else {
                order.push(node);
                frames.pop();
            }
        }
    }

    for &root in &stack.clone() {
        dfs_post(root, &children, &mut visited, &mut order);
    }
    // Any nodes not reached from an indegree-0 root (shouldn't happen on an acyclic graph given
    // every weakly-connected DAG has at least one source, but defends against a caller-provided
    // graph that still contains an untreated cycle).
    for ix in 0..n {
        dfs_post(NodeIndex::new(ix), &children, &mut visited, &mut order);
    }
    stack.clear();

    order.reverse();
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle_breaker::break_cycles;
    use crate::graph::GraphBuilder;

    #[test]
    fn topo_order_respects_edges() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("A").unwrap();
        let b = builder.add_node("B").unwrap();
        let c = builder.add_node("C").unwrap();
        builder.add_edge(a, b, true, None::<String>).unwrap();
        builder.add_edge(b, c, true, None::<String>).unwrap();
        let graph = builder.build().unwrap();
        let cycles = break_cycles(&graph);

        let order = topo_order(&graph, &cycles);
        let pos = |n: crate::graph::NodeIndex| order.iter().position(|&x| x == n).unwrap();
        assert!(pos(a) < pos(b));
        assert!(pos(b) < pos(c));
    }
}
