// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Detects back edges on a directed graph and marks a minimal set as reversed so the remainder
//! is a DAG.
//!
//! Three-colour DFS (white / grey / black), run in insertion order over unvisited nodes. Every
//! edge into a grey node is a back edge; self-loops are always reversed. This mirrors the
//! grounding crate's `petgraph_support::dfs` use of `DfsPostOrder`-style traversal, specialised
//! here to also classify edges rather than just order nodes.

use crate::graph::{EdgeIndex, GraphView, NodeIndex};
use fixedbitset::FixedBitSet;
use std::collections::HashSet;

/// The result of running the cycle breaker: which edges are treated as reversed by every
/// downstream pass.
#[derive(Clone, Debug, Default)]
pub struct CycleBreakResult {
    reversed: HashSet<EdgeIndex>,
}

impl CycleBreakResult {
    /// An empty result: no edges are reversed. Used when `cycle_breaking = none`.
    pub fn none() -> Self {
        CycleBreakResult {
            reversed: HashSet::new(),
        }
    }

    /// Whether `edge` is reversed.
    pub fn is_reversed(&self, edge: EdgeIndex) -> bool {
        self.reversed.contains(&edge)
    }

    /// Returns the effective (from, to) of `edge` after accounting for reversal: the orientation
    /// the layerer and positioner should use, as opposed to the semantic direction stored in the
    /// graph.
    pub fn effective_endpoints(&self, graph: &GraphView<'_>, edge: EdgeIndex) -> (NodeIndex, NodeIndex) {
        let e = graph.edge(edge).expect("edge index in range");
        if self.is_reversed(edge) {
            (e.to(), e.from())
        } else {
            (e.from(), e.to())
        }
    }

    /// Iterates over the indexes of every reversed edge.
    pub fn reversed_edges(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.reversed.iter().copied()
    }
}

/// Runs three-colour DFS over `graph`'s directed edges, marking back edges (including
/// self-loops) as reversed.
///
/// "White" is the absence of a bit in either set; "grey" is `on_stack`; "black" is `visited`
/// without `on_stack`. Two [`FixedBitSet`]s (mirroring the grounding crate's
/// `petgraph_support::scc` visited-marking) stand in for the usual three-value enum since both
/// sets are dense over `0..node_count` and known up front.
///
/// Undirected edges are never reversed: they carry no orientation to violate.
pub fn break_cycles(graph: &GraphView<'_>) -> CycleBreakResult {
    let n = graph.node_count();
    let mut visited = FixedBitSet::with_capacity(n);
    let mut on_stack = FixedBitSet::with_capacity(n);
    let mut reversed = HashSet::new();

    // Build an adjacency list of (target, edge_index) restricted to directed edges, grouped by
    // source, preserving insertion order -- this is what makes DFS tie-breaking deterministic.
    let mut out_edges: Vec<Vec<(NodeIndex, EdgeIndex)>> = vec![Vec::new(); n];
    for edge in graph.edges() {
        if edge.directed() {
            out_edges[edge.from().index()].push((edge.to(), edge.index()));
        }
    }

    // Explicit-stack DFS: each frame is a node plus the index of the next out-edge to examine,
    // so a long chain of nodes never recurses one native stack frame per node.
    fn dfs(
        root: NodeIndex,
        out_edges: &[Vec<(NodeIndex, EdgeIndex)>],
        visited: &mut FixedBitSet,
        on_stack: &mut FixedBitSet,
        reversed: &mut HashSet<EdgeIndex>,
    ) {
        if visited[root.index()] {
            return;
        }
        visited.insert(root.index());
        on_stack.insert(root.index());
        let mut frames: Vec<(NodeIndex, usize)> = vec![(root, 0)];
        while let Some(frame) = frames.last_mut() {
            let node = frame.0;
            if frame.1 < out_edges[node.index()].len() {
                let (target, edge_ix) = out_edges[node.index()][frame.1];
                frame.1 += 1;
                if target == node {
                    // Self-loop: always reversed, never recursed into.
                    reversed.insert(edge_ix);
                } else if on_stack[target.index()] {
                    // Back edge to an ancestor still on the stack.
                    reversed.insert(edge_ix);
                } else if !visited[target.index()] {
                    visited.insert(target.index());
                    on_stack.insert(target.index());
                    frames.push((target, 0));
                }
            } else {
                on_stack.set(node.index(), false);
                frames.pop();
            }
        }
    }

    for ix in 0..n {
        if !visited[ix] {
            dfs(NodeIndex::new(ix), &out_edges, &mut visited, &mut on_stack, &mut reversed);
        }
    }

    CycleBreakResult { reversed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    #[test]
    fn triangle_cycle_breaks_exactly_one_edge() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("A").unwrap();
        let b = builder.add_node("B").unwrap();
        let c = builder.add_node("C").unwrap();
        builder.add_edge(a, b, true, None::<String>).unwrap();
        builder.add_edge(b, c, true, None::<String>).unwrap();
        let back = builder.add_edge(c, a, true, None::<String>).unwrap();
        let graph = builder.build().unwrap();

        let result = break_cycles(&graph);
        let reversed: Vec<_> = result.reversed_edges().collect();
        assert_eq!(reversed, vec![back]);
    }

    #[test]
    fn self_loop_always_reversed() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("A").unwrap();
        let b = builder.add_node("B").unwrap();
        let loop_edge = builder.add_edge(a, a, true, None::<String>).unwrap();
        builder.add_edge(a, b, true, None::<String>).unwrap();
        let graph = builder.build().unwrap();

        let result = break_cycles(&graph);
        assert!(result.is_reversed(loop_edge));
    }

    #[test]
    fn dag_has_no_reversed_edges() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("A").unwrap();
        let b = builder.add_node("B").unwrap();
        let c = builder.add_node("C").unwrap();
        let d = builder.add_node("D").unwrap();
        builder.add_edge(a, b, true, None::<String>).unwrap();
        builder.add_edge(a, c, true, None::<String>).unwrap();
        builder.add_edge(b, d, true, None::<String>).unwrap();
        builder.add_edge(c, d, true, None::<String>).unwrap();
        let graph = builder.build().unwrap();

        let result = break_cycles(&graph);
        assert_eq!(result.reversed_edges().count(), 0);
    }
}
