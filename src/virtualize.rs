// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inserts a dummy node per skipped level on every edge that spans more than one level, so every
//! edge in the resulting [`Expanded`] graph connects adjacent levels.

use crate::cycle_breaker::CycleBreakResult;
use crate::graph::{EdgeIndex, GraphView, NodeIndex, NodeKind};
use crate::layer::LayerAssignment;
use smallvec::SmallVec;

/// Most edges span one level (no dummies) or skip a handful; four inline slots covers the
/// common case without spilling to the heap.
type Chain = SmallVec<[NodeIndex; 4]>;

/// One node in the post-virtualisation node space: either an original graph node (kept at its
/// original index) or a dummy node appended after all original nodes.
#[derive(Clone, Debug)]
pub struct ExpandedNode {
    kind: NodeKind,
    /// For a dummy node, the original edge it was created for.
    edge_index: Option<EdgeIndex>,
    level: usize,
}

impl ExpandedNode {
    /// What kind of node this is.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// For a dummy node, the original edge it was created for.
    pub fn edge_index(&self) -> Option<EdgeIndex> {
        self.edge_index
    }

    /// This node's level.
    pub fn level(&self) -> usize {
        self.level
    }
}

/// The virtualiser's output: the original graph's nodes plus every dummy node, an updated
/// per-level node list, and for every original edge the ordered chain of node indexes it now
/// passes through (source, dummy.., target, in effective post-cycle-break order).
#[derive(Clone, Debug)]
pub struct Expanded {
    nodes: Vec<ExpandedNode>,
    level_lists: Vec<Vec<NodeIndex>>,
    /// For each original edge, the chain of node indexes it threads through, oriented in
    /// *effective* (post cycle-break) direction: `chain[0]` is the effective source.
    chains: Vec<Chain>,
    original_node_count: usize,
}

impl Expanded {
    /// The node at `index`, if any (covers both original and dummy nodes).
    pub fn node(&self, index: NodeIndex) -> Option<&ExpandedNode> {
        self.nodes.get(index.index())
    }

    /// Total node count, including dummies.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The number of nodes the caller originally added (excludes dummies).
    pub fn original_node_count(&self) -> usize {
        self.original_node_count
    }

    /// Whether `index` refers to a dummy node.
    pub fn is_dummy(&self, index: NodeIndex) -> bool {
        index.index() >= self.original_node_count
    }

    /// The per-level ordered node lists. Mutated in place by the crossing reducer.
    pub fn level_lists(&self) -> &[Vec<NodeIndex>] {
        &self.level_lists
    }

    /// Mutable access to the per-level ordered node lists, for the crossing reducer.
    pub fn level_lists_mut(&mut self) -> &mut Vec<Vec<NodeIndex>> {
        &mut self.level_lists
    }

    /// The effective-direction chain of node indexes `edge_index` threads through.
    pub fn chain(&self, edge_index: EdgeIndex) -> &[NodeIndex] {
        self.chains[edge_index.index()].as_slice()
    }

    /// Builds the adjacent-level neighbour lists every crossing reducer and positioner needs:
    /// for each node, which nodes sit directly above it (one level up) and directly below it
    /// (one level down), derived from the dummy chains so multi-level edges contribute a link
    /// at every level they pass through.
    pub fn adjacency(&self) -> Adjacency {
        let mut upper = vec![Vec::new(); self.nodes.len()];
        let mut lower = vec![Vec::new(); self.nodes.len()];
        for chain in &self.chains {
            for pair in chain.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                if a == b {
                    continue;
                }
                lower[a.index()].push(b);
                upper[b.index()].push(a);
            }
        }
        Adjacency { upper, lower }
    }
}

/// Per-node adjacent-level neighbour lists, derived from [`Expanded::adjacency`].
#[derive(Clone, Debug)]
pub struct Adjacency {
    upper: Vec<Vec<NodeIndex>>,
    lower: Vec<Vec<NodeIndex>>,
}

impl Adjacency {
    /// Neighbours one level above `node`.
    pub fn upper(&self, node: NodeIndex) -> &[NodeIndex] {
        &self.upper[node.index()]
    }

    /// Neighbours one level below `node`.
    pub fn lower(&self, node: NodeIndex) -> &[NodeIndex] {
        &self.lower[node.index()]
    }
}

/// Runs the virtualiser: one dummy node per skipped level, appended after all original nodes.
pub fn virtualize(
    graph: &GraphView<'_>,
    cycles: &CycleBreakResult,
    layers: &LayerAssignment,
) -> Expanded {
    let original_node_count = graph.node_count();
    let mut nodes: Vec<ExpandedNode> = (0..original_node_count)
        .map(|ix| ExpandedNode {
            kind: graph
                .node(NodeIndex::new(ix))
                .map(|n| n.kind())
                .unwrap_or(NodeKind::Explicit),
            edge_index: None,
            level: layers.level(NodeIndex::new(ix)),
        })
        .collect();

    let mut level_lists: Vec<Vec<NodeIndex>> = vec![Vec::new(); layers.level_count()];
    for ix in 0..original_node_count {
        let level = layers.level(NodeIndex::new(ix));
        level_lists[level].push(NodeIndex::new(ix));
    }

    let mut chains: Vec<Chain> = Vec::with_capacity(graph.edge_count());
    for edge in graph.edges() {
        let (from, to) = cycles.effective_endpoints(graph, edge.index());
        let mut chain: Chain = smallvec::smallvec![from];
        if from != to {
            let from_level = layers.level(from);
            let to_level = layers.level(to);
            debug_assert!(
                from_level < to_level,
                "layerer invariant: effective source must be strictly above effective target"
            );
            for level in (from_level + 1)..to_level {
                let dummy_ix = NodeIndex::new(nodes.len());
                nodes.push(ExpandedNode {
                    kind: NodeKind::Dummy,
                    edge_index: Some(edge.index()),
                    level,
                });
                level_lists[level].push(dummy_ix);
                chain.push(dummy_ix);
            }
        }
        chain.push(to);
        chains.push(chain);
    }

    Expanded {
        nodes,
        level_lists,
        chains,
        original_node_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle_breaker::break_cycles;
    use crate::graph::GraphBuilder;
    use crate::layer::assign_longest_path;

    #[test]
    fn skip_level_edge_gets_two_dummies() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("A").unwrap();
        let b = builder.add_node("B").unwrap();
        let c = builder.add_node("C").unwrap();
        let d = builder.add_node("D").unwrap();
        builder.add_edge(a, b, true, None::<String>).unwrap();
        builder.add_edge(b, c, true, None::<String>).unwrap();
        builder.add_edge(c, d, true, None::<String>).unwrap();
        let skip = builder.add_edge(a, d, true, None::<String>).unwrap();
        let graph = builder.build().unwrap();
        let cycles = break_cycles(&graph);
        let layers = assign_longest_path(&graph, &cycles);

        let expanded = virtualize(&graph, &cycles, &layers);
        let chain = expanded.chain(skip);
        assert_eq!(chain.len(), 4); // a, dummy@1, dummy@2, d
        assert!(expanded.is_dummy(chain[1]));
        assert!(expanded.is_dummy(chain[2]));
        assert_eq!(expanded.node(chain[1]).unwrap().level(), 1);
        assert_eq!(expanded.node(chain[2]).unwrap().level(), 2);
    }

    #[test]
    fn adjacent_level_edge_gets_no_dummies() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("A").unwrap();
        let b = builder.add_node("B").unwrap();
        let direct = builder.add_edge(a, b, true, None::<String>).unwrap();
        let graph = builder.build().unwrap();
        let cycles = break_cycles(&graph);
        let layers = assign_longest_path(&graph, &cycles);

        let expanded = virtualize(&graph, &cycles, &layers);
        assert_eq!(expanded.chain(direct).len(), 2);
    }
}
