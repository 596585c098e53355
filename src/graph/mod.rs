// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The graph view consumed by the layout pipeline: nodes, edges, and adjacency.
//!
//! [`GraphBuilder`] is the concrete implementation of the "graph construction API" the pipeline
//! requires from its upstream collaborator. Once built, a [`GraphView`] is immutable for the
//! lifetime of the pipeline run and every rendering derived from it.

use crate::errors::{self, Error};
use petgraph::graph::IndexType;
use std::borrow::Cow;
use std::fmt;

/// Default cap on the number of nodes a [`GraphBuilder`] will accept.
pub const DEFAULT_MAX_NODES: usize = 100_000;
/// Default cap on the number of edges a [`GraphBuilder`] will accept.
pub const DEFAULT_MAX_EDGES: usize = 500_000;
/// Cap on the number of cells a rendered or label-placement grid may allocate (~400MB of
/// `char`s). Shared by the pipeline's label placer and the Unicode renderer.
pub const MAX_GRID_CELLS: usize = 100_000_000;

/// Index for nodes in a [`GraphView`], and (after virtualisation) in the expanded node list
/// that also contains dummy nodes. Used as a petgraph [`IndexType`] so the pipeline's passes can
/// reuse petgraph's graph algorithms directly.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeIndex(u32);

impl NodeIndex {
    pub(crate) fn new(ix: usize) -> Self {
        NodeIndex(ix as u32)
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// SAFETY: faithfully preserves and converts index values, per `IndexType`'s contract.
unsafe impl IndexType for NodeIndex {
    fn new(x: usize) -> Self {
        NodeIndex(x as u32)
    }
    fn index(&self) -> usize {
        self.0 as usize
    }
    fn max() -> Self {
        NodeIndex(u32::MAX)
    }
}

/// Index for edges in a [`GraphView`], in insertion order.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EdgeIndex(u32);

impl EdgeIndex {
    pub(crate) fn new(ix: usize) -> Self {
        EdgeIndex(ix as u32)
    }

    /// Returns this index as a `usize`.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EdgeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of node this is.
///
/// Explicit and implicit nodes are both caller-visible; the difference is only in label
/// ownership (see [`GraphBuilder::add_node`] vs [`GraphBuilder::add_implicit_node`]). Dummy
/// nodes are inserted by [`crate::virtualize`] and never appear in a plain [`GraphView`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NodeKind {
    /// A node the caller added directly, with a borrowed label.
    Explicit,
    /// A node the caller added, but whose label is owned by the graph (e.g. synthesized from
    /// other data rather than borrowed from caller-owned storage).
    Implicit,
    /// A synthetic waypoint node inserted by the virtualiser on a long edge.
    Dummy,
}

#[derive(Clone, Debug)]
struct NodeData<'a> {
    id: u64,
    label: Cow<'a, str>,
    kind: NodeKind,
}

#[derive(Clone, Debug)]
struct EdgeData {
    from: NodeIndex,
    to: NodeIndex,
    directed: bool,
    label: Option<String>,
}

/// A single node as seen by a pipeline pass or a renderer.
#[derive(Clone, Copy, Debug)]
pub struct NodeRef<'g> {
    index: NodeIndex,
    data: &'g NodeData<'g>,
}

impl<'g> NodeRef<'g> {
    /// The node's stable id.
    pub fn id(&self) -> u64 {
        self.data.id
    }

    /// The node's display label.
    pub fn label(&self) -> &'g str {
        &self.data.label
    }

    /// What kind of node this is.
    pub fn kind(&self) -> NodeKind {
        self.data.kind
    }

    /// This node's index in the graph.
    pub fn index(&self) -> NodeIndex {
        self.index
    }
}

/// A single edge as seen by a pipeline pass or a renderer.
#[derive(Clone, Copy, Debug)]
pub struct EdgeRef<'g> {
    index: EdgeIndex,
    data: &'g EdgeData,
}

impl<'g> EdgeRef<'g> {
    /// This edge's index.
    pub fn index(&self) -> EdgeIndex {
        self.index
    }

    /// The source node index.
    pub fn from(&self) -> NodeIndex {
        self.data.from
    }

    /// The target node index.
    pub fn to(&self) -> NodeIndex {
        self.data.to
    }

    /// Whether this edge is directed.
    pub fn directed(&self) -> bool {
        self.data.directed
    }

    /// This edge's label, if any.
    pub fn label(&self) -> Option<&str> {
        self.data.label.as_deref()
    }
}

/// The outcome of [`GraphView::validate`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Validation {
    /// The graph is well-formed.
    Ok,
    /// The graph has no nodes.
    Empty,
    /// The graph contains a cycle, witnessed by `path`.
    Cycle {
        /// A sequence of node indexes forming a cycle.
        path: Vec<NodeIndex>,
    },
}

/// Builds a [`GraphView`] by accumulating nodes and edges in insertion order.
///
/// Mirrors the grounding crate's pattern of a fallible, cap-enforcing builder that is consumed
/// into an immutable graph (`PackageGraph::from_metadata`): every `add_*` call can fail with a
/// structured [`Error`], and [`GraphBuilder::build`] performs one final acyclicity-agnostic
/// consistency pass before handing out a read-only [`GraphView`].
#[derive(Clone, Debug)]
pub struct GraphBuilder<'a> {
    nodes: Vec<NodeData<'a>>,
    edges: Vec<EdgeData>,
    children: Vec<Vec<NodeIndex>>,
    parents: Vec<Vec<NodeIndex>>,
    max_nodes: usize,
    max_edges: usize,
    strict: bool,
}

impl<'a> Default for GraphBuilder<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> GraphBuilder<'a> {
    /// Creates an empty builder with the default resource caps.
    pub fn new() -> Self {
        GraphBuilder {
            nodes: Vec::new(),
            edges: Vec::new(),
            children: Vec::new(),
            parents: Vec::new(),
            max_nodes: DEFAULT_MAX_NODES,
            max_edges: DEFAULT_MAX_EDGES,
            strict: false,
        }
    }

    /// Overrides the node and edge count caps.
    pub fn with_caps(mut self, max_nodes: usize, max_edges: usize) -> Self {
        self.max_nodes = max_nodes;
        self.max_edges = max_edges;
        self
    }

    /// Rejects self-loops at insertion time instead of accepting them for the cycle breaker to
    /// mark as reversed.
    pub fn with_strict_self_loops(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Adds a node with a borrowed label, returning its index. The node's `id` is assigned as
    /// the insertion order (stable for the lifetime of the builder/graph).
    pub fn add_node(&mut self, label: impl Into<Cow<'a, str>>) -> Result<NodeIndex, Error> {
        self.add_node_kind(label, NodeKind::Explicit)
    }

    /// Adds a node whose label is synthesized (and therefore owned) rather than borrowed from
    /// caller-owned storage.
    pub fn add_implicit_node(&mut self, label: impl Into<String>) -> Result<NodeIndex, Error> {
        self.add_node_kind(Cow::Owned(label.into()), NodeKind::Implicit)
    }

    fn add_node_kind(
        &mut self,
        label: impl Into<Cow<'a, str>>,
        kind: NodeKind,
    ) -> Result<NodeIndex, Error> {
        if self.nodes.len() >= self.max_nodes {
            return Err(errors::record(Error::GraphNodeLimitExceeded {
                limit: self.max_nodes,
            }));
        }
        let index = NodeIndex::new(self.nodes.len());
        self.nodes.push(NodeData {
            id: index.0 as u64,
            label: label.into(),
            kind,
        });
        self.children.push(Vec::new());
        self.parents.push(Vec::new());
        Ok(index)
    }

    /// Adds an edge between two previously-added nodes.
    pub fn add_edge(
        &mut self,
        from: NodeIndex,
        to: NodeIndex,
        directed: bool,
        label: Option<impl Into<String>>,
    ) -> Result<EdgeIndex, Error> {
        if self.edges.len() >= self.max_edges {
            return Err(errors::record(Error::GraphEdgeLimitExceeded {
                limit: self.max_edges,
            }));
        }
        if self.node_data(from).is_none() {
            return Err(errors::record(Error::GraphNodeNotFound {
                id: from.0 as u64,
            }));
        }
        if self.node_data(to).is_none() {
            return Err(errors::record(Error::GraphNodeNotFound { id: to.0 as u64 }));
        }
        if self.strict && from == to {
            return Err(errors::record(Error::GraphEdgeInvalid {
                id: from.0 as u64,
            }));
        }
        for existing in &self.edges {
            if existing.from == from && existing.to == to && existing.directed != directed {
                return Err(errors::record(Error::GraphEdgeMismatch {
                    from: from.0 as u64,
                    to: to.0 as u64,
                }));
            }
        }

        let index = EdgeIndex::new(self.edges.len());
        self.edges.push(EdgeData {
            from,
            to,
            directed,
            label: label.map(Into::into),
        });
        self.children[from.index()].push(to);
        self.parents[to.index()].push(from);
        if !directed {
            self.children[to.index()].push(from);
            self.parents[from.index()].push(to);
        }
        Ok(index)
    }

    fn node_data(&self, ix: NodeIndex) -> Option<&NodeData<'a>> {
        self.nodes.get(ix.index())
    }

    /// Consumes the builder, producing an immutable [`GraphView`].
    ///
    /// This does not itself require acyclicity; call [`GraphView::validate`] if the caller's
    /// configuration requires a DAG up front (see `Graph.Dag.Invalid` in the error taxonomy).
    pub fn build(self) -> Result<GraphView<'a>, Error> {
        if self.nodes.is_empty() {
            return Err(errors::record(Error::GraphNodeMissing));
        }
        Ok(GraphView {
            nodes: self.nodes,
            edges: self.edges,
            children: self.children,
            parents: self.parents,
        })
    }
}

/// An immutable snapshot of a graph: nodes, edges, and adjacency lists, indexed by insertion
/// order.
///
/// Owned by the caller across the whole pipeline and every rendering derived from it; the
/// pipeline only ever borrows a `GraphView`.
#[derive(Clone, Debug)]
pub struct GraphView<'a> {
    nodes: Vec<NodeData<'a>>,
    edges: Vec<EdgeData>,
    children: Vec<Vec<NodeIndex>>,
    parents: Vec<Vec<NodeIndex>>,
}

impl<'a> GraphView<'a> {
    /// The number of nodes in this graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The number of edges in this graph.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterates over nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        self.nodes.iter().enumerate().map(|(ix, data)| NodeRef {
            index: NodeIndex::new(ix),
            data,
        })
    }

    /// Iterates over edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeRef<'_>> + '_ {
        self.edges.iter().enumerate().map(|(ix, data)| EdgeRef {
            index: EdgeIndex::new(ix),
            data,
        })
    }

    /// Returns the node at `index`, if any.
    pub fn node(&self, index: NodeIndex) -> Option<NodeRef<'_>> {
        self.nodes.get(index.index()).map(|data| NodeRef { index, data })
    }

    /// Returns the edge at `index`, if any.
    pub fn edge(&self, index: EdgeIndex) -> Option<EdgeRef<'_>> {
        self.edges.get(index.index()).map(|data| EdgeRef { index, data })
    }

    /// Returns the node index for a stable node `id`, if one was added with that id.
    pub fn node_index(&self, id: u64) -> Option<NodeIndex> {
        self.nodes
            .iter()
            .position(|data| data.id == id)
            .map(NodeIndex::new)
    }

    /// Returns the children (outgoing neighbours) of `index` in insertion order.
    pub fn children_of(&self, index: NodeIndex) -> &[NodeIndex] {
        self.children
            .get(index.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns the parents (incoming neighbours) of `index` in insertion order.
    pub fn parents_of(&self, index: NodeIndex) -> &[NodeIndex] {
        self.parents
            .get(index.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Validates the graph's invariants, detecting cycles in its *directed* subgraph.
    ///
    /// Undirected edges never participate in a reported cycle, since they carry no orientation
    /// for the layerer to violate.
    pub fn validate(&self) -> Validation {
        if self.nodes.is_empty() {
            return Validation::Empty;
        }
        #[derive(Clone, Copy, PartialEq)]
        enum Color {
            White,
            Grey,
            Black,
        }

        let n = self.nodes.len();
        let mut out_edges: Vec<Vec<NodeIndex>> = vec![Vec::new(); n];
        for edge in self.edges() {
            if edge.directed() {
                out_edges[edge.from().index()].push(edge.to());
            }
        }

        let mut color = vec![Color::White; n];

        // Explicit-stack DFS: each frame is a node plus the index of the next out-edge to
        // examine, so a long chain of nodes never recurses one native stack frame per node.
        for ix in 0..n {
            if color[ix] != Color::White {
                continue;
            }
            let root = NodeIndex::new(ix);
            let mut path = vec![root];
            color[ix] = Color::Grey;
            let mut frames: Vec<(NodeIndex, usize)> = vec![(root, 0)];
            while let Some(frame) = frames.last_mut() {
                let node = frame.0;
                if frame.1 < out_edges[node.index()].len() {
                    let target = out_edges[node.index()][frame.1];
                    frame.1 += 1;
                    match color[target.index()] {
                        Color::White => {
                            color[target.index()] = Color::Grey;
                            path.push(target);
                            frames.push((target, 0));
                        }
                        Color::Grey => {
                            let start = path.iter().position(|&n| n == target).unwrap_or(0);
                            let mut cycle: Vec<NodeIndex> = path[start..].to_vec();
                            cycle.push(target);
                            return Validation::Cycle { path: cycle };
                        }
                        Color::Black => {}
                    }
                } else {
                    color[node.index()] = Color::Black;
                    path.pop();
                    frames.pop();
                }
            }
        }
        Validation::Ok
    }

    /// Checks the connectedness precondition a caller may opt into before laying out a graph
    /// it expects to be a single component. Edges are treated as undirected, same as
    /// [`crate::petgraph_support::dfs::is_connected`]: a weakly-connected dependency graph still
    /// passes.
    pub fn require_connected(&self) -> Result<(), Error> {
        if crate::petgraph_support::dfs::is_connected(self) {
            Ok(())
        } else {
            Err(errors::record(Error::GraphComponentDisconnected))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_unknown_endpoint() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("a").unwrap();
        let bogus = NodeIndex::new(42);
        let err = builder
            .add_edge(a, bogus, true, None::<String>)
            .unwrap_err();
        assert!(matches!(err, Error::GraphNodeNotFound { .. }));
    }

    #[test]
    fn builder_enforces_node_cap() {
        let mut builder = GraphBuilder::new().with_caps(1, 10);
        builder.add_node("a").unwrap();
        let err = builder.add_node("b").unwrap_err();
        assert!(matches!(err, Error::GraphNodeLimitExceeded { .. }));
    }

    #[test]
    fn empty_graph_fails_to_build() {
        let err = GraphBuilder::new().build().unwrap_err();
        assert!(matches!(err, Error::GraphNodeMissing));
    }

    #[test]
    fn validate_detects_cycle() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("a").unwrap();
        let b = builder.add_node("b").unwrap();
        let c = builder.add_node("c").unwrap();
        builder.add_edge(a, b, true, None::<String>).unwrap();
        builder.add_edge(b, c, true, None::<String>).unwrap();
        builder.add_edge(c, a, true, None::<String>).unwrap();
        let graph = builder.build().unwrap();
        assert!(matches!(graph.validate(), Validation::Cycle { .. }));
    }

    #[test]
    fn validate_accepts_dag() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("a").unwrap();
        let b = builder.add_node("b").unwrap();
        builder.add_edge(a, b, true, None::<String>).unwrap();
        let graph = builder.build().unwrap();
        assert_eq!(graph.validate(), Validation::Ok);
    }

    #[test]
    fn require_connected_rejects_two_components() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("a").unwrap();
        let b = builder.add_node("b").unwrap();
        builder.add_node("c").unwrap();
        builder.add_edge(a, b, true, None::<String>).unwrap();
        let graph = builder.build().unwrap();
        assert!(matches!(
            graph.require_connected(),
            Err(Error::GraphComponentDisconnected)
        ));
    }

    #[test]
    fn require_connected_accepts_a_single_chain() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("a").unwrap();
        let b = builder.add_node("b").unwrap();
        builder.add_edge(a, b, true, None::<String>).unwrap();
        let graph = builder.build().unwrap();
        assert!(graph.require_connected().is_ok());
    }

    #[test]
    fn children_and_parents_tracked() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("a").unwrap();
        let b = builder.add_node("b").unwrap();
        builder.add_edge(a, b, true, None::<String>).unwrap();
        let graph = builder.build().unwrap();
        assert_eq!(graph.children_of(a), &[b]);
        assert_eq!(graph.parents_of(b), &[a]);
    }
}
