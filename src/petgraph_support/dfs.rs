// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain (direction-agnostic) reachability, used to check the caller's opt-in connectedness
//! precondition (`Graph.Component.Disconnected`).

use crate::graph::{GraphView, NodeIndex};

/// Returns whether every node in `graph` is reachable from every other node, treating edges as
/// undirected for the purposes of this check (a dependency graph with a weakly-connected but not
/// strongly-connected shape is still "connected" for layout purposes).
pub fn is_connected(graph: &GraphView<'_>) -> bool {
    let n = graph.node_count();
    if n == 0 {
        return true;
    }
    let mut undirected: Vec<Vec<NodeIndex>> = vec![Vec::new(); n];
    for edge in graph.edges() {
        undirected[edge.from().index()].push(edge.to());
        undirected[edge.to().index()].push(edge.from());
    }

    let mut visited = vec![false; n];
    let mut stack = vec![NodeIndex::new(0)];
    visited[0] = true;
    let mut count = 1;
    while let Some(node) = stack.pop() {
        for &next in &undirected[node.index()] {
            if !visited[next.index()] {
                visited[next.index()] = true;
                count += 1;
                stack.push(next);
            }
        }
    }
    count == n
}
