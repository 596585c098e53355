// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assigns each node an integer level, using either the longest-path or network-simplex
//! algorithm.

mod longest_path;
mod network_simplex;

pub use longest_path::assign_longest_path;
pub use network_simplex::assign_network_simplex;

use crate::graph::NodeIndex;

/// A mapping from node index to its assigned level, produced by a layerer and consumed by the
/// virtualiser.
///
/// Invariant: for every retained directed edge u -> v (after cycle-breaker reorientation),
/// `level(u) < level(v)`.
#[derive(Clone, Debug)]
pub struct LayerAssignment {
    levels: Vec<usize>,
    max_level: usize,
}

impl LayerAssignment {
    pub(crate) fn from_levels(levels: Vec<usize>) -> Self {
        let max_level = levels.iter().copied().max().unwrap_or(0);
        LayerAssignment { levels, max_level }
    }

    /// The level assigned to `node`.
    pub fn level(&self, node: NodeIndex) -> usize {
        self.levels[node.index()]
    }

    /// The highest level assigned to any node.
    pub fn max_level(&self) -> usize {
        self.max_level
    }

    /// The number of distinct levels, i.e. `max_level() + 1`.
    pub fn level_count(&self) -> usize {
        self.max_level + 1
    }

    /// The number of nodes this assignment covers.
    pub fn node_count(&self) -> usize {
        self.levels.len()
    }
}
