// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::crossing::CrossingReducer;
use crate::graph::NodeIndex;
use crate::virtualize::Adjacency;
use std::collections::HashMap;

/// The cost threshold above which a level is skipped entirely (§4.4): pairwise adjacent swaps
/// are O(level size) per node, and levels denser than this are left to the median reducer.
const MAX_LEVEL_SIZE: usize = 20;

/// Greedy adjacent-pair exchange.
///
/// For each pass, for each level, walks adjacent pairs and swaps them whenever doing so strictly
/// reduces the crossing count against both adjacent levels. Skips levels with more than
/// [`MAX_LEVEL_SIZE`] nodes.
pub struct AdjacentExchangeReducer {
    passes: usize,
}

impl AdjacentExchangeReducer {
    /// Creates an adjacent-exchange reducer that runs `passes` sweeps over every level.
    pub fn new(passes: usize) -> Self {
        AdjacentExchangeReducer { passes }
    }
}

/// Counts crossings between `level` (in the order given) and a fixed neighbouring level, using
/// each node's neighbour positions in that fixed level.
fn crossings_against(
    level: &[NodeIndex],
    neighbour_positions: impl Fn(NodeIndex) -> Vec<usize>,
) -> usize {
    // For every pair of nodes (i, j) with i < j in level order, every pair of their neighbour
    // positions (p_i, p_j) with p_i > p_j contributes one crossing.
    let mut total = 0usize;
    let positions: Vec<Vec<usize>> = level.iter().map(|&n| neighbour_positions(n)).collect();
    for i in 0..level.len() {
        for j in (i + 1)..level.len() {
            for &pi in &positions[i] {
                for &pj in &positions[j] {
                    if pi > pj {
                        total += 1;
                    }
                }
            }
        }
    }
    total
}

fn positions_of(level: &[NodeIndex]) -> HashMap<NodeIndex, usize> {
    level
        .iter()
        .enumerate()
        .map(|(pos, &node)| (node, pos))
        .collect()
}

impl CrossingReducer for AdjacentExchangeReducer {
    fn reduce(&self, adjacency: &Adjacency, level_lists: &mut [Vec<NodeIndex>]) {
        let level_count = level_lists.len();
        for _ in 0..self.passes {
            for level in 0..level_count {
                if level_lists[level].len() > MAX_LEVEL_SIZE || level_lists[level].len() < 2 {
                    continue;
                }
                let upper_fixed = if level > 0 {
                    Some(positions_of(&level_lists[level - 1]))
                } else {
                    None
                };
                let lower_fixed = if level + 1 < level_count {
                    Some(positions_of(&level_lists[level + 1]))
                } else {
                    None
                };

                let mut improved = true;
                while improved {
                    improved = false;
                    for i in 0..level_lists[level].len().saturating_sub(1) {
                        let before = local_crossings(
                            &level_lists[level],
                            adjacency,
                            upper_fixed.as_ref(),
                            lower_fixed.as_ref(),
                        );
                        level_lists[level].swap(i, i + 1);
                        let after = local_crossings(
                            &level_lists[level],
                            adjacency,
                            upper_fixed.as_ref(),
                            lower_fixed.as_ref(),
                        );
                        if after < before {
                            improved = true;
                        } else {
                            level_lists[level].swap(i, i + 1);
                        }
                    }
                }
            }
        }
    }
}

fn local_crossings(
    level: &[NodeIndex],
    adjacency: &Adjacency,
    upper_fixed: Option<&HashMap<NodeIndex, usize>>,
    lower_fixed: Option<&HashMap<NodeIndex, usize>>,
) -> usize {
    let mut total = 0;
    if let Some(fixed) = upper_fixed {
        total += crossings_against(level, |n| {
            adjacency
                .upper(n)
                .iter()
                .filter_map(|u| fixed.get(u).copied())
                .collect()
        });
    }
    if let Some(fixed) = lower_fixed {
        total += crossings_against(level, |n| {
            adjacency
                .lower(n)
                .iter()
                .filter_map(|l| fixed.get(l).copied())
                .collect()
        });
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle_breaker::break_cycles;
    use crate::graph::GraphBuilder;
    use crate::layer::assign_longest_path;
    use crate::virtualize::virtualize;

    #[test]
    fn swap_reduces_crossings() {
        // Level 0: [a, b]; level 1: [y, x] with edges a-x, b-y -- crossed. Swapping level 1
        // should reduce crossings to zero.
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("a").unwrap();
        let b = builder.add_node("b").unwrap();
        let x = builder.add_node("x").unwrap();
        let y = builder.add_node("y").unwrap();
        builder.add_edge(a, x, true, None::<String>).unwrap();
        builder.add_edge(b, y, true, None::<String>).unwrap();
        let graph = builder.build().unwrap();
        let cycles = break_cycles(&graph);
        let layers = assign_longest_path(&graph, &cycles);
        let mut expanded = virtualize(&graph, &cycles, &layers);

        // Force the crossed order by hand.
        expanded.level_lists_mut()[1] = vec![y, x];

        let adjacency = expanded.adjacency();
        let reducer = AdjacentExchangeReducer::new(2);
        reducer.reduce(&adjacency, expanded.level_lists_mut());

        assert_eq!(expanded.level_lists()[1], vec![x, y]);
    }
}
