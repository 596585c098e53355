// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::crossing::CrossingReducer;
use crate::graph::NodeIndex;
use crate::virtualize::Adjacency;
use std::collections::HashMap;

/// The classical Sugiyama median heuristic.
///
/// For each pass, alternates a top-down sweep (level 1..N, each "free" level reordered by the
/// median position of each node's neighbours in the level above, which is "fixed" for that
/// sweep) and a bottom-up sweep (the mirror, using the level below). Ties -- an even-degree
/// node whose two medians straddle a gap -- break toward the left neighbour.
pub struct MedianReducer {
    passes: usize,
}

impl MedianReducer {
    /// Creates a median reducer that runs `passes` top-down/bottom-up sweeps.
    pub fn new(passes: usize) -> Self {
        MedianReducer { passes }
    }
}

fn median_position(positions: &mut Vec<usize>) -> Option<f64> {
    if positions.is_empty() {
        return None;
    }
    positions.sort_unstable();
    let m = positions.len();
    let mid = m / 2;
    if m % 2 == 1 {
        Some(positions[mid] as f64)
    } else if m == 2 {
        Some((positions[0] as f64 + positions[1] as f64) / 2.0)
    } else {
        // Even degree > 2: weight toward the left neighbour, per the classical heuristic
        // (Gansner et al.), which biases ties toward the earlier position.
        let left = positions[mid - 1] as f64;
        let right = positions[mid] as f64;
        let left_span = (right - positions[0] as f64).max(1.0);
        let right_span = (positions[m - 1] as f64 - left).max(1.0);
        Some((left * right_span + right * left_span) / (left_span + right_span))
    }
}

fn reorder_by_median(
    free: &mut Vec<NodeIndex>,
    fixed_positions: &HashMap<NodeIndex, usize>,
    neighbours: impl Fn(NodeIndex) -> Vec<NodeIndex>,
) {
    let mut keyed: Vec<(NodeIndex, Option<f64>, usize)> = free
        .iter()
        .enumerate()
        .map(|(original_pos, &node)| {
            let mut positions: Vec<usize> = neighbours(node)
                .into_iter()
                .filter_map(|n| fixed_positions.get(&n).copied())
                .collect();
            (node, median_position(&mut positions), original_pos)
        })
        .collect();

    // Nodes with no neighbours in the fixed level keep their original position; stable-sort the
    // rest by median, falling back to original position to keep the sort stable and
    // deterministic.
    keyed.sort_by(|a, b| match (a.1, b.1) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap().then(a.2.cmp(&b.2)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.2.cmp(&b.2),
    });

    *free = keyed.into_iter().map(|(node, _, _)| node).collect();
}

fn positions_of(level: &[NodeIndex]) -> HashMap<NodeIndex, usize> {
    level
        .iter()
        .enumerate()
        .map(|(pos, &node)| (node, pos))
        .collect()
}

impl CrossingReducer for MedianReducer {
    fn reduce(&self, adjacency: &Adjacency, level_lists: &mut [Vec<NodeIndex>]) {
        let level_count = level_lists.len();
        if level_count < 2 {
            return;
        }
        for _ in 0..self.passes {
            // Top-down: level 0 is fixed, reorder 1..level_count by upper neighbours.
            for level in 1..level_count {
                let fixed = positions_of(&level_lists[level - 1]);
                let mut free = std::mem::take(&mut level_lists[level]);
                reorder_by_median(&mut free, &fixed, |n| adjacency.upper(n).to_vec());
                level_lists[level] = free;
            }
            // Bottom-up: last level is fixed, reorder level_count-2..=0 by lower neighbours.
            for level in (0..level_count - 1).rev() {
                let fixed = positions_of(&level_lists[level + 1]);
                let mut free = std::mem::take(&mut level_lists[level]);
                reorder_by_median(&mut free, &fixed, |n| adjacency.lower(n).to_vec());
                level_lists[level] = free;
            }
        }
    }
}
