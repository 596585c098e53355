// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::graph::NodeIndex;
use crate::position::{from_x_and_widths, PositionAssignment};
use crate::virtualize::{Adjacency, Expanded};
use std::collections::HashMap;

/// Horizontal orientations an alignment can be computed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Horizontal {
    Left,
    Right,
}

/// Vertical directions an alignment can walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Vertical {
    Down,
    Up,
}

/// A position within a level: `(level, index_in_level)`.
type Pos = (usize, usize);

/// Brandes-Koepf four-alignment positioning.
///
/// Marks type-1 conflicts between inner segments of adjacent dummy chains, then for each of the
/// four combinations of (top-to-bottom or bottom-to-top) x (leftmost or rightmost) alignment,
/// builds vertical blocks of non-conflicting aligned nodes and compacts each block as far as it
/// can go toward its preferred side. The final x of each node is the median of its four aligned
/// x coordinates.
pub fn assign_brandes_kopf(expanded: &Expanded, widths: &[usize], node_spacing: usize) -> PositionAssignment {
    let levels = expanded.level_lists();
    let n = expanded.node_count();
    if n == 0 || levels.is_empty() {
        return from_x_and_widths(vec![], widths, node_spacing);
    }

    let pos_of: Vec<Pos> = {
        let mut pos_of = vec![(0usize, 0usize); n];
        for (level_ix, level) in levels.iter().enumerate() {
            for (i, &node) in level.iter().enumerate() {
                pos_of[node.index()] = (level_ix, i);
            }
        }
        pos_of
    };

    let adjacency = expanded.adjacency();
    let type1_conflicts = mark_type1_conflicts(expanded, &adjacency, &pos_of);

    let mut alignments = Vec::with_capacity(4);
    for &vertical in &[Vertical::Down, Vertical::Up] {
        for &horizontal in &[Horizontal::Left, Horizontal::Right] {
            alignments.push(align_and_compact(
                levels,
                &pos_of,
                &adjacency,
                &type1_conflicts,
                widths,
                node_spacing,
                vertical,
                horizontal,
            ));
        }
    }

    let x: Vec<usize> = (0..n)
        .map(|ix| {
            let mut vals: Vec<f64> = alignments.iter().map(|a| a[ix]).collect();
            vals.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let median = (vals[1] + vals[2]) / 2.0;
            median.round().max(0.0) as usize
        })
        .collect();

    from_x_and_widths(x, widths, node_spacing)
}

/// A type-1 conflict occurs when a non-dummy/dummy inner-segment pair crosses a dummy/dummy
/// segment; marking it prevents the dummy chain from being pulled straight through real nodes.
/// Recorded as a set of `(lower_level, index_in_lower_level)` pairs whose upper edge is not
/// eligible for alignment.
fn mark_type1_conflicts(
    expanded: &Expanded,
    adjacency: &Adjacency,
    pos_of: &[Pos],
) -> std::collections::HashSet<Pos> {
    use std::collections::HashSet;
    let levels = expanded.level_lists();
    let mut conflicts = HashSet::new();

    for level_ix in 1..levels.len() {
        let upper = &levels[level_ix - 1];
        let lower = &levels[level_ix];
        // Inner segments: both endpoints are dummy nodes belonging to the same chain.
        let mut inner_positions: Vec<(usize, usize)> = Vec::new();
        for (li, &lnode) in lower.iter().enumerate() {
            if !expanded.is_dummy(lnode) {
                continue;
            }
            for &unode in adjacency.upper(lnode) {
                if expanded.is_dummy(unode) {
                    let ui = pos_of[unode.index()].1;
                    inner_positions.push((ui, li));
                }
            }
        }
        for (li, &lnode) in lower.iter().enumerate() {
            if expanded.is_dummy(lnode) {
                continue;
            }
            for &unode in adjacency.upper(lnode) {
                let ui = pos_of[unode.index()].1;
                for &(inner_ui, inner_li) in &inner_positions {
                    if (ui < inner_ui) != (li < inner_li) {
                        conflicts.insert((level_ix, li));
                    }
                }
            }
        }
        let _ = upper;
    }
    conflicts
}

#[allow(clippy::too_many_arguments)]
fn align_and_compact(
    levels: &[Vec<NodeIndex>],
    pos_of: &[Pos],
    adjacency: &Adjacency,
    type1_conflicts: &std::collections::HashSet<Pos>,
    widths: &[usize],
    node_spacing: usize,
    vertical: Vertical,
    horizontal: Horizontal,
) -> Vec<f64> {
    let n = pos_of.len();
    // root[i] = index of the node that i is aligned beneath/above in its vertical block; the
    // block's representative is the node whose root points to itself.
    let mut root: Vec<usize> = (0..n).collect();
    let mut align: Vec<usize> = (0..n).collect();

    let level_order: Vec<usize> = match vertical {
        Vertical::Down => (0..levels.len()).collect(),
        Vertical::Up => (0..levels.len()).rev().collect(),
    };

    for &level_ix in &level_order {
        let level = &levels[level_ix];
        let indices: Vec<usize> = match horizontal {
            Horizontal::Left => (0..level.len()).collect(),
            Horizontal::Right => (0..level.len()).rev().collect(),
        };
        let mut r = match horizontal {
            Horizontal::Left => -1i64,
            Horizontal::Right => level.len() as i64,
        };

        for &i in &indices {
            let node = level[i];
            let neighbours: Vec<NodeIndex> = match vertical {
                Vertical::Down => adjacency.upper(node).to_vec(),
                Vertical::Up => adjacency.lower(node).to_vec(),
            };
            if neighbours.is_empty() {
                continue;
            }
            let mut positions: Vec<usize> = neighbours.iter().map(|nb| pos_of[nb.index()].1).collect();
            positions.sort_unstable();
            let m = positions.len();
            let (lo, hi) = ((m - 1) / 2, m / 2);
            let candidates = [positions[lo], positions[hi]];
            for &cand_pos in candidates.iter() {
                if align[node.index()] != node.index() {
                    continue;
                }
                if type1_conflicts.contains(&(level_ix, i)) {
                    continue;
                }
                let within_bound = match horizontal {
                    Horizontal::Left => cand_pos as i64 > r,
                    Horizontal::Right => (cand_pos as i64) < r,
                };
                if within_bound {
                    let neighbour_node = neighbours
                        .iter()
                        .find(|nb| pos_of[nb.index()].1 == cand_pos)
                        .copied();
                    if let Some(nb) = neighbour_node {
                        align[nb.index()] = node.index();
                        align[node.index()] = nb.index();
                        root[node.index()] = root[nb.index()];
                        r = cand_pos as i64;
                    }
                }
            }
        }
    }

    // Compact each block: assign an x to each block representative, then propagate to members.
    let mut x = vec![0.0f64; n];
    let mut visited = vec![false; n];
    let process_order: Vec<NodeIndex> = level_order
        .iter()
        .flat_map(|&level_ix| {
            let level = &levels[level_ix];
            let indices: Vec<usize> = match horizontal {
                Horizontal::Left => (0..level.len()).collect(),
                Horizontal::Right => (0..level.len()).rev().collect(),
            };
            indices.into_iter().map(move |i| level[i])
        })
        .collect();

    for node in process_order {
        if visited[node.index()] {
            continue;
        }
        // Walk the block from `node`, in alignment order, assigning positions left-to-right.
        let mut block = Vec::new();
        let mut cur = node;
        loop {
            block.push(cur);
            visited[cur.index()] = true;
            let next = align[cur.index()];
            if next == cur.index() || visited[next.index()] {
                break;
            }
            cur = NodeIndex::new(next);
        }
        block.sort_by_key(|n| pos_of[n.index()]);
        let mut cursor = 0.0f64;
        let mut prev: Option<NodeIndex> = None;
        for &member in &block {
            let w = widths[member.index()] as f64;
            if let Some(p) = prev {
                cursor = cursor.max(x[p.index()] + widths[p.index()] as f64 / 2.0 + node_spacing as f64 + w / 2.0);
            } else {
                cursor = left_neighbour_bound(member, pos_of, levels, widths, node_spacing, &x, &visited, horizontal);
            }
            x[member.index()] = cursor;
            prev = Some(member);
        }
    }

    x
}

/// Bounds the first (lowest-`pos`) member of a new block against whichever already-compacted
/// neighbour sits on the side `process_order` visits first: the spatially-left neighbour
/// (`pos - 1`) under [`Horizontal::Left`], since blocks there are built left-to-right, or the
/// spatially-right neighbour (`pos + 1`) under [`Horizontal::Right`], since `process_order` walks
/// each level right-to-left in that case and so has already compacted positions to this node's
/// right, not its left.
fn left_neighbour_bound(
    node: NodeIndex,
    pos_of: &[Pos],
    levels: &[Vec<NodeIndex>],
    widths: &[usize],
    node_spacing: usize,
    x: &[f64],
    visited: &[bool],
    horizontal: Horizontal,
) -> f64 {
    let (level_ix, pos) = pos_of[node.index()];
    let level_len = levels[level_ix].len();
    let neighbour_pos = match horizontal {
        Horizontal::Left => pos.checked_sub(1),
        Horizontal::Right => (pos + 1 < level_len).then_some(pos + 1),
    };
    let neighbour_pos = match neighbour_pos {
        Some(p) => p,
        None => return widths[node.index()] as f64 / 2.0,
    };
    let neighbour = levels[level_ix][neighbour_pos];
    if !visited[neighbour.index()] {
        return widths[node.index()] as f64 / 2.0;
    }
    match horizontal {
        Horizontal::Left => {
            x[neighbour.index()] + widths[neighbour.index()] as f64 / 2.0 + node_spacing as f64 + widths[node.index()] as f64 / 2.0
        }
        Horizontal::Right => {
            x[neighbour.index()] - widths[neighbour.index()] as f64 / 2.0 - node_spacing as f64 - widths[node.index()] as f64 / 2.0
        }
    }
}
