// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::position::{from_x_and_widths, PositionAssignment};
use crate::virtualize::Expanded;

/// Left-packs each level: `x(first) = 0`, `x(next) = x(prev) + width(prev) + node_spacing`.
/// Guarantees no overlap; the fastest positioner; produces left-biased layouts.
pub fn assign_compact(expanded: &Expanded, widths: &[usize], node_spacing: usize) -> PositionAssignment {
    let mut x = vec![0usize; expanded.node_count()];
    for level in expanded.level_lists() {
        let mut cursor = 0usize;
        for &node in level {
            x[node.index()] = cursor;
            cursor += widths[node.index()] + node_spacing;
        }
    }
    from_x_and_widths(x, widths, node_spacing)
}
