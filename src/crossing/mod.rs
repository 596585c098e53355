// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reorders nodes within each level to reduce edge crossings between adjacent levels.
//!
//! A crossing reducer is a value carrying its own parameters and a pure function of (adjacency,
//! mutable level lists); [`run_pipeline`] composes a borrowed sequence of these, matching the
//! grounding crate's pattern of small composable passes over a shared mutable structure (see
//! `graph/build.rs`'s sequential builder steps). [`verify`] is the post-pass checker described in
//! §4.4: every reducer must preserve total node count, per-level count, and uniqueness.

mod adjacent_exchange;
mod median;

pub use adjacent_exchange::AdjacentExchangeReducer;
pub use median::MedianReducer;

use crate::errors::{self, Error};
use crate::graph::NodeIndex;
use crate::virtualize::{Adjacency, Expanded};

/// A single crossing-reduction primitive: a pure function of the adjacency and the mutable
/// per-level node lists.
pub trait CrossingReducer {
    /// Reorders `level_lists` in place to reduce crossings, using `adjacency` to find each
    /// node's neighbours in adjacent levels.
    fn reduce(&self, adjacency: &Adjacency, level_lists: &mut [Vec<NodeIndex>]);
}

/// A named, curated sequence of reducers.
pub enum Preset {
    /// `median(2)`.
    Fast,
    /// `median(4)` then `adjacent_exchange(2)`.
    Balanced,
    /// `median(8)` then `adjacent_exchange(4)` then `median(2)`.
    Quality,
    /// No reordering.
    None,
}

impl Preset {
    /// Builds the concrete reducer pipeline for this preset.
    pub fn reducers(&self) -> Vec<Box<dyn CrossingReducer>> {
        match self {
            Preset::Fast => vec![Box::new(MedianReducer::new(2))],
            Preset::Balanced => vec![
                Box::new(MedianReducer::new(4)),
                Box::new(AdjacentExchangeReducer::new(2)),
            ],
            Preset::Quality => vec![
                Box::new(MedianReducer::new(8)),
                Box::new(AdjacentExchangeReducer::new(4)),
                Box::new(MedianReducer::new(2)),
            ],
            Preset::None => vec![],
        }
    }
}

/// Runs `reducers` in sequence over `expanded`'s level lists, then verifies the post-pass
/// invariants unless `skip_validation` is set.
pub fn run_pipeline(
    expanded: &mut Expanded,
    reducers: &[Box<dyn CrossingReducer>],
    skip_validation: bool,
) -> Result<(), Error> {
    let adjacency = expanded.adjacency();
    let before = total_nodes(expanded.level_lists());
    for reducer in reducers {
        reducer.reduce(&adjacency, expanded.level_lists_mut());
        if !skip_validation {
            verify(expanded.level_lists(), before)?;
        }
    }
    Ok(())
}

fn total_nodes(level_lists: &[Vec<NodeIndex>]) -> usize {
    level_lists.iter().map(Vec::len).sum()
}

/// Verifies that `level_lists` still contains exactly the same multiset of node indexes as
/// `expected_total` implies: no duplicates, no missing nodes, no change in total count.
///
/// `expected_total` is interpreted as "every node index in `0..expected_total` appears exactly
/// once across all level lists" -- true whenever the reducer pipeline started from a freshly
/// virtualised graph, which is always the case in this pipeline.
pub fn verify(level_lists: &[Vec<NodeIndex>], expected_total: usize) -> Result<(), Error> {
    let after = total_nodes(level_lists);
    if after != expected_total {
        return Err(errors::record(Error::LayoutReducerMismatch {
            before: expected_total,
            after,
        }));
    }
    let mut seen = vec![false; expected_total];
    for list in level_lists {
        for &node in list {
            let ix = node.index();
            if ix >= seen.len() {
                return Err(errors::record(Error::LayoutReducerInvalid));
            }
            if seen[ix] {
                return Err(errors::record(Error::LayoutReducerDuplicate { node_ix: ix }));
            }
            seen[ix] = true;
        }
    }
    if let Some(missing) = seen.iter().position(|&s| !s) {
        return Err(errors::record(Error::LayoutReducerMissing { node_ix: missing }));
    }
    Ok(())
}
