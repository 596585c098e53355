// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Small, generic helpers layered on top of petgraph's traits and index types.
//!
//! The code in here is generic over the pipeline's own [`crate::graph`] types; it exists so that
//! passes don't each reimplement topological sort or DFS bookkeeping.

pub mod dfs;
pub mod topo;
