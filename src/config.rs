// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pipeline configuration: one struct, with a `Default` matching this crate's documented
//! defaults, plumbed straight through to every pass.

use crate::crossing::{CrossingReducer, Preset};
use crate::force_directed::Repulsion;
use crate::graph::{DEFAULT_MAX_EDGES, DEFAULT_MAX_NODES};

/// Which layering algorithm to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layering {
    /// `level(v) = max(level(u) + 1)` over incoming edges; O(V+E).
    LongestPath,
    /// Longest-path seed, refined by simplex pivots to minimise total edge span.
    NetworkSimplex,
    /// Network simplex with a bounded pivot count (`8 * node_count`), for large graphs.
    NetworkSimplexFast,
}

/// Which cycle-breaking strategy to run before layering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleBreaking {
    /// Skip cycle breaking entirely; layering requires a DAG and will misbehave on cycles.
    None,
    /// Three-colour DFS back-edge detection (§4.1).
    DepthFirst,
}

/// A named, curated crossing-reducer pipeline. Wraps [`Preset`] so `Config` stays
/// serialisation-friendly without exposing trait objects in its public field type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrossingPreset {
    /// No reduction; level lists keep their virtualiser order.
    None,
    /// median(2).
    Fast,
    /// median(4) then adjacent-exchange(2).
    Balanced,
    /// median(8) then adjacent-exchange(4) then median(2).
    Quality,
}

impl CrossingPreset {
    pub(crate) fn reducers(self) -> Vec<Box<dyn CrossingReducer>> {
        let preset = match self {
            CrossingPreset::None => Preset::None,
            CrossingPreset::Fast => Preset::Fast,
            CrossingPreset::Balanced => Preset::Balanced,
            CrossingPreset::Quality => Preset::Quality,
        };
        preset.reducers()
    }
}

/// Which positioning algorithm to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Positioning {
    /// Left-pack each level.
    Compact,
    /// Compact seed, relaxed toward neighbour averages.
    Barycentric,
    /// Four-alignment median positioning (§4.5).
    BrandesKopf,
}

/// Which router to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Routing {
    /// Orthogonal: direct/corner/multi-segment paths.
    Direct,
    /// Cubic-Bezier paths.
    Spline,
}

/// Which top-level layout algorithm to run: the layered Sugiyama pipeline, or the
/// force-directed peer path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutAlgorithm {
    /// Cycle break -> layer -> virtualize -> reduce crossings -> position -> route -> label.
    Sugiyama,
    /// Fruchterman-Reingold with exact (all-pairs) repulsion.
    FruchtermanReingold,
    /// Fruchterman-Reingold with Barnes-Hut approximate repulsion.
    FruchtermanReingoldFast,
}

/// Force-directed-only sub-options, read only when `algorithm` selects one of the
/// Fruchterman-Reingold variants.
#[derive(Clone, Copy, Debug)]
pub struct ForceDirectedConfig {
    /// Seed for the deterministic initial placement.
    pub seed: u64,
    /// Iteration cap for the cooling schedule.
    pub iterations: u32,
}

impl Default for ForceDirectedConfig {
    fn default() -> Self {
        ForceDirectedConfig {
            seed: 0,
            iterations: 200,
        }
    }
}

impl ForceDirectedConfig {
    pub(crate) fn repulsion_for(self, algorithm: LayoutAlgorithm) -> Repulsion {
        match algorithm {
            LayoutAlgorithm::FruchtermanReingoldFast => Repulsion::BarnesHut,
            _ => Repulsion::Exact,
        }
    }
}

/// All tunables consumed by [`crate::pipeline::run`].
///
/// `Default` matches this crate's documented defaults: `network_simplex` layering (chosen over
/// `longest_path` because minimising total edge span is the generally-desired behaviour),
/// `depth_first` cycle breaking, the `balanced` crossing-reducer preset, `brandes_kopf`
/// positioning, `direct` routing, the `sugiyama` algorithm, `node_spacing = 2`,
/// `level_spacing = 3`.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Layering algorithm.
    pub layering: Layering,
    /// Cycle-breaking strategy.
    pub cycle_breaking: CycleBreaking,
    /// Crossing-reducer preset.
    pub crossing_reducers: CrossingPreset,
    /// Positioning algorithm.
    pub positioning: Positioning,
    /// Routing algorithm.
    pub routing: Routing,
    /// Top-level algorithm: Sugiyama or one of the force-directed variants.
    pub algorithm: LayoutAlgorithm,
    /// Force-directed-only sub-options.
    pub force_directed: ForceDirectedConfig,
    /// Horizontal spacing, in cells, between nodes on the same level.
    pub node_spacing: usize,
    /// Vertical spacing, in cells, between levels.
    pub level_spacing: usize,
    /// Whether dummy nodes are drawn by renderers, or represented as a line through their cell.
    pub show_dummy_nodes: bool,
    /// Whether dummy nodes remain in the IR's node list at all (renderers that need to stitch
    /// splines through them require this to stay `true` even when `show_dummy_nodes` is false).
    pub include_dummy_nodes: bool,
    /// Skip the crossing reducer's post-pass verification. Off by default: a custom reducer
    /// that corrupts level lists should fail loudly, not silently corrupt downstream passes.
    pub skip_validation: bool,
    /// Node count cap, enforced by [`crate::graph::GraphBuilder`].
    pub max_nodes: usize,
    /// Edge count cap, enforced by [`crate::graph::GraphBuilder`].
    pub max_edges: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            layering: Layering::NetworkSimplex,
            cycle_breaking: CycleBreaking::DepthFirst,
            crossing_reducers: CrossingPreset::Balanced,
            positioning: Positioning::BrandesKopf,
            routing: Routing::Direct,
            algorithm: LayoutAlgorithm::Sugiyama,
            force_directed: ForceDirectedConfig::default(),
            node_spacing: 2,
            level_spacing: 3,
            show_dummy_nodes: false,
            include_dummy_nodes: true,
            skip_validation: false,
            max_nodes: DEFAULT_MAX_NODES,
            max_edges: DEFAULT_MAX_EDGES,
        }
    }
}
