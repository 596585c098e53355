// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Produces one [`EdgePath`] per original edge, threading through whatever dummy waypoints the
//! virtualiser created for it.

mod orthogonal;
mod spline;

pub use orthogonal::route_orthogonal;
pub use spline::route_spline;

use crate::graph::EdgeIndex;
use serde::{Deserialize, Serialize};

/// How an edge is drawn, in abstract grid cells (or, after the IR's coordinate conversion,
/// pixels). The multi-segment variant owns its waypoint list; dropping a [`LayoutEdge`] frees it
/// along with the rest of the path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EdgePath {
    /// A single straight segment between vertically aligned, adjacent-level endpoints.
    Direct,
    /// An L-shape: a vertical run, a horizontal run at `horizontal_y`, then a vertical run.
    Corner {
        /// The y coordinate of the horizontal run, strictly between the two endpoints.
        horizontal_y: i64,
    },
    /// A dedicated vertical detour column, used for reversed edges.
    SideChannel {
        /// The x coordinate of the detour column.
        channel_x: i64,
        /// The y coordinate where the edge leaves the source toward the channel.
        start_y: i64,
        /// The y coordinate where the edge re-enters toward the target.
        end_y: i64,
    },
    /// An orthogonal polyline through one waypoint per level the edge's dummy chain passes
    /// through.
    MultiSegment {
        /// Ordered `(x, y)` waypoints, including both endpoints.
        waypoints: Vec<(i64, i64)>,
    },
    /// A cubic Bezier curve.
    Spline {
        /// First control point.
        cp1_x: i64,
        /// First control point.
        cp1_y: i64,
        /// Second control point.
        cp2_x: i64,
        /// Second control point.
        cp2_y: i64,
    },
}

/// A point for a positioned, not-yet-routed node: its centre-x and the y coordinate of its top
/// and bottom row, derived from level and `level_spacing`.
#[derive(Clone, Copy, Debug)]
pub struct RouteNode {
    /// Centre-x, in grid cells.
    pub center_x: i64,
    /// The node's top row y.
    pub top_y: i64,
    /// The node's bottom row y.
    pub bottom_y: i64,
}

/// One routed edge, ready to be folded into a `LayoutEdge`.
#[derive(Clone, Debug)]
pub struct RoutedEdge {
    /// The original edge this path was computed for.
    pub edge_index: EdgeIndex,
    /// Where the path starts, in grid cells.
    pub from_x: i64,
    /// Where the path starts, in grid cells.
    pub from_y: i64,
    /// Where the path ends, in grid cells.
    pub to_x: i64,
    /// Where the path ends, in grid cells.
    pub to_y: i64,
    /// The path shape itself.
    pub path: EdgePath,
}

/// Tension applied to spline control points: the vertical offset from each endpoint is
/// `tension * delta_y`.
pub const DEFAULT_SPLINE_TENSION: f64 = 0.5;

/// The width, in grid columns, reserved for each reversed edge's side channel.
pub const SIDE_CHANNEL_WIDTH: i64 = 2;

static_assertions::const_assert!(SIDE_CHANNEL_WIDTH > 0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_path_json_tag_is_snake_case() {
        let path = EdgePath::Corner { horizontal_y: 4 };
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#"{"type":"corner","horizontal_y":4}"#);
    }

    #[test]
    fn multi_segment_round_trips() {
        let path = EdgePath::MultiSegment {
            waypoints: vec![(0, 0), (1, 3), (1, 6)],
        };
        let json = serde_json::to_string(&path).unwrap();
        let back: EdgePath = serde_json::from_str(&json).unwrap();
        assert_eq!(path, back);
    }
}
