// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::cycle_breaker::CycleBreakResult;
use crate::graph::GraphView;
use crate::route::{EdgePath, RouteNode, RoutedEdge, DEFAULT_SPLINE_TENSION, SIDE_CHANNEL_WIDTH};
use crate::virtualize::Expanded;

/// Routes every original edge as a cubic Bezier.
///
/// Adjacent-level edges get a single curve from the source's bottom-centre to the target's
/// top-centre, with control points offset vertically by `tension * delta_y` and, for diagonal
/// edges, horizontally by a fraction of `delta_x` (a smaller fraction for long edges, so the
/// curve doesn't overshoot). Multi-level edges get a single curve whose control points are
/// pulled toward the middle dummy's x, so the curve visibly bends through the intermediate
/// level space instead of cutting a straight diagonal across it. Reversed edges (including
/// self-loops) still use a side channel, exactly as the orthogonal router does.
pub fn route_spline(
    graph: &GraphView<'_>,
    cycles: &CycleBreakResult,
    expanded: &Expanded,
    nodes: &[RouteNode],
    layout_right_edge: i64,
) -> Vec<RoutedEdge> {
    let mut routed = Vec::with_capacity(graph.edge_count());
    let mut side_channel_count = 0i64;

    for edge in graph.edges() {
        let from = edge.from();
        let to = edge.to();
        let from_point = nodes[from.index()];
        let to_point = nodes[to.index()];

        if cycles.is_reversed(edge.index()) {
            let channel_x = layout_right_edge + 1 + side_channel_count * SIDE_CHANNEL_WIDTH;
            side_channel_count += 1;
            let (from_y, to_y, start_y, end_y) = if from == to {
                (from_point.top_y, from_point.top_y, from_point.bottom_y, from_point.top_y)
            } else {
                (from_point.bottom_y, to_point.top_y, from_point.bottom_y, to_point.top_y)
            };
            routed.push(RoutedEdge {
                edge_index: edge.index(),
                from_x: from_point.center_x,
                from_y,
                to_x: to_point.center_x,
                to_y,
                path: EdgePath::SideChannel {
                    channel_x,
                    start_y,
                    end_y,
                },
            });
            continue;
        }

        let chain = expanded.chain(edge.index());
        let from_y = from_point.bottom_y;
        let to_y = to_point.top_y;
        let delta_y = to_y - from_y;

        let (cp1_x, cp2_x) = if chain.len() <= 2 {
            let delta_x = to_point.center_x - from_point.center_x;
            let is_long = delta_y.abs() > 2 * (from_point.bottom_y - from_point.top_y).max(1);
            let fraction = if is_long { 0.3 } else { 0.5 };
            let offset_x = (fraction * delta_x as f64).round() as i64;
            (from_point.center_x + offset_x, to_point.center_x - offset_x)
        } else {
            let middle_dummy = chain[chain.len() / 2];
            let middle_x = nodes[middle_dummy.index()].center_x;
            (middle_x, middle_x)
        };

        let offset_y = (DEFAULT_SPLINE_TENSION * delta_y as f64).round() as i64;
        routed.push(RoutedEdge {
            edge_index: edge.index(),
            from_x: from_point.center_x,
            from_y,
            to_x: to_point.center_x,
            to_y,
            path: EdgePath::Spline {
                cp1_x,
                cp1_y: from_y + offset_y,
                cp2_x,
                cp2_y: to_y - offset_y,
            },
        });
    }

    routed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle_breaker::break_cycles;
    use crate::graph::GraphBuilder;
    use crate::layer::assign_longest_path;
    use crate::virtualize::virtualize;

    fn route_nodes(expanded: &Expanded) -> Vec<RouteNode> {
        (0..expanded.node_count())
            .map(|ix| {
                let level = expanded.node(crate::graph::NodeIndex::new(ix)).unwrap().level() as i64;
                RouteNode {
                    center_x: ix as i64,
                    top_y: level * 3,
                    bottom_y: level * 3 + 1,
                }
            })
            .collect()
    }

    #[test]
    fn straight_edge_control_points_stay_on_axis() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("a").unwrap();
        let b = builder.add_node("b").unwrap();
        let edge = builder.add_edge(a, b, true, None::<String>).unwrap();
        let graph = builder.build().unwrap();
        let cycles = break_cycles(&graph);
        let layers = assign_longest_path(&graph, &cycles);
        let expanded = virtualize(&graph, &cycles, &layers);
        let mut nodes = route_nodes(&expanded);
        nodes[a.index()].center_x = 4;
        nodes[b.index()].center_x = 4;

        let routed = route_spline(&graph, &cycles, &expanded, &nodes, 20);
        match routed[edge.index()].path {
            EdgePath::Spline { cp1_x, cp2_x, .. } => {
                assert_eq!(cp1_x, 4);
                assert_eq!(cp2_x, 4);
            }
            ref other => panic!("expected spline, got {other:?}"),
        }
    }

    #[test]
    fn reversed_edge_still_uses_side_channel() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("a").unwrap();
        let b = builder.add_node("b").unwrap();
        builder.add_edge(a, b, true, None::<String>).unwrap();
        let back = builder.add_edge(b, a, true, None::<String>).unwrap();
        let graph = builder.build().unwrap();
        let cycles = break_cycles(&graph);
        let layers = assign_longest_path(&graph, &cycles);
        let expanded = virtualize(&graph, &cycles, &layers);
        let nodes = route_nodes(&expanded);

        let routed = route_spline(&graph, &cycles, &expanded, &nodes, 20);
        assert!(matches!(routed[back.index()].path, EdgePath::SideChannel { .. }));
    }
}
