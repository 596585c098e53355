// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::cycle_breaker::CycleBreakResult;
use crate::graph::GraphView;
use crate::route::{EdgePath, RouteNode, RoutedEdge, SIDE_CHANNEL_WIDTH};
use crate::virtualize::Expanded;

/// Routes every original edge orthogonally.
///
/// Adjacent-level, vertically aligned edges get a `direct` path; adjacent-level, horizontally
/// offset edges get a `corner` path with the horizontal run midway between the two rows.
/// Multi-level edges get a `multi_segment` path through the dummy chain's waypoints. Edges the
/// cycle breaker reversed (including self-loops) are routed through a dedicated side-channel
/// column to the right of the layout, one column per reversed edge in original edge-index order.
pub fn route_orthogonal(
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
        if chain.len() <= 2 {
            let path = if from_point.center_x == to_point.center_x {
                EdgePath::Direct
            } else {
                EdgePath::Corner {
                    horizontal_y: (from_point.bottom_y + to_point.top_y) / 2,
                }
            };
            routed.push(RoutedEdge {
                edge_index: edge.index(),
                from_x: from_point.center_x,
                from_y: from_point.bottom_y,
                to_x: to_point.center_x,
                to_y: to_point.top_y,
                path,
            });
            continue;
        }

        let mut waypoints = Vec::with_capacity(chain.len());
        waypoints.push((from_point.center_x, from_point.bottom_y));
        for &dummy in &chain[1..chain.len() - 1] {
            let point = nodes[dummy.index()];
            waypoints.push((point.center_x, point.top_y));
        }
        waypoints.push((to_point.center_x, to_point.top_y));

        routed.push(RoutedEdge {
            edge_index: edge.index(),
            from_x: from_point.center_x,
            from_y: from_point.bottom_y,
            to_x: to_point.center_x,
            to_y: to_point.top_y,
            path: EdgePath::MultiSegment { waypoints },
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
    use crate::route::RouteNode;
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
    fn aligned_adjacent_edge_is_direct() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("a").unwrap();
        let b = builder.add_node("b").unwrap();
        let edge = builder.add_edge(a, b, true, None::<String>).unwrap();
        let graph = builder.build().unwrap();
        let cycles = break_cycles(&graph);
        let layers = assign_longest_path(&graph, &cycles);
        let expanded = virtualize(&graph, &cycles, &layers);
        let mut nodes = route_nodes(&expanded);
        nodes[a.index()].center_x = 5;
        nodes[b.index()].center_x = 5;

        let routed = route_orthogonal(&graph, &cycles, &expanded, &nodes, 20);
        assert_eq!(routed[edge.index()].path, EdgePath::Direct);
    }

    #[test]
    fn offset_adjacent_edge_is_corner() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("a").unwrap();
        let b = builder.add_node("b").unwrap();
        let edge = builder.add_edge(a, b, true, None::<String>).unwrap();
        let graph = builder.build().unwrap();
        let cycles = break_cycles(&graph);
        let layers = assign_longest_path(&graph, &cycles);
        let expanded = virtualize(&graph, &cycles, &layers);
        let mut nodes = route_nodes(&expanded);
        nodes[a.index()].center_x = 2;
        nodes[b.index()].center_x = 9;

        let routed = route_orthogonal(&graph, &cycles, &expanded, &nodes, 20);
        assert!(matches!(routed[edge.index()].path, EdgePath::Corner { .. }));
    }

    #[test]
    fn skip_level_edge_gets_multi_segment_with_two_waypoints() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("A").unwrap();
        let b = builder.add_node("B").unwrap();
        let c = builder.add_node("C").unwrap();
        let d = builder.add_node("D").unwrap();
        builder.add_edge(a, b, true, None::<String>).unwrap();
        builder.add_edge(b, c, true, None::<String>).unwrap();
        builder.add_edge(c, d, true, None::<String>).unwrap();
        let skip = builder.add_edge(a, d, true, None::<String>).unwrap();
        let graph = builder.build().unwrap();
        let cycles = break_cycles(&graph);
        let layers = assign_longest_path(&graph, &cycles);
        let expanded = virtualize(&graph, &cycles, &layers);
        let nodes = route_nodes(&expanded);

        let routed = route_orthogonal(&graph, &cycles, &expanded, &nodes, 20);
        match &routed[skip.index()].path {
            EdgePath::MultiSegment { waypoints } => assert_eq!(waypoints.len(), 4),
            other => panic!("expected multi_segment, got {other:?}"),
        }
    }

    #[test]
    fn self_loop_uses_side_channel() {
        let mut builder = GraphBuilder::new().with_strict_self_loops(false);
        let a = builder.add_node("a").unwrap();
        let edge = builder.add_edge(a, a, true, None::<String>).unwrap();
        let graph = builder.build().unwrap();
        let cycles = break_cycles(&graph);
        let layers = assign_longest_path(&graph, &cycles);
        let expanded = virtualize(&graph, &cycles, &layers);
        let nodes = route_nodes(&expanded);

        let routed = route_orthogonal(&graph, &cycles, &expanded, &nodes, 20);
        assert!(matches!(routed[edge.index()].path, EdgePath::SideChannel { .. }));
    }
}
