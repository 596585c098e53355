// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end scenarios exercising the public pipeline, render, and config surface together,
//! the way the grounding crate's `tests/` integration suite drives its public `PackageGraph`
//! API rather than reaching into crate-private modules.

use sugiyama_layout::config::{CycleBreaking, LayoutAlgorithm, Positioning};
use sugiyama_layout::graph::{GraphBuilder, NodeKind};
use sugiyama_layout::render::json;
use sugiyama_layout::render::UnicodeRenderer;
use sugiyama_layout::route::EdgePath;
use sugiyama_layout::{pipeline, Config};

#[test]
fn linear_chain_produces_three_levels_of_direct_edges() {
    let mut builder = GraphBuilder::new();
    let a = builder.add_node("1").unwrap();
    let b = builder.add_node("2").unwrap();
    let c = builder.add_node("3").unwrap();
    builder.add_edge(a, b, true, None::<String>).unwrap();
    builder.add_edge(b, c, true, None::<String>).unwrap();
    let graph = builder.build().unwrap();

    let config = Config::default();
    let ir = pipeline::run(&graph, &config).unwrap();

    assert_eq!(ir.get_level_count(), 3);
    let mut by_level: Vec<_> = ir.get_nodes().iter().collect();
    by_level.sort_by_key(|n| n.level);
    for node in &by_level {
        assert_eq!(node.x, 0);
        assert_eq!(node.y, node.level as i64 * config.level_spacing as i64);
    }
    assert!(!ir.get_edges().is_empty());
    for edge in ir.get_edges() {
        assert_eq!(edge.path, EdgePath::Direct);
        assert!(!edge.reversed);
    }
}

#[test]
fn diamond_places_middle_nodes_symmetrically_with_no_reversal() {
    let mut builder = GraphBuilder::new();
    let one = builder.add_node("1").unwrap();
    let two = builder.add_node("2").unwrap();
    let three = builder.add_node("3").unwrap();
    let four = builder.add_node("4").unwrap();
    builder.add_edge(one, two, true, None::<String>).unwrap();
    builder.add_edge(one, three, true, None::<String>).unwrap();
    builder.add_edge(two, four, true, None::<String>).unwrap();
    builder.add_edge(three, four, true, None::<String>).unwrap();
    let graph = builder.build().unwrap();

    let mut config = Config::default();
    config.positioning = Positioning::BrandesKopf;
    let ir = pipeline::run(&graph, &config).unwrap();

    assert_eq!(ir.get_level_count(), 3);
    assert!(ir.get_edges().iter().all(|e| !e.reversed));

    // `GraphBuilder` assigns ids by insertion order, starting at 0: one=0, two=1, three=2, four=3.
    let root = ir.node_by_id(0).unwrap();
    let left = ir.node_by_id(1).unwrap();
    let right = ir.node_by_id(2).unwrap();
    assert_eq!(left.level, 1);
    assert_eq!(right.level, 1);
    let spread_left = root.center_x - left.center_x;
    let spread_right = right.center_x - root.center_x;
    assert_eq!(spread_left, spread_right);
}

#[test]
fn skip_level_edge_threads_two_dummy_waypoints() {
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

    let ir = pipeline::run(&graph, &Config::default()).unwrap();

    let dummy_count = ir
        .get_nodes()
        .iter()
        .filter(|n| n.kind == NodeKind::Dummy && n.edge_index == Some(skip.index()))
        .count();
    assert_eq!(dummy_count, 2);

    let skip_edge = ir
        .get_edges()
        .iter()
        .find(|e| e.edge_index == skip.index())
        .unwrap();
    match &skip_edge.path {
        EdgePath::MultiSegment { waypoints } => assert_eq!(waypoints.len(), 4),
        other => panic!("expected multi_segment path, got {other:?}"),
    }
}

#[test]
fn triangle_cycle_reverses_exactly_one_edge_and_routes_it_through_a_side_channel() {
    let mut builder = GraphBuilder::new();
    let a = builder.add_node("A").unwrap();
    let b = builder.add_node("B").unwrap();
    let c = builder.add_node("C").unwrap();
    builder.add_edge(a, b, true, None::<String>).unwrap();
    builder.add_edge(b, c, true, None::<String>).unwrap();
    builder.add_edge(c, a, true, None::<String>).unwrap();
    let graph = builder.build().unwrap();

    let mut config = Config::default();
    config.cycle_breaking = CycleBreaking::DepthFirst;
    let ir = pipeline::run(&graph, &config).unwrap();

    assert_eq!(ir.get_level_count(), 3);
    let reversed: Vec<_> = ir.get_edges().iter().filter(|e| e.reversed).collect();
    assert_eq!(reversed.len(), 1);
    assert!(matches!(reversed[0].path, EdgePath::SideChannel { .. }));

    let rendered = UnicodeRenderer::new(&ir).render().unwrap();
    assert!(!rendered.is_empty());
}

#[test]
fn self_loop_alongside_outgoing_edge_is_reversed_and_degenerate() {
    let mut builder = GraphBuilder::new();
    let one = builder.add_node("1").unwrap();
    let two = builder.add_node("2").unwrap();
    builder.add_edge(one, one, true, None::<String>).unwrap();
    builder.add_edge(one, two, true, None::<String>).unwrap();
    let graph = builder.build().unwrap();

    let ir = pipeline::run(&graph, &Config::default()).unwrap();

    // `one` is the first node added, so its assigned id is 0.
    let loop_edge = ir
        .get_edges()
        .iter()
        .find(|e| e.from_id == 0 && e.to_id == 0)
        .unwrap();
    assert!(loop_edge.reversed);
    assert_eq!(loop_edge.from_y, loop_edge.to_y);

    let rendered = UnicodeRenderer::new(&ir).render().unwrap();
    assert!(!rendered.is_empty());
}

#[test]
fn force_directed_ring_is_deterministic_across_runs_with_the_same_seed() {
    let mut builder = GraphBuilder::new();
    let nodes: Vec<_> = (0..6).map(|i| builder.add_node(i.to_string()).unwrap()).collect();
    for i in 0..6 {
        builder
            .add_edge(nodes[i], nodes[(i + 1) % 6], true, None::<String>)
            .unwrap();
    }
    let graph = builder.build().unwrap();

    let mut config = Config::default();
    config.algorithm = LayoutAlgorithm::FruchtermanReingold;
    config.force_directed.seed = 42;

    let first = pipeline::run(&graph, &config).unwrap();
    let second = pipeline::run(&graph, &config).unwrap();

    assert_eq!(first.get_level_count(), 1);
    assert_eq!(second.get_level_count(), 1);
    for (a, b) in first.get_nodes().iter().zip(second.get_nodes().iter()) {
        assert_eq!(a.x, b.x);
        assert_eq!(a.y, b.y);
    }
}

#[test]
fn json_round_trip_preserves_the_diamond_layout() {
    let mut builder = GraphBuilder::new();
    let one = builder.add_node("1").unwrap();
    let two = builder.add_node("2").unwrap();
    let three = builder.add_node("3").unwrap();
    let four = builder.add_node("4").unwrap();
    builder.add_edge(one, two, true, None::<String>).unwrap();
    builder.add_edge(one, three, true, None::<String>).unwrap();
    builder.add_edge(two, four, true, None::<String>).unwrap();
    builder.add_edge(three, four, true, None::<String>).unwrap();
    let graph = builder.build().unwrap();

    let ir = pipeline::run(&graph, &Config::default()).unwrap();
    let document = json::to_json(&ir).unwrap();
    let round_tripped = json::from_json(&document).unwrap();

    assert_eq!(round_tripped.get_level_count(), ir.get_level_count());
    assert_eq!(round_tripped.get_width(), ir.get_width());
    assert_eq!(round_tripped.get_height(), ir.get_height());
    for level in 0..ir.get_level_count() {
        let before: Vec<u64> = ir.nodes_at_level(level).iter().map(|n| n.id).collect();
        let after: Vec<u64> = round_tripped.nodes_at_level(level).iter().map(|n| n.id).collect();
        assert_eq!(before, after);
    }
}

#[test]
fn every_multi_segment_path_is_manhattan_shaped() {
    let mut builder = GraphBuilder::new();
    let a = builder.add_node("A").unwrap();
    let b = builder.add_node("B").unwrap();
    let c = builder.add_node("C").unwrap();
    let d = builder.add_node("D").unwrap();
    let e = builder.add_node("E").unwrap();
    builder.add_edge(a, b, true, None::<String>).unwrap();
    builder.add_edge(b, c, true, None::<String>).unwrap();
    builder.add_edge(c, d, true, None::<String>).unwrap();
    builder.add_edge(d, e, true, None::<String>).unwrap();
    builder.add_edge(a, e, true, None::<String>).unwrap();
    let graph = builder.build().unwrap();

    let ir = pipeline::run(&graph, &Config::default()).unwrap();
    for edge in ir.get_edges() {
        if let EdgePath::MultiSegment { waypoints } = &edge.path {
            for pair in waypoints.windows(2) {
                let (x1, y1) = pair[0];
                let (x2, y2) = pair[1];
                let axes_changed = (x1 != x2) as u8 + (y1 != y2) as u8;
                assert_eq!(axes_changed, 1, "waypoint pair {pair:?} is not axis-aligned");
            }
        }
    }
}
