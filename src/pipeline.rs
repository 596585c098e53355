// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runs the full layout pipeline: either the layered Sugiyama sequence (cycle break -> layer ->
//! virtualize -> reduce crossings -> position -> route -> place labels -> assemble) or the
//! force-directed peer path, picked by [`Config::algorithm`]. Either way the result is a
//! [`LayoutIR<i64>`] in integer cell coordinates; renderers convert from there.

use crate::config::{Config, CycleBreaking, Layering, LayoutAlgorithm, Positioning, Routing};
use crate::crossing;
use crate::cycle_breaker::{self, CycleBreakResult};
use crate::errors::{self, Error};
use crate::force_directed::{self, ForceDirectedParams};
use crate::graph::{GraphView, NodeIndex, Validation, MAX_GRID_CELLS};
use crate::ir::{LayoutEdge, LayoutIR, LayoutNode};
use crate::label::{self, LegendEntry, Placement};
use crate::layer::{assign_longest_path, assign_network_simplex};
use crate::position::{assign_barycentric, assign_brandes_kopf, assign_compact, node_widths};
use crate::route::{route_orthogonal, route_spline, EdgePath, RouteNode, RoutedEdge, SIDE_CHANNEL_WIDTH};
use crate::virtualize;

/// Nominal node box height used only to give the router's routing conventions and the
/// spline-heuristic's node-height denominator a non-zero value. Distinct from `level_spacing`,
/// the gap between levels; a node's own `y` is always `level * level_spacing`.
const NODE_HEIGHT: i64 = 1;

/// Runs the configured layout algorithm over `graph`, producing a renderer-agnostic IR.
pub fn run(graph: &GraphView<'_>, config: &Config) -> Result<LayoutIR<i64>, Error> {
    match config.algorithm {
        LayoutAlgorithm::Sugiyama => run_sugiyama(graph, config),
        LayoutAlgorithm::FruchtermanReingold | LayoutAlgorithm::FruchtermanReingoldFast => {
            run_force_directed(graph, config)
        }
    }
}

fn run_sugiyama(graph: &GraphView<'_>, config: &Config) -> Result<LayoutIR<i64>, Error> {
    let cycles = match config.cycle_breaking {
        CycleBreaking::None => {
            if let Validation::Cycle { path } = graph.validate() {
                return Err(errors::record(Error::GraphDagInvalid {
                    path: path.iter().map(|n| n.index()).collect(),
                }));
            }
            CycleBreakResult::none()
        }
        CycleBreaking::DepthFirst => cycle_breaker::break_cycles(graph),
    };

    let layers = match config.layering {
        Layering::LongestPath => assign_longest_path(graph, &cycles),
        Layering::NetworkSimplex => assign_network_simplex(graph, &cycles, false),
        Layering::NetworkSimplexFast => assign_network_simplex(graph, &cycles, true),
    };

    let mut expanded = virtualize::virtualize(graph, &cycles, &layers);

    let reducers = config.crossing_reducers.reducers();
    crossing::run_pipeline(&mut expanded, &reducers, config.skip_validation)?;

    let widths = node_widths(graph, &expanded);
    let positions = match config.positioning {
        Positioning::Compact => assign_compact(&expanded, &widths, config.node_spacing),
        Positioning::Barycentric => assign_barycentric(&expanded, &widths, config.node_spacing),
        Positioning::BrandesKopf => assign_brandes_kopf(&expanded, &widths, config.node_spacing),
    };

    let level_spacing = config.level_spacing as i64;
    let route_nodes: Vec<RouteNode> = (0..expanded.node_count())
        .map(|ix| {
            let index = NodeIndex::new(ix);
            let level = expanded.node(index).map(|n| n.level()).unwrap_or(0);
            let top_y = level as i64 * level_spacing;
            RouteNode {
                center_x: positions.center_x(index) as i64,
                top_y,
                bottom_y: top_y + NODE_HEIGHT,
            }
        })
        .collect();

    let layout_right_edge = positions.total_width() as i64;
    let routed: Vec<RoutedEdge> = match config.routing {
        Routing::Direct => route_orthogonal(graph, &cycles, &expanded, &route_nodes, layout_right_edge),
        Routing::Spline => route_spline(graph, &cycles, &expanded, &route_nodes, layout_right_edge),
    };

    let reversed_count = cycles.reversed_edges().count() as i64;
    let width = if reversed_count > 0 {
        layout_right_edge + 1 + reversed_count * SIDE_CHANNEL_WIDTH
    } else {
        layout_right_edge
    };
    let height = layers.level_count() as i64 * level_spacing;

    let mut buffer = build_node_buffer(
        width,
        height,
        (0..expanded.node_count()).filter_map(|ix| {
            let index = NodeIndex::new(ix);
            if expanded.is_dummy(index) {
                None
            } else {
                Some((positions.x(index) as i64, route_nodes[ix].top_y, widths[ix] as i64))
            }
        }),
    )?;

    let mut label_points: Vec<Option<(i64, i64)>> = vec![None; graph.edge_count()];
    let mut legend = Vec::new();
    for routed_edge in &routed {
        let edge = graph.edge(routed_edge.edge_index).expect("edge index in range");
        let Some(text) = edge.label() else { continue };
        let from = edge.from();
        let to = edge.to();
        let placement = if from == to {
            let node_ix = from.index();
            let after_x = positions.x(from) as i64 + widths[node_ix] as i64;
            label::place_after_loop_glyph(
                &mut buffer,
                width as usize,
                height as usize,
                text,
                after_x,
                route_nodes[node_ix].top_y,
            )
        } else {
            let mid_x = (routed_edge.from_x + routed_edge.to_x) / 2;
            label::place_on_span(
                &mut buffer,
                width as usize,
                height as usize,
                text,
                mid_x,
                routed_edge.from_y,
                routed_edge.to_y,
            )
        };
        match placement {
            Placement::Cell { x, y } => label_points[routed_edge.edge_index.index()] = Some((x, y)),
            Placement::Legend => legend.push(LegendEntry {
                from_id: graph.node(from).map(|n| n.id()).unwrap_or(0),
                to_id: graph.node(to).map(|n| n.id()).unwrap_or(0),
                text: text.to_owned(),
            }),
        }
    }

    let mut position_in_level = vec![0usize; expanded.node_count()];
    for level_list in expanded.level_lists() {
        for (pos, &node_ix) in level_list.iter().enumerate() {
            position_in_level[node_ix.index()] = pos;
        }
    }

    let mut ir = LayoutIR::<i64>::new();
    for ix in 0..expanded.node_count() {
        let index = NodeIndex::new(ix);
        let node_info = expanded.node(index).expect("node index in range");
        let id = graph.node(index).map(|n| n.id()).unwrap_or(ix as u64);
        let label = graph.node(index).map(|n| n.label().to_owned()).unwrap_or_default();
        ir.add_node(LayoutNode {
            id,
            label,
            x: positions.x(index) as i64,
            y: route_nodes[ix].top_y,
            width: widths[ix] as i64,
            center_x: positions.center_x(index) as i64,
            level: node_info.level(),
            level_position: position_in_level[ix],
            kind: node_info.kind(),
            edge_index: node_info.edge_index().map(|e| e.index()),
        });
    }
    for (level, level_list) in expanded.level_lists().iter().enumerate() {
        for &node_ix in level_list {
            ir.add_node_to_level(level, node_ix.index());
        }
    }

    for routed_edge in routed {
        let edge = graph.edge(routed_edge.edge_index).expect("edge index in range");
        let from_id = graph.node(edge.from()).map(|n| n.id()).unwrap_or(0);
        let to_id = graph.node(edge.to()).map(|n| n.id()).unwrap_or(0);
        let (label_x, label_y) = match label_points[routed_edge.edge_index.index()] {
            Some((x, y)) => (Some(x), Some(y)),
            None => (None, None),
        };
        ir.add_edge(LayoutEdge {
            from_id,
            to_id,
            from_x: routed_edge.from_x,
            from_y: routed_edge.from_y,
            to_x: routed_edge.to_x,
            to_y: routed_edge.to_y,
            path: routed_edge.path,
            edge_index: routed_edge.edge_index.index(),
            directed: edge.directed(),
            reversed: cycles.is_reversed(routed_edge.edge_index),
            label: edge.label().map(str::to_owned),
            label_x,
            label_y,
        });
    }

    ir.set_dimensions(width, height);
    ir.set_legend(legend);
    Ok(ir)
}

fn run_force_directed(graph: &GraphView<'_>, config: &Config) -> Result<LayoutIR<i64>, Error> {
    let params = ForceDirectedParams {
        seed: config.force_directed.seed,
        iterations: config.force_directed.iterations,
        repulsion: config.force_directed.repulsion_for(config.algorithm),
    };
    let solved = force_directed::layout(graph, &params);

    let n = graph.node_count();
    let widths: Vec<i64> = graph
        .nodes()
        .map(|node| node.label().chars().count() as i64 + 2)
        .collect();

    let raw: Vec<(i64, i64)> = (0..n).map(|ix| solved.position(NodeIndex::new(ix))).collect();
    const MARGIN: i64 = 2;
    let min_x = raw.iter().map(|&(x, _)| x).min().unwrap_or(0);
    let min_y = raw.iter().map(|&(_, y)| y).min().unwrap_or(0);
    let shift_x = MARGIN - min_x;
    let shift_y = MARGIN - min_y;
    let centers: Vec<(i64, i64)> = raw.iter().map(|&(x, y)| (x + shift_x, y + shift_y)).collect();

    let width = centers
        .iter()
        .zip(widths.iter())
        .map(|(&(x, _), &w)| x + w / 2 + MARGIN)
        .max()
        .unwrap_or(0);
    let height = centers.iter().map(|&(_, y)| y + MARGIN).max().unwrap_or(0);

    let mut buffer = build_node_buffer(
        width,
        height,
        (0..n).map(|ix| (centers[ix].0 - widths[ix] / 2, centers[ix].1, widths[ix])),
    )?;

    let mut label_points: Vec<Option<(i64, i64)>> = vec![None; graph.edge_count()];
    let mut legend = Vec::new();
    for edge in graph.edges() {
        let Some(text) = edge.label() else { continue };
        let from = edge.from();
        let to = edge.to();
        let (from_x, from_y) = centers[from.index()];
        let (to_x, to_y) = centers[to.index()];
        let placement = if from == to {
            let after_x = from_x + widths[from.index()] / 2;
            label::place_after_loop_glyph(&mut buffer, width as usize, height as usize, text, after_x, from_y)
        } else {
            let mid_x = (from_x + to_x) / 2;
            label::place_on_span(
                &mut buffer,
                width as usize,
                height as usize,
                text,
                mid_x,
                from_y.min(to_y),
                from_y.max(to_y),
            )
        };
        match placement {
            Placement::Cell { x, y } => label_points[edge.index().index()] = Some((x, y)),
            Placement::Legend => legend.push(LegendEntry {
                from_id: graph.node(from).map(|n| n.id()).unwrap_or(0),
                to_id: graph.node(to).map(|n| n.id()).unwrap_or(0),
                text: text.to_owned(),
            }),
        }
    }

    let mut ir = LayoutIR::<i64>::new();
    for ix in 0..n {
        let index = NodeIndex::new(ix);
        let node = graph.node(index).expect("node index in range");
        let (center_x, center_y) = centers[ix];
        ir.add_node(LayoutNode {
            id: node.id(),
            label: node.label().to_owned(),
            x: center_x - widths[ix] / 2,
            y: center_y,
            width: widths[ix],
            center_x,
            level: 0,
            level_position: ix,
            kind: node.kind(),
            edge_index: None,
        });
        ir.add_node_to_level(0, ix);
    }

    for edge in graph.edges() {
        let (from_x, from_y) = centers[edge.from().index()];
        let (to_x, to_y) = centers[edge.to().index()];
        let (label_x, label_y) = match label_points[edge.index().index()] {
            Some((x, y)) => (Some(x), Some(y)),
            None => (None, None),
        };
        ir.add_edge(LayoutEdge {
            from_id: graph.node(edge.from()).map(|n| n.id()).unwrap_or(0),
            to_id: graph.node(edge.to()).map(|n| n.id()).unwrap_or(0),
            from_x,
            from_y,
            to_x,
            to_y,
            path: EdgePath::Direct,
            edge_index: edge.index().index(),
            directed: edge.directed(),
            reversed: false,
            label: edge.label().map(str::to_owned),
            label_x,
            label_y,
        });
    }

    ir.set_dimensions(width, height);
    ir.set_legend(legend);
    Ok(ir)
}

/// Builds a scratch occupancy grid for label placement: `'#'` over every real node's box, ` `
/// elsewhere. Bounded the same way the Unicode renderer bounds its own grid, since both allocate
/// `width * height` cells.
fn build_node_buffer(width: i64, height: i64, boxes: impl Iterator<Item = (i64, i64, i64)>) -> Result<Vec<char>, Error> {
    if width < 0 || height < 0 {
        return Err(errors::record(Error::LayoutAlgoInvalid {
            detail: "negative layout dimension".to_owned(),
        }));
    }
    let (w, h) = (width as usize, height as usize);
    let cells = w.saturating_mul(h);
    if cells > MAX_GRID_CELLS {
        return Err(errors::record(Error::LayoutAlgoExhausted {
            detail: format!("label buffer would require {cells} cells"),
        }));
    }
    let mut buffer = vec![' '; cells];
    for (x, y, box_width) in boxes {
        if x < 0 || y < 0 || box_width <= 0 || y as usize >= h {
            continue;
        }
        let (x, y, box_width) = (x as usize, y as usize, box_width as usize);
        for dx in 0..box_width {
            if x + dx < w {
                buffer[y * w + x + dx] = '#';
            }
        }
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    #[test]
    fn linear_chain_has_three_contiguous_levels() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("A").unwrap();
        let b = builder.add_node("B").unwrap();
        let c = builder.add_node("C").unwrap();
        builder.add_edge(a, b, true, None::<String>).unwrap();
        builder.add_edge(b, c, true, None::<String>).unwrap();
        let graph = builder.build().unwrap();

        let ir = run(&graph, &Config::default()).unwrap();
        assert_eq!(ir.get_level_count(), 3);
        for node in ir.get_nodes() {
            assert_eq!(node.y, node.level as i64 * 3);
        }
    }

    #[test]
    fn triangle_cycle_marks_one_edge_reversed() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("A").unwrap();
        let b = builder.add_node("B").unwrap();
        let c = builder.add_node("C").unwrap();
        builder.add_edge(a, b, true, None::<String>).unwrap();
        builder.add_edge(b, c, true, None::<String>).unwrap();
        builder.add_edge(c, a, true, None::<String>).unwrap();
        let graph = builder.build().unwrap();

        let ir = run(&graph, &Config::default()).unwrap();
        assert_eq!(ir.get_edges().iter().filter(|e| e.reversed).count(), 1);
    }

    #[test]
    fn self_loop_alongside_outgoing_edge_does_not_panic() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("A").unwrap();
        let b = builder.add_node("B").unwrap();
        builder.add_edge(a, a, true, Some("loop")).unwrap();
        builder.add_edge(a, b, true, None::<String>).unwrap();
        let graph = builder.build().unwrap();

        let ir = run(&graph, &Config::default()).unwrap();
        assert_eq!(ir.get_edges().len(), 2);
        assert!(ir.get_edges().iter().any(|e| e.reversed));
    }

    #[test]
    fn cycle_breaking_none_rejects_a_cyclic_graph() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("A").unwrap();
        let b = builder.add_node("B").unwrap();
        builder.add_edge(a, b, true, None::<String>).unwrap();
        builder.add_edge(b, a, true, None::<String>).unwrap();
        let graph = builder.build().unwrap();

        let config = Config {
            cycle_breaking: CycleBreaking::None,
            ..Config::default()
        };
        let err = run(&graph, &config).unwrap_err();
        assert!(matches!(err, Error::GraphDagInvalid { .. }));
    }

    #[test]
    fn force_directed_is_deterministic_for_fixed_seed() {
        let mut builder = GraphBuilder::new();
        let nodes: Vec<_> = (0..6).map(|i| builder.add_node(format!("n{i}")).unwrap()).collect();
        for i in 0..6 {
            builder
                .add_edge(nodes[i], nodes[(i + 1) % 6], false, None::<String>)
                .unwrap();
        }
        let graph = builder.build().unwrap();

        let config = Config {
            algorithm: LayoutAlgorithm::FruchtermanReingold,
            force_directed: crate::config::ForceDirectedConfig {
                seed: 42,
                iterations: 100,
            },
            ..Config::default()
        };
        let first = run(&graph, &config).unwrap();
        let second = run(&graph, &config).unwrap();
        for (a, b) in first.get_nodes().iter().zip(second.get_nodes().iter()) {
            assert_eq!(a.x, b.x);
            assert_eq!(a.y, b.y);
        }
        assert_eq!(first.get_level_count(), 1);
    }
}
