// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialises and deserialises a [`LayoutIR`] to the external, bit-stable JSON schema.
//!
//! The wire schema's field names (`from`/`to`, not `from_id`/`to_id`) and shape (no
//! `level_lists`, no `legend`, no id index) differ from [`LayoutIR`]'s own `Serialize` impl, so
//! this module defines its own wire structs rather than deriving directly off the IR types.

use crate::errors::{self, Error};
use crate::graph::NodeKind;
use crate::ir::{LayoutEdge, LayoutIR, LayoutNode};
use crate::route::EdgePath;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const CURRENT_VERSION: &str = "1.1";

/// Serialises `ir` to the documented JSON IR schema.
pub fn to_json(ir: &LayoutIR<i64>) -> Result<String, Error> {
    let wire = WireIr {
        version: CURRENT_VERSION,
        width: ir.get_width(),
        height: ir.get_height(),
        level_count: ir.get_level_count(),
        nodes: ir.get_nodes().iter().map(WireNode::from_node).collect(),
        edges: ir.get_edges().iter().map(WireEdge::from_edge).collect(),
    };
    serde_json::to_string(&wire).map_err(|e| {
        errors::record(Error::Json {
            area: "root",
            kind: "invalid",
            detail: e.to_string(),
        })
    })
}

/// Deserialises a [`LayoutIR`] from the documented JSON IR schema.
///
/// Accepts both `"1.0"` and `"1.1"` document versions. Missing 1.1-only fields default to
/// `directed = true`, `kind = "explicit"`, `edge_index = null`, `reversed = false`, no label, per
/// the documented schema tolerance.
pub fn from_json(document: &str) -> Result<LayoutIR<i64>, Error> {
    let wire: WireIrIn = serde_json::from_str(document).map_err(|e| {
        errors::record(Error::Json {
            area: "root",
            kind: "invalid",
            detail: e.to_string(),
        })
    })?;

    if wire.version != "1.0" && wire.version != "1.1" {
        return Err(errors::record(Error::Json {
            area: "version",
            kind: "mismatch",
            detail: format!("unsupported IR document version {:?}", wire.version),
        }));
    }

    let mut ir = LayoutIR::<i64>::new();
    for node in wire.nodes {
        let kind = match node.kind.as_str() {
            "explicit" => NodeKind::Explicit,
            "implicit" => NodeKind::Implicit,
            "dummy" => NodeKind::Dummy,
            other => {
                return Err(errors::record(Error::Json {
                    area: "node",
                    kind: "invalid",
                    detail: format!("unrecognized node kind {other:?}"),
                }))
            }
        };
        ir.add_node(LayoutNode {
            id: node.id,
            label: node.label,
            x: node.x,
            y: node.y,
            width: node.width,
            center_x: node.center_x,
            level: node.level,
            level_position: node.level_position,
            kind,
            edge_index: node.edge_index,
        });
    }

    // The schema carries each node's level and level_position but not a separate level_lists
    // array; rebuild it by grouping nodes by level and ordering each group by level_position.
    let mut by_level: BTreeMap<usize, Vec<(usize, usize)>> = BTreeMap::new();
    for (node_ix, node) in ir.get_nodes().iter().enumerate() {
        by_level.entry(node.level).or_default().push((node.level_position, node_ix));
    }
    for (level, mut entries) in by_level {
        entries.sort_by_key(|&(level_position, _)| level_position);
        for (_, node_ix) in entries {
            ir.add_node_to_level(level, node_ix);
        }
    }
    ir.ensure_levels(wire.level_count);

    for edge in wire.edges {
        ir.add_edge(LayoutEdge {
            from_id: edge.from,
            to_id: edge.to,
            from_x: edge.from_x,
            from_y: edge.from_y,
            to_x: edge.to_x,
            to_y: edge.to_y,
            path: edge.path,
            edge_index: edge.edge_index,
            directed: edge.directed,
            reversed: edge.reversed,
            label: edge.label,
            label_x: edge.label_x,
            label_y: edge.label_y,
        });
    }

    ir.set_dimensions(wire.width, wire.height);
    Ok(ir)
}

#[derive(Serialize)]
struct WireIr<'a> {
    version: &'static str,
    width: i64,
    height: i64,
    level_count: usize,
    nodes: Vec<WireNode<'a>>,
    edges: Vec<WireEdge<'a>>,
}

#[derive(Serialize)]
struct WireNode<'a> {
    id: u64,
    label: &'a str,
    x: i64,
    y: i64,
    width: i64,
    center_x: i64,
    level: usize,
    level_position: usize,
    kind: &'static str,
    edge_index: Option<usize>,
}

impl<'a> WireNode<'a> {
    fn from_node(node: &'a LayoutNode<i64>) -> Self {
        WireNode {
            id: node.id,
            label: &node.label,
            x: node.x,
            y: node.y,
            width: node.width,
            center_x: node.center_x,
            level: node.level,
            level_position: node.level_position,
            kind: match node.kind {
                NodeKind::Explicit => "explicit",
                NodeKind::Implicit => "implicit",
                NodeKind::Dummy => "dummy",
            },
            edge_index: node.edge_index,
        }
    }
}

#[derive(Serialize)]
struct WireEdge<'a> {
    from: u64,
    to: u64,
    from_x: i64,
    from_y: i64,
    to_x: i64,
    to_y: i64,
    edge_index: usize,
    directed: bool,
    #[serde(skip_serializing_if = "is_false")]
    reversed: bool,
    path: &'a EdgePath,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    label_x: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    label_y: Option<i64>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl<'a> WireEdge<'a> {
    fn from_edge(edge: &'a LayoutEdge<i64>) -> Self {
        WireEdge {
            from: edge.from_id,
            to: edge.to_id,
            from_x: edge.from_x,
            from_y: edge.from_y,
            to_x: edge.to_x,
            to_y: edge.to_y,
            edge_index: edge.edge_index,
            directed: edge.directed,
            reversed: edge.reversed,
            path: &edge.path,
            label: edge.label.as_deref(),
            label_x: edge.label_x,
            label_y: edge.label_y,
        }
    }
}

#[derive(Deserialize)]
struct WireIrIn {
    version: String,
    width: i64,
    height: i64,
    level_count: usize,
    nodes: Vec<WireNodeIn>,
    edges: Vec<WireEdgeIn>,
}

#[derive(Deserialize)]
struct WireNodeIn {
    id: u64,
    label: String,
    x: i64,
    y: i64,
    width: i64,
    center_x: i64,
    level: usize,
    #[serde(default)]
    level_position: usize,
    #[serde(default = "default_kind")]
    kind: String,
    #[serde(default)]
    edge_index: Option<usize>,
}

fn default_kind() -> String {
    "explicit".to_owned()
}

#[derive(Deserialize)]
struct WireEdgeIn {
    from: u64,
    to: u64,
    from_x: i64,
    from_y: i64,
    to_x: i64,
    to_y: i64,
    edge_index: usize,
    #[serde(default = "default_true")]
    directed: bool,
    #[serde(default)]
    reversed: bool,
    path: EdgePath,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    label_x: Option<i64>,
    #[serde(default)]
    label_y: Option<i64>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::graph::GraphBuilder;
    use crate::pipeline;

    #[test]
    fn round_trips_a_diamond_graph() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("A").unwrap();
        let b = builder.add_node("B").unwrap();
        let c = builder.add_node("C").unwrap();
        let d = builder.add_node("D").unwrap();
        builder.add_edge(a, b, true, None::<String>).unwrap();
        builder.add_edge(a, c, true, None::<String>).unwrap();
        builder.add_edge(b, d, true, None::<String>).unwrap();
        builder.add_edge(c, d, true, None::<String>).unwrap();
        let graph = builder.build().unwrap();

        let ir = pipeline::run(&graph, &Config::default()).unwrap();
        let json = to_json(&ir).unwrap();
        let back = from_json(&json).unwrap();

        assert_eq!(back.get_width(), ir.get_width());
        assert_eq!(back.get_height(), ir.get_height());
        assert_eq!(back.get_level_count(), ir.get_level_count());
        assert_eq!(back.get_nodes().len(), ir.get_nodes().len());
        assert_eq!(back.get_edges().len(), ir.get_edges().len());
        for level in 0..ir.get_level_count() {
            let original: Vec<u64> = ir.nodes_at_level(level).iter().map(|n| n.id).collect();
            let round_tripped: Vec<u64> = back.nodes_at_level(level).iter().map(|n| n.id).collect();
            assert_eq!(original, round_tripped);
        }
    }

    #[test]
    fn accepts_1_0_documents_and_fills_in_defaults() {
        let document = r#"{
            "version": "1.0",
            "width": 10, "height": 3, "level_count": 1,
            "nodes": [
                { "id": 1, "label": "A", "x": 0, "y": 0, "width": 3, "center_x": 1, "level": 0 }
            ],
            "edges": []
        }"#;
        let ir = from_json(document).unwrap();
        let node = &ir.get_nodes()[0];
        assert_eq!(node.kind, NodeKind::Explicit);
        assert_eq!(node.level_position, 0);
        assert_eq!(node.edge_index, None);
    }

    #[test]
    fn rejects_unsupported_version() {
        let document = r#"{"version":"2.0","width":0,"height":0,"level_count":0,"nodes":[],"edges":[]}"#;
        let err = from_json(document).unwrap_err();
        assert!(matches!(err, Error::Json { area: "version", .. }));
    }
}
