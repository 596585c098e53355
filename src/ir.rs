// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The pipeline's product: a renderer-agnostic description of node boxes, edge paths, and grid
//! dimensions. Parameterised over the coordinate numeric type so the same shape serves both
//! integer-cell renderers (Unicode, JSON) and float-pixel renderers (SVG).

use crate::graph::NodeKind;
use crate::label::LegendEntry;
use crate::route::EdgePath;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A coordinate numeric type the IR can be parameterised over.
///
/// Implemented for `i64` (the pipeline's native integer-cell output) and `f64` (the SVG
/// renderer's pixel space, reached via [`LayoutIR::convert`]).
pub trait Coordinate: Copy + PartialOrd + Serialize {
    /// Converts from an `i64` cell coordinate, the pipeline's native output.
    fn from_cell(v: i64) -> Self;
    /// Converts to `f64`, used by [`LayoutIR::convert`] as the common intermediate.
    fn to_f64(self) -> f64;
    /// Converts from `f64`, rounding half away from zero when the target type is integral.
    fn from_f64(v: f64) -> Self;
}

impl Coordinate for i64 {
    fn from_cell(v: i64) -> Self {
        v
    }
    fn to_f64(self) -> f64 {
        self as f64
    }
    fn from_f64(v: f64) -> Self {
        if v >= 0.0 {
            (v + 0.5).floor() as i64
        } else {
            -((-v + 0.5).floor() as i64)
        }
    }
}

impl Coordinate for f64 {
    fn from_cell(v: i64) -> Self {
        v as f64
    }
    fn to_f64(self) -> f64 {
        self
    }
    fn from_f64(v: f64) -> Self {
        v
    }
}

/// One node in the finished layout.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LayoutNode<T> {
    /// The caller's id for this node (dummies get an id past the caller's id space).
    pub id: u64,
    /// The node's label, empty for dummies.
    pub label: String,
    /// Left edge.
    pub x: T,
    /// Top edge.
    pub y: T,
    /// Box width, in the IR's coordinate unit.
    pub width: T,
    /// Horizontal centre, used for routing.
    pub center_x: T,
    /// The node's level.
    pub level: usize,
    /// Position within its level's ordered list, post-crossing-reduction.
    pub level_position: usize,
    /// What kind of node this is.
    pub kind: NodeKind,
    /// For a dummy node, the original edge it stands in for.
    pub edge_index: Option<usize>,
}

/// One edge in the finished layout.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LayoutEdge<T> {
    /// Semantic source id (unaffected by cycle-breaker reversal).
    pub from_id: u64,
    /// Semantic target id (unaffected by cycle-breaker reversal).
    pub to_id: u64,
    /// Where the path starts.
    pub from_x: T,
    /// Where the path starts.
    pub from_y: T,
    /// Where the path ends.
    pub to_x: T,
    /// Where the path ends.
    pub to_y: T,
    /// How the edge is drawn.
    pub path: EdgePath,
    /// The original edge index.
    pub edge_index: usize,
    /// Whether this edge has a direction arrow.
    pub directed: bool,
    /// Whether the cycle breaker flipped this edge's effective direction.
    pub reversed: bool,
    /// The edge's label text, if any.
    pub label: Option<String>,
    /// Where the label was placed, if it was placed on the grid (as opposed to the legend).
    pub label_x: Option<T>,
    /// Where the label was placed, if it was placed on the grid.
    pub label_y: Option<T>,
}

/// The pipeline's output, parameterised by coordinate type `T`.
///
/// Owns every interior allocation, including each `multi_segment` edge's waypoint vector;
/// dropping a `LayoutIR` releases all of it, no special destructor required beyond what `Vec`
/// and `String` already do.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LayoutIR<T> {
    nodes: Vec<LayoutNode<T>>,
    edges: Vec<LayoutEdge<T>>,
    width: T,
    height: T,
    level_count: usize,
    level_lists: Vec<Vec<usize>>,
    #[serde(skip)]
    id_index: IndexMap<u64, usize>,
    legend: Vec<LegendEntry>,
}

impl<T> Default for LayoutIR<T>
where
    T: Coordinate,
{
    fn default() -> Self {
        LayoutIR {
            nodes: Vec::new(),
            edges: Vec::new(),
            width: T::from_cell(0),
            height: T::from_cell(0),
            level_count: 0,
            level_lists: Vec::new(),
            id_index: IndexMap::new(),
            legend: Vec::new(),
        }
    }
}

impl<T> LayoutIR<T>
where
    T: Coordinate,
{
    /// Creates an empty IR.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node, indexing it by id for later `node_by_id` lookups.
    pub fn add_node(&mut self, node: LayoutNode<T>) {
        self.id_index.insert(node.id, self.nodes.len());
        self.nodes.push(node);
    }

    /// Appends an edge.
    pub fn add_edge(&mut self, edge: LayoutEdge<T>) {
        self.edges.push(edge);
    }

    /// Grows `level_lists` so index `level` is valid, padding with empty levels.
    pub fn ensure_levels(&mut self, level_count: usize) {
        if self.level_lists.len() < level_count {
            self.level_lists.resize(level_count, Vec::new());
        }
        if level_count > self.level_count {
            self.level_count = level_count;
        }
    }

    /// Records that `node_index` (an index into `nodes()`) sits at `level`, in level-list order.
    pub fn add_node_to_level(&mut self, level: usize, node_index: usize) {
        self.ensure_levels(level + 1);
        self.level_lists[level].push(node_index);
    }

    /// Sets the grid's total width and height.
    pub fn set_dimensions(&mut self, width: T, height: T) {
        self.width = width;
        self.height = height;
    }

    /// Attaches the overflow legend (edge labels that found no free row).
    pub fn set_legend(&mut self, legend: Vec<LegendEntry>) {
        self.legend = legend;
    }

    /// Total grid width.
    pub fn get_width(&self) -> T {
        self.width
    }

    /// Total grid height.
    pub fn get_height(&self) -> T {
        self.height
    }

    /// Number of levels (0 if the IR is empty).
    pub fn get_level_count(&self) -> usize {
        self.level_count
    }

    /// Every node, in insertion order.
    pub fn get_nodes(&self) -> &[LayoutNode<T>] {
        &self.nodes
    }

    /// Every edge, in original edge-index order.
    pub fn get_edges(&self) -> &[LayoutEdge<T>] {
        &self.edges
    }

    /// Labels that the placer could not fit on the grid.
    pub fn legend(&self) -> &[LegendEntry] {
        &self.legend
    }

    /// Looks up a node by its caller-facing id.
    pub fn node_by_id(&self, id: u64) -> Option<&LayoutNode<T>> {
        self.id_index.get(&id).map(|&ix| &self.nodes[ix])
    }

    /// The nodes at `level`, in level-list (post-crossing-reduction) order.
    pub fn nodes_at_level(&self, level: usize) -> Vec<&LayoutNode<T>> {
        self.level_lists
            .get(level)
            .map(|indices| indices.iter().map(|&ix| &self.nodes[ix]).collect())
            .unwrap_or_default()
    }

    /// Rewrites this IR into a different coordinate type, deep-copying every waypoint list.
    /// Floats rounded to integers half away from zero; integers widened to floats exactly.
    pub fn convert<U>(&self) -> LayoutIR<U>
    where
        U: Coordinate,
    {
        LayoutIR {
            nodes: self
                .nodes
                .iter()
                .map(|n| LayoutNode {
                    id: n.id,
                    label: n.label.clone(),
                    x: U::from_f64(n.x.to_f64()),
                    y: U::from_f64(n.y.to_f64()),
                    width: U::from_f64(n.width.to_f64()),
                    center_x: U::from_f64(n.center_x.to_f64()),
                    level: n.level,
                    level_position: n.level_position,
                    kind: n.kind,
                    edge_index: n.edge_index,
                })
                .collect(),
            edges: self
                .edges
                .iter()
                .map(|e| LayoutEdge {
                    from_id: e.from_id,
                    to_id: e.to_id,
                    from_x: U::from_f64(e.from_x.to_f64()),
                    from_y: U::from_f64(e.from_y.to_f64()),
                    to_x: U::from_f64(e.to_x.to_f64()),
                    to_y: U::from_f64(e.to_y.to_f64()),
                    path: e.path.clone(),
                    edge_index: e.edge_index,
                    directed: e.directed,
                    reversed: e.reversed,
                    label: e.label.clone(),
                    label_x: e.label_x.map(|v| U::from_f64(v.to_f64())),
                    label_y: e.label_y.map(|v| U::from_f64(v.to_f64())),
                })
                .collect(),
            width: U::from_f64(self.width.to_f64()),
            height: U::from_f64(self.height.to_f64()),
            level_count: self.level_count,
            level_lists: self.level_lists.clone(),
            id_index: self.id_index.clone(),
            legend: self.legend.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_node(id: u64, level: usize) -> LayoutNode<i64> {
        LayoutNode {
            id,
            label: format!("n{id}"),
            x: 0,
            y: (level as i64) * 3,
            width: 3,
            center_x: 1,
            level,
            level_position: 0,
            kind: NodeKind::Explicit,
            edge_index: None,
        }
    }

    #[test]
    fn node_by_id_finds_inserted_node() {
        let mut ir = LayoutIR::<i64>::new();
        ir.add_node(sample_node(7, 0));
        assert_eq!(ir.node_by_id(7).unwrap().id, 7);
        assert!(ir.node_by_id(8).is_none());
    }

    #[test]
    fn nodes_at_level_respects_level_list_order() {
        let mut ir = LayoutIR::<i64>::new();
        ir.add_node(sample_node(0, 0));
        ir.add_node(sample_node(1, 1));
        ir.add_node(sample_node(2, 1));
        ir.add_node_to_level(0, 0);
        ir.add_node_to_level(1, 2);
        ir.add_node_to_level(1, 1);

        let level1 = ir.nodes_at_level(1);
        assert_eq!(level1.iter().map(|n| n.id).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn convert_rounds_half_away_from_zero() {
        let mut ir = LayoutIR::<f64>::new();
        let mut node = sample_node(0, 0);
        let node_f64 = LayoutNode {
            id: node.id,
            label: std::mem::take(&mut node.label),
            x: 2.5,
            y: -2.5,
            width: 3.0,
            center_x: 1.0,
            level: 0,
            level_position: 0,
            kind: NodeKind::Explicit,
            edge_index: None,
        };
        ir.add_node(node_f64);
        let converted: LayoutIR<i64> = ir.convert();
        assert_eq!(converted.get_nodes()[0].x, 3);
        assert_eq!(converted.get_nodes()[0].y, -3);
    }

    #[test]
    fn get_level_count_reflects_ensure_levels() {
        let mut ir = LayoutIR::<i64>::new();
        ir.ensure_levels(3);
        assert_eq!(ir.get_level_count(), 3);
    }
}
