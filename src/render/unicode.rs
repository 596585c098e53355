// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Draws a [`crate::ir::LayoutIR`] onto a 2-D cell buffer of box-drawing glyphs, the way the
//! grounding crate's dot writer renders a graph by implementing `fmt::Display` over a visitor.

use crate::errors::{self, Error};
use crate::graph::{NodeKind, MAX_GRID_CELLS};
use crate::ir::LayoutIR;
use crate::label;
use crate::route::EdgePath;
use std::fmt;

/// Renders a [`LayoutIR<i64>`] as a grid of Unicode box-drawing characters.
///
/// Construct with [`UnicodeRenderer::new`], then either call [`UnicodeRenderer::render`]
/// directly for the structured error on overflow, or use the `Display` impl (which swallows the
/// error into an empty string, recording it in [`crate::errors::last_diagnostic`] instead).
pub struct UnicodeRenderer<'a> {
    ir: &'a LayoutIR<i64>,
    show_dummy_nodes: bool,
}

impl<'a> UnicodeRenderer<'a> {
    /// Creates a renderer with dummy nodes hidden (drawn as a bare vertical line), the default.
    pub fn new(ir: &'a LayoutIR<i64>) -> Self {
        UnicodeRenderer {
            ir,
            show_dummy_nodes: false,
        }
    }

    /// Draws dummy nodes as a small marker instead of a bare line through their cell.
    pub fn with_dummy_nodes_shown(mut self, show: bool) -> Self {
        self.show_dummy_nodes = show;
        self
    }

    /// Renders the grid to a `String`, failing if the buffer would exceed
    /// [`crate::graph::MAX_GRID_CELLS`].
    pub fn render(&self) -> Result<String, Error> {
        let width = self.ir.get_width().max(0) as usize;
        let height = self.ir.get_height().max(0) as usize;
        let cells = width.saturating_mul(height);
        if cells > MAX_GRID_CELLS {
            return Err(errors::record(Error::LayoutAlgoExhausted {
                detail: format!("unicode render buffer would require {cells} cells"),
            }));
        }

        let mut buffer = vec![' '; cells];
        for node in self.ir.get_nodes() {
            draw_node(&mut buffer, width, height, node, self.show_dummy_nodes);
        }
        for edge in self.ir.get_edges() {
            draw_edge(&mut buffer, width, height, edge);
        }
        for edge in self.ir.get_edges() {
            if let (Some(text), Some(x), Some(y)) = (edge.label.as_deref(), edge.label_x, edge.label_y) {
                if label::can_place_label(&buffer, width, height, text, x, y) {
                    label::write_label(&mut buffer, width, text, x, y);
                }
            }
        }

        let mut out = String::with_capacity(cells + height);
        for row in 0..height {
            let start = row * width;
            out.extend(&buffer[start..start + width]);
            out.push('\n');
        }
        if !self.ir.legend().is_empty() {
            out.push_str("---\n");
            for entry in self.ir.legend() {
                out.push_str(&format!("{} -> {}: \"{}\"\n", entry.from_id, entry.to_id, entry.text));
            }
        }
        Ok(out)
    }
}

impl fmt::Display for UnicodeRenderer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Ok(s) => f.write_str(&s),
            Err(_) => Err(fmt::Error),
        }
    }
}

fn draw_node(
    buffer: &mut [char],
    width: usize,
    height: usize,
    node: &crate::ir::LayoutNode<i64>,
    show_dummy_nodes: bool,
) {
    if node.y < 0 || node.y as usize >= height {
        return;
    }
    let row = node.y as usize;
    if node.kind == NodeKind::Dummy {
        if show_dummy_nodes {
            set_cell(buffer, width, node.center_x, row as i64, '◦');
        } else {
            set_cell(buffer, width, node.center_x, row as i64, '│');
        }
        return;
    }
    let x = node.x.max(0) as usize;
    let box_width = node.width.max(1) as usize;
    if x >= width {
        return;
    }
    set_cell(buffer, width, x as i64, row as i64, '│');
    for (offset, ch) in node.label.chars().enumerate() {
        set_cell(buffer, width, (x + 1 + offset) as i64, row as i64, ch);
    }
    if box_width >= 2 {
        set_cell(buffer, width, (x + box_width - 1) as i64, row as i64, '│');
    }
}

fn draw_edge(buffer: &mut [char], width: usize, _height: usize, edge: &crate::ir::LayoutEdge<i64>) {
    match &edge.path {
        EdgePath::Direct => {
            draw_vertical(buffer, width, edge.from_x, edge.from_y, edge.to_y, '│');
        }
        EdgePath::Corner { horizontal_y } => {
            draw_vertical(buffer, width, edge.from_x, edge.from_y, *horizontal_y, '│');
            draw_horizontal(buffer, width, *horizontal_y, edge.from_x, edge.to_x, '─');
            draw_vertical(buffer, width, edge.to_x, *horizontal_y, edge.to_y, '│');
        }
        EdgePath::SideChannel {
            channel_x,
            start_y,
            end_y,
        } => {
            draw_horizontal(buffer, width, *start_y, edge.from_x, *channel_x, '─');
            draw_vertical(buffer, width, *channel_x, *start_y, *end_y, '│');
            draw_horizontal(buffer, width, *end_y, *channel_x, edge.to_x, '─');
        }
        EdgePath::MultiSegment { waypoints } => {
            for pair in waypoints.windows(2) {
                let (x1, y1) = pair[0];
                let (x2, y2) = pair[1];
                if x1 == x2 {
                    draw_vertical(buffer, width, x1, y1, y2, '│');
                } else {
                    draw_horizontal(buffer, width, y1, x1, x2, '─');
                }
            }
        }
        EdgePath::Spline {
            cp1_x,
            cp1_y,
            cp2_x,
            cp2_y,
        } => {
            draw_spline(
                buffer,
                width,
                (edge.from_x, edge.from_y),
                (*cp1_x, *cp1_y),
                (*cp2_x, *cp2_y),
                (edge.to_x, edge.to_y),
            );
        }
    }
}

const SPLINE_SAMPLES: usize = 24;

fn draw_spline(buffer: &mut [char], width: usize, from: (i64, i64), cp1: (i64, i64), cp2: (i64, i64), to: (i64, i64)) {
    let mut prev = from;
    for step in 1..=SPLINE_SAMPLES {
        let t = step as f64 / SPLINE_SAMPLES as f64;
        let point = cubic_bezier(from, cp1, cp2, to, t);
        let (dx, dy) = (point.0 - prev.0, point.1 - prev.1);
        let glyph = if dx == 0 && dy != 0 {
            '│'
        } else if dy == 0 && dx != 0 {
            '─'
        } else {
            '┊'
        };
        set_cell(buffer, width, point.0, point.1, glyph);
        prev = point;
    }
}

fn cubic_bezier(p0: (i64, i64), p1: (i64, i64), p2: (i64, i64), p3: (i64, i64), t: f64) -> (i64, i64) {
    let mt = 1.0 - t;
    let w0 = mt * mt * mt;
    let w1 = 3.0 * mt * mt * t;
    let w2 = 3.0 * mt * t * t;
    let w3 = t * t * t;
    let x = w0 * p0.0 as f64 + w1 * p1.0 as f64 + w2 * p2.0 as f64 + w3 * p3.0 as f64;
    let y = w0 * p0.1 as f64 + w1 * p1.1 as f64 + w2 * p2.1 as f64 + w3 * p3.1 as f64;
    (x.round() as i64, y.round() as i64)
}

fn set_cell(buffer: &mut [char], width: usize, x: i64, y: i64, ch: char) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= width {
        return;
    }
    let ix = y * width + x;
    if ix < buffer.len() {
        buffer[ix] = ch;
    }
}

fn draw_vertical(buffer: &mut [char], width: usize, x: i64, y1: i64, y2: i64, ch: char) {
    let (lo, hi) = (y1.min(y2), y1.max(y2));
    for y in lo..=hi {
        set_cell(buffer, width, x, y, ch);
    }
}

fn draw_horizontal(buffer: &mut [char], width: usize, y: i64, x1: i64, x2: i64, ch: char) {
    let (lo, hi) = (x1.min(x2), x1.max(x2));
    for x in lo..=hi {
        set_cell(buffer, width, x, y, ch);
    }
}
