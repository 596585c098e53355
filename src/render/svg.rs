// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Converts a [`LayoutIR`] to an SVG document: one `<rect>`/`<text>` per node, one `<path>` per
//! edge, abstract cells scaled to pixels by fixed per-cell constants.

use crate::ir::LayoutIR;
use crate::route::EdgePath;
use std::fmt::Write as _;

/// Pixel width of one abstract grid column.
pub const CELL_WIDTH_PX: f64 = 10.0;
/// Pixel height of one abstract grid row.
pub const CELL_HEIGHT_PX: f64 = 20.0;

/// Renders `ir` as a standalone SVG document.
///
/// `ir` is first converted to float-pixel coordinates via [`LayoutIR::convert`], then each cell
/// coordinate is scaled by [`CELL_WIDTH_PX`]/[`CELL_HEIGHT_PX`] to get a pixel coordinate.
pub fn to_svg(ir: &LayoutIR<i64>) -> String {
    let pixels: LayoutIR<f64> = ir.convert();
    let width_px = pixels.get_width() * CELL_WIDTH_PX;
    let height_px = pixels.get_height() * CELL_HEIGHT_PX;

    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width_px}" height="{height_px}" viewBox="0 0 {width_px} {height_px}">"#
    );

    for node in pixels.get_nodes() {
        let x = node.x * CELL_WIDTH_PX;
        let y = node.y * CELL_HEIGHT_PX;
        let w = node.width * CELL_WIDTH_PX;
        let h = CELL_HEIGHT_PX;
        let _ = writeln!(
            out,
            r#"  <rect x="{x}" y="{y}" width="{w}" height="{h}" fill="none" stroke="black" />"#
        );
        if !node.label.is_empty() {
            let text_x = node.center_x * CELL_WIDTH_PX;
            let text_y = y + h * 0.7;
            let _ = writeln!(
                out,
                r#"  <text x="{text_x}" y="{text_y}" text-anchor="middle">{}</text>"#,
                escape_xml(&node.label)
            );
        }
    }

    for edge in pixels.get_edges() {
        let d = path_data(&edge.path, edge.from_x, edge.from_y, edge.to_x, edge.to_y);
        let _ = writeln!(out, r#"  <path d="{d}" fill="none" stroke="black" />"#);
        if let (Some(text), Some(x), Some(y)) = (edge.label.as_deref(), edge.label_x, edge.label_y) {
            let _ = writeln!(
                out,
                r#"  <text x="{x}" y="{y}" font-size="0.8em">{}</text>"#,
                escape_xml(text)
            );
        }
    }

    out.push_str("</svg>\n");
    out
}

fn path_data(path: &EdgePath, from_x: f64, from_y: f64, to_x: f64, to_y: f64) -> String {
    match path {
        EdgePath::Direct | EdgePath::Corner { .. } | EdgePath::SideChannel { .. } => {
            format!("M {from_x} {from_y} L {to_x} {to_y}")
        }
        EdgePath::MultiSegment { waypoints } => {
            let mut d = format!("M {from_x} {from_y}");
            for &(x, y) in waypoints.iter().skip(1) {
                let _ = write!(d, " L {} {}", x as f64 * CELL_WIDTH_PX, y as f64 * CELL_HEIGHT_PX);
            }
            d
        }
        EdgePath::Spline {
            cp1_x,
            cp1_y,
            cp2_x,
            cp2_y,
        } => {
            let (cp1_x, cp1_y) = (*cp1_x as f64 * CELL_WIDTH_PX, *cp1_y as f64 * CELL_HEIGHT_PX);
            let (cp2_x, cp2_y) = (*cp2_x as f64 * CELL_WIDTH_PX, *cp2_y as f64 * CELL_HEIGHT_PX);
            format!("M {from_x} {from_y} C {cp1_x} {cp1_y}, {cp2_x} {cp2_y}, {to_x} {to_y}")
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.chars().fold(String::with_capacity(s.len()), |mut acc, c| {
        match c {
            '&' => acc.push_str("&amp;"),
            '<' => acc.push_str("&lt;"),
            '>' => acc.push_str("&gt;"),
            '"' => acc.push_str("&quot;"),
            _ => acc.push(c),
        }
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::graph::GraphBuilder;
    use crate::pipeline;

    #[test]
    fn emits_well_formed_svg_root() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("A").unwrap();
        let b = builder.add_node("B").unwrap();
        builder.add_edge(a, b, true, None::<String>).unwrap();
        let graph = builder.build().unwrap();

        let ir = pipeline::run(&graph, &Config::default()).unwrap();
        let svg = to_svg(&ir);
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("<rect"));
    }

    #[test]
    fn escapes_label_text() {
        assert_eq!(escape_xml("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}
