// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Places edge labels on the rendered grid, falling back to a legend when no row fits.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Glyphs a label is allowed to overwrite: blank cells and the line-drawing characters the
/// Unicode renderer uses for edges passing behind a label's row. Built once and shared across
/// every placement call in the process.
static TRANSPARENT_GLYPHS: Lazy<HashSet<char>> = Lazy::new(|| [' ', '\0', '│', '─'].into_iter().collect());

/// A label the placer could not fit on any row near its edge; carried in the IR's legend so
/// renderers can print it out of band instead of dropping it silently.
#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
    /// The edge's semantic source id.
    pub from_id: u64,
    /// The edge's semantic target id.
    pub to_id: u64,
    /// The label text, unquoted.
    pub text: String,
}

/// Where a label landed: either a grid cell, or a legend entry because no row fit.
#[derive(Clone, Debug, PartialEq)]
pub enum Placement {
    /// The label's top-left cell once wrapped in ASCII quotes.
    Cell {
        /// Column of the label's leftmost quote.
        x: i64,
        /// Row of the label.
        y: i64,
    },
    /// No row in the edge's vertical span was free; this label now lives only in the legend.
    Legend,
}

/// Whether `label` (already quoted, `"text"`, total width `label.len() + 2`) can be written
/// starting at `(x, y)` in `buffer` without overwriting anything but a space or a vertical line
/// glyph.
///
/// `buffer` is a row-major grid of characters, `width` wide; `'\0'` cells are treated as empty
/// space, same as `' '`. This mirrors the renderer-facing contract described for the Unicode
/// renderer: labels must never clobber a node box or another label.
pub fn can_place_label(buffer: &[char], width: usize, height: usize, label: &str, x: i64, y: i64) -> bool {
    if x < 0 || y < 0 {
        return false;
    }
    let (x, y) = (x as usize, y as usize);
    let quoted_len = label.chars().count() + 2;
    if y >= height || x + quoted_len > width {
        return false;
    }
    for (offset, _) in quoted_chars(label).enumerate() {
        let cell = buffer[y * width + x + offset];
        if !TRANSPARENT_GLYPHS.contains(&cell) {
            return false;
        }
    }
    true
}

/// Writes `label` (quoted) into `buffer` at `(x, y)`. Caller must have already confirmed the
/// write is legal via [`can_place_label`].
pub fn write_label(buffer: &mut [char], width: usize, label: &str, x: i64, y: i64) {
    let (x, y) = (x as usize, y as usize);
    for (offset, ch) in quoted_chars(label).enumerate() {
        buffer[y * width + x + offset] = ch;
    }
}

fn quoted_chars(label: &str) -> impl Iterator<Item = char> + '_ {
    std::iter::once('"')
        .chain(label.chars())
        .chain(std::iter::once('"'))
}

/// Attempts to place `label` on an edge whose path runs from `(mid_x, from_y + 1)` to
/// `(mid_x, to_y - 1)` inclusive (its vertical span), centred horizontally on `mid_x`.
///
/// Policy: try the midpoint row first, then slide within the span from the midpoint outward.
/// Returns [`Placement::Legend`] if nothing in the span fits.
pub fn place_on_span(
    buffer: &mut [char],
    width: usize,
    height: usize,
    label: &str,
    mid_x: i64,
    from_y: i64,
    to_y: i64,
) -> Placement {
    let quoted_len = label.chars().count() as i64 + 2;
    let start_x = mid_x - quoted_len / 2;

    let lo = (from_y + 1).min(to_y - 1);
    let hi = (from_y + 1).max(to_y - 1);
    let midpoint = (from_y + to_y) / 2;

    let mut candidates = vec![midpoint];
    let mut below = midpoint + 1;
    let mut above = midpoint - 1;
    while below <= hi || above >= lo {
        if below <= hi {
            candidates.push(below);
            below += 1;
        }
        if above >= lo {
            candidates.push(above);
            above -= 1;
        }
    }

    for y in candidates {
        if can_place_label(buffer, width, height, label, start_x, y) {
            write_label(buffer, width, label, start_x, y);
            return Placement::Cell { x: start_x, y };
        }
    }
    Placement::Legend
}

/// Places a self-loop's label immediately after the loop indicator glyph at `(after_x, y)`.
pub fn place_after_loop_glyph(
    buffer: &mut [char],
    width: usize,
    height: usize,
    label: &str,
    after_x: i64,
    y: i64,
) -> Placement {
    let x = after_x + 1;
    if can_place_label(buffer, width, height, label, x, y) {
        write_label(buffer, width, label, x, y);
        Placement::Cell { x, y }
    } else {
        Placement::Legend
    }
}
