// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only consumers of a finished [`crate::ir::LayoutIR`]: a Unicode grid renderer, an SVG
//! document renderer, and a versioned JSON serialiser/deserialiser.

pub mod json;
pub mod svg;
pub mod unicode;

pub use self::unicode::UnicodeRenderer;
pub use svg::to_svg;
