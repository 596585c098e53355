// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Computes a two-dimensional layered embedding of a directed (optionally mixed) graph and
//! renders it to Unicode, SVG, or a versioned JSON document.
//!
//! The pipeline is a sequence of passes over an immutable [`graph::GraphView`]:
//! cycle breaking, layering, virtualisation (dummy node insertion), crossing reduction,
//! positioning, routing, and label placement. A peer path, the force-directed solver, bypasses
//! layering entirely and produces the same [`ir::LayoutIR`].
//!
//! # Examples
//!
//! ```
//! use sugiyama_layout::{GraphBuilder, Config};
//!
//! let mut builder = GraphBuilder::new();
//! let a = builder.add_node("A").unwrap();
//! let b = builder.add_node("B").unwrap();
//! let c = builder.add_node("C").unwrap();
//! builder.add_edge(a, b, true, None::<String>).unwrap();
//! builder.add_edge(b, c, true, None::<String>).unwrap();
//! let graph = builder.build().unwrap();
//!
//! let ir = sugiyama_layout::pipeline::run(&graph, &Config::default()).unwrap();
//! assert_eq!(ir.get_level_count(), 3);
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod crossing;
pub mod cycle_breaker;
pub mod errors;
pub mod force_directed;
pub mod graph;
pub mod ir;
pub mod label;
pub mod layer;
pub(crate) mod petgraph_support;
pub mod pipeline;
pub mod position;
pub mod render;
pub mod route;
pub mod virtualize;

pub use config::{Config, CrossingPreset, CycleBreaking, Layering, LayoutAlgorithm, Positioning,
    Routing};
pub use errors::{Diagnostic, Error};
pub use graph::{EdgeIndex, GraphBuilder, GraphView, NodeIndex, NodeKind};
pub use ir::LayoutIR;
