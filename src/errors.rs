// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contains types that describe errors and diagnostics that pipeline passes can return.

use std::cell::RefCell;
use std::error;
use std::fmt;

use Error::*;

/// The maximum number of node ids a [`Diagnostic`] carries inline.
pub const MAX_INVOLVED_IDS: usize = 64;
/// The maximum length of a [`Diagnostic`]'s detail string.
pub const MAX_DETAIL_LEN: usize = 512;

/// Error type describing the sorts of errors the pipeline can return.
///
/// Each variant corresponds to one of the structured diagnostic codes: for example
/// `Error::GraphNodeMissing` is `Graph.Node.Missing`.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// `Graph.Node.Missing` -- an empty graph was supplied where a non-empty one is required.
    GraphNodeMissing,
    /// `Graph.Node.NotFound` -- an edge referenced an endpoint that doesn't exist.
    GraphNodeNotFound {
        /// The id that could not be resolved.
        id: u64,
    },
    /// `Graph.Node.LimitExceeded` -- the node count cap was exceeded.
    GraphNodeLimitExceeded {
        /// The configured cap.
        limit: usize,
    },
    /// `Graph.Edge.LimitExceeded` -- the edge count cap was exceeded.
    GraphEdgeLimitExceeded {
        /// The configured cap.
        limit: usize,
    },
    /// `Graph.Edge.Mismatch` -- a directed and an undirected edge were declared between the
    /// same ordered pair of endpoints.
    GraphEdgeMismatch {
        /// The source node id.
        from: u64,
        /// The target node id.
        to: u64,
    },
    /// `Graph.Edge.Invalid` -- a self-loop was added while the builder runs in strict mode.
    GraphEdgeInvalid {
        /// The node id of the self-loop.
        id: u64,
    },
    /// `Graph.Dag.Invalid` -- a cycle was found where acyclicity is a precondition.
    GraphDagInvalid {
        /// One path that witnesses the cycle, as node indexes.
        path: Vec<usize>,
    },
    /// `Graph.Component.Disconnected` -- the graph isn't connected and the caller opted into
    /// requiring connectedness.
    GraphComponentDisconnected,
    /// `Layout.Algo.Invalid` -- an internal algorithm invariant was violated.
    LayoutAlgoInvalid {
        /// A one-line description of what went wrong.
        detail: String,
    },
    /// `Layout.Algo.Exhausted` -- an allocation needed to complete the layout exceeded a
    /// resource cap (for example, the Unicode renderer's cell buffer cap).
    LayoutAlgoExhausted {
        /// A one-line description of the resource that was exhausted.
        detail: String,
    },
    /// `Layout.Reducer.Invalid` -- a custom crossing reducer produced a level list shape the
    /// verifier doesn't recognize.
    LayoutReducerInvalid,
    /// `Layout.Reducer.Mismatch` -- a custom crossing reducer changed the total node count.
    LayoutReducerMismatch {
        /// The node count before the reducer ran.
        before: usize,
        /// The node count after the reducer ran.
        after: usize,
    },
    /// `Layout.Reducer.Duplicate` -- a custom crossing reducer produced a level list containing
    /// the same node index twice.
    LayoutReducerDuplicate {
        /// The duplicated node index.
        node_ix: usize,
    },
    /// `Layout.Reducer.Missing` -- a custom crossing reducer dropped a node index that must
    /// appear somewhere in the level lists.
    LayoutReducerMissing {
        /// The node index that went missing.
        node_ix: usize,
    },
    /// `Json.*` -- a JSON IR document failed to parse or didn't match the expected schema.
    Json {
        /// Which part of the schema failed (`"root"`, `"version"`, `"nodes"`, `"edges"`,
        /// `"node"`, `"edge"`, `"field"`, `"path"`, `"waypoints"`).
        area: &'static str,
        /// Which way it failed (`"missing"`, `"mismatch"`, `"invalid"`, `"unsupported"`).
        kind: &'static str,
        /// A one-line description.
        detail: String,
    },
}

impl Error {
    /// Returns the dotted structured code for this error, e.g. `"Graph.Node.Missing"`.
    pub fn code(&self) -> String {
        match self {
            GraphNodeMissing => "Graph.Node.Missing".to_owned(),
            GraphNodeNotFound { .. } => "Graph.Node.NotFound".to_owned(),
            GraphNodeLimitExceeded { .. } => "Graph.Node.LimitExceeded".to_owned(),
            GraphEdgeLimitExceeded { .. } => "Graph.Edge.LimitExceeded".to_owned(),
            GraphEdgeMismatch { .. } => "Graph.Edge.Mismatch".to_owned(),
            GraphEdgeInvalid { .. } => "Graph.Edge.Invalid".to_owned(),
            GraphDagInvalid { .. } => "Graph.Dag.Invalid".to_owned(),
            GraphComponentDisconnected => "Graph.Component.Disconnected".to_owned(),
            LayoutAlgoInvalid { .. } => "Layout.Algo.Invalid".to_owned(),
            LayoutAlgoExhausted { .. } => "Layout.Algo.Exhausted".to_owned(),
            LayoutReducerInvalid => "Layout.Reducer.Invalid".to_owned(),
            LayoutReducerMismatch { .. } => "Layout.Reducer.Mismatch".to_owned(),
            LayoutReducerDuplicate { .. } => "Layout.Reducer.Duplicate".to_owned(),
            LayoutReducerMissing { .. } => "Layout.Reducer.Missing".to_owned(),
            Json { area, kind, .. } => format!(
                "Json.{}.{}",
                capitalize(area),
                capitalize(kind)
            ),
        }
    }

    /// Returns an actionable hint for resolving this error.
    pub fn hint(&self) -> &'static str {
        match self {
            GraphNodeMissing => "add at least one node before running the pipeline",
            GraphNodeNotFound { .. } => "check that the edge's endpoint was added with add_node",
            GraphNodeLimitExceeded { .. } => "raise Config::max_nodes or reduce the input graph",
            GraphEdgeLimitExceeded { .. } => "raise Config::max_edges or reduce the input graph",
            GraphEdgeMismatch { .. } => {
                "declare all edges between this pair with the same directed flag"
            }
            GraphEdgeInvalid { .. } => "disable strict mode or remove the self-loop",
            GraphDagInvalid { .. } => "set cycle_breaking = depth_first",
            GraphComponentDisconnected => "run layout per connected component",
            LayoutAlgoInvalid { .. } => "this indicates a bug in the pipeline; please report it",
            LayoutAlgoExhausted { .. } => "reduce the graph size or raise the resource cap",
            LayoutReducerInvalid
            | LayoutReducerMismatch { .. }
            | LayoutReducerDuplicate { .. }
            | LayoutReducerMissing { .. } => {
                "fix the custom crossing reducer to preserve every node exactly once"
            }
            Json { .. } => "check the document against the documented JSON IR schema",
        }
    }

    /// Returns the node ids involved in this error, if any, truncated to
    /// [`MAX_INVOLVED_IDS`].
    pub fn involved_ids(&self) -> Vec<u64> {
        let ids = match self {
            GraphNodeNotFound { id } | GraphEdgeInvalid { id } => vec![*id],
            GraphEdgeMismatch { from, to } => vec![*from, *to],
            GraphDagInvalid { path } => path.iter().map(|ix| *ix as u64).collect(),
            _ => Vec::new(),
        };
        ids.into_iter().take(MAX_INVOLVED_IDS).collect()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphNodeMissing => write!(f, "graph has no nodes"),
            GraphNodeNotFound { id } => write!(f, "node id {} not found", id),
            GraphNodeLimitExceeded { limit } => {
                write!(f, "node count exceeds configured limit of {}", limit)
            }
            GraphEdgeLimitExceeded { limit } => {
                write!(f, "edge count exceeds configured limit of {}", limit)
            }
            GraphEdgeMismatch { from, to } => write!(
                f,
                "edge {} -> {} declared both directed and undirected",
                from, to
            ),
            GraphEdgeInvalid { id } => write!(f, "self-loop on node {} in strict mode", id),
            GraphDagInvalid { path } => write!(
                f,
                "graph contains a cycle: {}",
                itertools::join(path.iter().map(|ix| ix.to_string()), " -> ")
            ),
            GraphComponentDisconnected => write!(f, "graph is not connected"),
            LayoutAlgoInvalid { detail } => write!(f, "internal algorithm error: {}", detail),
            LayoutAlgoExhausted { detail } => write!(f, "resource exhausted: {}", detail),
            LayoutReducerInvalid => write!(f, "crossing reducer corrupted the level lists"),
            LayoutReducerMismatch { before, after } => write!(
                f,
                "crossing reducer changed node count from {} to {}",
                before, after
            ),
            LayoutReducerDuplicate { node_ix } => {
                write!(f, "crossing reducer duplicated node index {}", node_ix)
            }
            LayoutReducerMissing { node_ix } => {
                write!(f, "crossing reducer dropped node index {}", node_ix)
            }
            Json { area, kind, detail } => {
                write!(f, "JSON IR error in {} ({}): {}", area, kind, detail)
            }
        }
    }
}

impl error::Error for Error {}

/// A structured diagnostic: the error's code, message, hint, and any contextual detail.
///
/// Constructed from an [`Error`] and stashed in the thread-local "last diagnostic" slot (see
/// [`last_diagnostic`]) every time a pass returns an error, so callers that only propagate a
/// plain `Result<_, Error>` up several layers can still recover context near the top.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// The dotted structured code, e.g. `"Graph.Node.Missing"`.
    pub code: String,
    /// A one-line human-readable message.
    pub message: String,
    /// An actionable hint for resolving the error.
    pub hint: &'static str,
    /// An optional detail string, truncated to [`MAX_DETAIL_LEN`] bytes.
    pub detail: Option<String>,
    /// Node ids involved in the error, truncated to [`MAX_INVOLVED_IDS`].
    pub involved_ids: Vec<u64>,
}

impl Diagnostic {
    /// Builds a diagnostic from an error.
    pub fn from_error(err: &Error) -> Self {
        let detail = match err {
            LayoutAlgoInvalid { detail } | LayoutAlgoExhausted { detail } | Json { detail, .. } => {
                Some(truncate(detail, MAX_DETAIL_LEN))
            }
            _ => None,
        };
        Diagnostic {
            code: err.code(),
            message: err.to_string(),
            hint: err.hint(),
            detail,
            involved_ids: err.involved_ids(),
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_owned()
    } else {
        s.chars().take(max).collect()
    }
}

thread_local! {
    static LAST_DIAGNOSTIC: RefCell<Option<Diagnostic>> = RefCell::new(None);
}

/// Records `err` as the thread's last diagnostic and returns it unchanged.
///
/// Every pass that returns an `Error` routes it through this function first, so
/// [`last_diagnostic`] always reflects the most recent failure on this thread.
pub(crate) fn record(err: Error) -> Error {
    LAST_DIAGNOSTIC.with(|cell| {
        *cell.borrow_mut() = Some(Diagnostic::from_error(&err));
    });
    err
}

/// Returns a clone of the last diagnostic recorded on this thread, if any.
///
/// This is a convenience for callers that propagate errors with `?` through layers that don't
/// preserve the original `Error` value (e.g. after converting to a boxed `dyn std::error::Error`).
pub fn last_diagnostic() -> Option<Diagnostic> {
    LAST_DIAGNOSTIC.with(|cell| cell.borrow().clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_matches_expected_dotted_form() {
        assert_eq!(Error::GraphNodeMissing.code(), "Graph.Node.Missing");
        assert_eq!(
            Error::GraphEdgeLimitExceeded { limit: 5 }.code(),
            "Graph.Edge.LimitExceeded"
        );
        assert_eq!(
            Error::Json {
                area: "version",
                kind: "mismatch",
                detail: String::new()
            }
            .code(),
            "Json.Version.Mismatch"
        );
    }

    #[test]
    fn record_populates_last_diagnostic() {
        let _ = record(Error::GraphNodeMissing);
        let diag = last_diagnostic().expect("diagnostic recorded");
        assert_eq!(diag.code, "Graph.Node.Missing");
    }

    #[test]
    fn involved_ids_truncated() {
        let path: Vec<usize> = (0..200).collect();
        let err = Error::GraphDagInvalid { path };
        assert_eq!(err.involved_ids().len(), MAX_INVOLVED_IDS);
    }
}
