// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The force-directed peer path: Fruchterman-Reingold layout, for callers who want a classic
//! spring-embedder result instead of a layered drawing. Shares no state with the Sugiyama
//! pipeline; produces an IR whose nodes all carry `level = 0`.

mod fixed;
mod quadtree;

use crate::graph::{GraphView, NodeIndex};
use fixed::{Fixed, Xorshift64};
use quadtree::Quadtree;

/// Whether repulsion is computed exactly (all pairs) or approximately (Barnes-Hut).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repulsion {
    /// O(N^2) per iteration; exact.
    Exact,
    /// O(N log N) per iteration via a quadtree, theta = 0.8.
    BarnesHut,
}

/// Barnes-Hut's approximation threshold: a subtree is summarised as a single pseudo-body once
/// `size / distance < theta`.
const BARNES_HUT_THETA: f64 = 0.8;

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon1")] {
        use rayon::prelude::*;

        /// Exact O(n^2) repulsion, one independent reduction per node, fanned out across a
        /// rayon thread pool.
        fn exact_repulsion(positions: &[(Fixed, Fixed)], k_squared: Fixed) -> Vec<(Fixed, Fixed)> {
            positions
                .par_iter()
                .enumerate()
                .map(|(i, &(xi, yi))| {
                    let mut fx = Fixed::ZERO;
                    let mut fy = Fixed::ZERO;
                    for (j, &(xj, yj)) in positions.iter().enumerate() {
                        if i == j {
                            continue;
                        }
                        accumulate_pair_repulsion(xi, yi, xj, yj, k_squared, &mut fx, &mut fy);
                    }
                    (fx, fy)
                })
                .collect()
        }
    } else {
        /// Exact O(n^2) repulsion, computed serially.
        fn exact_repulsion(positions: &[(Fixed, Fixed)], k_squared: Fixed) -> Vec<(Fixed, Fixed)> {
            let n = positions.len();
            let mut out = vec![(Fixed::ZERO, Fixed::ZERO); n];
            for i in 0..n {
                let (xi, yi) = positions[i];
                let mut fx = Fixed::ZERO;
                let mut fy = Fixed::ZERO;
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let (xj, yj) = positions[j];
                    accumulate_pair_repulsion(xi, yi, xj, yj, k_squared, &mut fx, &mut fy);
                }
                out[i] = (fx, fy);
            }
            out
        }
    }
}

/// Fruchterman-Reingold tuning, mirroring the `algorithm`-specific sub-options in [`crate::config::Config`].
#[derive(Clone, Copy, Debug)]
pub struct ForceDirectedParams {
    /// Random seed for the initial placement. Two runs with the same seed on the same graph
    /// produce bit-identical output.
    pub seed: u64,
    /// Iteration cap for the cooling schedule.
    pub iterations: u32,
    /// Which repulsion strategy to use.
    pub repulsion: Repulsion,
}

impl Default for ForceDirectedParams {
    fn default() -> Self {
        ForceDirectedParams {
            seed: 0,
            iterations: 200,
            repulsion: Repulsion::Exact,
        }
    }
}

/// The solver's output: one `(x, y)` position per node, in fixed-point cell coordinates, plus
/// the bounding area used so callers can derive a margin.
pub struct ForceDirectedLayout {
    positions: Vec<(Fixed, Fixed)>,
}

impl ForceDirectedLayout {
    /// The final position of `node`, rounded to an integer cell.
    pub fn position(&self, node: NodeIndex) -> (i64, i64) {
        let (x, y) = self.positions[node.index()];
        (x.round_to_int(), y.round_to_int())
    }
}

/// Runs Fruchterman-Reingold on `graph`'s undirected adjacency (edge direction is irrelevant to
/// the spring-embedder model).
///
/// Cooling is linear from `k = sqrt(area / n)` to zero over `params.iterations` steps.
/// Terminates early once an iteration's total displacement drops below `k / 1000`.
pub fn layout(graph: &GraphView<'_>, params: &ForceDirectedParams) -> ForceDirectedLayout {
    let n = graph.node_count();
    if n == 0 {
        return ForceDirectedLayout { positions: Vec::new() };
    }

    let area = Fixed::from_int((n as i64) * 100);
    let k = area_sqrt_over_n(area, n);
    let k_squared = k * k;

    let mut rng = Xorshift64::new(params.seed);
    let scale = Fixed::from_int((n as i64).max(1)) * Fixed::from_f64(5.0);
    let mut positions: Vec<(Fixed, Fixed)> = (0..n)
        .map(|_| (rng.next_signed(scale), rng.next_signed(scale)))
        .collect();

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    for edge in graph.edges() {
        let (a, b) = (edge.from().index(), edge.to().index());
        if a != b {
            adjacency[a].push(b);
            adjacency[b].push(a);
        }
    }

    let mut temperature = k;
    let cooling_step = k / Fixed::from_int(params.iterations.max(1) as i64);
    let min_total_displacement = k / Fixed::from_int(1000);

    for _ in 0..params.iterations {
        let mut displacement = match params.repulsion {
            Repulsion::Exact => exact_repulsion(&positions, k_squared),
            Repulsion::BarnesHut => vec![(Fixed::ZERO, Fixed::ZERO); n],
        };

        if params.repulsion == Repulsion::BarnesHut {
            let tree = Quadtree::build(&positions);
            let theta = Fixed::from_f64(BARNES_HUT_THETA);
            for i in 0..n {
                let (xi, yi) = positions[i];
                let mut fx = Fixed::ZERO;
                let mut fy = Fixed::ZERO;
                tree.accumulate_repulsion(i, xi, yi, theta, k_squared, &mut fx, &mut fy);
                displacement[i] = (fx, fy);
            }
        }

        for i in 0..n {
            let (xi, yi) = positions[i];
            let (mut fx, mut fy) = displacement[i];
            for &j in &adjacency[i] {
                let (xj, yj) = positions[j];
                accumulate_attraction(xi, yi, xj, yj, k, &mut fx, &mut fy);
            }
            displacement[i] = (fx, fy);
        }

        let mut total_displacement = Fixed::ZERO;
        for i in 0..n {
            let (fx, fy) = displacement[i];
            let magnitude = (fx * fx + fy * fy).sqrt();
            if magnitude.is_zero() {
                continue;
            }
            let capped = if magnitude < temperature { magnitude } else { temperature };
            let (xi, yi) = positions[i];
            positions[i] = (xi + (fx / magnitude) * capped, yi + (fy / magnitude) * capped);
            total_displacement += capped;
        }

        temperature = if temperature > cooling_step {
            temperature - cooling_step
        } else {
            Fixed::ZERO
        };

        if total_displacement < min_total_displacement {
            break;
        }
    }

    ForceDirectedLayout { positions }
}

fn area_sqrt_over_n(area: Fixed, n: usize) -> Fixed {
    (area / Fixed::from_int(n as i64)).sqrt()
}

fn accumulate_pair_repulsion(
    xi: Fixed,
    yi: Fixed,
    xj: Fixed,
    yj: Fixed,
    k_squared: Fixed,
    fx: &mut Fixed,
    fy: &mut Fixed,
) {
    let dx = xi - xj;
    let dy = yi - yj;
    let dist_sq = dx * dx + dy * dy;
    let min_dist_sq = Fixed::from_f64(0.01);
    let dist_sq = if dist_sq < min_dist_sq { min_dist_sq } else { dist_sq };
    let dist = dist_sq.sqrt();
    let magnitude = k_squared / dist;
    *fx += (dx / dist) * magnitude;
    *fy += (dy / dist) * magnitude;
}

fn accumulate_attraction(xi: Fixed, yi: Fixed, xj: Fixed, yj: Fixed, k: Fixed, fx: &mut Fixed, fy: &mut Fixed) {
    let dx = xj - xi;
    let dy = yj - yi;
    let dist_sq = dx * dx + dy * dy;
    let min_dist_sq = Fixed::from_f64(0.01);
    let dist_sq = if dist_sq < min_dist_sq { min_dist_sq } else { dist_sq };
    let dist = dist_sq.sqrt();
    let magnitude = dist_sq / k;
    *fx += (dx / dist) * magnitude;
    *fy += (dy / dist) * magnitude;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    #[test]
    fn deterministic_for_fixed_seed() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("a").unwrap();
        let b = builder.add_node("b").unwrap();
        let c = builder.add_node("c").unwrap();
        builder.add_edge(a, b, true, None::<String>).unwrap();
        builder.add_edge(b, c, true, None::<String>).unwrap();
        builder.add_edge(c, a, true, None::<String>).unwrap();
        let graph = builder.build().unwrap();

        let params = ForceDirectedParams {
            seed: 42,
            iterations: 50,
            repulsion: Repulsion::Exact,
        };
        let first = layout(&graph, &params);
        let second = layout(&graph, &params);
        for ix in [a, b, c] {
            assert_eq!(first.position(ix), second.position(ix));
        }
    }

    #[test]
    fn exact_and_barnes_hut_agree_roughly_on_a_triangle() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("a").unwrap();
        let b = builder.add_node("b").unwrap();
        let c = builder.add_node("c").unwrap();
        builder.add_edge(a, b, true, None::<String>).unwrap();
        builder.add_edge(b, c, true, None::<String>).unwrap();
        builder.add_edge(c, a, true, None::<String>).unwrap();
        let graph = builder.build().unwrap();

        let exact = layout(
            &graph,
            &ForceDirectedParams {
                seed: 7,
                iterations: 100,
                repulsion: Repulsion::Exact,
            },
        );
        let approx = layout(
            &graph,
            &ForceDirectedParams {
                seed: 7,
                iterations: 100,
                repulsion: Repulsion::BarnesHut,
            },
        );
        // With only 3 nodes Barnes-Hut always falls back to exact-equivalent pairwise forces,
        // so positions should match closely (theta never triggers an approximation).
        for ix in [a, b, c] {
            let (ex, ey) = exact.position(ix);
            let (ax, ay) = approx.position(ix);
            assert!((ex - ax).abs() <= 1, "x mismatch: {ex} vs {ax}");
            assert!((ey - ay).abs() <= 1, "y mismatch: {ey} vs {ay}");
        }
    }

    #[test]
    fn empty_graph_layout_has_no_positions() {
        // A zero-node GraphView cannot be constructed via GraphBuilder::build (it errors), so
        // this exercises the solver's defensive n == 0 branch directly via an empty node set
        // would require a non-public constructor; instead confirm a one-node graph works.
        let mut builder = GraphBuilder::new();
        builder.add_node("solo").unwrap();
        let graph = builder.build().unwrap();
        let layout_result = layout(&graph, &ForceDirectedParams::default());
        assert_eq!(layout_result.positions.len(), 1);
    }
}
