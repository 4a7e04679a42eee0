/*
 * Copyright (c) 2022 Frank Fischer <frank-fischer@shadow-soft.de>
 *
 * This program is free software: you can redistribute it and/or
 * modify it under the terms of the GNU General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful, but
 * WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
 * General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see  <http://www.gnu.org/licenses/>
 */

//! A dedicated minimum cost flow solver.
//!
//! [`NetSimplex`] runs the primal network simplex of `rs-graph` on flow
//! conservation models. The graph is recovered from the balance rows:
//! every row is a node and every column has a `+1` entry in the row of
//! its source and a `-1` entry in the row of its sink. Multi-echelon
//! models are not networks and are reported as
//! [`SolutionState::Error`].
//!
//! Columns without an upper bound get the finite bound
//!
//! ```text
//! 1 + sum of all positive supplies + sum of all finite capacities,
//! ```
//!
//! which no flow without cycles of unbounded edges exceeds. The model is
//! unbounded iff it is feasible and the unbounded edges contain a cycle
//! of negative cost.
//!
//! ```
//! use rs_flownet::{scenarios, solve_model, Model, NetSimplex, SolverOptions};
//!
//! let sol = solve_model(&NetSimplex, &Model::flow(scenarios::small()), &SolverOptions::default()).unwrap();
//! assert_eq!(sol.value(), Some(14.0));
//! ```

use crate::echelon::Shape;
use crate::formulation::{Comparison, LinearModel};
use crate::solver::{dense_costs, log_level, Solution, SolutionState, Solver, SolverOptions};

use log::{log, warn};
use rs_graph::mcf::{self, NetworkSimplex};
use rs_graph::{Buildable, Builder, IndexGraph, VecGraph};

/// Tolerance for negative cycles.
const EPS: f64 = 1e-9;

/// The rows of the source and the sink of each column.
#[allow(clippy::float_cmp)]
fn column_ends(lp: &LinearModel) -> Result<Vec<[usize; 2]>, String> {
    let mut ends = vec![[None, None]; lp.num_columns()];
    for (i, row) in lp.rows().iter().enumerate() {
        if row.cmp != Comparison::Eq {
            return Err(format!("row {} is not an equation", row.name));
        }
        for &(j, a) in &row.terms {
            let side = if a == 1.0 {
                0
            } else if a == -1.0 {
                1
            } else {
                return Err(format!("coefficient {} in row {} is not +1 or -1", a, row.name));
            };
            if ends[j][side].replace(i).is_some() {
                return Err(format!("column {} has more than two entries", j));
            }
        }
    }

    ends.into_iter()
        .enumerate()
        .map(|(j, e)| match e {
            [Some(u), Some(v)] => Ok([u, v]),
            _ => Err(format!("column {} is not an edge", j)),
        })
        .collect()
}

/// Return `true` if the `arcs` on nodes `0..n` contain a cycle of negative cost.
fn has_negative_cycle(n: usize, arcs: &[(usize, usize, f64)]) -> bool {
    // all nodes are sources, distances start at zero
    let mut dist = vec![0.0; n];
    for _ in 0..n {
        let mut changed = false;
        for &(u, v, c) in arcs {
            if dist[u] + c < dist[v] - EPS {
                dist[v] = dist[u] + c;
                changed = true;
            }
        }
        if !changed {
            return false;
        }
    }
    true
}

/// The network simplex of `rs-graph`.
///
/// Only flow conservation models are supported. Flows are computed in
/// floating point.
#[derive(Clone, Copy, Debug, Default)]
pub struct NetSimplex;

impl Solver for NetSimplex {
    fn solve(&self, lp: &LinearModel, options: &SolverOptions) -> Solution {
        let level = log_level(options);
        if let Some(limit) = options.time_limit {
            warn!("the network simplex does not support time limits, ignoring limit of {:?}", limit);
        }

        let edges: Vec<_> = lp.columns().iter().map(|c| (c.src, c.snk)).collect();

        if lp.shape() != Shape::FlowConservation {
            let msg = format!("the network simplex cannot solve {:?} models", lp.shape());
            log!(level, "{}", msg);
            return Solution::failed(SolutionState::Error, edges, msg);
        }
        let ends = match column_ends(lp) {
            Ok(ends) => ends,
            Err(msg) => {
                log!(level, "{}", msg);
                return Solution::failed(SolutionState::Error, edges, msg);
            }
        };

        let g = VecGraph::<u32>::new_with(|b| {
            let nodes = b.add_nodes(lp.num_rows());
            for &[u, v] in &ends {
                b.add_edge(nodes[u], nodes[v]);
            }
        });

        let costs = dense_costs(lp);
        let bound = 1.0
            + lp.rows().iter().map(|r| r.rhs.max(0.0)).sum::<f64>()
            + lp.columns().iter().map(|c| c.upper).filter(|x| x.is_finite()).sum::<f64>();

        let mut spx = NetworkSimplex::new(&g);
        for (i, row) in lp.rows().iter().enumerate() {
            spx.set_balance(g.id2node(i), row.rhs);
        }
        for (j, col) in lp.columns().iter().enumerate() {
            let e = g.id2edge(j);
            spx.set_lower(e, col.lower);
            spx.set_upper(e, if col.upper.is_finite() { col.upper } else { bound });
            spx.set_cost(e, costs[j]);
        }

        log!(
            level,
            "solving flow model with {} nodes and {} edges by the network simplex",
            lp.num_rows(),
            lp.num_columns()
        );

        let state = match spx.solve() {
            mcf::SolutionState::Optimal => {
                let unbounded: Vec<_> = lp
                    .columns()
                    .iter()
                    .zip(&ends)
                    .zip(&costs)
                    .filter(|((col, _), _)| col.upper.is_infinite())
                    .map(|((_, &[u, v]), &c)| (u, v, c))
                    .collect();
                if has_negative_cycle(lp.num_rows(), &unbounded) {
                    let msg = "unbounded edges form a cycle of negative cost".to_string();
                    log!(level, "{}", msg);
                    return Solution::failed(SolutionState::Unbounded, edges, msg);
                }

                let flows: Vec<f64> = (0..lp.num_columns())
                    .map(|j| spx.flow(g.id2edge(j)))
                    .map(|x| if options.integral { x.round() } else { x })
                    .collect();
                let value = lp.objective_value(&flows);
                log!(
                    level,
                    "optimal solution with value {} after {} iterations",
                    value,
                    spx.num_iterations()
                );
                return Solution::optimal(value, edges, flows);
            }
            mcf::SolutionState::Infeasible => SolutionState::Infeasible,
            mcf::SolutionState::Unbounded => SolutionState::Unbounded,
            mcf::SolutionState::Unknown => SolutionState::Error,
        };

        let msg = format!("network simplex finished with state {:?}", state);
        log!(level, "{}", msg);
        Solution::failed(state, edges, msg)
    }
}

#[cfg(test)]
mod tests {
    use super::NetSimplex;
    use crate::balance::BalancePolicy;
    use crate::builder::Buildable;
    use crate::echelon::{Mode, Model};
    use crate::formulation::formulate;
    use crate::network::{Network, NodeId::*};
    use crate::scenarios;
    use crate::solver::{solve_model, MicroLp, SolutionState, Solver, SolverOptions};
    use approx::assert_abs_diff_eq;

    fn solve(model: &Model) -> (f64, f64) {
        let options = SolverOptions::default();
        let a = solve_model(&NetSimplex, model, &options).unwrap();
        let b = solve_model(&MicroLp, model, &options).unwrap();
        assert_eq!(a.state(), SolutionState::Optimal);
        assert_eq!(b.state(), SolutionState::Optimal);
        (a.value().unwrap(), b.value().unwrap())
    }

    #[test]
    fn test_small() {
        let (x, y) = solve(&Model::flow(scenarios::small()));
        assert_abs_diff_eq!(x, 14.0, epsilon = 1e-6);
        assert_abs_diff_eq!(y, 14.0, epsilon = 1e-6);

        let sol = solve_model(&NetSimplex, &Model::flow(scenarios::small()), &SolverOptions::default()).unwrap();
        assert_abs_diff_eq!(sol.flow(Index(0), Index(1)).unwrap(), 3.0, epsilon = 1e-6);
        assert_abs_diff_eq!(sol.flow(Index(0), Index(3)).unwrap(), 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(sol.flow(Index(2), Index(1)).unwrap(), 3.0, epsilon = 1e-6);
        assert_abs_diff_eq!(sol.flow(Index(2), Index(3)).unwrap(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_medium() {
        let (x, y) = solve(&Model::flow(scenarios::medium()));
        assert_abs_diff_eq!(x, 150.0, epsilon = 1e-6);
        assert_abs_diff_eq!(y, 150.0, epsilon = 1e-6);
    }

    #[test]
    fn test_crown_graph() {
        let params = scenarios::crown();
        let (x, y) = solve(&params.build(&Mode::Graph(BalancePolicy::crown())).unwrap());
        assert_abs_diff_eq!(x, 198_500.0, epsilon = 1e-6);
        assert_abs_diff_eq!(y, 198_500.0, epsilon = 1e-6);

        let (x, y) = solve(&params.build(&Mode::Graph(BalancePolicy::default())).unwrap());
        assert_abs_diff_eq!(x, 194_750.0, epsilon = 1e-6);
        assert_abs_diff_eq!(y, 194_750.0, epsilon = 1e-6);
    }

    #[test]
    fn test_states() {
        let options = SolverOptions::default();

        let infeasible = Network::new_with(|b| {
            b.add_node(Index(0), 5)?;
            b.add_node(Index(1), -5)?;
            b.add_edge(Index(0), Index(1), 1.0, Some(3))
        })
        .unwrap();
        let sol = solve_model(&NetSimplex, &Model::flow(infeasible), &options).unwrap();
        assert_eq!(sol.state(), SolutionState::Infeasible);
        assert_eq!(sol.value(), None);
        assert!(sol.message().is_some());

        let unbounded = Network::new_with(|b| {
            b.add_node(Index(0), 0)?;
            b.add_node(Index(1), 0)?;
            b.add_edge(Index(0), Index(1), -1.0, None)?;
            b.add_edge(Index(1), Index(0), 0.0, None)
        })
        .unwrap();
        let sol = solve_model(&NetSimplex, &Model::flow(unbounded), &options).unwrap();
        assert_eq!(sol.state(), SolutionState::Unbounded);
        assert_eq!(sol.value(), None);
    }

    #[test]
    fn test_rejects_echelon_model() {
        let lp = formulate(&scenarios::crown().build(&Mode::Factory).unwrap()).unwrap();
        let sol = NetSimplex.solve(&lp, &SolverOptions::default());
        assert_eq!(sol.state(), SolutionState::Error);
        assert!(sol.message().unwrap_or_default().contains("MultiEchelon"));
    }
}
