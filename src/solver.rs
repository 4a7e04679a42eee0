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

//! Solving linear models.
//!
//! A [`Solver`] takes a [`LinearModel`] and reports a [`Solution`]. The
//! solve status is part of the solution, it is not an error: a model may
//! be infeasible or unbounded.
//!
//! ```
//! use rs_flownet::{scenarios, solve_model, Model, MicroLp, SolutionState, SolverOptions};
//!
//! let model = Model::flow(scenarios::medium());
//! let sol = solve_model(&MicroLp, &model, &SolverOptions::default()).unwrap();
//! assert_eq!(sol.state(), SolutionState::Optimal);
//! assert!((sol.value().unwrap() - 150.0).abs() < 1e-6);
//! ```

use crate::echelon::Model;
use crate::error::Result;
use crate::formulation::{formulate, Comparison, LinearModel};
use crate::network::{NodeId, Quantity};
use crate::num::traits::NumCast;

use either::Either;
use log::{log, warn, Level};
use microlp::{ComparisonOp, OptimizationDirection, Problem};

use std::time::Duration;

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

/// Tolerance for rows without terms.
const EPS: f64 = 1e-9;

/// Tolerance for the feasibility of rounded flows.
const ROUND_EPS: f64 = 1e-6;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SolutionState {
    /// The problem has been solved to optimality
    Optimal,
    /// The problem is infeasible
    Infeasible,
    /// The problem is unbounded
    Unbounded,
    /// The solver failed
    Error,
}

/// Options passed to the solver.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialize", serde(default))]
pub struct SolverOptions {
    /// Use integer flow variables.
    pub integral: bool,
    /// Report the solve steps at `info` instead of `debug` level.
    pub verbose: bool,
    /// A limit on the solution time, if the solver supports one.
    pub time_limit: Option<Duration>,
}

/// The result of a solver run.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    state: SolutionState,
    value: f64,
    edges: Vec<(NodeId, NodeId)>,
    flows: Vec<f64>,
    message: Option<String>,
}

impl Solution {
    pub(crate) fn optimal(value: f64, edges: Vec<(NodeId, NodeId)>, flows: Vec<f64>) -> Self {
        Solution {
            state: SolutionState::Optimal,
            value,
            edges,
            flows,
            message: None,
        }
    }

    pub(crate) fn failed(state: SolutionState, edges: Vec<(NodeId, NodeId)>, message: String) -> Self {
        Solution {
            state,
            value: f64::NAN,
            edges,
            flows: vec![],
            message: Some(message),
        }
    }

    pub fn state(&self) -> SolutionState {
        self.state
    }

    pub fn is_optimal(&self) -> bool {
        self.state == SolutionState::Optimal
    }

    /// The objective value, `None` if the solution is not optimal.
    ///
    /// An optimal value of `0` is reported as `Some(0.0)`.
    pub fn value(&self) -> Option<f64> {
        if self.is_optimal() {
            Some(self.value)
        } else {
            None
        }
    }

    /// The flow on edge `(u,v)`.
    pub fn flow(&self, u: NodeId, v: NodeId) -> Option<f64> {
        if !self.is_optimal() {
            return None;
        }
        self.edges
            .iter()
            .position(|&e| e == (u, v))
            .map(|j| self.flows[j])
    }

    /// Return all `(src, snk, flow)` triples in edge order.
    ///
    /// The iterator is empty if the solution is not optimal.
    pub fn flows(&self) -> impl Iterator<Item = (NodeId, NodeId, f64)> + '_ {
        if self.is_optimal() {
            Either::Left(self.edges.iter().zip(&self.flows).map(|(&(u, v), &x)| (u, v, x)))
        } else {
            Either::Right(std::iter::empty())
        }
    }

    /// The message of the solver if it did not find an optimal solution.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// A linear programming solver.
pub trait Solver {
    /// Minimize `lp`.
    ///
    /// All resources of the solver are released before this returns.
    fn solve(&self, lp: &LinearModel, options: &SolverOptions) -> Solution;
}

/// The cost vector of `lp`, zero for columns not in the objective.
pub(crate) fn dense_costs(lp: &LinearModel) -> Vec<f64> {
    let mut costs = vec![0.0; lp.num_columns()];
    for &(j, c) in lp.objective() {
        costs[j] += c;
    }
    costs
}

/// The log level of a solver run.
pub(crate) fn log_level(options: &SolverOptions) -> Level {
    if options.verbose {
        Level::Info
    } else {
        Level::Debug
    }
}

/// Convert an integral column bound to the integer bound of microlp.
fn integer_bound(x: f64) -> Option<i32> {
    if x.fract() == 0.0 {
        <i32 as NumCast>::from(x)
    } else {
        None
    }
}

/// The pure Rust simplex solver `microlp`.
///
/// Integer variables of microlp need finite `i32` bounds. In integral
/// mode a column without upper bound stays continuous, a finite bound
/// outside of the `i32` range makes the run fail with
/// [`SolutionState::Error`]. The returned flows are rounded and checked
/// against the model again.
#[derive(Clone, Copy, Debug, Default)]
pub struct MicroLp;

impl Solver for MicroLp {
    fn solve(&self, lp: &LinearModel, options: &SolverOptions) -> Solution {
        let level = log_level(options);
        if let Some(limit) = options.time_limit {
            warn!("microlp does not support time limits, ignoring limit of {:?}", limit);
        }

        let edges: Vec<_> = lp.columns().iter().map(|c| (c.src, c.snk)).collect();

        // rows without terms are decided here, microlp only sees the others
        if let Some(row) = lp.rows().iter().find(|r| r.terms.is_empty() && !r.is_satisfied(&[], EPS)) {
            log!(level, "row {} has no terms and is violated", row.name);
            return Solution::failed(
                SolutionState::Infeasible,
                edges,
                format!("row {} has no terms and is violated", row.name),
            );
        }

        if lp.num_columns() == 0 {
            log!(level, "model without columns is trivially optimal");
            return Solution::optimal(0.0, edges, vec![]);
        }

        let costs = dense_costs(lp);
        let mut problem = Problem::new(OptimizationDirection::Minimize);
        let mut vars = Vec::with_capacity(lp.num_columns());
        let mut nintegers = 0;
        for (col, &c) in lp.columns().iter().zip(&costs) {
            if !options.integral || col.upper.is_infinite() {
                vars.push(problem.add_var(c, (col.lower, col.upper)));
                continue;
            }
            match (integer_bound(col.lower), integer_bound(col.upper)) {
                (Some(lower), Some(upper)) => {
                    vars.push(problem.add_integer_var(c, (lower, upper)));
                    nintegers += 1;
                }
                _ => {
                    let msg = format!(
                        "bounds [{}, {}] of column ({},{}) are not valid integer bounds for microlp",
                        col.lower, col.upper, col.src, col.snk
                    );
                    log!(level, "{}", msg);
                    return Solution::failed(SolutionState::Error, edges, msg);
                }
            }
        }

        let mut nrows = 0;
        for row in lp.rows().iter().filter(|r| !r.terms.is_empty()) {
            let cmp = match row.cmp {
                Comparison::Eq => ComparisonOp::Eq,
                Comparison::Le => ComparisonOp::Le,
                Comparison::Ge => ComparisonOp::Ge,
            };
            problem.add_constraint(row.terms.iter().map(|&(j, a)| (vars[j], a)), cmp, row.rhs);
            nrows += 1;
        }

        log!(
            level,
            "solving {:?} model with {} variables ({} integer) and {} rows",
            lp.shape(),
            vars.len(),
            nintegers,
            nrows
        );

        match problem.solve() {
            Ok(sol) => {
                let flows: Vec<f64> = vars
                    .iter()
                    .map(|&x| if options.integral { sol[x].round() } else { sol[x] })
                    .collect();
                if options.integral && !lp.is_feasible(&flows, ROUND_EPS) {
                    let msg = "rounded flows violate the model".to_string();
                    log!(level, "{}", msg);
                    return Solution::failed(SolutionState::Error, edges, msg);
                }
                let value = lp.objective_value(&flows);
                log!(level, "optimal solution with value {}", value);
                Solution::optimal(value, edges, flows)
            }
            Err(err) => {
                let state = match err {
                    microlp::Error::Infeasible => SolutionState::Infeasible,
                    microlp::Error::Unbounded => SolutionState::Unbounded,
                    _ => SolutionState::Error,
                };
                log!(level, "no optimal solution ({:?}): {}", state, err);
                Solution::failed(state, edges, err.to_string())
            }
        }
    }
}

/// Formulate and solve `model`.
///
/// Fails only if the model cannot be formulated, the solve status is
/// reported by the returned solution.
pub fn solve_model<T, S>(solver: &S, model: &Model<T>, options: &SolverOptions) -> Result<Solution>
where
    T: Quantity,
    S: Solver + ?Sized,
{
    let lp = formulate(model)?;
    Ok(solver.solve(&lp, options))
}

#[cfg(test)]
mod tests {
    use super::{solve_model, MicroLp, SolutionState, Solver, SolverOptions};
    use crate::builder::Buildable;
    use crate::echelon::Model;
    use crate::formulation::formulate;
    use crate::network::{Network, NodeId::*};
    use crate::scenarios;
    use approx::assert_abs_diff_eq;
    use std::time::Duration;

    fn two_nodes(supply: i64, cost: f64, cap: Option<i64>) -> Model {
        Model::flow(
            Network::new_with(|b| {
                b.add_node(Index(0), supply)?;
                b.add_node(Index(1), -supply)?;
                b.add_edge(Index(0), Index(1), cost, cap)
            })
            .unwrap(),
        )
    }

    #[test]
    fn test_small() {
        let sol = solve_model(&MicroLp, &Model::flow(scenarios::small()), &SolverOptions::default()).unwrap();
        assert_eq!(sol.state(), SolutionState::Optimal);
        assert_abs_diff_eq!(sol.value().unwrap(), 14.0, epsilon = 1e-6);
        assert_abs_diff_eq!(sol.flow(Index(0), Index(3)).unwrap(), 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(sol.flow(Index(2), Index(1)).unwrap(), 3.0, epsilon = 1e-6);
        assert_eq!(sol.flow(Index(1), Index(0)), None);
        assert_eq!(sol.flows().count(), 4);
        assert_eq!(sol.message(), None);
    }

    #[test]
    fn test_integral() {
        let options = SolverOptions {
            integral: true,
            ..SolverOptions::default()
        };
        let sol = solve_model(&MicroLp, &Model::flow(scenarios::small()), &options).unwrap();
        assert!(sol.is_optimal());
        assert_abs_diff_eq!(sol.value().unwrap(), 14.0, epsilon = 1e-6);
        assert!(sol.flows().all(|(_, _, x)| x == x.round()));
    }

    #[test]
    fn test_integral_bounds() {
        let integral = SolverOptions {
            integral: true,
            ..SolverOptions::default()
        };
        let model = two_nodes(3_000_000_000, 1.0, Some(3_000_000_000));

        let sol = solve_model(&MicroLp, &model, &SolverOptions::default()).unwrap();
        assert_eq!(sol.state(), SolutionState::Optimal);
        assert_abs_diff_eq!(sol.value().unwrap(), 3e9, epsilon = 1e-3);

        // the capacity does not fit into an integer variable of microlp
        let sol = solve_model(&MicroLp, &model, &integral).unwrap();
        assert_eq!(sol.state(), SolutionState::Error);
        assert_eq!(sol.value(), None);
        assert!(sol.message().unwrap_or_default().contains("(0,1)"));

        // unbounded columns keep their bounds
        let sol = solve_model(&MicroLp, &two_nodes(3_000_000_000, 1.0, None), &integral).unwrap();
        assert_eq!(sol.state(), SolutionState::Optimal);
        assert_abs_diff_eq!(sol.value().unwrap(), 3e9, epsilon = 1e-3);
        assert_eq!(sol.flow(Index(0), Index(1)), Some(3e9));
    }

    #[test]
    fn test_infeasible() {
        let sol = solve_model(&MicroLp, &two_nodes(5, 1.0, Some(3)), &SolverOptions::default()).unwrap();
        assert_eq!(sol.state(), SolutionState::Infeasible);
        assert_eq!(sol.value(), None);
        assert_eq!(sol.flow(Index(0), Index(1)), None);
        assert_eq!(sol.flows().count(), 0);
        assert!(sol.message().is_some());
    }

    #[test]
    fn test_unbounded() {
        let net = Network::new_with(|b| {
            b.add_node(Index(0), 0)?;
            b.add_node(Index(1), 0)?;
            b.add_edge(Index(0), Index(1), -1.0, None)?;
            b.add_edge(Index(1), Index(0), 0.0, None)
        })
        .unwrap();
        let sol = solve_model(&MicroLp, &Model::flow(net), &SolverOptions::default()).unwrap();
        assert_eq!(sol.state(), SolutionState::Unbounded);
        assert_eq!(sol.value(), None);
    }

    #[test]
    fn test_zero_value() {
        let sol = solve_model(&MicroLp, &two_nodes(5, 0.0, None), &SolverOptions::default()).unwrap();
        assert_eq!(sol.value(), Some(0.0));
        assert_abs_diff_eq!(sol.flow(Index(0), Index(1)).unwrap(), 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_row_without_terms() {
        let net = Network::new_with(|b| {
            b.add_node(Index(0), 1)?;
            b.add_node(Index(1), -1)
        })
        .unwrap();
        let lp = formulate(&Model::flow(net)).unwrap();
        let sol = MicroLp.solve(&lp, &SolverOptions::default());
        assert_eq!(sol.state(), SolutionState::Infeasible);
        assert!(sol.message().unwrap_or_default().contains("balance_0"));

        // a satisfied empty row is dropped
        let net = Network::new_with(|b| b.add_node(Index(0), 0)).unwrap();
        let sol = solve_model(&MicroLp, &Model::flow(net), &SolverOptions::default()).unwrap();
        assert_eq!(sol.value(), Some(0.0));
    }

    #[test]
    fn test_options() {
        let _ = env_logger::builder().is_test(true).try_init();
        let options = SolverOptions {
            integral: false,
            verbose: true,
            time_limit: Some(Duration::from_secs(1)),
        };
        let sol = solve_model(&MicroLp, &Model::flow(scenarios::medium()), &options).unwrap();
        assert_abs_diff_eq!(sol.value().unwrap(), 150.0, epsilon = 1e-6);
    }
}
