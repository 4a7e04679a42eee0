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

//! Linear programs of network models.
//!
//! A [`Model`] is turned into a [`LinearModel`] with one column (flow
//! variable) per network edge, in network edge order, and a list of
//! named rows. The rows depend on the [`Shape`] of the model.
//!
//! # Flow conservation
//!
//! For every node `u` with supply `b(u)`
//!
//! ```text
//! sum_{(u,v)} x(u,v) - sum_{(v,u)} x(v,u) = b(u)      (balance_u)
//! ```
//!
//! and `0 <= x(u,v) <= cap(u,v)` for every edge. The objective is
//! `min sum c(u,v) x(u,v)` over all edges.
//!
//! # Multi-echelon
//!
//! ```text
//! sum_{(p,v)} x(p,v)               <= capacity(p)     (capacity_p)
//! sum_{(p,w)} x(p,w)               <= throughput(w)   (throughput_w)
//! sum_{(p,w)} x(p,w) - sum_{(w,c)} x(w,c) = 0         (passthrough_w)
//! sum_{(p,c)} x(p,c) + sum_{(w,c)} x(w,c) = demand(c) (demand_c)
//! ```
//!
//! The objective only contains the edges with a non-zero cost. Zero-cost
//! edges still carry (constrained) flow.

use crate::echelon::{Model, Shape};
use crate::capacity::Limits;
use crate::error::{Error, Result};
use crate::network::{to_f64, Network, NodeId, Quantity};
use crate::topology::{EdgeClass, Topology};

use log::debug;
use std::collections::HashMap;
use std::fmt;

/// The sense of a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Le,
    Ge,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        match self {
            Comparison::Eq => write!(f, "="),
            Comparison::Le => write!(f, "<="),
            Comparison::Ge => write!(f, ">="),
        }
    }
}

/// The flow variable of an edge.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub src: NodeId,
    pub snk: NodeId,
    pub lower: f64,
    /// The upper bound, infinite for unbounded edges.
    pub upper: f64,
}

/// A linear constraint `sum coeff * x[col] <cmp> rhs`.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub name: String,
    /// Pairs `(column, coefficient)`.
    pub terms: Vec<(usize, f64)>,
    pub cmp: Comparison,
    pub rhs: f64,
}

impl Row {
    /// The value of the left-hand side at `x`.
    pub fn activity(&self, x: &[f64]) -> f64 {
        self.terms.iter().map(|&(j, a)| a * x[j]).sum()
    }

    /// Return `true` if `x` satisfies the row up to `eps`.
    pub fn is_satisfied(&self, x: &[f64], eps: f64) -> bool {
        let lhs = self.activity(x);
        match self.cmp {
            Comparison::Eq => (lhs - self.rhs).abs() <= eps,
            Comparison::Le => lhs <= self.rhs + eps,
            Comparison::Ge => lhs >= self.rhs - eps,
        }
    }
}

/// A minimization problem over the flows of a network.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearModel {
    shape: Shape,
    columns: Vec<Column>,
    objective: Vec<(usize, f64)>,
    rows: Vec<Row>,
    column_index: HashMap<(NodeId, NodeId), usize>,
}

impl LinearModel {
    fn new(shape: Shape, columns: Vec<Column>, objective: Vec<(usize, f64)>, rows: Vec<Row>) -> Self {
        let column_index = columns.iter().enumerate().map(|(j, c)| ((c.src, c.snk), j)).collect();
        LinearModel {
            shape,
            columns,
            objective,
            rows,
            column_index,
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// The columns, one per network edge in edge order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// The column of edge `(u,v)`.
    pub fn column(&self, u: NodeId, v: NodeId) -> Option<usize> {
        self.column_index.get(&(u, v)).copied()
    }

    /// The objective terms `(column, cost)`.
    pub fn objective(&self) -> &[(usize, f64)] {
        &self.objective
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Return the row with the given name.
    pub fn row(&self, name: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.name == name)
    }

    /// The objective value of `x`.
    pub fn objective_value(&self, x: &[f64]) -> f64 {
        self.objective.iter().map(|&(j, c)| c * x[j]).sum()
    }

    /// Return `true` if `x` satisfies all bounds and rows up to `eps`.
    pub fn is_feasible(&self, x: &[f64], eps: f64) -> bool {
        x.len() == self.columns.len()
            && self
                .columns
                .iter()
                .zip(x)
                .all(|(c, &v)| v >= c.lower - eps && v <= c.upper + eps)
            && self.rows.iter().all(|r| r.is_satisfied(x, eps))
    }
}

fn columns<T: Quantity>(net: &Network<T>) -> Vec<Column> {
    net.edges()
        .map(|e| Column {
            src: e.src(),
            snk: e.snk(),
            lower: 0.0,
            upper: e.capacity().map(to_f64).unwrap_or(f64::INFINITY),
        })
        .collect()
}

/// Emit the linear program of `model`.
///
/// Fails if a flow conservation model is requested for an unbalanced
/// network.
pub fn formulate<T: Quantity>(model: &Model<T>) -> Result<LinearModel> {
    let lp = match (model.shape(), model.topology(), model.limits()) {
        (Shape::FlowConservation, _, _) => flow_conservation(model.network())?,
        (Shape::MultiEchelon, Some(topology), Some(limits)) => multi_echelon(model.network(), topology, limits),
        (Shape::MultiEchelon, _, _) => unreachable!("multi-echelon models always have layers and limits"),
    };
    debug!(
        "formulated {:?} model with {} columns and {} rows",
        lp.shape,
        lp.num_columns(),
        lp.num_rows()
    );
    Ok(lp)
}

/// Emit the flow conservation form of `net`.
pub fn flow_conservation<T: Quantity>(net: &Network<T>) -> Result<LinearModel> {
    let excess = net.total_supply()?;
    if !excess.is_zero() {
        return Err(Error::Unbalanced(excess.to_string()));
    }

    let mut rows: Vec<_> = net
        .supplies()
        .map(|(u, b)| Row {
            name: format!("balance_{}", u),
            terms: vec![],
            cmp: Comparison::Eq,
            rhs: to_f64(b),
        })
        .collect();
    for e in net.edges() {
        let [uid, vid] = e.ends();
        rows[uid].terms.push((e.id(), 1.0));
        rows[vid].terms.push((e.id(), -1.0));
    }

    Ok(LinearModel::new(
        Shape::FlowConservation,
        columns(net),
        net.edges().map(|e| (e.id(), e.cost())).collect(),
        rows,
    ))
}

/// Emit the multi-echelon form of `net`.
fn multi_echelon<T: Quantity>(net: &Network<T>, topology: &Topology, limits: &Limits<T>) -> LinearModel {
    let echelon = |u: NodeId, v: NodeId| EdgeClass::of(u, v).is_some();
    let mut rows = Vec::with_capacity(topology.num_nodes() + topology.warehouses().len());

    for (&p, &cap) in topology.plants().iter().zip(&limits.capacities) {
        rows.push(Row {
            name: format!("capacity_{}", p),
            terms: net
                .outedges(p)
                .filter(|e| echelon(e.src(), e.snk()))
                .map(|e| (e.id(), 1.0))
                .collect(),
            cmp: Comparison::Le,
            rhs: to_f64(cap),
        });
    }

    for (&w, &thr) in topology.warehouses().iter().zip(&limits.throughputs) {
        rows.push(Row {
            name: format!("throughput_{}", w),
            terms: net
                .inedges(w)
                .filter(|e| e.src().is_plant())
                .map(|e| (e.id(), 1.0))
                .collect(),
            cmp: Comparison::Le,
            rhs: to_f64(thr),
        });
    }

    for &w in topology.warehouses() {
        let inflow = net.inedges(w).filter(|e| e.src().is_plant()).map(|e| (e.id(), 1.0));
        let outflow = net.outedges(w).filter(|e| e.snk().is_customer()).map(|e| (e.id(), -1.0));
        rows.push(Row {
            name: format!("passthrough_{}", w),
            terms: inflow.chain(outflow).collect(),
            cmp: Comparison::Eq,
            rhs: 0.0,
        });
    }

    for (&c, &dem) in topology.customers().iter().zip(&limits.demands) {
        rows.push(Row {
            name: format!("demand_{}", c),
            terms: net
                .inedges(c)
                .filter(|e| echelon(e.src(), e.snk()))
                .map(|e| (e.id(), 1.0))
                .collect(),
            cmp: Comparison::Eq,
            rhs: to_f64(dem),
        });
    }

    #[allow(clippy::float_cmp)]
    let objective = net
        .edges()
        .filter(|e| e.cost() != 0.0)
        .map(|e| (e.id(), e.cost()))
        .collect();

    LinearModel::new(Shape::MultiEchelon, columns(net), objective, rows)
}

#[cfg(test)]
mod tests {
    use super::{flow_conservation, formulate, Comparison};
    use crate::balance::BalancePolicy;
    use crate::costs::CostTables;
    use crate::echelon::{EchelonParams, Mode, Model, Shape};
    use crate::error::Error;
    use crate::network::NodeId::{self, *};
    use crate::scenarios;

    #[test]
    fn test_flow_conservation() {
        let lp = formulate(&Model::flow(scenarios::small())).unwrap();
        assert_eq!(lp.shape(), Shape::FlowConservation);
        assert_eq!(lp.num_columns(), 4);
        assert_eq!(lp.num_rows(), 4);

        let r = lp.row("balance_1").unwrap();
        assert_eq!(r.terms, vec![(0, -1.0), (2, -1.0)]);
        assert_eq!(r.cmp, Comparison::Eq);
        assert_eq!(r.rhs, -6.0);
        assert_eq!(lp.row("balance_2").unwrap().terms, vec![(2, 1.0), (3, 1.0)]);

        let uppers: Vec<_> = lp.columns().iter().map(|c| c.upper).collect();
        assert_eq!(uppers, vec![5.0, 2.0, 3.0, 2.0]);
        // zero-cost edges are part of the flow conservation objective
        assert_eq!(lp.objective(), &[(0, 0.0), (1, 4.0), (2, 2.0), (3, 8.0)][..]);

        // the optimal flow and a more expensive one
        let x = [3.0, 2.0, 3.0, 0.0];
        assert!(lp.is_feasible(&x, 1e-9));
        assert_eq!(lp.objective_value(&x), 14.0);
        let y = [5.0, 0.0, 1.0, 2.0];
        assert!(lp.is_feasible(&y, 1e-9));
        assert_eq!(lp.objective_value(&y), 18.0);
        // violates the supply of node 3
        assert!(!lp.is_feasible(&[5.0, 0.0, 1.0, 1.0], 1e-9));
        // violates the capacity of (0,3)
        assert!(!lp.is_feasible(&[2.0, 3.0, 4.0, -1.0], 1e-9));
    }

    #[test]
    fn test_unbalanced() {
        let params = scenarios::crown();
        let factory = params.build(&Mode::Factory).unwrap();
        // the factory network keeps the raw supplies
        assert!(matches!(flow_conservation(factory.network()), Err(Error::Unbalanced(_))));
        assert!(formulate(&Model::flow(factory.into_network())).is_err());
    }

    #[test]
    fn test_graph_mode() {
        let model = scenarios::crown().build(&Mode::Graph(BalancePolicy::crown())).unwrap();
        let lp = formulate(&model).unwrap();
        assert_eq!(lp.num_columns(), 31);
        assert_eq!(lp.num_rows(), 13);
        let dummy = lp.row("balance_dummy").unwrap();
        assert_eq!(dummy.rhs, -135_000.0);
        assert_eq!(dummy.terms.len(), 2);
        let col = lp.column(Plant(1), NodeId::Dummy).unwrap();
        assert_eq!(lp.columns()[col].upper, 55_000.0);
    }

    #[test]
    fn test_multi_echelon() {
        let model = scenarios::crown().build(&Mode::Factory).unwrap();
        let lp = formulate(&model).unwrap();

        assert_eq!(lp.shape(), Shape::MultiEchelon);
        assert_eq!(lp.num_columns(), 29);
        // 2 capacities, 4 throughputs, 4 pass-throughs, 6 demands
        assert_eq!(lp.num_rows(), 16);
        assert!(lp.columns().iter().all(|c| c.upper.is_infinite() && c.lower == 0.0));

        let cap = lp.row("capacity_p2").unwrap();
        assert_eq!(cap.cmp, Comparison::Le);
        assert_eq!(cap.rhs, 200_000.0);
        // w2, w3, w4 and c1
        assert_eq!(cap.terms.len(), 4);

        let thr = lp.row("throughput_w1").unwrap();
        assert_eq!(thr.rhs, 70_000.0);
        assert_eq!(thr.terms, vec![(lp.column(Plant(0), Warehouse(0)).unwrap(), 1.0)]);

        let pass = lp.row("passthrough_w2").unwrap();
        assert_eq!(pass.cmp, Comparison::Eq);
        assert_eq!(pass.rhs, 0.0);
        assert_eq!(pass.terms.iter().filter(|t| t.1 > 0.0).count(), 2);
        assert_eq!(pass.terms.iter().filter(|t| t.1 < 0.0).count(), 5);

        let dem = lp.row("demand_c1").unwrap();
        assert_eq!(dem.cmp, Comparison::Eq);
        assert_eq!(dem.rhs, 50_000.0);
        // p1, p2 and w2
        assert_eq!(dem.terms.len(), 3);
        assert_eq!(lp.row("demand_c5").unwrap().terms.len(), 3);
    }

    #[test]
    fn test_zero_cost_not_in_objective() {
        let params = EchelonParams {
            capacities: vec![10],
            throughputs: vec![10],
            demands: vec![5],
            costs: CostTables {
                plant_warehouse: vec![vec![Some(0.0)]].into(),
                plant_customer: vec![vec![Some(3.0)]].into(),
                warehouse_customer: vec![vec![Some(1.0)]].into(),
            },
        };
        let lp = formulate(&params.build(&Mode::Factory).unwrap()).unwrap();
        let pw = lp.column(Plant(0), Warehouse(0)).unwrap();

        assert_eq!(lp.num_columns(), 3);
        assert_eq!(lp.objective().len(), 2);
        assert!(lp.objective().iter().all(|&(j, _)| j != pw));
        // ... but the edge is still constrained
        assert!(lp.row("throughput_w1").unwrap().terms.contains(&(pw, 1.0)));
        assert!(lp.row("capacity_p1").unwrap().terms.contains(&(pw, 1.0)));

        // the same network in graph mode keeps all edges in the objective
        let graph = params.build(&Mode::Graph(BalancePolicy::default())).unwrap();
        assert_eq!(formulate(&graph).unwrap().objective().len(), 4);
    }
}
