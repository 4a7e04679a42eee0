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

//! Three-echelon distribution networks.
//!
//! Plants produce, warehouses pass goods on, customers consume. Goods
//! travel plant -> warehouse -> customer or directly plant -> customer.
//! The network is generated from [`EchelonParams`] in one of two modes:
//!
//! - [`Mode::Factory`] keeps the node limits as constraints of their
//!   own. The edges are unbounded and the model has the
//!   [`Shape::MultiEchelon`] form.
//! - [`Mode::Graph`] moves the node limits onto the edges (each edge can
//!   carry at most what both of its endpoints can pass), turns the
//!   limits into supplies and balances the network. The model has the
//!   [`Shape::FlowConservation`] form.

use crate::balance::{balance, BalancePolicy};
use crate::builder::NetworkBuilder;
use crate::capacity::Limits;
use crate::costs::{CostTables, EdgeSets};
use crate::error::Result;
use crate::network::{Network, Quantity};
use crate::topology::Topology;

use log::debug;

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

/// The business data of an echelon network.
///
/// The numbers of plants, warehouses and customers are the lengths of
/// the limit vectors.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct EchelonParams<T = i64> {
    /// The production capacity of each plant.
    pub capacities: Vec<T>,
    /// The throughput of each warehouse.
    pub throughputs: Vec<T>,
    /// The demand of each customer.
    pub demands: Vec<T>,
    pub costs: CostTables,
}

/// How an echelon network is turned into a model.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Mode<T = i64> {
    /// Node limits as constraints, no dummy node.
    Factory,
    /// Edge capacities from node limits, balanced by a dummy node.
    Graph(BalancePolicy<T>),
}

/// The constraint family of a model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Shape {
    /// Flow conservation at every node plus edge capacities.
    FlowConservation,
    /// Plant capacity, warehouse throughput and pass-through, customer demand.
    MultiEchelon,
}

/// A network together with the form of its constraints.
#[derive(Clone, Debug, PartialEq)]
pub struct Model<T = i64> {
    network: Network<T>,
    shape: Shape,
    topology: Option<Topology>,
    limits: Option<Limits<T>>,
}

impl<T: Quantity> Model<T> {
    /// A flow conservation model of a generic network.
    pub fn flow(network: Network<T>) -> Self {
        Model {
            network,
            shape: Shape::FlowConservation,
            topology: None,
            limits: None,
        }
    }

    pub fn network(&self) -> &Network<T> {
        &self.network
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// The echelon layers, `None` for generic networks.
    pub fn topology(&self) -> Option<&Topology> {
        self.topology.as_ref()
    }

    /// The echelon node limits, `None` for generic networks.
    pub fn limits(&self) -> Option<&Limits<T>> {
        self.limits.as_ref()
    }

    pub fn into_network(self) -> Network<T> {
        self.network
    }
}

impl<T: Quantity> EchelonParams<T> {
    /// The node limits.
    pub fn limits(&self) -> Limits<T> {
        Limits {
            capacities: self.capacities.clone(),
            throughputs: self.throughputs.clone(),
            demands: self.demands.clone(),
        }
    }

    /// The node registry.
    pub fn topology(&self) -> Topology {
        Topology::new(self.capacities.len(), self.throughputs.len(), self.demands.len())
    }

    /// Build the model.
    ///
    /// The nodes are the plants (supply = capacity), the warehouses
    /// (supply 0) and the customers (supply = -demand), in this order.
    /// The edges are those with a defined cost, plant->warehouse first,
    /// then plant->customer, then warehouse->customer. In graph mode the
    /// dummy node and its edges come last.
    ///
    /// Any dimension mismatch or invalid value is reported before the
    /// first edge is created.
    pub fn build(&self, mode: &Mode<T>) -> Result<Model<T>> {
        let topology = self.topology();
        let limits = self.limits();
        limits.check(&topology)?;
        let edges = EdgeSets::map(&topology, &self.costs)?;

        debug!(
            "building echelon network with {} plants, {} warehouses, {} customers and {} edges",
            topology.plants().len(),
            topology.warehouses().len(),
            topology.customers().len(),
            edges.len()
        );

        let mut b = NetworkBuilder::with_capacities(topology.num_nodes() + 1, edges.len() + 2);
        b.add_nodes(topology.plants().iter().zip(&self.capacities).map(|(&u, &c)| (u, c)))?;
        b.add_nodes(topology.warehouses().iter().map(|&u| (u, T::zero())))?;
        b.add_nodes(topology.customers().iter().zip(&self.demands).map(|(&u, &d)| (u, -d)))?;

        match mode {
            Mode::Factory => {
                for e in edges.iter() {
                    b.add_edge(e.src, e.snk, e.cost, None)?;
                }
                Ok(Model {
                    network: b.into_network(),
                    shape: Shape::MultiEchelon,
                    topology: Some(topology),
                    limits: Some(limits),
                })
            }
            Mode::Graph(policy) => {
                for e in edges.iter() {
                    let cap = limits.derive(e.src, e.snk)?;
                    debug!("capacity of ({},{}) is {}", e.src, e.snk, cap);
                    b.add_edge(e.src, e.snk, e.cost, Some(cap))?;
                }
                let network = balance(b.into_network(), topology.plants(), policy)?;
                Ok(Model {
                    network,
                    shape: Shape::FlowConservation,
                    topology: Some(topology),
                    limits: Some(limits),
                })
            }
        }
    }
}
