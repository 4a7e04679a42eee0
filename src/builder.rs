/*
 * Copyright (c) 2017-2022 Frank Fischer <frank-fischer@shadow-soft.de>
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

//! Constructing networks.
//!
//! Networks are static objects. In order to build a network one uses a
//! [`NetworkBuilder`] and, once the construction is complete, converts
//! it into a [`Network`]. Every structural invariant of the network (no
//! loops, no parallel edges, endpoints exist, non-negative capacities,
//! finite costs) is checked when an item is added, so a finished
//! network is always valid.

use crate::error::{Error, Result};
use crate::network::{EdgeData, Network, NodeData, NodeId, Quantity};

use log::trace;

/// A builder for a [`Network`].
#[derive(Clone, Debug)]
pub struct NetworkBuilder<T = i64> {
    net: Network<T>,
}

impl<T: Quantity> Default for NetworkBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Quantity> NetworkBuilder<T> {
    /// Create a new, empty builder.
    pub fn new() -> Self {
        Self::with_capacities(0, 0)
    }

    /// Create a new, empty builder.
    ///
    /// The builder might be passed a guess of the number of nodes and
    /// edges. This is used to reserve the appropriate internal memory
    /// but is no strict requirement for the number of nodes and edges
    /// to be added.
    pub fn with_capacities(nnodes: usize, nedges: usize) -> Self {
        NetworkBuilder {
            net: Network::empty(nnodes, nedges),
        }
    }

    /// Reserve memory for a certain number of nodes and edges.
    pub fn reserve(&mut self, nnodes: usize, nedges: usize) {
        self.net.nodes.reserve(nnodes);
        self.net.edges.reserve(nedges);
        self.net.node_index.reserve(nnodes);
        self.net.edge_index.reserve(nedges);
    }

    /// Return the current number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.net.num_nodes()
    }

    /// Return the current number of edges.
    pub fn num_edges(&self) -> usize {
        self.net.num_edges()
    }

    /// Return the current sum of all supplies.
    pub fn total_supply(&self) -> Result<T> {
        self.net.total_supply()
    }

    /// Add a new node with the given supply.
    pub fn add_node(&mut self, u: NodeId, supply: T) -> Result<()> {
        if self.net.contains_node(u) {
            return Err(Error::DuplicateNode(u));
        }
        trace!("add node {} with supply {}", u, supply);
        self.net.node_index.insert(u, self.net.nodes.len());
        self.net.nodes.push(NodeData {
            id: u,
            supply,
            adj: [vec![], vec![]],
        });
        Ok(())
    }

    /// Add several new nodes.
    pub fn add_nodes<I>(&mut self, nodes: I) -> Result<()>
    where
        I: IntoIterator<Item = (NodeId, T)>,
    {
        for (u, supply) in nodes {
            self.add_node(u, supply)?;
        }
        Ok(())
    }

    /// Add a new edge.
    ///
    /// A capacity of `None` means the edge is unbounded.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId, cost: f64, capacity: Option<T>) -> Result<()> {
        let uid = self.net.node_id(u).ok_or(Error::UnknownNode(u))?;
        let vid = self.net.node_id(v).ok_or(Error::UnknownNode(v))?;

        if uid == vid {
            return Err(Error::Loop(u));
        }
        if self.net.edge_index.contains_key(&[uid, vid]) {
            return Err(Error::DuplicateEdge(u, v));
        }
        if !cost.is_finite() {
            return Err(Error::InvalidCost { src: u, snk: v, cost });
        }
        if let Some(cap) = capacity {
            if cap.is_negative() {
                return Err(Error::NegativeCapacity {
                    src: u,
                    snk: v,
                    capacity: cap.to_string(),
                });
            }
        }

        trace!("add edge ({},{}) with cost {} and capacity {:?}", u, v, cost, capacity);
        let eid = self.net.edges.len();
        self.net.edge_index.insert([uid, vid], eid);
        self.net.nodes[uid].adj[0].push(eid);
        self.net.nodes[vid].adj[1].push(eid);
        self.net.edges.push(EdgeData {
            nodes: [uid, vid],
            cost,
            capacity,
        });
        Ok(())
    }

    /// Turn the builder into a network.
    pub fn into_network(self) -> Network<T> {
        self.net
    }
}

impl<T: Quantity> From<Network<T>> for NetworkBuilder<T> {
    /// Continue building on top of an existing network.
    fn from(net: Network<T>) -> Self {
        NetworkBuilder { net }
    }
}

/// A network type with a default builder.
pub trait Buildable
where
    Self: Sized,
{
    type Builder;

    /// Create a new builder for this network type.
    fn new_builder() -> Self::Builder;

    /// Create a new network by passing the builder to the callback `f`.
    ///
    /// # Example
    ///
    /// ```
    /// use rs_flownet::{Buildable, Network, NodeId};
    ///
    /// let net = Network::<i64>::new_with(|b| {
    ///     b.add_node(NodeId::Index(0), 3)?;
    ///     b.add_node(NodeId::Index(1), -3)?;
    ///     b.add_edge(NodeId::Index(0), NodeId::Index(1), 1.5, Some(5))
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(net.num_nodes(), 2);
    /// assert_eq!(net.num_edges(), 1);
    /// ```
    fn new_with<F>(f: F) -> Result<Self>
    where
        F: FnOnce(&mut Self::Builder) -> Result<()>;
}

impl<T: Quantity> Buildable for Network<T> {
    type Builder = NetworkBuilder<T>;

    fn new_builder() -> Self::Builder {
        NetworkBuilder::new()
    }

    fn new_with<F>(f: F) -> Result<Self>
    where
        F: FnOnce(&mut Self::Builder) -> Result<()>,
    {
        let mut b = Self::new_builder();
        f(&mut b)?;
        Ok(b.into_network())
    }
}
