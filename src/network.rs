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

//! The flow network data structure.
//!
//! A [`Network`] is a directed graph with a supply value for each node
//! and a cost and a capacity for each edge. Nodes and edges are stored
//! in insertion order, which makes every derived model (and its solver
//! input) deterministic.
//!
//! Networks are immutable. They are created by a
//! [`NetworkBuilder`](crate::builder::NetworkBuilder).

use crate::error::{Error, Result};
use crate::num::integer::Integer;
use crate::num::traits::{PrimInt, Signed, ToPrimitive};

use std::collections::HashMap;
use std::fmt;
use std::iter::Sum;

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

/// Integral quantities: supplies, capacities, throughputs and demands.
///
/// Implemented for all primitive signed integers.
pub trait Quantity: PrimInt + Signed + Integer + Sum + fmt::Display + fmt::Debug + Send + Sync + 'static {}

impl<T> Quantity for T where T: PrimInt + Signed + Integer + Sum + fmt::Display + fmt::Debug + Send + Sync + 'static {}

/// Converts a quantity into a solver coefficient.
pub(crate) fn to_f64<T: Quantity>(x: T) -> f64 {
    // primitive integers always have a (possibly rounded) f64 value
    x.to_f64().unwrap_or(f64::NAN)
}

/// Sum up quantities, failing if an intermediate sum overflows.
pub(crate) fn checked_sum<T, I>(xs: I, what: &str) -> Result<T>
where
    T: Quantity,
    I: IntoIterator<Item = T>,
{
    xs.into_iter()
        .try_fold(T::zero(), |sum, x| sum.checked_add(&x))
        .ok_or_else(|| Error::Overflow(what.to_string()))
}

/// The identifier of a node.
///
/// Echelon networks use the typed variants, generic networks use
/// `Index`. The numbers are 0-based, the display of the typed variants
/// is 1-based (`p1` is `Plant(0)`).
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum NodeId {
    /// A node of a generic network.
    Index(usize),
    Plant(usize),
    Warehouse(usize),
    Customer(usize),
    /// The artificial node absorbing an imbalance.
    Dummy,
}

impl NodeId {
    pub fn is_plant(&self) -> bool {
        matches!(self, NodeId::Plant(_))
    }

    pub fn is_warehouse(&self) -> bool {
        matches!(self, NodeId::Warehouse(_))
    }

    pub fn is_customer(&self) -> bool {
        matches!(self, NodeId::Customer(_))
    }

    pub fn is_dummy(&self) -> bool {
        matches!(self, NodeId::Dummy)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NodeId::Index(u) => write!(f, "{}", u),
            NodeId::Plant(i) => write!(f, "p{}", i + 1),
            NodeId::Warehouse(j) => write!(f, "w{}", j + 1),
            NodeId::Customer(k) => write!(f, "c{}", k + 1),
            NodeId::Dummy => write!(f, "dummy"),
        }
    }
}

/// Data for a node in a network.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct NodeData<T> {
    pub(crate) id: NodeId,
    pub(crate) supply: T,
    /// The outgoing and incoming edges.
    pub(crate) adj: [Vec<usize>; 2],
}

/// Data for an edge in a network.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct EdgeData<T> {
    pub(crate) nodes: [usize; 2],
    pub(crate) cost: f64,
    pub(crate) capacity: Option<T>,
}

/// A flow network.
///
/// The cost and capacity maps are total over the edges and the supply
/// map is total over the nodes by construction. An edge capacity of
/// `None` means the edge is unbounded.
#[derive(Clone, Debug, PartialEq)]
pub struct Network<T = i64> {
    pub(crate) nodes: Vec<NodeData<T>>,
    pub(crate) edges: Vec<EdgeData<T>>,
    pub(crate) node_index: HashMap<NodeId, usize>,
    pub(crate) edge_index: HashMap<[usize; 2], usize>,
}

/// A reference to an edge of a network.
#[derive(Clone, Copy, Debug)]
pub struct EdgeRef<'a, T> {
    net: &'a Network<T>,
    id: usize,
}

impl<'a, T: Quantity> EdgeRef<'a, T> {
    /// The position of the edge in the network.
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn src(&self) -> NodeId {
        self.net.nodes[self.net.edges[self.id].nodes[0]].id
    }

    pub fn snk(&self) -> NodeId {
        self.net.nodes[self.net.edges[self.id].nodes[1]].id
    }

    /// The positions of source and sink node.
    pub(crate) fn ends(&self) -> [usize; 2] {
        self.net.edges[self.id].nodes
    }

    /// Return the pair `(src, snk)`.
    pub fn enodes(&self) -> (NodeId, NodeId) {
        (self.src(), self.snk())
    }

    pub fn cost(&self) -> f64 {
        self.net.edges[self.id].cost
    }

    /// The capacity of the edge, `None` if unbounded.
    pub fn capacity(&self) -> Option<T> {
        self.net.edges[self.id].capacity
    }
}

impl<T: Quantity> Network<T> {
    pub(crate) fn empty(nnodes: usize, nedges: usize) -> Self {
        Network {
            nodes: Vec::with_capacity(nnodes),
            edges: Vec::with_capacity(nedges),
            node_index: HashMap::with_capacity(nnodes),
            edge_index: HashMap::with_capacity(nedges),
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Return an iterator over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|u| u.id)
    }

    /// Return an iterator over all edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeRef<'_, T>> + '_ {
        (0..self.edges.len()).map(move |id| EdgeRef { net: self, id })
    }

    fn incident(&self, u: NodeId, dir: usize) -> impl Iterator<Item = EdgeRef<'_, T>> + '_ {
        self.node_id(u)
            .into_iter()
            .flat_map(move |uid| self.nodes[uid].adj[dir].iter())
            .map(move |&id| EdgeRef { net: self, id })
    }

    /// Return the edges leaving `u` in insertion order.
    pub fn outedges(&self, u: NodeId) -> impl Iterator<Item = EdgeRef<'_, T>> + '_ {
        self.incident(u, 0)
    }

    /// Return the edges entering `u` in insertion order.
    pub fn inedges(&self, u: NodeId) -> impl Iterator<Item = EdgeRef<'_, T>> + '_ {
        self.incident(u, 1)
    }

    /// Return the position of node `u`.
    pub fn node_id(&self, u: NodeId) -> Option<usize> {
        self.node_index.get(&u).copied()
    }

    /// Return the node at position `id`.
    pub fn id2node(&self, id: usize) -> NodeId {
        self.nodes[id].id
    }

    /// Return the position of the edge `(u,v)`.
    pub fn edge_id(&self, u: NodeId, v: NodeId) -> Option<usize> {
        let uid = self.node_id(u)?;
        let vid = self.node_id(v)?;
        self.edge_index.get(&[uid, vid]).copied()
    }

    /// Return the edge at position `id`.
    pub fn id2edge(&self, id: usize) -> EdgeRef<'_, T> {
        assert!(id < self.edges.len(), "invalid edge id {}", id);
        EdgeRef { net: self, id }
    }

    /// Return the edge `(u,v)` if it exists.
    pub fn edge(&self, u: NodeId, v: NodeId) -> Option<EdgeRef<'_, T>> {
        self.edge_id(u, v).map(|id| EdgeRef { net: self, id })
    }

    pub fn contains_node(&self, u: NodeId) -> bool {
        self.node_index.contains_key(&u)
    }

    pub fn contains_edge(&self, u: NodeId, v: NodeId) -> bool {
        self.edge_id(u, v).is_some()
    }

    /// The supply (positive) or demand (negative) of node `u`.
    pub fn supply(&self, u: NodeId) -> Option<T> {
        self.node_id(u).map(|id| self.nodes[id].supply)
    }

    /// The cost of edge `(u,v)`, `None` if there is no such edge.
    pub fn cost(&self, u: NodeId, v: NodeId) -> Option<f64> {
        self.edge(u, v).map(|e| e.cost())
    }

    /// Return all `(node, supply)` pairs in insertion order.
    pub fn supplies(&self) -> impl Iterator<Item = (NodeId, T)> + '_ {
        self.nodes.iter().map(|u| (u.id, u.supply))
    }

    /// The sum of all supplies.
    ///
    /// This is zero iff total supply equals total demand. Fails if the
    /// sum does not fit into `T`.
    pub fn total_supply(&self) -> Result<T> {
        checked_sum(self.nodes.iter().map(|u| u.supply), "total supply")
    }

    /// Return `true` if the supplies sum up to zero.
    ///
    /// A network whose total supply overflows is not balanced.
    pub fn is_balanced(&self) -> bool {
        matches!(self.total_supply(), Ok(s) if s.is_zero())
    }
}
