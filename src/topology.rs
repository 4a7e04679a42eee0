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

//! The node registry of a three-echelon distribution network.
//!
//! Plants, warehouses and customers receive their identifiers exactly
//! once, here, and are threaded everywhere else. The candidate edges of
//! each edge class form a complete bipartite graph between the two
//! layers, enumerated origin-major.

use crate::network::NodeId;
use std::fmt;

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

/// The three classes of edges in an echelon network.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum EdgeClass {
    PlantWarehouse,
    PlantCustomer,
    WarehouseCustomer,
}

impl EdgeClass {
    /// All classes in the order their edges appear in a network.
    pub const ALL: [EdgeClass; 3] = [
        EdgeClass::PlantWarehouse,
        EdgeClass::PlantCustomer,
        EdgeClass::WarehouseCustomer,
    ];

    /// Return the class of the edge `(u,v)`, if it is an echelon edge.
    pub fn of(u: NodeId, v: NodeId) -> Option<EdgeClass> {
        match (u, v) {
            (NodeId::Plant(_), NodeId::Warehouse(_)) => Some(EdgeClass::PlantWarehouse),
            (NodeId::Plant(_), NodeId::Customer(_)) => Some(EdgeClass::PlantCustomer),
            (NodeId::Warehouse(_), NodeId::Customer(_)) => Some(EdgeClass::WarehouseCustomer),
            _ => None,
        }
    }
}

impl fmt::Display for EdgeClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            EdgeClass::PlantWarehouse => write!(f, "plant->warehouse"),
            EdgeClass::PlantCustomer => write!(f, "plant->customer"),
            EdgeClass::WarehouseCustomer => write!(f, "warehouse->customer"),
        }
    }
}

/// The nodes of an echelon network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    plants: Vec<NodeId>,
    warehouses: Vec<NodeId>,
    customers: Vec<NodeId>,
}

impl Topology {
    /// Create the registry for the given numbers of nodes.
    pub fn new(nplants: usize, nwarehouses: usize, ncustomers: usize) -> Self {
        Topology {
            plants: (0..nplants).map(NodeId::Plant).collect(),
            warehouses: (0..nwarehouses).map(NodeId::Warehouse).collect(),
            customers: (0..ncustomers).map(NodeId::Customer).collect(),
        }
    }

    pub fn plants(&self) -> &[NodeId] {
        &self.plants
    }

    pub fn warehouses(&self) -> &[NodeId] {
        &self.warehouses
    }

    pub fn customers(&self) -> &[NodeId] {
        &self.customers
    }

    pub fn num_nodes(&self) -> usize {
        self.plants.len() + self.warehouses.len() + self.customers.len()
    }

    /// All nodes: plants, then warehouses, then customers.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.plants
            .iter()
            .chain(&self.warehouses)
            .chain(&self.customers)
            .copied()
    }

    /// The tail layer of an edge class.
    pub fn origins(&self, class: EdgeClass) -> &[NodeId] {
        match class {
            EdgeClass::PlantWarehouse | EdgeClass::PlantCustomer => &self.plants,
            EdgeClass::WarehouseCustomer => &self.warehouses,
        }
    }

    /// The head layer of an edge class.
    pub fn destinations(&self, class: EdgeClass) -> &[NodeId] {
        match class {
            EdgeClass::PlantWarehouse => &self.warehouses,
            EdgeClass::PlantCustomer | EdgeClass::WarehouseCustomer => &self.customers,
        }
    }

    /// The candidate edges of a class.
    ///
    /// For every origin (in order) all destinations (in order).
    pub fn candidates(&self, class: EdgeClass) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        let dsts = self.destinations(class);
        self.origins(class)
            .iter()
            .flat_map(move |&u| dsts.iter().map(move |&v| (u, v)))
    }
}

#[cfg(test)]
mod tests {
    use super::{EdgeClass, Topology};
    use crate::network::NodeId::*;

    #[test]
    fn test_registry() {
        let t = Topology::new(2, 3, 1);
        let names: Vec<_> = t.nodes().map(|u| u.to_string()).collect();
        assert_eq!(names, vec!["p1", "p2", "w1", "w2", "w3", "c1"]);
        assert_eq!(t.num_nodes(), 6);
        assert_eq!(t.origins(EdgeClass::WarehouseCustomer), t.warehouses());
        assert_eq!(t.destinations(EdgeClass::PlantWarehouse), t.warehouses());
    }

    #[test]
    fn test_candidates() {
        let t = Topology::new(2, 2, 3);
        let pw: Vec<_> = t.candidates(EdgeClass::PlantWarehouse).collect();
        assert_eq!(
            pw,
            vec![
                (Plant(0), Warehouse(0)),
                (Plant(0), Warehouse(1)),
                (Plant(1), Warehouse(0)),
                (Plant(1), Warehouse(1)),
            ]
        );
        assert_eq!(t.candidates(EdgeClass::PlantCustomer).count(), 6);
        assert_eq!(t.candidates(EdgeClass::WarehouseCustomer).count(), 6);
        for class in EdgeClass::ALL.iter() {
            for (u, v) in t.candidates(*class) {
                assert_eq!(EdgeClass::of(u, v), Some(*class));
            }
        }
    }

    #[test]
    fn test_empty_layers() {
        let t = Topology::new(0, 2, 0);
        assert!(t.plants().is_empty());
        assert_eq!(t.nodes().count(), 2);
        for class in EdgeClass::ALL.iter() {
            assert_eq!(t.candidates(*class).count(), 0);
        }
        assert_eq!(EdgeClass::of(Customer(0), Plant(0)), None);
    }
}
