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

//! Standalone node limits and the edge capacities derived from them.

use crate::error::{Error, Result};
use crate::network::{NodeId, Quantity};
use crate::topology::Topology;

use std::cmp::min;

/// The standalone limits of the nodes of an echelon network.
#[derive(Clone, Debug, PartialEq)]
pub struct Limits<T = i64> {
    /// The production capacity of each plant.
    pub capacities: Vec<T>,
    /// The throughput of each warehouse.
    pub throughputs: Vec<T>,
    /// The demand of each customer.
    pub demands: Vec<T>,
}

impl<T: Quantity> Limits<T> {
    /// Ensure the limits fit `topology` and are non-negative.
    pub fn check(&self, topology: &Topology) -> Result<()> {
        let layers = [
            ("plant capacities", topology.plants(), &self.capacities),
            ("warehouse throughputs", topology.warehouses(), &self.throughputs),
            ("customer demands", topology.customers(), &self.demands),
        ];
        for (what, nodes, values) in layers.iter() {
            if nodes.len() != values.len() {
                return Err(Error::Dimension {
                    what: what.to_string(),
                    expected: nodes.len(),
                    found: values.len(),
                });
            }
            if let Some((&node, value)) = nodes.iter().zip(values.iter()).find(|(_, x)| x.is_negative()) {
                return Err(Error::InvalidLimit {
                    node,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    /// The standalone limit of node `u`.
    ///
    /// This is the capacity of a plant, the throughput of a warehouse or
    /// the demand of a customer. Other nodes have no limit.
    pub fn limit(&self, u: NodeId) -> Option<T> {
        match u {
            NodeId::Plant(i) => self.capacities.get(i).copied(),
            NodeId::Warehouse(j) => self.throughputs.get(j).copied(),
            NodeId::Customer(k) => self.demands.get(k).copied(),
            NodeId::Index(_) | NodeId::Dummy => None,
        }
    }

    /// The capacity of edge `(u,v)`: the smaller of both endpoint limits.
    ///
    /// No edge may carry more than either endpoint can pass on its own.
    pub fn derive(&self, u: NodeId, v: NodeId) -> Result<T> {
        let lu = self.limit(u).ok_or(Error::UnknownNode(u))?;
        let lv = self.limit(v).ok_or(Error::UnknownNode(v))?;
        Ok(min(lu, lv))
    }
}

#[cfg(test)]
mod tests {
    use super::Limits;
    use crate::error::Error;
    use crate::network::NodeId::*;
    use crate::topology::Topology;

    fn limits() -> Limits {
        Limits {
            capacities: vec![150, 200],
            throughputs: vec![70, 250],
            demands: vec![50, 300],
        }
    }

    #[test]
    fn test_derive() {
        let l = limits();
        assert_eq!(l.derive(Plant(0), Warehouse(0)).unwrap(), 70);
        assert_eq!(l.derive(Plant(1), Warehouse(1)).unwrap(), 200);
        assert_eq!(l.derive(Plant(0), Customer(1)).unwrap(), 150);
        assert_eq!(l.derive(Warehouse(1), Customer(1)).unwrap(), 250);
        assert_eq!(l.derive(Warehouse(1), Customer(0)).unwrap(), 50);
        assert!(matches!(l.derive(Plant(2), Customer(0)), Err(Error::UnknownNode(Plant(2)))));
        assert!(matches!(l.derive(Dummy, Customer(0)), Err(Error::UnknownNode(Dummy))));
    }

    #[test]
    fn test_check() {
        let l = limits();
        assert!(l.check(&Topology::new(2, 2, 2)).is_ok());
        assert!(matches!(l.check(&Topology::new(2, 3, 2)), Err(Error::Dimension { .. })));

        let mut neg = limits();
        neg.demands[1] = -1;
        match neg.check(&Topology::new(2, 2, 2)) {
            Err(Error::InvalidLimit { node, .. }) => assert_eq!(node, Customer(1)),
            r => panic!("unexpected result {:?}", r),
        }
    }
}
