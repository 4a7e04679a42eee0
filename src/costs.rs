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

//! Mapping sparse cost tables onto the edges of an echelon network.
//!
//! A cost table has one row per *destination* and one column per
//! *origin*, so entry `[k][i]` is the cost of sending one unit from
//! origin `i` to destination `k`. A missing entry means that the edge
//! does not exist at all.

use crate::error::{Error, Result};
use crate::network::NodeId;
use crate::topology::{EdgeClass, Topology};

use log::debug;
use std::collections::HashMap;

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

/// A sparse cost table, indexed by `[destination][origin]`.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialize", serde(transparent))]
pub struct CostTable {
    rows: Vec<Vec<Option<f64>>>,
}

impl CostTable {
    pub fn new(rows: Vec<Vec<Option<f64>>>) -> Self {
        CostTable { rows }
    }

    /// The number of rows (destinations).
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// The cost from origin `org` to destination `dst`.
    pub fn get(&self, dst: usize, org: usize) -> Option<f64> {
        self.rows.get(dst).and_then(|row| row.get(org)).copied().flatten()
    }

    /// Ensure the table has `nrows` rows with `ncols` entries each.
    fn check_dimensions(&self, class: EdgeClass, nrows: usize, ncols: usize) -> Result<()> {
        if self.rows.len() != nrows {
            return Err(Error::Dimension {
                what: format!("{} cost table rows", class),
                expected: nrows,
                found: self.rows.len(),
            });
        }
        for (k, row) in self.rows.iter().enumerate() {
            if row.len() != ncols {
                return Err(Error::Dimension {
                    what: format!("{} cost table row {}", class, k + 1),
                    expected: ncols,
                    found: row.len(),
                });
            }
        }
        Ok(())
    }
}

impl From<Vec<Vec<Option<f64>>>> for CostTable {
    fn from(rows: Vec<Vec<Option<f64>>>) -> Self {
        CostTable::new(rows)
    }
}

/// The cost tables of the three edge classes.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct CostTables {
    /// Rows: warehouses, columns: plants.
    pub plant_warehouse: CostTable,
    /// Rows: customers, columns: plants.
    pub plant_customer: CostTable,
    /// Rows: customers, columns: warehouses.
    pub warehouse_customer: CostTable,
}

impl CostTables {
    pub fn table(&self, class: EdgeClass) -> &CostTable {
        match class {
            EdgeClass::PlantWarehouse => &self.plant_warehouse,
            EdgeClass::PlantCustomer => &self.plant_customer,
            EdgeClass::WarehouseCustomer => &self.warehouse_customer,
        }
    }
}

/// The cost of an existing edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CostedEdge {
    pub src: NodeId,
    pub snk: NodeId,
    pub cost: f64,
    pub class: EdgeClass,
}

/// The edges of an echelon network that have a defined cost.
///
/// All edge collections are views of a single pruned list, so an edge is
/// contained in a collection iff its cost is defined. The combined list
/// holds the plant->warehouse edges, then the plant->customer edges,
/// then the warehouse->customer edges.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct EdgeSets {
    edges: Vec<CostedEdge>,
    index: HashMap<(NodeId, NodeId), usize>,
}

impl EdgeSets {
    /// Map the cost tables onto the candidate edges of `topology`.
    ///
    /// Fails if a table does not match the dimensions of the topology or
    /// contains a non-finite cost. All tables are checked before a
    /// single edge is created.
    pub fn map(topology: &Topology, tables: &CostTables) -> Result<EdgeSets> {
        for &class in EdgeClass::ALL.iter() {
            let table = tables.table(class);
            table.check_dimensions(
                class,
                topology.destinations(class).len(),
                topology.origins(class).len(),
            )?;
        }

        let mut edges = Vec::new();
        for &class in EdgeClass::ALL.iter() {
            let table = tables.table(class);
            let dsts = topology.destinations(class);
            for (i, &src) in topology.origins(class).iter().enumerate() {
                for (k, &snk) in dsts.iter().enumerate() {
                    if let Some(cost) = table.get(k, i) {
                        if !cost.is_finite() {
                            return Err(Error::InvalidCost { src, snk, cost });
                        }
                        edges.push(CostedEdge { src, snk, cost, class });
                    }
                }
            }
        }

        debug!(
            "mapped costs: {} of {} candidate edges exist",
            edges.len(),
            EdgeClass::ALL
                .iter()
                .map(|&c| topology.origins(c).len() * topology.destinations(c).len())
                .sum::<usize>()
        );

        let index = edges.iter().enumerate().map(|(i, e)| ((e.src, e.snk), i)).collect();
        Ok(EdgeSets { edges, index })
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// All edges with their costs.
    pub fn iter(&self) -> impl Iterator<Item = &CostedEdge> + '_ {
        self.edges.iter()
    }

    /// All edges.
    pub fn all(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.edges.iter().map(|e| (e.src, e.snk))
    }

    /// The edges of one class.
    pub fn of_class(&self, class: EdgeClass) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.edges
            .iter()
            .filter(move |e| e.class == class)
            .map(|e| (e.src, e.snk))
    }

    pub fn plant_warehouse(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.of_class(EdgeClass::PlantWarehouse)
    }

    pub fn plant_customer(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.of_class(EdgeClass::PlantCustomer)
    }

    pub fn warehouse_customer(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.of_class(EdgeClass::WarehouseCustomer)
    }

    /// The cost of edge `(u,v)`, `None` if the edge does not exist.
    pub fn cost(&self, u: NodeId, v: NodeId) -> Option<f64> {
        self.index.get(&(u, v)).map(|&i| self.edges[i].cost)
    }
}

#[cfg(test)]
mod tests {
    use super::{CostTable, CostTables, EdgeSets};
    use crate::error::Error;
    use crate::network::NodeId::*;
    use crate::scenarios;
    use crate::topology::{EdgeClass, Topology};

    fn tables() -> CostTables {
        CostTables {
            // 2 warehouses x 1 plant
            plant_warehouse: vec![vec![Some(1.0)], vec![None]].into(),
            // 2 customers x 1 plant
            plant_customer: vec![vec![None], vec![Some(3.0)]].into(),
            // 2 customers x 2 warehouses
            warehouse_customer: vec![vec![Some(0.5), Some(2.0)], vec![None, Some(0.0)]].into(),
        }
    }

    #[test]
    fn test_indexing() {
        let t = Topology::new(1, 2, 2);
        let sets = EdgeSets::map(&t, &tables()).unwrap();

        // entry [k][i] is the cost from origin i to destination k
        assert_eq!(sets.cost(Warehouse(1), Customer(0)), Some(2.0));
        assert_eq!(sets.cost(Warehouse(0), Customer(1)), None);
        assert_eq!(sets.cost(Plant(0), Customer(1)), Some(3.0));
        // zero is a defined cost
        assert_eq!(sets.cost(Warehouse(1), Customer(1)), Some(0.0));

        let all: Vec<_> = sets.all().collect();
        assert_eq!(
            all,
            vec![
                (Plant(0), Warehouse(0)),
                (Plant(0), Customer(1)),
                (Warehouse(0), Customer(0)),
                (Warehouse(1), Customer(0)),
                (Warehouse(1), Customer(1)),
            ]
        );
    }

    #[test]
    fn test_pruning_is_consistent() {
        let params = scenarios::crown();
        let t = Topology::new(2, 4, 6);
        let sets = EdgeSets::map(&t, &params.costs).unwrap();

        let mut classes = 0;
        for &class in EdgeClass::ALL.iter() {
            let table = params.costs.table(class);
            for (i, &u) in t.origins(class).iter().enumerate() {
                for (k, &v) in t.destinations(class).iter().enumerate() {
                    let defined = table.get(k, i).is_some();
                    assert_eq!(sets.all().any(|e| e == (u, v)), defined);
                    assert_eq!(sets.of_class(class).any(|e| e == (u, v)), defined);
                    assert_eq!(sets.cost(u, v).is_some(), defined);
                }
            }
            classes += sets.of_class(class).count();
        }
        assert_eq!(classes, sets.len());

        assert_eq!(sets.plant_warehouse().count(), 7);
        assert_eq!(sets.plant_customer().count(), 5);
        assert_eq!(sets.warehouse_customer().count(), 17);
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut costs = tables();
        costs.warehouse_customer = vec![vec![Some(0.5), Some(2.0)], vec![None]].into();
        match EdgeSets::map(&Topology::new(1, 2, 2), &costs) {
            Err(Error::Dimension { expected, found, .. }) => {
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            r => panic!("unexpected result {:?}", r),
        }

        // one warehouse too many in the topology
        assert!(matches!(
            EdgeSets::map(&Topology::new(1, 3, 2), &tables()),
            Err(Error::Dimension { .. })
        ));
    }

    #[test]
    fn test_invalid_cost() {
        let mut costs = tables();
        costs.plant_customer = CostTable::new(vec![vec![None], vec![Some(f64::INFINITY)]]);
        assert!(matches!(
            EdgeSets::map(&Topology::new(1, 2, 2), &costs),
            Err(Error::InvalidCost { src: Plant(0), snk: Customer(1), .. })
        ));
    }
}
