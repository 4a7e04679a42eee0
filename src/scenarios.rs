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

//! Reference instances.
//!
//! - [`small`]: a generic network with 4 nodes, optimal value 14.
//! - [`medium`]: a generic network with 5 nodes, optimal value 150.
//! - [`crown`]: the Crown distributors echelon network with 2 plants,
//!   4 warehouses and 6 customers.

use crate::builder::Buildable;
use crate::costs::CostTables;
use crate::echelon::EchelonParams;
use crate::network::{Network, NodeId};

/// A generic network with nodes `0..supplies.len()`.
///
/// Only used for the fixed reference data, which is a valid network.
fn generic(supplies: &[i64], edges: &[(usize, usize, f64, i64)]) -> Network {
    Network::new_with(|b| {
        b.reserve(supplies.len(), edges.len());
        b.add_nodes(supplies.iter().enumerate().map(|(i, &s)| (NodeId::Index(i), s)))?;
        for &(u, v, cost, cap) in edges {
            b.add_edge(NodeId::Index(u), NodeId::Index(v), cost, Some(cap))?;
        }
        Ok(())
    })
    .expect("reference data is a valid network")
}

/// The 4 node network.
///
/// The optimal flow is `(0,1)=3`, `(0,3)=2`, `(2,1)=3` with value 14.
pub fn small() -> Network {
    generic(
        &[5, -6, 3, -2],
        &[(0, 1, 0.0, 5), (0, 3, 4.0, 2), (2, 1, 2.0, 3), (2, 3, 8.0, 2)],
    )
}

/// The 5 node network with optimal value 150.
pub fn medium() -> Network {
    generic(
        &[20, 0, 0, -5, -15],
        &[
            (0, 1, 4.0, 15),
            (0, 2, 4.0, 8),
            (1, 2, 2.0, 20),
            (1, 3, 2.0, 4),
            (1, 4, 6.0, 10),
            (2, 3, 1.0, 15),
            (2, 4, 3.0, 4),
            (3, 4, 2.0, 20),
            (4, 2, 3.0, 5),
        ],
    )
}

/// The Crown distributors network.
///
/// Total capacity exceeds total demand by 135000.
pub fn crown() -> EchelonParams {
    EchelonParams {
        capacities: vec![150_000, 200_000],
        throughputs: vec![70_000, 50_000, 100_000, 40_000],
        demands: vec![50_000, 10_000, 40_000, 35_000, 60_000, 20_000],
        costs: CostTables {
            plant_warehouse: vec![
                vec![Some(0.5), None],
                vec![Some(0.5), Some(0.3)],
                vec![Some(1.0), Some(0.5)],
                vec![Some(0.2), Some(0.2)],
            ]
            .into(),
            plant_customer: vec![
                vec![Some(1.0), Some(2.0)],
                vec![None, None],
                vec![Some(1.5), None],
                vec![Some(2.0), None],
                vec![None, None],
                vec![Some(1.0), None],
            ]
            .into(),
            warehouse_customer: vec![
                vec![None, Some(1.0), None, None],
                vec![Some(1.5), Some(0.5), Some(1.5), None],
                vec![Some(0.5), Some(0.5), Some(2.0), Some(0.2)],
                vec![Some(1.5), Some(1.0), None, Some(1.5)],
                vec![None, Some(0.5), Some(0.5), Some(0.5)],
                vec![Some(1.0), None, Some(1.5), Some(1.5)],
            ]
            .into(),
        },
    }
}
