// Copyright (c) 2015-2022 Frank Fischer <frank-fischer@shadow-soft.de>
//
// This program is free software: you can redistribute it and/or
// modify it under the terms of the GNU General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see  <http://www.gnu.org/licenses/>
//

#![forbid(unsafe_code)]

//! A library for building minimum cost flow models.
//!
//! Networks are either assembled node by node with a
//! [`NetworkBuilder`] or generated from the business data of a
//! three-echelon distribution network ([`EchelonParams`]): plants,
//! warehouses and customers with capacities, throughputs, demands and
//! sparse cost tables. The generation runs in a fixed order:
//!
//! 1. the [`Topology`] registers the nodes of the three layers,
//! 2. the cost tables are mapped onto edges ([`EdgeSets`]),
//! 3. in graph mode, edge capacities are derived from the node limits
//!    ([`Limits::derive`]),
//! 4. in graph mode, a dummy node balances supply and demand
//!    ([`balance`]),
//! 5. the [`Model`] is turned into a [`LinearModel`] ([`formulate`]),
//! 6. a [`Solver`] computes a [`Solution`].
//!
//! ```
//! use rs_flownet::{scenarios, solve_model, BalancePolicy, MicroLp, Mode, SolverOptions};
//!
//! let params = scenarios::crown();
//! let model = params.build(&Mode::Graph(BalancePolicy::crown())).unwrap();
//! assert!(model.network().is_balanced());
//!
//! let sol = solve_model(&MicroLp, &model, &SolverOptions::default()).unwrap();
//! assert!(sol.is_optimal());
//! ```

mod num {
    pub use num_integer as integer;
    pub use num_traits as traits;
}

pub mod error;
pub use self::error::{Error, Result};

// # Networks

pub mod network;
pub use self::network::{EdgeRef, Network, NodeId, Quantity};

pub mod builder;
pub use self::builder::{Buildable, NetworkBuilder};

// # Echelon networks

pub mod topology;
pub use self::topology::{EdgeClass, Topology};

pub mod costs;
pub use self::costs::{CostTable, CostTables, EdgeSets};

pub mod capacity;
pub use self::capacity::Limits;

pub mod balance;
pub use self::balance::{balance, BalancePolicy, SplitPolicy};

pub mod echelon;
pub use self::echelon::{EchelonParams, Mode, Model, Shape};

pub mod scenarios;

// # Models and solvers

pub mod formulation;
pub use self::formulation::{formulate, LinearModel};

pub mod solver;
pub use self::solver::{solve_model, MicroLp, Solution, SolutionState, Solver, SolverOptions};

pub mod netsimplex;
pub use self::netsimplex::NetSimplex;

// # File formats

#[cfg(feature = "dimacs")]
pub mod dimacs;
#[cfg(feature = "mps")]
pub mod mps;
