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

//! Errors raised while constructing, balancing or reading a network.
//!
//! Solve-time outcomes (infeasible, unbounded, solver failure) are *not*
//! errors, they are reported by [`SolutionState`](crate::solver::SolutionState).

use crate::network::NodeId;
use std::io;
use thiserror::Error;

/// Error when building a network model.
#[derive(Debug, Error)]
pub enum Error {
    /// A table or limit vector does not match the declared dimensions.
    #[error("dimension mismatch in {what}: expected {expected}, got {found}")]
    Dimension { what: String, expected: usize, found: usize },

    /// A cost is not a finite number.
    #[error("invalid cost {cost} on edge ({src},{snk})")]
    InvalidCost { src: NodeId, snk: NodeId, cost: f64 },

    /// A capacity, throughput or demand is negative.
    #[error("invalid limit {value} at node {node} (must be non-negative)")]
    InvalidLimit { node: NodeId, value: String },

    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("node {0} has been added twice")]
    DuplicateNode(NodeId),

    #[error("parallel edge ({0},{1})")]
    DuplicateEdge(NodeId, NodeId),

    #[error("invalid loop at node {0}")]
    Loop(NodeId),

    #[error("negative capacity {capacity} on edge ({src},{snk})")]
    NegativeCapacity {
        src: NodeId,
        snk: NodeId,
        capacity: String,
    },

    /// An imbalance must be absorbed but there is no origin node to connect the dummy node to.
    #[error("no origin node available to absorb an imbalance of {0}")]
    NoOrigin(String),

    /// The split policy cannot distribute the imbalance over the origins.
    #[error("cannot split {excess} over {origins} origin(s): {msg}")]
    SplitMismatch { excess: String, origins: usize, msg: String },

    /// A sum of quantities does not fit into the quantity type.
    #[error("overflow in {0}")]
    Overflow(String),

    /// A flow conservation model has been requested for an unbalanced network.
    #[error("network is unbalanced (total supply {0})")]
    Unbalanced(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("format error on line {line}: {msg}")]
    Format { line: usize, msg: String },

    #[error("data error on line {line}: {msg}")]
    Data { line: usize, msg: String },
}

pub type Result<T> = std::result::Result<T, Error>;
