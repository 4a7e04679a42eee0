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

//! Balancing total supply and total demand.
//!
//! A flow conservation model is only feasible if the supplies of all
//! nodes sum up to zero. If they do not, an artificial [`NodeId::Dummy`]
//! node takes the residual `excess` as its (negated) supply and is
//! joined to some origin nodes by zero-cost edges whose capacities add
//! up to `|excess|`.
//!
//! - If there is surplus supply (`excess > 0`), the dummy node is a sink
//!   and the edges run from the origins to the dummy node.
//! - If there is surplus demand (`excess < 0`), the dummy node is a
//!   source and the edges run from the dummy node to the origins.
//!
//! How `|excess|` is distributed over the connecting edges is decided
//! by a [`SplitPolicy`].

use crate::builder::NetworkBuilder;
use crate::error::{Error, Result};
use crate::network::{checked_sum, Network, NodeId, Quantity};

use crate::num::traits::NumCast;
use log::{debug, info};

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

/// The capacities of the Crown distributors reference split.
const CROWN_SPLIT: [i64; 2] = [80_000, 55_000];

/// How the imbalance is distributed over the connecting edges.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum SplitPolicy<T = i64> {
    /// Equal shares rounded down, the last origin takes the remainder.
    ///
    /// For two origins this is `excess / 2` and `excess - excess / 2`.
    Halves,
    /// Literal capacities, one per origin, summing up to `|excess|`.
    Fixed(Vec<T>),
    /// The split `[80000, 55000]` of the Crown distributors example.
    ///
    /// Together with its data this reproduces the optimal plan of the
    /// factory model.
    CrownReference,
}

impl<T: Quantity> SplitPolicy<T> {
    /// Distribute `amount` over `n` origins.
    pub fn split(&self, amount: T, n: usize) -> Result<Vec<T>> {
        let mismatch = |msg: String| Error::SplitMismatch {
            excess: amount.to_string(),
            origins: n,
            msg,
        };

        if n == 0 {
            return Err(mismatch("no origins".to_string()));
        }

        let shares = match self {
            SplitPolicy::Halves => {
                let cnt = <T as NumCast>::from(n).ok_or_else(|| mismatch("too many origins".to_string()))?;
                let share = amount.div_floor(&cnt);
                let mut shares = vec![share; n - 1];
                shares.push(amount - share * (cnt - T::one()));
                shares
            }
            SplitPolicy::Fixed(values) => values.clone(),
            SplitPolicy::CrownReference => CROWN_SPLIT
                .iter()
                .map(|&x| <T as NumCast>::from(x))
                .collect::<Option<Vec<T>>>()
                .ok_or_else(|| mismatch("reference split does not fit the quantity type".to_string()))?,
        };

        if shares.len() != n {
            return Err(mismatch(format!("got {} capacities", shares.len())));
        }
        if shares.iter().any(|x| x.is_negative()) {
            return Err(mismatch("negative capacity".to_string()));
        }
        let total = checked_sum(shares.iter().copied(), "split capacities")?;
        if total != amount {
            return Err(mismatch(format!("capacities sum up to {}", total)));
        }

        Ok(shares)
    }
}

/// The configuration of the balancing step.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialize", serde(default))]
pub struct BalancePolicy<T = i64> {
    /// The maximal number of origins joined to the dummy node.
    ///
    /// The first `max_origins` candidates are used.
    pub max_origins: usize,
    pub split: SplitPolicy<T>,
}

impl<T> Default for BalancePolicy<T> {
    fn default() -> Self {
        BalancePolicy {
            max_origins: 2,
            split: SplitPolicy::Halves,
        }
    }
}

impl<T> BalancePolicy<T> {
    /// The policy reproducing the Crown distributors reference result.
    pub fn crown() -> Self {
        BalancePolicy {
            max_origins: 2,
            split: SplitPolicy::CrownReference,
        }
    }
}

/// Balance the network.
///
/// `candidates` are the possible origin nodes in order of preference
/// (the plants for an echelon network). If the network is balanced it is
/// returned unchanged. Otherwise a dummy node and at most
/// `policy.max_origins` connecting edges are added. No other supply,
/// cost or capacity is modified.
pub fn balance<T: Quantity>(net: Network<T>, candidates: &[NodeId], policy: &BalancePolicy<T>) -> Result<Network<T>> {
    let excess = net.total_supply()?;
    if excess.is_zero() {
        debug!("network is balanced, no dummy node required");
        return Ok(net);
    }

    let origins = &candidates[..candidates.len().min(policy.max_origins)];
    if origins.is_empty() {
        return Err(Error::NoOrigin(excess.to_string()));
    }
    if let Some(&u) = origins.iter().find(|&&u| !net.contains_node(u)) {
        return Err(Error::UnknownNode(u));
    }

    // `-T::min_value()` does not exist
    if excess == T::min_value() {
        return Err(Error::Overflow(format!("imbalance {}", excess)));
    }

    let shares = policy.split.split(excess.abs(), origins.len())?;
    info!(
        "absorbing imbalance {} by {} with capacities {:?} from {}",
        excess,
        NodeId::Dummy,
        shares,
        origins.iter().map(|u| u.to_string()).collect::<Vec<_>>().join(", ")
    );

    let mut b = NetworkBuilder::from(net);
    b.reserve(1, origins.len());
    b.add_node(NodeId::Dummy, -excess)?;
    for (&u, &cap) in origins.iter().zip(shares.iter()) {
        if excess.is_positive() {
            b.add_edge(u, NodeId::Dummy, 0.0, Some(cap))?;
        } else {
            b.add_edge(NodeId::Dummy, u, 0.0, Some(cap))?;
        }
    }

    Ok(b.into_network())
}
