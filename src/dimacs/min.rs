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

//! This module implements the DIMACS min cost flow format for
//! networks. A DIMACS file must look as follows.
//!
//! 1. empty lines are allowed and ignored
//! 2. a line starting with `c` is a comment line and is ignored
//! 3. the first non-comment line must have the form `p min <n> <m>`,
//!    where `<n>` is the number of nodes and `<m>` the number of arcs.
//! 4. node lines `n <node> <supply>` where `<node>` is the node number
//!    between `1..n` and `<supply>` is the node's supply (if positive)
//!    or demand (if negative). Nodes with supply 0 do not need to be
//!    specified.
//! 5. exactly `m` arc lines `a <u> <v> <lb> <ub> <c>` denoting the
//!    source and sink nodes, the lower bound `<lb>`, the upper bound
//!    `<ub>` and the cost `<c>` of an arc.
//!
//! Node `i` is read as [`NodeId::Index(i-1)`](NodeId::Index). Lower
//! bounds must be 0, loops and parallel arcs are not allowed.
//!
//! Solutions have a line `s <value>` followed by lines `f <u> <v>
//! <flow>` for the arcs with non-zero flow.

use super::DimacsReader;
use crate::builder::NetworkBuilder;
use crate::error::{Error, Result};
use crate::network::{Network, NodeId, Quantity};
use crate::solver::Solution;

use std::fmt::Display;
use std::io::{self, Read, Write};
use std::str::FromStr;

/// Read a network in DIMACS min cost flow format.
pub fn read<R, T>(r: R) -> Result<Network<T>>
where
    R: Read,
    T: Quantity + FromStr,
    T::Err: Display,
{
    let mut reader = DimacsReader::new(r);

    // Read the problem line.
    let mut pline = reader.expect_line("p")?;
    pline.expect("min")?;
    let nnodes: usize = pline.number()?;
    let nedges: usize = pline.number()?;
    pline.end()?;

    let mut supplies = vec![T::zero(); nnodes];
    let mut arcs = Vec::with_capacity(nedges);

    while let Some((d, mut toks)) = reader.read_one_line_of(&["n", "a"])? {
        let line = toks.line;
        let node = |u: usize, what: &str| {
            if u < 1 || u > nnodes {
                Err(Error::Data {
                    line,
                    msg: format!("invalid {} id {} (must be in 1..{})", what, u, nnodes),
                })
            } else {
                Ok(u - 1)
            }
        };

        if d == "n" {
            let u = node(toks.number()?, "node")?;
            supplies[u] = toks.number()?;
        } else {
            let u = node(toks.number()?, "source node")?;
            let v = node(toks.number()?, "sink node")?;
            let lb: T = toks.number()?;
            let ub: T = toks.number()?;
            let c: f64 = toks.number()?;

            if !lb.is_zero() {
                return Err(Error::Data {
                    line,
                    msg: format!("non-zero lower bound {} on arc ({},{})", lb, u + 1, v + 1),
                });
            }

            if arcs.len() == nedges {
                return Err(Error::Data {
                    line,
                    msg: format!("unexpected 'a' line (expected exactly {} arcs)", nedges),
                });
            }

            arcs.push((line, u, v, ub, c));
        }

        toks.end()?;
    }

    if arcs.len() != nedges {
        return Err(Error::Format {
            line: arcs.last().map(|a| a.0).unwrap_or(0),
            msg: format!("expected {} arcs, got {}", nedges, arcs.len()),
        });
    }

    let mut b = NetworkBuilder::with_capacities(nnodes, nedges);
    b.add_nodes(supplies.into_iter().enumerate().map(|(i, s)| (NodeId::Index(i), s)))?;
    for (line, u, v, ub, c) in arcs {
        b.add_edge(NodeId::Index(u), NodeId::Index(v), c, Some(ub))
            .map_err(|err| Error::Data {
                line,
                msg: err.to_string(),
            })?;
    }

    Ok(b.into_network())
}

pub fn read_from_file<T>(filename: &str) -> Result<Network<T>>
where
    T: Quantity + FromStr,
    T::Err: Display,
{
    read(std::fs::File::open(filename)?)
}

/// Write a network.
///
/// Node `i` is the node at position `i-1`. Unbounded arcs get the
/// largest value of `T` as upper bound.
pub fn write<W, T>(mut w: W, net: &Network<T>) -> io::Result<()>
where
    W: Write,
    T: Quantity,
{
    writeln!(w, "p min {} {}", net.num_nodes(), net.num_edges())?;
    for (i, (_, b)) in net.supplies().enumerate() {
        if !b.is_zero() {
            writeln!(w, "n {} {}", i + 1, b)?;
        }
    }
    for e in net.edges() {
        let [u, v] = e.ends();
        writeln!(
            w,
            "a {} {} 0 {} {}",
            u + 1,
            v + 1,
            e.capacity().unwrap_or_else(T::max_value),
            e.cost()
        )?;
    }

    Ok(())
}

/// Write a network to a named file.
pub fn write_to_file<T: Quantity>(filename: &str, net: &Network<T>) -> io::Result<()> {
    write(&mut std::fs::File::create(filename)?, net)
}

/// Write an optimal solution of a flow problem on `net`.
///
/// Fails if `sol` is not optimal or refers to nodes not in `net`.
pub fn write_solution<W, T>(mut w: W, net: &Network<T>, sol: &Solution) -> io::Result<()>
where
    W: Write,
    T: Quantity,
{
    let value = sol
        .value()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "solution is not optimal"))?;
    let pos = |u: NodeId| {
        net.node_id(u)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("unknown node {}", u)))
    };

    writeln!(w, "s {}", value)?;
    for (u, v, x) in sol.flows().filter(|&(_, _, x)| x.abs() > 0.0) {
        writeln!(w, "f {} {} {}", pos(u)? + 1, pos(v)? + 1, x)?;
    }

    Ok(())
}

/// Write an optimal solution to a named file.
pub fn write_solution_to_file<T: Quantity>(filename: &str, net: &Network<T>, sol: &Solution) -> io::Result<()> {
    write_solution(&mut std::fs::File::create(filename)?, net, sol)
}

/// Read a solution.
///
/// Returns the value and the `(src, snk, flow)` triples with 0-based
/// node positions.
pub fn read_solution<R>(r: R) -> Result<(f64, Vec<(usize, usize, f64)>)>
where
    R: Read,
{
    let mut reader = DimacsReader::new(r);
    let mut flows = vec![];
    let mut sol = None;

    while let Some((d, mut toks)) = reader.read_one_line_of(&["f", "s"])? {
        if d == "f" {
            let line = toks.line;
            let u: usize = toks.number()?;
            let v: usize = toks.number()?;
            if u == 0 || v == 0 {
                return Err(Error::Data {
                    line,
                    msg: "node ids start at 1".to_string(),
                });
            }
            flows.push((u - 1, v - 1, toks.number()?));
        } else {
            if sol.is_some() {
                return Err(Error::Format {
                    line: toks.line,
                    msg: "The solution value must be specified exactly once".to_string(),
                });
            }
            sol = Some(toks.number()?);
        }
        toks.end()?;
    }

    Ok((
        sol.ok_or_else(|| Error::Format {
            line: 0,
            msg: "Missing solution value".to_string(),
        })?,
        flows,
    ))
}

/// Read a solution from a named file.
pub fn read_solution_from_file(filename: &str) -> Result<(f64, Vec<(usize, usize, f64)>)> {
    read_solution(std::fs::File::open(filename)?)
}

#[cfg(test)]
mod tests {
    use crate::dimacs;
    use crate::echelon::{Mode, Model};
    use crate::error::Error;
    use crate::network::{Network, NodeId::*};
    use crate::scenarios;
    use crate::solver::{solve_model, MicroLp, SolverOptions};
    use std::io::Cursor;

    #[test]
    fn parse_file_test() {
        let file = "c this is a test file

p min 4 4
n 1 5
n 2 -6
n 3 3
n 4 -2

c there might be empty lines

a 1 2 0 5 0
a 1 4 0 2 4
a 3 2 0 3 2
a 3 4 0 2 8

c end of the file
";
        let net: Network = dimacs::min::read(Cursor::new(file)).unwrap();
        assert_eq!(net, scenarios::small());
        assert_eq!(net.supply(Index(2)), Some(3));
        assert_eq!(net.edge(Index(2), Index(3)).and_then(|e| e.capacity()), Some(2));
    }

    #[test]
    fn read_errors() {
        let bad_lower = "p min 2 1\nn 1 1\nn 2 -1\na 1 2 1 5 1\n";
        assert!(matches!(
            dimacs::min::read::<_, i64>(Cursor::new(bad_lower)),
            Err(Error::Data { line: 4, .. })
        ));

        let parallel = "p min 2 2\na 1 2 0 5 1\na 1 2 0 5 2\n";
        assert!(matches!(
            dimacs::min::read::<_, i64>(Cursor::new(parallel)),
            Err(Error::Data { line: 3, .. })
        ));

        let loops = "p min 2 1\na 2 2 0 5 1\n";
        assert!(matches!(
            dimacs::min::read::<_, i64>(Cursor::new(loops)),
            Err(Error::Data { line: 2, .. })
        ));

        let bad_node = "p min 2 1\nn 3 1\n";
        assert!(matches!(
            dimacs::min::read::<_, i64>(Cursor::new(bad_node)),
            Err(Error::Data { line: 2, .. })
        ));

        let missing = "p min 2 2\na 1 2 0 5 1\n";
        assert!(matches!(
            dimacs::min::read::<_, i64>(Cursor::new(missing)),
            Err(Error::Format { .. })
        ));

        let extra = "p min 2 1\na 1 2 0 5 1\na 2 1 0 5 1\n";
        assert!(matches!(
            dimacs::min::read::<_, i64>(Cursor::new(extra)),
            Err(Error::Data { line: 3, .. })
        ));
    }

    #[test]
    fn write_test_file() {
        let mut buf = Cursor::new(Vec::new());
        dimacs::min::write(&mut buf, &scenarios::small()).unwrap();
        assert_eq!(
            String::from_utf8(buf.into_inner()).unwrap(),
            "p min 4 4
n 1 5
n 2 -6
n 3 3
n 4 -2
a 1 2 0 5 0
a 1 4 0 2 4
a 3 2 0 3 2
a 3 4 0 2 8
"
        );
    }

    #[test]
    fn write_echelon_network() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let net = scenarios::crown().build(&Mode::Factory)?.into_network();
        let mut buf = Cursor::new(Vec::new());
        dimacs::min::write(&mut buf, &net)?;

        let txt = String::from_utf8(buf.into_inner())?;
        assert!(txt.starts_with("p min 12 29\nn 1 150000\n"));
        assert!(txt.contains(&format!("a 1 3 0 {} 0.5\n", i64::max_value())));

        let back: Network = dimacs::min::read(Cursor::new(txt))?;
        assert_eq!(back.num_edges(), 29);
        assert_eq!(back.edge(Index(0), Index(2)).and_then(|e| e.capacity()), Some(i64::max_value()));
        Ok(())
    }

    #[test]
    fn write_solution_file() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let net = scenarios::small();
        let options = SolverOptions {
            integral: true,
            ..SolverOptions::default()
        };
        let sol = solve_model(&MicroLp, &Model::flow(net.clone()), &options)?;

        let mut buf = Cursor::new(Vec::new());
        dimacs::min::write_solution(&mut buf, &net, &sol)?;

        let soltxt = String::from_utf8(buf.into_inner())?;
        let (value, flows) = dimacs::min::read_solution(Cursor::new(soltxt))?;
        assert!((value - 14.0).abs() < 1e-6);
        let flows: Vec<_> = flows.into_iter().map(|(u, v, x)| (u, v, x.round() as i64)).collect();
        assert_eq!(flows, vec![(0, 1, 3), (0, 3, 2), (2, 1, 3)]);

        Ok(())
    }

    #[test]
    fn read_solution_errors() {
        assert!(dimacs::min::read_solution(Cursor::new("f 1 2 3\n")).is_err());
        assert!(dimacs::min::read_solution(Cursor::new("s 1\ns 2\n")).is_err());
        assert!(dimacs::min::read_solution(Cursor::new("s 1\nf 0 2 3\n")).is_err());
    }
}
