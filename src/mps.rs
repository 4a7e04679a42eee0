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

//! Write routines for the (fixed) MPS format.
//!
//! Fixed MPS names have at most 8 characters. Rows are therefore called
//! `R1, R2, ...` and columns `X1, X2, ...` in model order, the model
//! names are listed in comment lines at the top of the file. The
//! objective row is `COST`, the sense is always minimization.

use crate::formulation::{Comparison, LinearModel};

use std::io::{self, Write};

/// Name of the objective row.
const OBJ_ROW: &str = "COST";

fn row_name(i: usize) -> String {
    format!("R{}", i + 1)
}

fn col_name(j: usize) -> String {
    format!("X{}", j + 1)
}

/// Write a data record with up to two `(name, value)` pairs.
///
/// The fields start at columns 2, 5, 15, 25, 40 and 50.
fn record<W: Write>(w: &mut W, typ: &str, name: &str, pairs: &[(&str, f64)]) -> io::Result<()> {
    let mut line = format!(" {:2} {:8}", typ, name);
    for (k, &(n, v)) in pairs.iter().enumerate() {
        if k == 0 {
            line.push_str(&format!("  {:8}  {:12}", n, v.to_string()));
        } else {
            line.push_str(&format!("   {:8}  {}", n, v));
        }
    }
    writeln!(w, "{}", line.trim_end())
}

/// Write `lp` in MPS format.
pub fn write<W: Write>(mut w: W, lp: &LinearModel, name: &str) -> io::Result<()> {
    writeln!(w, "* {:?} model", lp.shape())?;
    for (i, row) in lp.rows().iter().enumerate() {
        writeln!(w, "* {} = {}", row_name(i), row.name)?;
    }
    for (j, col) in lp.columns().iter().enumerate() {
        writeln!(w, "* {} = ({},{})", col_name(j), col.src, col.snk)?;
    }

    writeln!(w, "{:14}{}", "NAME", name)?;

    writeln!(w, "ROWS")?;
    record(&mut w, "N", OBJ_ROW, &[])?;
    for (i, row) in lp.rows().iter().enumerate() {
        let typ = match row.cmp {
            Comparison::Eq => "E",
            Comparison::Le => "L",
            Comparison::Ge => "G",
        };
        record(&mut w, typ, &row_name(i), &[])?;
    }

    // the entries of each column, objective first
    let mut entries = vec![vec![]; lp.num_columns()];
    for &(j, c) in lp.objective() {
        if c.abs() > 0.0 {
            entries[j].push((OBJ_ROW.to_string(), c));
        }
    }
    for (i, row) in lp.rows().iter().enumerate() {
        for &(j, a) in &row.terms {
            entries[j].push((row_name(i), a));
        }
    }

    writeln!(w, "COLUMNS")?;
    for (j, col) in entries.iter().enumerate() {
        let cname = col_name(j);
        for pair in col.chunks(2) {
            let pairs: Vec<_> = pair.iter().map(|(r, a)| (r.as_str(), *a)).collect();
            record(&mut w, "", &cname, &pairs)?;
        }
    }

    writeln!(w, "RHS")?;
    for (i, row) in lp.rows().iter().enumerate() {
        if row.rhs.abs() > 0.0 {
            record(&mut w, "", "RHS", &[(&row_name(i), row.rhs)])?;
        }
    }

    writeln!(w, "BOUNDS")?;
    for (j, col) in lp.columns().iter().enumerate() {
        if col.lower.abs() > 0.0 {
            record(&mut w, "LO", "BND", &[(&col_name(j), col.lower)])?;
        }
        if col.upper.is_finite() {
            record(&mut w, "UP", "BND", &[(&col_name(j), col.upper)])?;
        }
    }

    writeln!(w, "ENDATA")?;

    Ok(())
}

/// Write `lp` to a named file.
pub fn write_to_file(filename: &str, lp: &LinearModel, name: &str) -> io::Result<()> {
    write(&mut std::fs::File::create(filename)?, lp, name)
}
