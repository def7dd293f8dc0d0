//! Plain-text persistence of basis states.
//!
//! One state per line, tokens separated by single spaces:
//!
//! - basis: `D·V` tokens `0`/`1`, one per link in link order;
//! - spin states: `D·V` tokens `1`/`-1`;
//! - flux states: one `0`/`1` per plaquette in plaquette order, `1` where
//!   the plaquette is flippable.
//!
//! Readers skip blank lines and report the 1-based line number of the
//! first malformed one. A spin stream read back with [`read_spin_states`]
//! can be frozen and assembled in a later process; its flux stream is then
//! checked against the frozen basis with [`check_flux_states`].

use std::io::{BufRead, Write};

use qlm_lattice::LatticeContext;

use crate::basis::{Basis, BasisStore};
use crate::error::{QuantumError, Result};
use crate::flux;
use crate::link::LinkConfig;

pub fn write_basis<'a, W, I>(mut w: W, states: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a LinkConfig>,
{
    for state in states {
        writeln!(w, "{state}")?;
    }
    w.flush()?;
    Ok(())
}

/// Read a basis written by [`write_basis`]; every line must have `n_links` tokens.
pub fn read_basis<R: BufRead>(r: R, n_links: usize) -> Result<BasisStore> {
    let mut store = BasisStore::new();
    for_each_row(r, n_links, bit_token, |bits| {
        store.try_reserve(1)?;
        store.append(LinkConfig::from_bits(bits));
        Ok(())
    })?;
    Ok(store)
}

pub fn write_spin_states<'a, W, I>(mut w: W, states: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a LinkConfig>,
{
    for state in states {
        let line: Vec<&str> = state
            .as_slice()
            .iter()
            .map(|&b| if b { "1" } else { "-1" })
            .collect();
        writeln!(w, "{}", line.join(" "))?;
    }
    w.flush()?;
    Ok(())
}

pub fn read_spin_states<R: BufRead>(r: R, n_links: usize) -> Result<BasisStore> {
    let mut store = BasisStore::new();
    for_each_row(r, n_links, spin_token, |bits| {
        store.try_reserve(1)?;
        store.append(LinkConfig::from_bits(bits));
        Ok(())
    })?;
    Ok(store)
}

pub fn write_flux_states<'a, W, I>(mut w: W, ctx: &LatticeContext, states: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a LinkConfig>,
{
    for state in states {
        let line: Vec<&str> = flux::flux_pattern(ctx, state)
            .into_iter()
            .map(|f| if f { "1" } else { "0" })
            .collect();
        writeln!(w, "{}", line.join(" "))?;
    }
    w.flush()?;
    Ok(())
}

pub fn read_flux_states<R: BufRead>(r: R, n_plaquettes: usize) -> Result<Vec<Vec<bool>>> {
    let mut rows = Vec::new();
    for_each_row(r, n_plaquettes, bit_token, |bits| {
        rows.push(bits);
        Ok(())
    })?;
    Ok(rows)
}

/// Check flux rows read by [`read_flux_states`] against `basis`, row for row.
pub fn check_flux_states(ctx: &LatticeContext, basis: &Basis, rows: &[Vec<bool>]) -> Result<()> {
    if rows.len() != basis.dim() {
        return Err(QuantumError::FluxRows {
            expected: basis.dim(),
            found: rows.len(),
        });
    }
    for (state, row) in rows.iter().enumerate() {
        let mismatch = (0..ctx.n_plaquettes()).find(|&p| row[p] != basis.flux(ctx, state, p));
        if let Some(plaquette) = mismatch {
            return Err(QuantumError::FluxMismatch { state, plaquette });
        }
    }
    Ok(())
}

fn bit_token(token: &str) -> Option<bool> {
    match token {
        "0" => Some(false),
        "1" => Some(true),
        _ => None,
    }
}

fn spin_token(token: &str) -> Option<bool> {
    match token {
        "-1" => Some(false),
        "1" => Some(true),
        _ => None,
    }
}

fn for_each_row<R, F>(r: R, width: usize, parse: fn(&str) -> Option<bool>, mut row: F) -> Result<()>
where
    R: BufRead,
    F: FnMut(Vec<bool>) -> Result<()>,
{
    for (n, line) in r.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let parse_err = |reason: String| QuantumError::Parse { line: n + 1, reason };

        let mut bits = Vec::with_capacity(width);
        for token in line.split_whitespace() {
            let bit = parse(token).ok_or_else(|| parse_err(format!("unexpected token {token:?}")))?;
            bits.push(bit);
        }
        if bits.len() != width {
            return Err(parse_err(format!("expected {width} tokens, found {}", bits.len())));
        }
        row(bits)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn states() -> Vec<LinkConfig> {
        ["10101010", "10110001"]
            .iter()
            .map(|s| LinkConfig::from_bits(s.bytes().map(|b| b == b'1').collect()))
            .collect()
    }

    #[test]
    fn test_basis_format() {
        let mut buf = Vec::new();
        write_basis(&mut buf, &states()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "1 0 1 0 1 0 1 0\n1 0 1 1 0 0 0 1\n");

        let back = read_basis(text.as_bytes(), 8).unwrap();
        assert_eq!(back.iter().cloned().collect::<Vec<_>>(), states());
    }

    #[test]
    fn test_spin_format() {
        let mut buf = Vec::new();
        write_spin_states(&mut buf, &states()[1..]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "1 -1 1 1 -1 -1 -1 1\n");
        let back = read_spin_states(text.as_bytes(), 8).unwrap();
        assert_eq!(back.get(0), Some(&states()[1]));
    }

    #[test]
    fn test_flux_format() {
        let ctx = LatticeContext::from_extents(&[2, 2]).unwrap();
        let mut buf = Vec::new();
        write_flux_states(&mut buf, &ctx, &states()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "0 0 0 0\n1 0 0 1\n");

        let rows = read_flux_states(text.as_bytes(), 4).unwrap();
        assert_eq!(rows[1], vec![true, false, false, true]);
    }

    #[test]
    fn test_flux_rows_checked_against_basis() {
        let ctx = LatticeContext::from_extents(&[2, 2]).unwrap();
        let basis: BasisStore = states().into_iter().collect();
        let basis = basis.freeze(&ctx).unwrap();

        let mut buf = Vec::new();
        write_flux_states(&mut buf, &ctx, basis.states()).unwrap();
        let mut rows = read_flux_states(buf.as_slice(), 4).unwrap();
        check_flux_states(&ctx, &basis, &rows).unwrap();

        rows[1][3] = false;
        assert!(matches!(
            check_flux_states(&ctx, &basis, &rows),
            Err(QuantumError::FluxMismatch { state: 1, plaquette: 3 })
        ));

        assert!(matches!(
            check_flux_states(&ctx, &basis, &rows[..1]),
            Err(QuantumError::FluxRows { expected: 2, found: 1 })
        ));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let store = read_basis("\n1 0\n\n0 1\n".as_bytes(), 2).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_parse_errors_carry_line() {
        let err = read_basis("1 0 1\n1 2 0\n".as_bytes(), 3).unwrap_err();
        assert!(matches!(err, QuantumError::Parse { line: 2, .. }));

        let err = read_basis("1 0 1\n1 0\n".as_bytes(), 3).unwrap_err();
        assert!(matches!(err, QuantumError::Parse { line: 2, .. }));

        let err = read_spin_states("1 0\n".as_bytes(), 2).unwrap_err();
        assert!(matches!(err, QuantumError::Parse { line: 1, .. }));
    }
}
