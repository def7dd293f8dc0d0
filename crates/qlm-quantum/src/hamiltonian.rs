//! Plaquette Hamiltonian of the U(1) quantum link model.
//!
//!   H = −J Σ_□ (U_□ + U_□†) + λ Σ_□ (U_□ + U_□†)²
//!
//! In the link basis U_□ + U_□† flips a flippable plaquette and annihilates
//! any other state, so
//!
//! - `H[i][j] = −J · s` when state j is state i with one plaquette flipped,
//!   where `s = 1` for bosonic links and the Jordan-Wigner sign of the flip
//!   for fermionic ones;
//! - `H[i][i] = λ · n_flippable(i)`, stored only when non-zero.
//!
//! Two different plaquettes never flip a state into the same target, so
//! every entry is written at most once; a second write is reported as an
//! error rather than summed. Rows are assembled independently on the rayon
//! pool and stored in CSR form.

use nalgebra::DMatrix;
use qlm_lattice::{LatticeContext, Plaquette};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::basis::Basis;
use crate::error::{QuantumError, Result};
use crate::fermion;
use crate::flux;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatistics {
    #[default]
    Bosonic,
    Fermionic,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HamiltonianParams {
    /// Plaquette coupling J.
    pub coupling: f64,
    /// Potential term coefficient λ.
    pub lambda: f64,
    pub statistics: LinkStatistics,
}

impl Default for HamiltonianParams {
    fn default() -> Self {
        Self {
            coupling: 1.0,
            lambda: 0.0,
            statistics: LinkStatistics::Bosonic,
        }
    }
}

/// Real sparse matrix in compressed sparse row form, columns sorted within
/// each row.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseHamiltonian {
    pub dim: usize,
    pub row_ptr: Vec<usize>,
    pub col_indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseHamiltonian {
    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Columns and values of row `i`.
    pub fn row(&self, i: usize) -> (&[usize], &[f64]) {
        let range = self.row_ptr[i]..self.row_ptr[i + 1];
        (&self.col_indices[range.clone()], &self.values[range])
    }

    /// Entry (i, j); zero when not stored.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        let (cols, vals) = self.row(i);
        cols.binary_search(&j).map_or(0.0, |k| vals[k])
    }

    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.dim).map(|i| self.get(i, i)).collect()
    }

    /// y = H x.
    pub fn matvec(&self, x: &[f64]) -> Vec<f64> {
        assert_eq!(x.len(), self.dim, "vector length must match dimension");
        (0..self.dim)
            .map(|i| {
                let (cols, vals) = self.row(i);
                cols.iter().zip(vals).map(|(&j, &v)| v * x[j]).sum()
            })
            .collect()
    }

    /// Every stored entry matches its transpose within `tol`.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        (0..self.dim).all(|i| {
            let (cols, vals) = self.row(i);
            cols.iter()
                .zip(vals)
                .all(|(&j, &v)| (self.get(j, i) - v).abs() <= tol)
        })
    }

    /// Dense copy, refused when `dim²` does not fit in memory.
    pub fn to_dense(&self) -> Result<DMatrix<f64>> {
        let n = self.dim;
        let len = n.checked_mul(n).ok_or(QuantumError::Allocation {
            what: "dense Hamiltonian",
            requested: usize::MAX,
        })?;
        let mut data: Vec<f64> = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| QuantumError::Allocation {
                what: "dense Hamiltonian",
                requested: len,
            })?;
        data.resize(len, 0.0);

        let mut h = DMatrix::from_vec(n, n, data);
        for i in 0..n {
            let (cols, vals) = self.row(i);
            for (&j, &v) in cols.iter().zip(vals) {
                h[(i, j)] = v;
            }
        }
        Ok(h)
    }
}

/// Assemble H on `basis`. The basis must be closed under plaquette flips.
pub fn build_hamiltonian(
    ctx: &LatticeContext,
    basis: &Basis,
    params: &HamiltonianParams,
) -> Result<SparseHamiltonian> {
    let dim = basis.dim();
    let rows: Vec<Vec<(usize, f64)>> = (0..dim)
        .into_par_iter()
        .map(|i| assemble_row(ctx, basis, params, i))
        .collect::<Result<Vec<_>>>()?;

    let nnz: usize = rows.iter().map(Vec::len).sum();
    let mut row_ptr = Vec::new();
    let mut col_indices = Vec::new();
    let mut values = Vec::new();
    let alloc_err = |what: &'static str, requested: usize| QuantumError::Allocation { what, requested };
    row_ptr
        .try_reserve_exact(dim + 1)
        .map_err(|_| alloc_err("row pointers", dim + 1))?;
    col_indices
        .try_reserve_exact(nnz)
        .map_err(|_| alloc_err("column indices", nnz))?;
    values
        .try_reserve_exact(nnz)
        .map_err(|_| alloc_err("matrix values", nnz))?;

    row_ptr.push(0);
    for row in rows {
        for (j, v) in row {
            col_indices.push(j);
            values.push(v);
        }
        row_ptr.push(col_indices.len());
    }

    info!(dim, nnz, statistics = ?params.statistics, "hamiltonian assembled");

    Ok(SparseHamiltonian {
        dim,
        row_ptr,
        col_indices,
        values,
    })
}

/// Entries of row `i`, sorted by column.
pub fn assemble_row(
    ctx: &LatticeContext,
    basis: &Basis,
    params: &HamiltonianParams,
    i: usize,
) -> Result<Vec<(usize, f64)>> {
    let state = basis.index_to_config(i);
    let mut entries: Vec<(usize, f64)> = Vec::with_capacity(basis.n_flippable(i) + 1);
    let mut writers: Vec<Plaquette> = Vec::with_capacity(basis.n_flippable(i));
    let mut n_flippable = 0usize;

    for (plaquette, links) in ctx.plaquettes.iter().zip(&ctx.plaquette_links) {
        if !flux::is_flippable(state, links) {
            continue;
        }
        n_flippable += 1;

        let mut target = state.clone();
        let sign = match params.statistics {
            LinkStatistics::Bosonic => {
                flux::flip_in_place(&mut target, links);
                1
            }
            LinkStatistics::Fermionic => fermion::plaquette_sign_in(&mut target, links)
                .map_err(|source| QuantumError::FermionSign {
                    state: i,
                    plaquette: *plaquette,
                    source,
                })?,
        };

        let j = basis
            .config_to_index(&target)
            .ok_or(QuantumError::MissingFlipTarget {
                state: i,
                plaquette: *plaquette,
            })?;

        if let Some(k) = entries.iter().position(|&(col, _)| col == j) {
            return Err(QuantumError::DoubleWrite {
                row: i,
                col: j,
                first: writers[k],
                second: *plaquette,
            });
        }
        entries.push((j, -params.coupling * f64::from(sign)));
        writers.push(*plaquette);
    }

    let diag = params.lambda * n_flippable as f64;
    if diag != 0.0 {
        entries.push((i, diag));
    }
    entries.sort_by_key(|&(col, _)| col);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::BasisStore;
    use crate::enumerate::{enumerate, EnumerationOptions};
    use crate::link::LinkConfig;
    use approx::assert_relative_eq;

    fn setup(extents: &[usize]) -> (LatticeContext, Basis) {
        let ctx = LatticeContext::from_extents(extents).unwrap();
        let basis = enumerate(&ctx, &EnumerationOptions::default())
            .unwrap()
            .freeze(&ctx)
            .unwrap();
        (ctx, basis)
    }

    #[test]
    fn test_2x2_bosonic_structure() {
        let (ctx, basis) = setup(&[2, 2]);
        let h = build_hamiltonian(&ctx, &basis, &HamiltonianParams::default()).unwrap();
        assert_eq!(h.dim, 18);
        assert_eq!(h.nnz(), 16);
        assert!(h.is_symmetric(0.0));
        assert!(h.diagonal().iter().all(|&d| d == 0.0));
        assert!(h.values.iter().all(|&v| v == -1.0));
    }

    #[test]
    fn test_potential_term_on_diagonal() {
        let (ctx, basis) = setup(&[2, 2]);
        let params = HamiltonianParams {
            coupling: 0.5,
            lambda: 2.0,
            ..Default::default()
        };
        let h = build_hamiltonian(&ctx, &basis, &params).unwrap();
        // Off-diagonal plus one diagonal entry per non-frozen state.
        assert_eq!(h.nnz(), 16 + 6);
        for i in 0..basis.dim() {
            assert_relative_eq!(h.get(i, i), 2.0 * basis.n_flippable(i) as f64);
            let (cols, vals) = h.row(i);
            for (&j, &v) in cols.iter().zip(vals) {
                if j != i {
                    assert_relative_eq!(v, -0.5);
                }
            }
        }
    }

    #[test]
    fn test_fermionic_is_symmetric() {
        let (ctx, basis) = setup(&[2, 4]);
        let params = HamiltonianParams {
            statistics: LinkStatistics::Fermionic,
            ..Default::default()
        };
        let h = build_hamiltonian(&ctx, &basis, &params).unwrap();
        assert_eq!(h.nnz(), 288);
        assert!(h.is_symmetric(0.0));
        assert!(h.values.iter().all(|&v| v == 1.0 || v == -1.0));
    }

    #[test]
    fn test_matvec_matches_dense() {
        let (ctx, basis) = setup(&[2, 2]);
        let params = HamiltonianParams {
            lambda: 0.3,
            ..Default::default()
        };
        let h = build_hamiltonian(&ctx, &basis, &params).unwrap();
        let dense = h.to_dense().unwrap();
        let x: Vec<f64> = (0..h.dim).map(|k| (k as f64 * 0.37).sin()).collect();
        let y = h.matvec(&x);
        let y_dense = &dense * nalgebra::DVector::from_vec(x);
        for k in 0..h.dim {
            assert_relative_eq!(y[k], y_dense[k], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_missing_flip_target() {
        let ctx = LatticeContext::from_extents(&[2, 2]).unwrap();
        let flippable: LinkConfig = vec![true, false, true, true, false, false, false, true].into();
        let basis = BasisStore::from_iter([flippable]).freeze(&ctx).unwrap();
        let err = build_hamiltonian(&ctx, &basis, &HamiltonianParams::default()).unwrap_err();
        assert!(matches!(err, QuantumError::MissingFlipTarget { state: 0, .. }));
    }
}
