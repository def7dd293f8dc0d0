//! Dense eigendecomposition for small Hamiltonians.
//!
//! Uses nalgebra's `SymmetricEigen` for real symmetric matrices. The sparse
//! Hamiltonian is densified first, so this is only meant for bases of a few
//! thousand states.

use nalgebra::{DMatrix, DVector, SymmetricEigen};
use serde::Serialize;
use tracing::debug;

use crate::error::{QuantumError, Result};
use crate::hamiltonian::SparseHamiltonian;

/// Eigenvalues and eigenstates from diagonalization.
#[derive(Debug, Clone, Serialize)]
pub struct Spectrum {
    /// Eigenvalues in ascending order.
    pub energies: Vec<f64>,
    /// Corresponding eigenstates.
    #[serde(skip)]
    pub states: Vec<DVector<f64>>,
}

impl Spectrum {
    /// Ground state energy, `None` for an empty spectrum.
    pub fn ground_energy(&self) -> Option<f64> {
        self.energies.first().copied()
    }

    pub fn ground_state(&self) -> Option<&DVector<f64>> {
        self.states.first()
    }

    /// Spectral gap (E_1 - E_0).
    pub fn gap(&self) -> f64 {
        if self.energies.len() < 2 {
            return 0.0;
        }
        self.energies[1] - self.energies[0]
    }
}

/// Eigenpairs of a real symmetric matrix, lowest first.
///
/// Only the lower triangle of `h` is read. `n_lowest` truncates after the
/// full decomposition.
pub fn diagonalize(h: &DMatrix<f64>, n_lowest: Option<usize>) -> Spectrum {
    let SymmetricEigen {
        eigenvectors,
        eigenvalues,
    } = h.clone().symmetric_eigen();

    let mut order: Vec<usize> = (0..eigenvalues.len()).collect();
    order.sort_by(|&a, &b| eigenvalues[a].total_cmp(&eigenvalues[b]));
    if let Some(n) = n_lowest {
        order.truncate(n);
    }

    Spectrum {
        energies: order.iter().map(|&k| eigenvalues[k]).collect(),
        states: order
            .iter()
            .map(|&k| eigenvectors.column(k).into_owned())
            .collect(),
    }
}

/// Diagonalize an assembled Hamiltonian.
///
/// The matrix must be symmetric to within `SYMMETRY_TOL`, since
/// [`diagonalize`] reads only the lower triangle.
pub fn diagonalize_sparse(h: &SparseHamiltonian, n_lowest: Option<usize>) -> Result<Spectrum> {
    if !h.is_symmetric(SYMMETRY_TOL) {
        return Err(QuantumError::NotSymmetric { dim: h.dim });
    }
    debug!(dim = h.dim, nnz = h.nnz(), "densifying for diagonalization");
    Ok(diagonalize(&h.to_dense()?, n_lowest))
}

const SYMMETRY_TOL: f64 = 1e-12;
