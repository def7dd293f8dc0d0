//! Immutable per-run lattice tables.

use crate::checkerboard::Checkerboard;
use crate::error::Result;
use crate::lattice::Lattice;
use crate::plaquette::{all_plaquettes, Plaquette};

/// Everything derived from the lattice extents, built once and then only read.
///
/// The enumerator and the Hamiltonian assembler borrow this; nothing in it
/// changes after construction.
#[derive(Debug, Clone)]
pub struct LatticeContext {
    pub lattice: Lattice,
    pub checkerboard: Checkerboard,
    pub plaquettes: Vec<Plaquette>,
    /// `plaquette_links[k]` = link indices of `plaquettes[k]`.
    pub plaquette_links: Vec<[usize; 4]>,
}

impl LatticeContext {
    pub fn new(lattice: Lattice) -> Self {
        let checkerboard = Checkerboard::new(&lattice);
        let plaquettes = all_plaquettes(&lattice);
        let plaquette_links = plaquettes.iter().map(|p| p.links(&lattice)).collect();
        Self {
            lattice,
            checkerboard,
            plaquettes,
            plaquette_links,
        }
    }

    /// Build directly from extents.
    pub fn from_extents(extents: &[usize]) -> Result<Self> {
        Ok(Self::new(Lattice::new(extents)?))
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.lattice.dim()
    }

    #[inline]
    pub fn volume(&self) -> usize {
        self.lattice.volume()
    }

    #[inline]
    pub fn n_links(&self) -> usize {
        self.lattice.n_links()
    }

    #[inline]
    pub fn n_plaquettes(&self) -> usize {
        self.plaquettes.len()
    }
}
