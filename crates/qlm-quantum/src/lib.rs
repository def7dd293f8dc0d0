#![allow(clippy::needless_range_loop)]
//! Gauge-invariant basis and plaquette Hamiltonian for U(1) quantum link
//! models.
//!
//! Each link of a periodic square or cubic lattice from `qlm-lattice`
//! carries a spin-½ electric flux. The physical states obey Gauss law at
//! every site; this crate enumerates them and assembles the ring-exchange
//! Hamiltonian acting on them, for bosonic or fermionic links.
//!
//! # Modules
//!
//! - [`link`]: binary link configurations
//! - [`gauss_law`]: local charge, charge sectors, spanning-tree solve
//! - [`generator`]: the six neutral vertex rules
//! - [`odometer`]: mixed counter with prefix-pruning jump
//! - [`enumerate`]: checkerboard, spanning-tree and brute-force enumeration
//! - [`basis`]: append-only store and frozen, indexed basis
//! - [`flux`]: plaquette flippability and flips
//! - [`fermion`]: Jordan-Wigner signs of fermionic flips
//! - [`hamiltonian`]: sparse Hamiltonian assembly
//! - [`diag`]: dense eigendecomposition via nalgebra
//! - [`io`]: plain-text basis, spin and flux files

pub mod basis;
pub mod diag;
pub mod enumerate;
pub mod error;
pub mod fermion;
pub mod flux;
pub mod gauss_law;
pub mod generator;
pub mod hamiltonian;
pub mod io;
pub mod link;
pub mod odometer;

pub use basis::{Basis, BasisStore};
pub use diag::{diagonalize, diagonalize_sparse, Spectrum};
pub use enumerate::{
    enumerate, select_strategy, Enumeration, EnumerationOptions, EnumerationStats, Strategy,
    WindingFilter,
};
pub use error::{QuantumError, Result};
pub use gauss_law::ChargeSector;
pub use hamiltonian::{build_hamiltonian, HamiltonianParams, LinkStatistics, SparseHamiltonian};
pub use link::LinkConfig;
