//! Error types for qlm-quantum.
//!
//! Configuration and allocation failures are reported before or while
//! tables are built. The remaining variants are internal-consistency
//! failures: they mean the basis or the assembler is wrong, and the run's
//! results must be discarded.

use qlm_lattice::{LatticeError, Plaquette};
use thiserror::Error;

use crate::enumerate::Strategy;
use crate::fermion::SignError;

#[derive(Debug, Error)]
pub enum QuantumError {
    #[error("lattice configuration error: {0}")]
    Lattice(#[from] LatticeError),

    #[error("strategy {strategy:?} cannot be used here: {reason}")]
    StrategyUnavailable { strategy: Strategy, reason: String },

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("cannot allocate {what} ({requested} elements)")]
    Allocation { what: &'static str, requested: usize },

    #[error("basis state {state} has {found} links, expected {expected}")]
    StateLength {
        state: usize,
        expected: usize,
        found: usize,
    },

    #[error("basis states {first} and {second} are identical")]
    DuplicateState { first: usize, second: usize },

    #[error("flipping the {plaquette} of basis state {state} leaves the basis")]
    MissingFlipTarget { state: usize, plaquette: Plaquette },

    #[error("H[{row}][{col}] written twice: first by the {first}, again by the {second}")]
    DoubleWrite {
        row: usize,
        col: usize,
        first: Plaquette,
        second: Plaquette,
    },

    #[error("fermionic sign of the {plaquette} on basis state {state}: {source}")]
    FermionSign {
        state: usize,
        plaquette: Plaquette,
        #[source]
        source: SignError,
    },

    #[error("assembled Hamiltonian of dimension {dim} is not symmetric")]
    NotSymmetric { dim: usize },

    #[error("flux stream has {found} rows for {expected} basis states")]
    FluxRows { expected: usize, found: usize },

    #[error("flux stream disagrees with basis state {state} at plaquette {plaquette}")]
    FluxMismatch { state: usize, plaquette: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, QuantumError>;
