//! Lattice topology for U(1) quantum link models.
//!
//! Periodic square (2D) and cubic (3D) lattices with one binary link per
//! (site, axis) pair.
//!
//! # Modules
//!
//! - [`lattice`]: linear site indexing, periodic neighbor table, link indexing
//! - [`checkerboard`]: even/odd site ordering used by the basis enumerator
//! - [`plaquette`]: plaquette orientations and their four links
//! - [`context`]: the immutable per-run bundle of all of the above

pub mod checkerboard;
pub mod context;
pub mod error;
pub mod lattice;
pub mod plaquette;

pub use checkerboard::Checkerboard;
pub use context::LatticeContext;
pub use error::{LatticeError, Result};
pub use lattice::{Direction, Lattice, MAX_DIM};
pub use plaquette::{all_plaquettes, Orientation, Plaquette};
