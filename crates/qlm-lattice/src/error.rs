//! Error types for qlm-lattice.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LatticeError {
    #[error("unsupported lattice dimension {0} (expected 2 or 3)")]
    UnsupportedDimension(usize),

    #[error("invalid extent {extent} along axis {axis} (periodic plaquettes need at least 2 sites)")]
    InvalidExtent { axis: usize, extent: usize },

    #[error("lattice volume overflows usize")]
    VolumeOverflow,
}

pub type Result<T> = std::result::Result<T, LatticeError>;
