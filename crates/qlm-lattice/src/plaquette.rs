//! Elementary plaquettes and their link order.
//!
//! ```text
//!            p3 = U_μ(n+ν)
//!         o---------------o
//!         |               |
//!  p4 =   |               |  p2 = U_ν(n+μ)
//!  U_ν(n) |               |
//!         o---------------o
//!         n   p1 = U_μ(n)
//! ```

use std::fmt;

use crate::lattice::Lattice;

/// Plane of a plaquette: the ordered axis pair (μ, ν) with μ < ν.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Orientation {
    XY,
    XZ,
    YZ,
}

impl Orientation {
    /// Orientations present on a lattice of the given dimension, in storage order.
    pub fn for_dim(dim: usize) -> &'static [Orientation] {
        match dim {
            2 => &[Orientation::XY],
            _ => &[Orientation::XY, Orientation::XZ, Orientation::YZ],
        }
    }

    /// The axis pair (μ, ν).
    pub fn axes(self) -> (usize, usize) {
        match self {
            Orientation::XY => (0, 1),
            Orientation::XZ => (0, 2),
            Orientation::YZ => (1, 2),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Orientation::XY => "xy",
            Orientation::XZ => "xz",
            Orientation::YZ => "yz",
        };
        f.write_str(s)
    }
}

/// A plaquette anchored at `site` spanning the plane `orientation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Plaquette {
    pub site: usize,
    pub orientation: Orientation,
}

impl Plaquette {
    pub fn new(site: usize, orientation: Orientation) -> Self {
        Self { site, orientation }
    }

    /// Link indices `[p1, p2, p3, p4]`.
    pub fn links(&self, lattice: &Lattice) -> [usize; 4] {
        let (mu, nu) = self.orientation.axes();
        let n = self.site;
        [
            lattice.link(n, mu),
            lattice.link(lattice.forward(n, mu), nu),
            lattice.link(lattice.forward(n, nu), mu),
            lattice.link(n, nu),
        ]
    }
}

impl fmt::Display for Plaquette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-plaquette at site {}", self.orientation, self.site)
    }
}

/// All plaquettes of the lattice, site-major, orientations in `XY, XZ, YZ` order.
pub fn all_plaquettes(lattice: &Lattice) -> Vec<Plaquette> {
    let orientations = Orientation::for_dim(lattice.dim());
    let mut plaquettes = Vec::with_capacity(lattice.volume() * orientations.len());
    for site in 0..lattice.volume() {
        for &orientation in orientations {
            plaquettes.push(Plaquette::new(site, orientation));
        }
    }
    plaquettes
}
