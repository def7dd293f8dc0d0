//! Periodic square and cubic lattices.
//!
//! Sites are linearized with x fastest: `p = x + Lx·(y + Ly·z)`.
//! The link U_μ(n) leaves site n along +μ and has index `D·n + μ`, so the
//! two (or three) links owned by a site are stored next to each other.

use crate::error::{LatticeError, Result};

/// Largest supported number of spatial dimensions.
pub const MAX_DIM: usize = 3;

/// A step on the lattice: stay put, or move one site along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Here,
    Forward(usize),
    Backward(usize),
}

impl Direction {
    /// Row of the neighbor table holding this direction.
    #[inline]
    fn slot(self, dim: usize) -> usize {
        match self {
            Direction::Here => 0,
            Direction::Forward(axis) => 1 + axis,
            Direction::Backward(axis) => 1 + dim + axis,
        }
    }
}

/// Periodic D-dimensional rectangular lattice with a precomputed neighbor table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lattice {
    extents: Vec<usize>,
    volume: usize,
    /// `next[slot * volume + site]` for the `2D + 1` directions.
    next: Vec<usize>,
}

impl Lattice {
    /// Build a lattice with the given extents `[Lx, Ly]` or `[Lx, Ly, Lz]`.
    pub fn new(extents: &[usize]) -> Result<Self> {
        let dim = extents.len();
        if !(2..=MAX_DIM).contains(&dim) {
            return Err(LatticeError::UnsupportedDimension(dim));
        }
        for (axis, &extent) in extents.iter().enumerate() {
            if extent < 2 {
                return Err(LatticeError::InvalidExtent { axis, extent });
            }
        }
        let volume = extents
            .iter()
            .try_fold(1usize, |acc, &l| acc.checked_mul(l))
            .ok_or(LatticeError::VolumeOverflow)?;
        let table_len = (2 * dim + 1)
            .checked_mul(volume)
            .ok_or(LatticeError::VolumeOverflow)?;

        let mut lattice = Self {
            extents: extents.to_vec(),
            volume,
            next: vec![0; table_len],
        };

        for site in 0..volume {
            lattice.next[site] = site;
            for axis in 0..dim {
                let fwd = lattice.shift(site, axis, true);
                let bwd = lattice.shift(site, axis, false);
                lattice.next[Direction::Forward(axis).slot(dim) * volume + site] = fwd;
                lattice.next[Direction::Backward(axis).slot(dim) * volume + site] = bwd;
            }
        }

        Ok(lattice)
    }

    /// Square lattice `Lx × Ly`.
    pub fn square(lx: usize, ly: usize) -> Result<Self> {
        Self::new(&[lx, ly])
    }

    /// Cubic lattice `Lx × Ly × Lz`.
    pub fn cubic(lx: usize, ly: usize, lz: usize) -> Result<Self> {
        Self::new(&[lx, ly, lz])
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.extents.len()
    }

    pub fn extents(&self) -> &[usize] {
        &self.extents
    }

    #[inline]
    pub fn extent(&self, axis: usize) -> usize {
        self.extents[axis]
    }

    /// Number of sites V.
    #[inline]
    pub fn volume(&self) -> usize {
        self.volume
    }

    /// Number of links D·V.
    #[inline]
    pub fn n_links(&self) -> usize {
        self.dim() * self.volume
    }

    /// Neighboring site in direction `dir` (periodic).
    #[inline]
    pub fn neighbor(&self, site: usize, dir: Direction) -> usize {
        self.next[dir.slot(self.dim()) * self.volume + site]
    }

    #[inline]
    pub fn forward(&self, site: usize, axis: usize) -> usize {
        self.neighbor(site, Direction::Forward(axis))
    }

    #[inline]
    pub fn backward(&self, site: usize, axis: usize) -> usize {
        self.neighbor(site, Direction::Backward(axis))
    }

    /// Index of the link U_axis(site).
    #[inline]
    pub fn link(&self, site: usize, axis: usize) -> usize {
        self.dim() * site + axis
    }

    /// Inverse of [`Lattice::link`]: `(site, axis)`.
    #[inline]
    pub fn link_site_axis(&self, link: usize) -> (usize, usize) {
        (link / self.dim(), link % self.dim())
    }

    /// Coordinates of a site; entries beyond `dim()` are zero.
    pub fn coords(&self, site: usize) -> [usize; MAX_DIM] {
        let mut coords = [0usize; MAX_DIM];
        let mut rem = site;
        for (axis, &extent) in self.extents.iter().enumerate() {
            coords[axis] = rem % extent;
            rem /= extent;
        }
        coords
    }

    /// Linear index of a coordinate tuple (coordinates are taken modulo the extents).
    pub fn site_index(&self, coords: &[usize]) -> usize {
        let mut index = 0;
        let mut stride = 1;
        for (axis, &extent) in self.extents.iter().enumerate() {
            index += (coords[axis] % extent) * stride;
            stride *= extent;
        }
        index
    }

    /// Coordinate-sum parity: 0 for even sites, 1 for odd ones.
    pub fn parity(&self, site: usize) -> usize {
        self.coords(site).iter().sum::<usize>() % 2
    }

    /// True when every extent is even, so that every link joins an even
    /// site to an odd one across the periodic boundary as well.
    pub fn is_bipartite(&self) -> bool {
        self.extents.iter().all(|l| l % 2 == 0)
    }

    fn shift(&self, site: usize, axis: usize, forward: bool) -> usize {
        let mut coords = self.coords(site);
        let l = self.extents[axis];
        coords[axis] = if forward {
            (coords[axis] + 1) % l
        } else {
            (coords[axis] + l - 1) % l
        };
        self.site_index(&coords[..self.dim()])
    }
}
