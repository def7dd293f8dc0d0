//! Checkerboard (even/odd) site ordering.
//!
//! Checkerboard indices `[0, n_even)` are the even sites (coordinate sum
//! even), `[n_even, V)` the odd ones, each block in increasing linear order.
//! On a bipartite lattice `n_even = V/2`. Fixing the four links of an even
//! site fixes one link of each odd neighbor, which is what the basis
//! enumerator exploits.

use crate::lattice::{Direction, Lattice};

/// Bijection between linear and checkerboard site indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkerboard {
    lin2chk: Vec<usize>,
    chk2lin: Vec<usize>,
    n_even: usize,
}

impl Checkerboard {
    pub fn new(lattice: &Lattice) -> Self {
        let volume = lattice.volume();
        let mut chk2lin = Vec::with_capacity(volume);
        chk2lin.extend((0..volume).filter(|&p| lattice.parity(p) == 0));
        let n_even = chk2lin.len();
        chk2lin.extend((0..volume).filter(|&p| lattice.parity(p) == 1));

        let mut lin2chk = vec![0; volume];
        for (chk, &lin) in chk2lin.iter().enumerate() {
            lin2chk[lin] = chk;
        }

        Self {
            lin2chk,
            chk2lin,
            n_even,
        }
    }

    #[inline]
    pub fn linear_to_checkerboard(&self, site: usize) -> usize {
        self.lin2chk[site]
    }

    #[inline]
    pub fn checkerboard_to_linear(&self, chk: usize) -> usize {
        self.chk2lin[chk]
    }

    /// Number of even sites; the even block is `[0, n_even)`.
    #[inline]
    pub fn n_even(&self) -> usize {
        self.n_even
    }

    pub fn len(&self) -> usize {
        self.chk2lin.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chk2lin.is_empty()
    }

    /// Even sites in checkerboard order, as linear indices.
    pub fn even_sites(&self) -> &[usize] {
        &self.chk2lin[..self.n_even]
    }

    /// Odd sites in checkerboard order, as linear indices.
    pub fn odd_sites(&self) -> &[usize] {
        &self.chk2lin[self.n_even..]
    }

    #[inline]
    pub fn is_even(&self, site: usize) -> bool {
        self.lin2chk[site] < self.n_even
    }

    /// Neighbor expressed in checkerboard indices.
    pub fn neighbor(&self, lattice: &Lattice, chk: usize, dir: Direction) -> usize {
        self.lin2chk[lattice.neighbor(self.chk2lin[chk], dir)]
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_extents() -> impl Strategy<Value = Vec<usize>> {
        prop_oneof![
            prop::collection::vec(2usize..7, 2),
            prop::collection::vec(2usize..5, 3),
        ]
    }

    proptest! {
        #[test]
        fn bijection_roundtrips(extents in arb_extents()) {
            let lat = Lattice::new(&extents).unwrap();
            let chk = Checkerboard::new(&lat);
            prop_assert_eq!(chk.len(), lat.volume());
            for site in 0..lat.volume() {
                let c = chk.linear_to_checkerboard(site);
                prop_assert_eq!(chk.checkerboard_to_linear(c), site);
                prop_assert_eq!(c < chk.n_even(), lat.parity(site) == 0);
            }
        }
    }
}
