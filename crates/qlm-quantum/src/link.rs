//! Binary link configurations.
//!
//! Each link carries a spin-½ electric flux S³ = ±½, stored as a bool
//! (`true` ↦ +1, `false` ↦ −1). Configurations are indexed by the lattice
//! link index `D·site + axis`.

use std::fmt;

/// One assignment of all `D·V` links.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkConfig(Vec<bool>);

impl LinkConfig {
    /// All links set to −1.
    pub fn new(n_links: usize) -> Self {
        Self(vec![false; n_links])
    }

    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self(bits)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn get(&self, link: usize) -> bool {
        self.0[link]
    }

    #[inline]
    pub fn set(&mut self, link: usize, up: bool) {
        self.0[link] = up;
    }

    /// Link value as ±1.
    #[inline]
    pub fn value(&self, link: usize) -> i32 {
        if self.0[link] {
            1
        } else {
            -1
        }
    }

    #[inline]
    pub fn toggle(&mut self, link: usize) {
        self.0[link] = !self.0[link];
    }

    #[inline]
    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    /// Number of links set to +1.
    pub fn count_up(&self) -> usize {
        self.0.iter().filter(|&&b| b).count()
    }
}

/// Space-separated `0`/`1` tokens, one per link.
impl fmt::Display for LinkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &b) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(if b { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl From<Vec<bool>> for LinkConfig {
    fn from(bits: Vec<bool>) -> Self {
        Self(bits)
    }
}
