//! The six charge-neutral vertex rules.
//!
//! A 2D site has four incident links: `out_x = U_x(n)`, `out_y = U_y(n)`,
//! `in_x = U_x(n − x)` and `in_y = U_y(n − y)`. Exactly six of the sixteen
//! assignments give Q(n) = 0. The checkerboard enumerator assigns one rule
//! to every even site; the digit of a rule is its position in [`GeneratorRule::ALL`].

use qlm_lattice::Lattice;

use crate::link::LinkConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneratorRule {
    /// Flux passes straight through along +x; y links point down.
    PlusXMinusY,
    /// All four links up.
    PlusXPlusY,
    /// All four links down.
    MinusXMinusY,
    /// Flux enters along x and leaves along y.
    InXOutY,
    /// Flux enters along y and leaves along x.
    OutXInY,
    /// Flux passes straight through along +y; x links point down.
    MinusXPlusY,
}

impl GeneratorRule {
    pub const ALL: [GeneratorRule; 6] = [
        GeneratorRule::PlusXMinusY,
        GeneratorRule::PlusXPlusY,
        GeneratorRule::MinusXMinusY,
        GeneratorRule::InXOutY,
        GeneratorRule::OutXInY,
        GeneratorRule::MinusXPlusY,
    ];

    #[inline]
    pub fn from_digit(digit: u8) -> Option<Self> {
        Self::ALL.get(digit as usize).copied()
    }

    #[inline]
    pub fn digit(self) -> u8 {
        self as u8
    }

    /// Link outcomes `[out_x, out_y, in_x, in_y]`.
    #[inline]
    pub fn links(self) -> [bool; 4] {
        match self {
            GeneratorRule::PlusXMinusY => [true, false, true, false],
            GeneratorRule::PlusXPlusY => [true, true, true, true],
            GeneratorRule::MinusXMinusY => [false, false, false, false],
            GeneratorRule::InXOutY => [false, true, true, false],
            GeneratorRule::OutXInY => [true, false, false, true],
            GeneratorRule::MinusXPlusY => [false, true, false, true],
        }
    }

    /// Write the four incident links of `site`.
    pub fn apply(self, lattice: &Lattice, config: &mut LinkConfig, site: usize) {
        let [out_x, out_y, in_x, in_y] = self.links();
        config.set(lattice.link(site, 0), out_x);
        config.set(lattice.link(site, 1), out_y);
        config.set(lattice.link(lattice.backward(site, 0), 0), in_x);
        config.set(lattice.link(lattice.backward(site, 1), 1), in_y);
    }
}
