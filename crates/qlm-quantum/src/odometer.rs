//! Mixed-position counter over a fixed base.
//!
//! Digit 0 is the most significant. The checkerboard enumerator runs one
//! base-6 digit per even site; the spanning-tree and brute-force strategies
//! run binary digits over their free links.

/// Fixed-length base-`b` counter with a pruning jump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OdometerCounter {
    digits: Vec<u8>,
    base: u8,
    exhausted: bool,
}

impl OdometerCounter {
    /// All-zero counter of `len` digits. `base` must be at least 2.
    pub fn new(len: usize, base: u8) -> Self {
        assert!(base >= 2, "odometer base must be at least 2");
        Self {
            digits: vec![0; len],
            base,
            exhausted: false,
        }
    }

    /// Counter whose leading digits are `prefix` and the rest zero.
    pub fn with_prefix(len: usize, base: u8, prefix: &[u8]) -> Self {
        let mut counter = Self::new(len, base);
        for (d, &p) in counter.digits.iter_mut().zip(prefix) {
            debug_assert!(p < base);
            *d = p;
        }
        counter
    }

    /// Counter positioned at `ordinal`, or `None` if it is out of range.
    pub fn from_ordinal(ordinal: u128, len: usize, base: u8) -> Option<Self> {
        let mut counter = Self::new(len, base);
        let mut rem = ordinal;
        for d in counter.digits.iter_mut().rev() {
            *d = (rem % base as u128) as u8;
            rem /= base as u128;
        }
        (rem == 0).then_some(counter)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.digits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    #[inline]
    pub fn base(&self) -> u8 {
        self.base
    }

    #[inline]
    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    #[inline]
    pub fn digit(&self, pos: usize) -> u8 {
        self.digits[pos]
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Advance by one. Carrying past digit 0 exhausts the counter.
    pub fn increment(&mut self) {
        match self.digits.len() {
            0 => self.exhausted = true,
            n => self.carry_from(n - 1),
        }
    }

    /// Zero every digit after `pos`, then add one at `pos` with carry.
    ///
    /// All candidates skipped share the digits `0..=pos` of the current one.
    pub fn increment_at(&mut self, pos: usize) {
        if pos + 1 >= self.digits.len() {
            self.increment();
            return;
        }
        self.digits[pos + 1..].fill(0);
        self.carry_from(pos);
    }

    fn carry_from(&mut self, pos: usize) {
        if self.exhausted {
            return;
        }
        let mut k = pos;
        loop {
            if self.digits[k] + 1 < self.base {
                self.digits[k] += 1;
                return;
            }
            self.digits[k] = 0;
            if k == 0 {
                self.exhausted = true;
                return;
            }
            k -= 1;
        }
    }

    /// Position in the full sequence; `base^len` once exhausted.
    /// `None` if that does not fit in a `u128`.
    pub fn ordinal(&self) -> Option<u128> {
        if self.exhausted {
            return (self.base as u128).checked_pow(u32::try_from(self.len()).ok()?);
        }
        self.digits.iter().try_fold(0u128, |acc, &d| {
            acc.checked_mul(self.base as u128)?.checked_add(d as u128)
        })
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn jump_skips_exactly_subtree(len in 1usize..8, pos_seed in 0usize..8, ord_seed in 0u128..1_679_616) {
            let base = 6u8;
            let total = 6u128.pow(len as u32);
            let pos = pos_seed % len;
            let ordinal = ord_seed % total;
            let mut c = OdometerCounter::from_ordinal(ordinal, len, base).unwrap();

            let stride = 6u128.pow((len - 1 - pos) as u32);
            let expected = (ordinal / stride + 1) * stride;
            c.increment_at(pos);
            prop_assert_eq!(c.ordinal(), Some(expected.min(total)));
            prop_assert_eq!(c.is_exhausted(), expected >= total);
        }

        #[test]
        fn ordinal_roundtrips(len in 0usize..10, base in 2u8..7, seed in any::<u64>()) {
            let total = (base as u128).pow(len as u32);
            let ordinal = seed as u128 % total;
            let c = OdometerCounter::from_ordinal(ordinal, len, base).unwrap();
            prop_assert_eq!(c.ordinal(), Some(ordinal));
        }
    }
}
