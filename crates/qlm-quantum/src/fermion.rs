//! Jordan-Wigner sign of a fermionic plaquette flip.
//!
//! Every link is a fermionic mode, ordered by link index; `true` means
//! occupied. Applying c or c† to mode p picks up (−1)^N(p) where N(p) is the
//! number of occupied modes with index greater than p.
//!
//! A flippable plaquette in the pattern `(1,1,0,0)` on `(p1,p2,p3,p4)` is
//! flipped by c(p1) c(p2) c†(p3) c†(p4); the pattern `(0,0,1,1)` by
//! c(p4) c(p3) c†(p2) c†(p1). Operators are applied left to right.

use thiserror::Error;

use crate::link::LinkConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignError {
    #[error("link pattern {0:?} is neither (1,1,0,0) nor (0,0,1,1)")]
    Pattern([bool; 4]),

    #[error("mode {mode} is {}", occupancy(.occupied))]
    Occupation { mode: usize, occupied: bool },
}

fn occupancy(occupied: &bool) -> &'static str {
    if *occupied {
        "already occupied"
    } else {
        "empty"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Annihilate,
    Create,
}

/// Sign (±1) of the flip of the plaquette with links `links`.
pub fn plaquette_sign(config: &LinkConfig, links: &[usize; 4]) -> Result<i32, SignError> {
    let mut scratch = config.clone();
    plaquette_sign_in(&mut scratch, links)
}

/// As [`plaquette_sign`], working in a caller-provided copy.
///
/// On success `scratch` holds the flipped configuration.
pub fn plaquette_sign_in(scratch: &mut LinkConfig, links: &[usize; 4]) -> Result<i32, SignError> {
    let [p1, p2, p3, p4] = *links;
    let pattern = links.map(|l| scratch.get(l));
    let sequence = match pattern {
        [true, true, false, false] => [
            (p1, Op::Annihilate),
            (p2, Op::Annihilate),
            (p3, Op::Create),
            (p4, Op::Create),
        ],
        [false, false, true, true] => [
            (p4, Op::Annihilate),
            (p3, Op::Annihilate),
            (p2, Op::Create),
            (p1, Op::Create),
        ],
        _ => return Err(SignError::Pattern(pattern)),
    };

    let mut sign = 1;
    for (mode, op) in sequence {
        sign *= apply(scratch, mode, op)?;
    }
    Ok(sign)
}

fn apply(state: &mut LinkConfig, mode: usize, op: Op) -> Result<i32, SignError> {
    let occupied = state.get(mode);
    if occupied != (op == Op::Annihilate) {
        return Err(SignError::Occupation { mode, occupied });
    }
    let above = state.as_slice()[mode + 1..].iter().filter(|&&b| b).count();
    state.toggle(mode);
    Ok(if above % 2 == 0 { 1 } else { -1 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flux::flip;

    #[test]
    fn test_isolated_plaquette_sign() {
        // Modes 0..4 are the plaquette, nothing above them.
        // c(0): above = {1} → −1; c(1): none → +1; c†(2), c†(3): +1.
        let c = LinkConfig::from_bits(vec![true, true, false, false]);
        assert_eq!(plaquette_sign(&c, &[0, 1, 2, 3]), Ok(-1));
    }

    #[test]
    fn test_spectator_modes_count() {
        // An occupied spectator above every plaquette mode contributes
        // (−1) four times, which cancels.
        let c = LinkConfig::from_bits(vec![true, true, false, false, true]);
        assert_eq!(plaquette_sign(&c, &[0, 1, 2, 3]), Ok(-1));

        // A spectator between p2 and p3 is seen by c(p1) and c(p2) only.
        let c = LinkConfig::from_bits(vec![true, true, true, false, false]);
        assert_eq!(plaquette_sign(&c, &[0, 1, 3, 4]), Ok(-1));
    }

    #[test]
    fn test_scratch_holds_flipped_state() {
        let c = LinkConfig::from_bits(vec![false, true, false, true, true, false]);
        let links = [1, 3, 0, 5];
        let mut scratch = c.clone();
        plaquette_sign_in(&mut scratch, &links).unwrap();
        assert_eq!(scratch, flip(&c, &links));
    }

    #[test]
    fn test_reverse_flip_has_same_sign() {
        let links = [4, 1, 5, 2];
        for (m0, m3) in [(false, false), (false, true), (true, false), (true, true)] {
            let c = LinkConfig::from_bits(vec![m0, true, false, m3, true, false]);
            let f = flip(&c, &links);
            assert_eq!(plaquette_sign(&c, &links), plaquette_sign(&f, &links));
        }
    }

    #[test]
    fn test_rejects_unflippable_pattern() {
        let c = LinkConfig::from_bits(vec![true, false, true, false]);
        assert_eq!(
            plaquette_sign(&c, &[0, 1, 2, 3]),
            Err(SignError::Pattern([true, false, true, false]))
        );
    }

    #[test]
    fn test_occupation_error() {
        let mut s = LinkConfig::from_bits(vec![false, true]);
        assert_eq!(
            apply(&mut s, 0, Op::Annihilate),
            Err(SignError::Occupation {
                mode: 0,
                occupied: false
            })
        );
        assert_eq!(
            apply(&mut s, 1, Op::Create),
            Err(SignError::Occupation {
                mode: 1,
                occupied: true
            })
        );
        assert_eq!(apply(&mut s, 0, Op::Create), Ok(-1));
    }
}
