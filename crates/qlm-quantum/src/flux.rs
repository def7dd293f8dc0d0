//! Plaquette flux and the flip operator U_□ + U_□†.
//!
//! With links `[p1, p2, p3, p4]` in the order of
//! [`Plaquette::links`](qlm_lattice::Plaquette::links), a plaquette is
//! flippable when it carries a circulating flux: `p1 == p2`, `p3 == p4` and
//! `p1 != p4`. Flipping reverses the circulation by toggling all four links,
//! which leaves the charge at each corner unchanged.

use qlm_lattice::LatticeContext;

use crate::link::LinkConfig;

#[inline]
pub fn is_flippable(config: &LinkConfig, links: &[usize; 4]) -> bool {
    let [l1, l2, l3, l4] = links.map(|l| config.get(l));
    l1 == l2 && l3 == l4 && l1 != l4
}

/// Copy of `config` with the four plaquette links toggled.
pub fn flip(config: &LinkConfig, links: &[usize; 4]) -> LinkConfig {
    let mut out = config.clone();
    flip_in_place(&mut out, links);
    out
}

#[inline]
pub fn flip_in_place(config: &mut LinkConfig, links: &[usize; 4]) {
    for &l in links {
        config.toggle(l);
    }
}

/// Number of flippable plaquettes.
pub fn count_flippable(ctx: &LatticeContext, config: &LinkConfig) -> usize {
    ctx.plaquette_links
        .iter()
        .filter(|links| is_flippable(config, links))
        .count()
}

/// Flippability of every plaquette, in plaquette order.
pub fn flux_pattern(ctx: &LatticeContext, config: &LinkConfig) -> Vec<bool> {
    ctx.plaquette_links
        .iter()
        .map(|links| is_flippable(config, links))
        .collect()
}
