//! Gauss law constraint for U(1) quantum link models.
//!
//! With link values E_μ(n) = ±1 the charge at site n is
//!
//!   Q(n) = Σ_μ [E_μ(n) − E_μ(n − μ)]
//!
//! i.e. outgoing links count positive, incoming links negative. A physical
//! state has Q(n) = 0 at every site; the bounded sector also admits
//! Q(n) = ±2. Summed over a periodic lattice, Q is identically zero since
//! every link leaves one site and enters another.
//!
//! For the spanning-tree enumeration the non-tree links are assigned
//! freely and the tree links are solved from Gauss law by leaf peeling.

use std::collections::VecDeque;

use qlm_lattice::Lattice;
use serde::{Deserialize, Serialize};

use crate::link::LinkConfig;

/// Which local charges are admissible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeSector {
    /// Q(n) = 0 everywhere.
    #[default]
    Neutral,
    /// Q(n) ∈ {−2, 0, +2}.
    Bounded,
}

impl ChargeSector {
    #[inline]
    pub fn admits(self, charge: i32) -> bool {
        match self {
            ChargeSector::Neutral => charge == 0,
            ChargeSector::Bounded => matches!(charge, -2 | 0 | 2),
        }
    }
}

/// Charge Q(site).
#[inline]
pub fn charge(lattice: &Lattice, config: &LinkConfig, site: usize) -> i32 {
    let mut q = 0;
    for axis in 0..lattice.dim() {
        q += config.value(lattice.link(site, axis));
        q -= config.value(lattice.link(lattice.backward(site, axis), axis));
    }
    q
}

/// Gauss law at a single site.
#[inline]
pub fn is_valid(lattice: &Lattice, config: &LinkConfig, site: usize, sector: ChargeSector) -> bool {
    sector.admits(charge(lattice, config, site))
}

/// Verify that a configuration satisfies Gauss law at every site.
pub fn check_gauss_law(lattice: &Lattice, config: &LinkConfig, sector: ChargeSector) -> bool {
    (0..lattice.volume()).all(|site| is_valid(lattice, config, site, sector))
}

/// Σ_n Q(n). Zero for every configuration on a periodic lattice.
pub fn total_charge(lattice: &Lattice, config: &LinkConfig) -> i32 {
    (0..lattice.volume())
        .map(|site| charge(lattice, config, site))
        .sum()
}

/// The two endpoints `(from, to)` of a link.
#[inline]
pub fn link_endpoints(lattice: &Lattice, link: usize) -> (usize, usize) {
    let (site, axis) = lattice.link_site_axis(link);
    (site, lattice.forward(site, axis))
}

/// Site-link adjacency with orientation signs.
///
/// `adj[v]` holds `(link, sign)` with `sign = +1` if the link leaves v and
/// `−1` if it enters v. Every site has exactly `2D` entries; on an axis of
/// extent 2 two distinct links join the same pair of sites.
pub fn vertex_link_adjacency(lattice: &Lattice) -> Vec<Vec<(usize, i32)>> {
    let mut adj = vec![Vec::with_capacity(2 * lattice.dim()); lattice.volume()];
    for link in 0..lattice.n_links() {
        let (from, to) = link_endpoints(lattice, link);
        adj[from].push((link, 1));
        adj[to].push((link, -1));
    }
    adj
}

/// BFS spanning tree of the lattice graph, rooted at site 0.
///
/// Returns `(tree_links, free_links)`; `free_links` has
/// `D·V − V + 1` entries and is sorted.
pub fn spanning_tree(lattice: &Lattice) -> (Vec<usize>, Vec<usize>) {
    let adj = vertex_link_adjacency(lattice);
    let n_v = lattice.volume();
    let mut visited = vec![false; n_v];
    let mut is_tree = vec![false; lattice.n_links()];
    let mut tree_links = Vec::with_capacity(n_v.saturating_sub(1));

    let mut queue = VecDeque::new();
    visited[0] = true;
    queue.push_back(0);

    while let Some(v) = queue.pop_front() {
        for &(link, _) in &adj[v] {
            let (from, to) = link_endpoints(lattice, link);
            let other = if from == v { to } else { from };
            if !visited[other] {
                visited[other] = true;
                is_tree[link] = true;
                tree_links.push(link);
                queue.push_back(other);
            }
        }
    }

    let free_links = (0..lattice.n_links()).filter(|&l| !is_tree[l]).collect();
    (tree_links, free_links)
}

/// Order in which tree links are fixed by Gauss law.
///
/// Each entry `(site, link)` names a site with exactly one still-unknown
/// tree link; Gauss law at that site determines it. The root is left over
/// and is satisfied automatically because the total charge vanishes.
pub fn tree_solve_order(
    lattice: &Lattice,
    tree_links: &[usize],
    adj: &[Vec<(usize, i32)>],
) -> Vec<(usize, usize)> {
    let n_v = lattice.volume();
    let mut is_tree = vec![false; lattice.n_links()];
    for &l in tree_links {
        is_tree[l] = true;
    }

    let mut tree_degree: Vec<u32> = adj
        .iter()
        .map(|links| links.iter().filter(|(l, _)| is_tree[*l]).count() as u32)
        .collect();

    let mut solved = vec![false; lattice.n_links()];
    let mut order = Vec::with_capacity(tree_links.len());
    let mut queue: VecDeque<usize> = (0..n_v).filter(|&v| tree_degree[v] == 1).collect();

    while let Some(v) = queue.pop_front() {
        let Some(&(link, _)) = adj[v].iter().find(|(l, _)| is_tree[*l] && !solved[*l]) else {
            continue;
        };
        solved[link] = true;
        order.push((v, link));
        tree_degree[v] -= 1;

        let (from, to) = link_endpoints(lattice, link);
        let other = if from == v { to } else { from };
        tree_degree[other] -= 1;
        if tree_degree[other] == 1 {
            queue.push_back(other);
        }
    }

    order
}

/// Fix tree links from Gauss law given the free-link assignment.
///
/// Returns false if some tree link would need a value other than ±1.
pub fn solve_tree_links(
    adj: &[Vec<(usize, i32)>],
    solve_order: &[(usize, usize)],
    config: &mut LinkConfig,
) -> bool {
    for &(v, target) in solve_order {
        // Σ σ(v,l) E_l = 0  ⇒  E_target = −σ_target · Σ_{l ≠ target} σ(v,l) E_l
        let mut sum = 0i32;
        let mut target_sign = 0i32;
        for &(link, sign) in &adj[v] {
            if link == target {
                target_sign = sign;
            } else {
                sum += sign * config.value(link);
            }
        }
        debug_assert_ne!(target_sign, 0);
        match -sum * target_sign {
            1 => config.set(target, true),
            -1 => config.set(target, false),
            _ => return false,
        }
    }
    true
}
