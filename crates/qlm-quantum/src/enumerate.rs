//! Gauge-invariant basis enumeration.
//!
//! Every strategy walks an [`OdometerCounter`] whose digits parametrize
//! candidate link configurations, and appends the candidates that satisfy
//! Gauss law to a [`BasisStore`] in odometer order.
//!
//! - **Checkerboard** (2D, even extents): one base-6 digit per even site,
//!   selecting a [`GeneratorRule`]. Each link joins an even site to an odd
//!   one, so the rules fix every link and only odd sites need checking. An
//!   odd site is checked as soon as all four of its links are set; a failure
//!   at digit `pos` skips every candidate sharing digits `0..=pos`.
//! - **Spanning tree**: one binary digit per non-tree link of a BFS spanning
//!   tree; tree links are solved from Gauss law by leaf peeling. Any D, any
//!   extents.
//! - **Brute force**: one binary digit per link, Gauss law checked at every
//!   site. Exponential; used as a reference.
//!
//! With `parallel` set, the scan is split into one shard per value of the
//! leading digit and shards run on the rayon pool. Shard results are
//! concatenated in digit order, which is the sequential order.

use std::fmt;
use std::ops::AddAssign;

use qlm_lattice::{Lattice, LatticeContext};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::basis::{Basis, BasisStore};
use crate::error::{QuantumError, Result};
use crate::flux;
use crate::gauss_law::{self, ChargeSector};
use crate::generator::GeneratorRule;
use crate::link::LinkConfig;
use crate::odometer::OdometerCounter;

/// Brute force above this many links is refused.
pub const BRUTE_FORCE_MAX_LINKS: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    Checkerboard,
    SpanningTree,
    BruteForce,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Checkerboard => "checkerboard",
            Strategy::SpanningTree => "spanning-tree",
            Strategy::BruteForce => "brute-force",
        })
    }
}

/// Keep only states in one winding sector.
///
/// A state is in sector `target` when `Σ_site U_d(site) = target[d] · L_d`
/// for every axis d.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindingFilter {
    pub target: Vec<i32>,
}

impl WindingFilter {
    pub fn new(target: Vec<i32>) -> Self {
        Self { target }
    }

    pub fn accepts(&self, lattice: &Lattice, config: &LinkConfig) -> bool {
        winding_sums(lattice, config)
            .iter()
            .zip(&self.target)
            .enumerate()
            .all(|(axis, (&sum, &w))| {
                i64::from(sum) == i64::from(w) * lattice.extent(axis) as i64
            })
    }
}

/// `Σ_site U_d(site)` per axis, with links as ±1.
pub fn winding_sums(lattice: &Lattice, config: &LinkConfig) -> Vec<i32> {
    (0..lattice.dim())
        .map(|axis| {
            (0..lattice.volume())
                .map(|site| config.value(lattice.link(site, axis)))
                .sum()
        })
        .collect()
}

/// Winding numbers `Σ_site U_d(site) / L_d`, or `None` if a sum is not a
/// multiple of its extent.
pub fn winding_numbers(lattice: &Lattice, config: &LinkConfig) -> Option<Vec<i32>> {
    winding_sums(lattice, config)
        .into_iter()
        .enumerate()
        .map(|(axis, sum)| {
            let l = lattice.extent(axis) as i32;
            (sum % l == 0).then_some(sum / l)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumerationOptions {
    /// `None` selects automatically.
    pub strategy: Option<Strategy>,
    pub sector: ChargeSector,
    pub winding: Option<WindingFilter>,
    /// Keep states without any flippable plaquette.
    pub keep_frozen: bool,
    pub parallel: bool,
}

impl Default for EnumerationOptions {
    fn default() -> Self {
        Self {
            strategy: None,
            sector: ChargeSector::Neutral,
            winding: None,
            keep_frozen: true,
            parallel: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnumerationStats {
    /// Candidates evaluated, each at least partially.
    pub candidates_visited: u64,
    /// Pruning jumps taken.
    pub jumps: u64,
    /// States appended to the basis.
    pub accepted: u64,
    /// Gauss-law states rejected by the winding filter.
    pub rejected_by_filter: u64,
    /// Gauss-law states dropped for having no flippable plaquette.
    pub frozen_dropped: u64,
}

impl AddAssign for EnumerationStats {
    fn add_assign(&mut self, rhs: Self) {
        self.candidates_visited += rhs.candidates_visited;
        self.jumps += rhs.jumps;
        self.accepted += rhs.accepted;
        self.rejected_by_filter += rhs.rejected_by_filter;
        self.frozen_dropped += rhs.frozen_dropped;
    }
}

#[derive(Debug, Clone)]
pub struct Enumeration {
    pub basis: BasisStore,
    pub strategy: Strategy,
    pub stats: EnumerationStats,
}

impl Enumeration {
    pub fn freeze(self, ctx: &LatticeContext) -> Result<Basis> {
        self.basis.freeze(ctx)
    }
}

/// Pick the strategy for `options`, or check that the requested one applies.
pub fn select_strategy(ctx: &LatticeContext, options: &EnumerationOptions) -> Result<Strategy> {
    let lattice = &ctx.lattice;
    let Some(strategy) = options.strategy else {
        let auto = match options.sector {
            ChargeSector::Bounded => Strategy::BruteForce,
            ChargeSector::Neutral if lattice.dim() == 2 && lattice.is_bipartite() => {
                Strategy::Checkerboard
            }
            ChargeSector::Neutral => Strategy::SpanningTree,
        };
        check_strategy(ctx, auto, options.sector)?;
        return Ok(auto);
    };
    check_strategy(ctx, strategy, options.sector)?;
    Ok(strategy)
}

fn check_strategy(ctx: &LatticeContext, strategy: Strategy, sector: ChargeSector) -> Result<()> {
    let unavailable =
        |reason: String| -> Result<()> { Err(QuantumError::StrategyUnavailable { strategy, reason }) };
    match strategy {
        Strategy::Checkerboard => {
            if ctx.dim() != 2 {
                return unavailable(format!("needs a 2D lattice, got {}D", ctx.dim()));
            }
            if !ctx.lattice.is_bipartite() {
                return unavailable(format!(
                    "needs even extents, got {:?}",
                    ctx.lattice.extents()
                ));
            }
            if sector != ChargeSector::Neutral {
                return unavailable("generator rules only produce neutral sites".into());
            }
        }
        Strategy::SpanningTree => {
            if sector != ChargeSector::Neutral {
                return unavailable("tree links are solved for zero charge only".into());
            }
        }
        Strategy::BruteForce => {
            if ctx.n_links() > BRUTE_FORCE_MAX_LINKS {
                return unavailable(format!(
                    "{} links exceed the limit of {BRUTE_FORCE_MAX_LINKS}",
                    ctx.n_links()
                ));
            }
        }
    }
    Ok(())
}

/// Enumerate the gauge-invariant basis of `ctx`.
pub fn enumerate(ctx: &LatticeContext, options: &EnumerationOptions) -> Result<Enumeration> {
    if let Some(filter) = &options.winding {
        if filter.target.len() != ctx.dim() {
            return Err(QuantumError::InvalidOption(format!(
                "winding target {:?} has {} entries, lattice is {}D",
                filter.target,
                filter.target.len(),
                ctx.dim()
            )));
        }
    }

    let strategy = select_strategy(ctx, options)?;
    debug!(%strategy, extents = ?ctx.lattice.extents(), sector = ?options.sector, "strategy selected");

    let (basis, stats) = match strategy {
        Strategy::Checkerboard => run(ctx, options, &CheckerboardScanner::new(ctx)),
        Strategy::SpanningTree => {
            let plan = TreePlan::new(&ctx.lattice);
            run(ctx, options, &TreeScanner::new(&plan))
        }
        Strategy::BruteForce => run(ctx, options, &BruteForceScanner::new(ctx, options.sector)),
    }?;

    if stats.frozen_dropped > 0 {
        warn!(dropped = stats.frozen_dropped, "removed frozen states");
    }
    info!(
        %strategy,
        states = basis.len(),
        visited = stats.candidates_visited,
        jumps = stats.jumps,
        "basis enumerated"
    );

    Ok(Enumeration {
        basis,
        strategy,
        stats,
    })
}

/// Outcome of evaluating one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Accept,
    Reject,
    /// Every candidate sharing digits `0..=pos` fails too.
    Prune(usize),
}

/// One strategy's candidate space. Clones share read-only tables and own
/// their scratch buffers, one per shard.
trait Scanner: Clone + Send + Sync {
    fn n_digits(&self) -> usize;
    fn base(&self) -> u8;
    /// Build the candidate for `digits` into the scanner's configuration.
    fn evaluate(&mut self, digits: &[u8]) -> Verdict;
    fn config(&self) -> &LinkConfig;
}

fn run<S: Scanner>(
    ctx: &LatticeContext,
    options: &EnumerationOptions,
    scanner: &S,
) -> Result<(BasisStore, EnumerationStats)> {
    let n_digits = scanner.n_digits();
    if !options.parallel || n_digits == 0 {
        return scan(ctx, options, scanner.clone(), None);
    }

    let shards: Vec<Result<(BasisStore, EnumerationStats)>> = (0..scanner.base())
        .into_par_iter()
        .map(|lead| scan(ctx, options, scanner.clone(), Some(lead)))
        .collect();

    let mut basis = BasisStore::new();
    let mut stats = EnumerationStats::default();
    for (lead, shard) in shards.into_iter().enumerate() {
        let (states, shard_stats) = shard?;
        debug!(lead, states = states.len(), visited = shard_stats.candidates_visited, "shard done");
        basis.try_reserve(states.len())?;
        basis.extend(states);
        stats += shard_stats;
    }
    Ok((basis, stats))
}

/// Scan all candidates, or only those whose leading digit is `lead`.
fn scan<S: Scanner>(
    ctx: &LatticeContext,
    options: &EnumerationOptions,
    mut scanner: S,
    lead: Option<u8>,
) -> Result<(BasisStore, EnumerationStats)> {
    let n_digits = scanner.n_digits();
    let mut counter = match lead {
        Some(d) => OdometerCounter::with_prefix(n_digits, scanner.base(), &[d]),
        None => OdometerCounter::new(n_digits, scanner.base()),
    };
    let mut basis = BasisStore::new();
    let mut stats = EnumerationStats::default();

    while !counter.is_exhausted() && lead.map_or(true, |d| counter.digit(0) == d) {
        stats.candidates_visited += 1;
        match scanner.evaluate(counter.digits()) {
            Verdict::Accept => {
                let config = scanner.config();
                if options
                    .winding
                    .as_ref()
                    .is_some_and(|w| !w.accepts(&ctx.lattice, config))
                {
                    stats.rejected_by_filter += 1;
                } else if !options.keep_frozen && flux::count_flippable(ctx, config) == 0 {
                    stats.frozen_dropped += 1;
                } else {
                    basis.try_reserve(1)?;
                    basis.append(config.clone());
                    stats.accepted += 1;
                }
                counter.increment();
            }
            Verdict::Reject => counter.increment(),
            Verdict::Prune(pos) => {
                stats.jumps += 1;
                counter.increment_at(pos);
            }
        }
    }

    Ok((basis, stats))
}

#[derive(Debug, Clone)]
struct CheckerboardScanner<'a> {
    lattice: &'a Lattice,
    even: &'a [usize],
    odd: &'a [usize],
    config: LinkConfig,
    /// Links of each site set so far in the current candidate.
    counts: Vec<u8>,
    checked: Vec<bool>,
}

impl<'a> CheckerboardScanner<'a> {
    fn new(ctx: &'a LatticeContext) -> Self {
        Self {
            lattice: &ctx.lattice,
            even: ctx.checkerboard.even_sites(),
            odd: ctx.checkerboard.odd_sites(),
            config: LinkConfig::new(ctx.n_links()),
            counts: vec![0; ctx.volume()],
            checked: vec![false; ctx.volume()],
        }
    }
}

impl Scanner for CheckerboardScanner<'_> {
    fn n_digits(&self) -> usize {
        self.even.len()
    }

    fn base(&self) -> u8 {
        GeneratorRule::ALL.len() as u8
    }

    fn evaluate(&mut self, digits: &[u8]) -> Verdict {
        let lat = self.lattice;
        self.counts.fill(0);
        self.checked.fill(false);

        for (pos, (&site, &digit)) in self.even.iter().zip(digits).enumerate() {
            let Some(rule) = GeneratorRule::from_digit(digit) else {
                return Verdict::Reject;
            };
            rule.apply(lat, &mut self.config, site);

            let neighbors = [
                lat.backward(site, 1),
                lat.backward(site, 0),
                lat.forward(site, 0),
                lat.forward(site, 1),
            ];
            for &nb in &neighbors {
                self.counts[nb] += 1;
            }
            for &nb in &neighbors {
                if self.counts[nb] == 4 && !self.checked[nb] {
                    self.checked[nb] = true;
                    if !gauss_law::is_valid(lat, &self.config, nb, ChargeSector::Neutral) {
                        return Verdict::Prune(pos);
                    }
                }
            }
        }

        let remaining_ok = self.odd.iter().all(|&site| {
            self.checked[site] || gauss_law::is_valid(lat, &self.config, site, ChargeSector::Neutral)
        });
        if remaining_ok {
            Verdict::Accept
        } else {
            Verdict::Reject
        }
    }

    fn config(&self) -> &LinkConfig {
        &self.config
    }
}

/// Spanning tree and solve order, built once per lattice.
#[derive(Debug, Clone)]
struct TreePlan {
    n_links: usize,
    free_links: Vec<usize>,
    adjacency: Vec<Vec<(usize, i32)>>,
    solve_order: Vec<(usize, usize)>,
}

impl TreePlan {
    fn new(lattice: &Lattice) -> Self {
        let adjacency = gauss_law::vertex_link_adjacency(lattice);
        let (tree_links, free_links) = gauss_law::spanning_tree(lattice);
        let solve_order = gauss_law::tree_solve_order(lattice, &tree_links, &adjacency);
        debug!(
            tree = tree_links.len(),
            free = free_links.len(),
            "spanning tree built"
        );
        Self {
            n_links: lattice.n_links(),
            free_links,
            adjacency,
            solve_order,
        }
    }
}

#[derive(Debug, Clone)]
struct TreeScanner<'a> {
    plan: &'a TreePlan,
    config: LinkConfig,
}

impl<'a> TreeScanner<'a> {
    fn new(plan: &'a TreePlan) -> Self {
        Self {
            plan,
            config: LinkConfig::new(plan.n_links),
        }
    }
}

impl Scanner for TreeScanner<'_> {
    fn n_digits(&self) -> usize {
        self.plan.free_links.len()
    }

    fn base(&self) -> u8 {
        2
    }

    fn evaluate(&mut self, digits: &[u8]) -> Verdict {
        for (&link, &d) in self.plan.free_links.iter().zip(digits) {
            self.config.set(link, d == 1);
        }
        if gauss_law::solve_tree_links(&self.plan.adjacency, &self.plan.solve_order, &mut self.config) {
            Verdict::Accept
        } else {
            Verdict::Reject
        }
    }

    fn config(&self) -> &LinkConfig {
        &self.config
    }
}

#[derive(Debug, Clone)]
struct BruteForceScanner<'a> {
    lattice: &'a Lattice,
    sector: ChargeSector,
    config: LinkConfig,
}

impl<'a> BruteForceScanner<'a> {
    fn new(ctx: &'a LatticeContext, sector: ChargeSector) -> Self {
        Self {
            lattice: &ctx.lattice,
            sector,
            config: LinkConfig::new(ctx.n_links()),
        }
    }
}

impl Scanner for BruteForceScanner<'_> {
    fn n_digits(&self) -> usize {
        self.lattice.n_links()
    }

    fn base(&self) -> u8 {
        2
    }

    fn evaluate(&mut self, digits: &[u8]) -> Verdict {
        for (link, &d) in digits.iter().enumerate() {
            self.config.set(link, d == 1);
        }
        if gauss_law::check_gauss_law(self.lattice, &self.config, self.sector) {
            Verdict::Accept
        } else {
            Verdict::Reject
        }
    }

    fn config(&self) -> &LinkConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(extents: &[usize]) -> LatticeContext {
        LatticeContext::from_extents(extents).unwrap()
    }

    fn bits(config: &LinkConfig) -> String {
        config
            .as_slice()
            .iter()
            .map(|&b| if b { '1' } else { '0' })
            .collect()
    }

    fn with_strategy(strategy: Strategy) -> EnumerationOptions {
        EnumerationOptions {
            strategy: Some(strategy),
            ..Default::default()
        }
    }

    #[test]
    fn test_auto_selection() {
        let opts = EnumerationOptions::default();
        assert_eq!(select_strategy(&ctx(&[4, 4]), &opts).unwrap(), Strategy::Checkerboard);
        assert_eq!(select_strategy(&ctx(&[3, 3]), &opts).unwrap(), Strategy::SpanningTree);
        assert_eq!(select_strategy(&ctx(&[2, 2, 2]), &opts).unwrap(), Strategy::SpanningTree);

        let bounded = EnumerationOptions {
            sector: ChargeSector::Bounded,
            ..Default::default()
        };
        assert_eq!(select_strategy(&ctx(&[2, 2]), &bounded).unwrap(), Strategy::BruteForce);
    }

    #[test]
    fn test_unavailable_strategies() {
        let cb = with_strategy(Strategy::Checkerboard);
        for extents in [&[3, 4][..], &[2, 2, 2][..]] {
            assert!(matches!(
                select_strategy(&ctx(extents), &cb),
                Err(QuantumError::StrategyUnavailable {
                    strategy: Strategy::Checkerboard,
                    ..
                })
            ));
        }

        let bounded_tree = EnumerationOptions {
            strategy: Some(Strategy::SpanningTree),
            sector: ChargeSector::Bounded,
            ..Default::default()
        };
        assert!(select_strategy(&ctx(&[2, 2]), &bounded_tree).is_err());

        assert!(select_strategy(&ctx(&[6, 6]), &with_strategy(Strategy::BruteForce)).is_err());
    }

    #[test]
    fn test_2x2_checkerboard() {
        let e = enumerate(&ctx(&[2, 2]), &EnumerationOptions::default()).unwrap();
        assert_eq!(e.strategy, Strategy::Checkerboard);
        assert_eq!(e.basis.len(), 18);
        assert_eq!(e.stats.accepted, 18);
        assert_eq!(e.stats.candidates_visited, 36);

        let first: Vec<String> = e.basis.iter().take(4).map(bits).collect();
        assert_eq!(first, ["10101010", "10111011", "10100000", "10110001"]);
    }

    #[test]
    fn test_2x4_checkerboard_prunes() {
        let e = enumerate(&ctx(&[2, 4]), &EnumerationOptions::default()).unwrap();
        assert_eq!(e.basis.len(), 114);
        assert_eq!(e.stats.candidates_visited, 666);
        assert!(e.stats.jumps > 0);

        let first: Vec<String> = e.basis.iter().take(4).map(bits).collect();
        assert_eq!(
            first,
            [
                "1010101010101010",
                "1010101010100000",
                "1010101000001010",
                "1010101000000000"
            ]
        );
    }

    #[test]
    fn test_strategies_agree_on_2x2() {
        let c = ctx(&[2, 2]);
        let mut sets = Vec::new();
        for strategy in [Strategy::Checkerboard, Strategy::SpanningTree, Strategy::BruteForce] {
            let e = enumerate(&c, &with_strategy(strategy)).unwrap();
            let mut states: Vec<LinkConfig> = e.basis.iter().cloned().collect();
            states.sort();
            sets.push(states);
        }
        assert_eq!(sets[0].len(), 18);
        assert_eq!(sets[0], sets[1]);
        assert_eq!(sets[0], sets[2]);
    }

    #[test]
    fn test_spanning_tree_odd_extents() {
        assert_eq!(enumerate(&ctx(&[3, 3]), &EnumerationOptions::default()).unwrap().basis.len(), 148);
        assert_eq!(enumerate(&ctx(&[2, 3]), &EnumerationOptions::default()).unwrap().basis.len(), 44);
    }

    #[test]
    fn test_bounded_sector() {
        let opts = EnumerationOptions {
            sector: ChargeSector::Bounded,
            ..Default::default()
        };
        let e = enumerate(&ctx(&[2, 2]), &opts).unwrap();
        assert_eq!(e.strategy, Strategy::BruteForce);
        assert_eq!(e.basis.len(), 162);
        assert_eq!(e.stats.candidates_visited, 256);
    }

    #[test]
    fn test_winding_filter() {
        let opts = EnumerationOptions {
            winding: Some(WindingFilter::new(vec![0, 0])),
            ..Default::default()
        };
        let c = ctx(&[2, 2]);
        let e = enumerate(&c, &opts).unwrap();
        assert_eq!(e.basis.len(), 6);
        assert_eq!(e.stats.rejected_by_filter, 12);
        for s in e.basis.iter() {
            assert_eq!(winding_numbers(&c.lattice, s), Some(vec![0, 0]));
        }

        let bad = EnumerationOptions {
            winding: Some(WindingFilter::new(vec![0])),
            ..Default::default()
        };
        assert!(matches!(enumerate(&c, &bad), Err(QuantumError::InvalidOption(_))));
    }

    #[test]
    fn test_drop_frozen() {
        let opts = EnumerationOptions {
            keep_frozen: false,
            ..Default::default()
        };
        let c = ctx(&[2, 2]);
        let e = enumerate(&c, &opts).unwrap();
        assert_eq!(e.basis.len(), 6);
        assert_eq!(e.stats.frozen_dropped, 12);
        assert!(e.basis.iter().all(|s| flux::count_flippable(&c, s) > 0));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let c = ctx(&[2, 4]);
        let seq = enumerate(&c, &EnumerationOptions::default()).unwrap();
        let par = enumerate(
            &c,
            &EnumerationOptions {
                parallel: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(seq.basis, par.basis);
        assert_eq!(seq.stats, par.stats);
    }
}
