//! Basis storage.
//!
//! [`BasisStore`] is the append-only list the enumerator fills. Once
//! enumeration is complete it is frozen into a [`Basis`], which adds a hash
//! index for config → index lookup and caches the flippable-plaquette count
//! of every state. A `Basis` is never mutated and is shared read-only by the
//! Hamiltonian assembler's workers.

use std::collections::HashMap;

use qlm_lattice::LatticeContext;

use crate::error::{QuantumError, Result};
use crate::flux;
use crate::link::LinkConfig;

/// Ordered, append-only list of accepted states.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasisStore {
    states: Vec<LinkConfig>,
}

impl BasisStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a state and return its index.
    pub fn append(&mut self, config: LinkConfig) -> usize {
        self.states.push(config);
        self.states.len() - 1
    }

    /// Reserve room for `additional` more states.
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        self.states
            .try_reserve(additional)
            .map_err(|_| QuantumError::Allocation {
                what: "basis states",
                requested: self.states.len().saturating_add(additional),
            })
    }

    /// Move every state of `other` to the end of this store.
    pub fn extend(&mut self, other: BasisStore) {
        self.states.extend(other.states);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&LinkConfig> {
        self.states.get(index)
    }

    /// Index of `config` by linear scan.
    pub fn find(&self, config: &LinkConfig) -> Option<usize> {
        self.states.iter().position(|s| s == config)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LinkConfig> {
        self.states.iter()
    }

    /// Freeze into a [`Basis`] for the given lattice.
    ///
    /// Fails if a state has the wrong number of links or occurs twice.
    pub fn freeze(self, ctx: &LatticeContext) -> Result<Basis> {
        let n_links = ctx.n_links();
        let mut index_map = HashMap::new();
        index_map
            .try_reserve(self.states.len())
            .map_err(|_| QuantumError::Allocation {
                what: "basis index",
                requested: self.states.len(),
            })?;

        for (i, state) in self.states.iter().enumerate() {
            if state.len() != n_links {
                return Err(QuantumError::StateLength {
                    state: i,
                    expected: n_links,
                    found: state.len(),
                });
            }
            if let Some(first) = index_map.insert(state.clone(), i) {
                return Err(QuantumError::DuplicateState { first, second: i });
            }
        }

        let n_flippable = self
            .states
            .iter()
            .map(|s| flux::count_flippable(ctx, s) as u32)
            .collect();

        Ok(Basis {
            states: self.states,
            index_map,
            n_flippable,
        })
    }
}

impl FromIterator<LinkConfig> for BasisStore {
    fn from_iter<I: IntoIterator<Item = LinkConfig>>(iter: I) -> Self {
        Self {
            states: iter.into_iter().collect(),
        }
    }
}

/// Frozen gauge-invariant basis with O(1) lookup.
#[derive(Debug, Clone)]
pub struct Basis {
    states: Vec<LinkConfig>,
    index_map: HashMap<LinkConfig, usize>,
    /// Flippable plaquettes per state.
    n_flippable: Vec<u32>,
}

impl Basis {
    /// Number of basis states.
    #[inline]
    pub fn dim(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Basis index of `config`, or `None` if it is not a basis state.
    #[inline]
    pub fn config_to_index(&self, config: &LinkConfig) -> Option<usize> {
        self.index_map.get(config).copied()
    }

    /// Same answer as [`Basis::config_to_index`] by linear scan.
    pub fn find_linear(&self, config: &LinkConfig) -> Option<usize> {
        self.states.iter().position(|s| s == config)
    }

    #[inline]
    pub fn index_to_config(&self, index: usize) -> &LinkConfig {
        &self.states[index]
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&LinkConfig> {
        self.states.get(index)
    }

    pub fn states(&self) -> &[LinkConfig] {
        &self.states
    }

    #[inline]
    pub fn n_flippable(&self, index: usize) -> usize {
        self.n_flippable[index] as usize
    }

    /// Whether plaquette `plaquette` (an index into the context's plaquette
    /// list) is flippable in state `index`.
    pub fn flux(&self, ctx: &LatticeContext, index: usize, plaquette: usize) -> bool {
        flux::is_flippable(&self.states[index], &ctx.plaquette_links[plaquette])
    }

    /// Number of states with no flippable plaquette.
    pub fn frozen_count(&self) -> usize {
        self.n_flippable.iter().filter(|&&n| n == 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> LatticeContext {
        LatticeContext::from_extents(&[2, 2]).unwrap()
    }

    fn bits(s: &str) -> LinkConfig {
        LinkConfig::from_bits(s.bytes().map(|b| b == b'1').collect())
    }

    #[test]
    fn test_store_append_and_find() {
        let mut store = BasisStore::new();
        assert!(store.is_empty());
        assert_eq!(store.append(bits("10101010")), 0);
        assert_eq!(store.append(bits("10110001")), 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.find(&bits("10110001")), Some(1));
        assert_eq!(store.find(&bits("11111111")), None);
        assert_eq!(store.get(0), Some(&bits("10101010")));
        assert_eq!(store.get(2), None);
    }

    #[test]
    fn test_freeze_indexes_and_counts() {
        let ctx = ctx();
        let store: BasisStore = ["10101010", "10111011", "10100000", "10110001"]
            .into_iter()
            .map(bits)
            .collect();
        let basis = store.freeze(&ctx).unwrap();

        assert_eq!(basis.dim(), 4);
        for i in 0..basis.dim() {
            let c = basis.index_to_config(i);
            assert_eq!(basis.config_to_index(c), Some(i));
            assert_eq!(basis.find_linear(c), Some(i));
        }
        assert_eq!(basis.config_to_index(&bits("00000000")), None);

        let counts: Vec<usize> = (0..4).map(|i| basis.n_flippable(i)).collect();
        assert_eq!(counts, vec![0, 0, 0, 2]);
        assert_eq!(basis.frozen_count(), 3);

        let flippable: Vec<bool> = (0..ctx.n_plaquettes())
            .map(|p| basis.flux(&ctx, 3, p))
            .collect();
        assert_eq!(flippable.iter().filter(|&&f| f).count(), 2);
    }

    #[test]
    fn test_freeze_rejects_duplicates() {
        let store: BasisStore = ["10101010", "10100000", "10101010"]
            .into_iter()
            .map(bits)
            .collect();
        assert!(matches!(
            store.freeze(&ctx()),
            Err(QuantumError::DuplicateState { first: 0, second: 2 })
        ));
    }

    #[test]
    fn test_freeze_rejects_wrong_length() {
        let store: BasisStore = ["10101010", "1010"].into_iter().map(bits).collect();
        assert!(matches!(
            store.freeze(&ctx()),
            Err(QuantumError::StateLength {
                state: 1,
                expected: 8,
                found: 4
            })
        ));
    }
}
