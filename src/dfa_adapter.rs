//! Converts an external DFA representation into an NFA by inverting its
//! transition map. The DFA itself is treated as a black box — this module
//! only needs the thin [`ExternalDfa`] contract below, mirroring how the
//! teacher's own `DFA::to_nfa` inverts a `Vec<HashMap<V, usize>>` into
//! per-source `HashMap<V, Vec<usize>>` transitions, generalized from
//! single-symbol to range-keyed transitions.

use std::hash::Hash;

use crate::charset::{CharRange, CharSet};
use crate::error::{NfaError, Result};
use crate::graph::NodeList;
use crate::nfa::NFA;
use crate::options::NFAOptions;
use indexmap::IndexMap;

/// The minimal surface `from_dfa` needs from an external DFA: its states,
/// its initial state, which states are final, and each state's outgoing
/// transitions as `(min, max, target)` ranges.
pub trait ExternalDfa {
    type State: Copy + Eq + Hash;

    fn initial(&self) -> Self::State;
    fn states(&self) -> Vec<Self::State>;
    fn is_final(&self, state: Self::State) -> bool;
    fn transitions(&self, state: Self::State) -> Vec<(u32, u32, Self::State)>;
}

/// Mirrors `dfa`'s transition graph into a fresh NFA: finals map to finals,
/// and each state's range-keyed transitions are inverted into a single
/// CharSet-labelled edge per distinct target.
pub fn from_dfa<D: ExternalDfa>(dfa: &D, options: NFAOptions) -> Result<NFA> {
    let mut list = NodeList::new(options.max_character);
    let mut mapping: IndexMap<D::State, usize> = IndexMap::new();
    mapping.insert(dfa.initial(), list.initial());

    for state in dfa.states() {
        mapping.entry(state).or_insert_with(|| list.create_node());
    }

    for state in dfa.states() {
        let from = mapping[&state];
        let mut per_target: IndexMap<D::State, Vec<CharRange>> = IndexMap::new();
        for (min, max, target) in dfa.transitions(state) {
            if min > max || max > options.max_character {
                return Err(NfaError::InvalidRange {
                    min,
                    max,
                    maximum: options.max_character,
                });
            }
            per_target.entry(target).or_default().push(CharRange::new(min, max));
        }
        for (target, ranges) in per_target {
            let to = mapping[&target];
            let chars = CharSet::empty(options.max_character)
                .union_ranges(ranges)
                .expect("ranges already validated against the alphabet bound");
            list.link_nodes(from, to, &chars)?;
        }
    }

    for state in dfa.states() {
        if dfa.is_final(state) {
            list.finals_mut().insert(mapping[&state]);
        }
    }

    Ok(NFA::from_parts(list, options))
}
