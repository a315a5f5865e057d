//! The public automaton type: construction algebra, conformance testing,
//! word enumeration, and the product construction for intersection.

use crate::charset::CharSet;
use crate::error::{NfaError, Result};
use crate::graph::NodeList;
use crate::options::NFAOptions;
use crate::transform::{
    base_concat, base_optimization_reuse_final_states, base_quantify, base_union,
};
use indexmap::IndexMap;
use std::fmt;

/// A nondeterministic finite automaton over character-set-labelled edges.
#[derive(Debug, Clone)]
pub struct NFA {
    nodes: NodeList,
    options: NFAOptions,
}

impl NFA {
    /// A fresh NFA accepting the empty language (no finals).
    pub fn new(options: NFAOptions) -> NFA {
        NFA {
            nodes: NodeList::new(options.max_character),
            options,
        }
    }

    /// Builds an NFA directly from an already-constructed node list, for
    /// collaborators (`compiler`, `trie`, `dfa_adapter`) that build the
    /// graph themselves rather than through the facade's own algebra.
    pub(crate) fn from_parts(nodes: NodeList, options: NFAOptions) -> NFA {
        NFA { nodes, options }
    }

    pub fn options(&self) -> NFAOptions {
        self.options
    }

    pub fn nodes(&self) -> &NodeList {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut NodeList {
        &mut self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.finals().is_empty()
    }

    /// True iff the language is finite: no cycle reachable from the initial
    /// node lies on a path from initial to some final. Forward DFS with
    /// three-coloring, restricted to nodes that can still reach a final.
    pub fn is_finite(&self) -> bool {
        if self.is_empty() {
            return true;
        }

        let co_reachable = self.backward_from_finals();

        #[derive(Clone, Copy, PartialEq)]
        enum Color {
            White,
            Gray,
            Black,
        }

        let mut color: IndexMap<usize, Color> = IndexMap::new();
        let mut has_cycle = false;

        fn visit(
            list: &NodeList,
            co_reachable: &indexmap::IndexSet<usize>,
            color: &mut IndexMap<usize, Color>,
            node: usize,
            has_cycle: &mut bool,
        ) {
            if *has_cycle {
                return;
            }
            color.insert(node, Color::Gray);
            for &succ in list.node(node).out_edges().keys() {
                if !co_reachable.contains(&succ) {
                    continue;
                }
                match color.get(&succ).copied().unwrap_or(Color::White) {
                    Color::Gray => {
                        *has_cycle = true;
                        return;
                    }
                    Color::White => visit(list, co_reachable, color, succ, has_cycle),
                    Color::Black => {}
                }
                if *has_cycle {
                    return;
                }
            }
            color.insert(node, Color::Black);
        }

        visit(
            &self.nodes,
            &co_reachable,
            &mut color,
            self.nodes.initial(),
            &mut has_cycle,
        );
        !has_cycle
    }

    fn backward_from_finals(&self) -> indexmap::IndexSet<usize> {
        use std::collections::VecDeque;
        let mut seen = indexmap::IndexSet::new();
        let mut queue = VecDeque::new();
        for &f in self.nodes.finals() {
            if seen.insert(f) {
                queue.push_back(f);
            }
        }
        while let Some(n) = queue.pop_front() {
            for &pred in self.nodes.node(n).in_edges().keys() {
                if seen.insert(pred) {
                    queue.push_back(pred);
                }
            }
        }
        seen
    }

    /// A fresh NFA accepting the same language as `self`.
    pub fn copy(&self) -> NFA {
        let mut out = NFA::new(self.options);
        out.union(self).expect("copy shares its own options");
        out
    }

    /// Brute-force recursive simulation: conformance-only, not a
    /// performance path. Succeeds iff some outgoing edge from the current
    /// node accepts the current code point and the remainder matches.
    pub fn test(&self, word: &[u32]) -> bool {
        self.test_from(self.nodes.initial(), word)
    }

    fn test_from(&self, node: usize, word: &[u32]) -> bool {
        match word.split_first() {
            None => self.nodes.finals().contains(&node),
            Some((&cp, rest)) => self
                .nodes
                .node(node)
                .out_edges()
                .iter()
                .any(|(&next, chars)| chars.has(cp) && self.test_from(next, rest)),
        }
    }

    /// Lazy enumeration of accepted word-sets: sequences of `CharSet`s, one
    /// per transition along a finite accepting path. May be infinite if the
    /// language is infinite; callers drive it incrementally.
    pub fn word_sets(&self) -> WordSets<'_> {
        WordSets::new(self)
    }

    /// Lazy enumeration of concrete accepted words (one representative
    /// code point per transition).
    pub fn words(&self) -> Words<'_> {
        Words::new(self)
    }

    /// Unites `other`'s language into `self`'s in place. A no-op when
    /// `other` and `self` are the same automaton.
    pub fn union(&mut self, other: &NFA) -> Result<()> {
        if self.options.max_character != other.options.max_character {
            return Err(NfaError::AlphabetMismatch {
                left: self.options.max_character,
                right: other.options.max_character,
            });
        }
        if std::ptr::eq(self, other) {
            return Ok(());
        }
        let other_root = other.nodes.root();
        let copied = self.nodes.copy_from(&other.nodes, &other_root);
        let mut base = self.nodes.root();
        base_union(&mut self.nodes, &mut base, copied);
        self.nodes.set_finals(base.finals);
        Ok(())
    }

    /// Concatenates `other`'s language after `self`'s, in place.
    pub fn concat(&mut self, other: &NFA) -> Result<()> {
        if self.options.max_character != other.options.max_character {
            return Err(NfaError::AlphabetMismatch {
                left: self.options.max_character,
                right: other.options.max_character,
            });
        }
        if std::ptr::eq(self, other) {
            return self.quantify(2, Some(2));
        }
        let other_root = other.nodes.root();
        let copied = self.nodes.copy_from(&other.nodes, &other_root);
        let mut base = self.nodes.root();
        base_concat(&mut self.nodes, &mut base, copied);
        self.nodes.set_finals(base.finals);
        Ok(())
    }

    /// Repeats `self`'s language between `min` and `max` times (`max = None`
    /// for unbounded).
    pub fn quantify(&mut self, min: usize, max: Option<usize>) -> Result<()> {
        if let Some(max) = max {
            if min > max {
                return Err(NfaError::InvalidRange {
                    min: min as u32,
                    max: max as u32,
                    maximum: self.options.max_character,
                });
            }
        }
        let mut base = self.nodes.root();
        base_quantify(&mut self.nodes, &mut base, min, max);
        self.nodes.set_finals(base.finals);
        Ok(())
    }

    /// The product construction for intersection: `L(left) ∩ L(right)`.
    pub fn intersect(left: &NFA, right: &NFA) -> Result<NFA> {
        if left.options.max_character != right.options.max_character {
            return Err(NfaError::AlphabetMismatch {
                left: left.options.max_character,
                right: right.options.max_character,
            });
        }

        let left_order = left.nodes.bfs_from_initial();
        let right_order = right.nodes.bfs_from_initial();
        let left_index: IndexMap<usize, usize> =
            left_order.iter().enumerate().map(|(i, &n)| (n, i)).collect();
        let right_index: IndexMap<usize, usize> =
            right_order.iter().enumerate().map(|(i, &n)| (n, i)).collect();
        let right_count = right_order.len();

        let mut out = NFA::new(left.options);
        let mut pair_to_node: IndexMap<usize, usize> = IndexMap::new();
        let pair_key = |il: usize, ir: usize| il * right_count + ir;

        pair_to_node.insert(pair_key(0, 0), out.nodes.initial());

        let mut queue = std::collections::VecDeque::new();
        queue.push_back((left.nodes.initial(), right.nodes.initial()));
        let mut visited = indexmap::IndexSet::new();
        visited.insert((left.nodes.initial(), right.nodes.initial()));

        while let Some((a, b)) = queue.pop_front() {
            let key = pair_key(left_index[&a], right_index[&b]);
            let node = pair_to_node[&key];

            if left.nodes.finals().contains(&a) && right.nodes.finals().contains(&b) {
                out.nodes.finals_mut().insert(node);
            }

            for (&a2, sa) in left.nodes.node(a).out_edges() {
                for (&b2, sb) in right.nodes.node(b).out_edges() {
                    let common = sa.intersect(sb);
                    if common.is_empty() {
                        continue;
                    }
                    let key2 = pair_key(left_index[&a2], right_index[&b2]);
                    let node2 = *pair_to_node
                        .entry(key2)
                        .or_insert_with(|| out.nodes.create_node());
                    let _ = out.nodes.link_nodes(node, node2, &common);
                    if visited.insert((a2, b2)) {
                        queue.push_back((a2, b2));
                    }
                }
            }
        }

        out.nodes.remove_unreachable()?;
        let mut root = out.nodes.root();
        base_optimization_reuse_final_states(&mut out.nodes, &mut root);
        out.nodes.set_finals(root.finals);
        Ok(out)
    }
}

impl NFA {
    /// BFS order used for textual rendering: a node's out-edges are visited
    /// in ascending order of their label's lowest code point, so that the
    /// displayed node numbering only depends on the automaton's structure,
    /// not on which branch happened to be constructed first.
    fn display_order(&self) -> Vec<usize> {
        let mut seen = indexmap::IndexSet::new();
        let mut order = Vec::new();
        let mut queue = std::collections::VecDeque::new();
        seen.insert(self.nodes.initial());
        queue.push_back(self.nodes.initial());
        while let Some(n) = queue.pop_front() {
            order.push(n);
            let mut neighbors: Vec<usize> = self.nodes.node(n).out_edges().keys().copied().collect();
            neighbors.sort_by_key(|&to| {
                self.nodes
                    .node(n)
                    .out_edges()
                    .get(&to)
                    .and_then(|chars| chars.ranges().first().map(|r| r.min))
                    .unwrap_or(0)
            });
            for succ in neighbors {
                if seen.insert(succ) {
                    queue.push_back(succ);
                }
            }
        }
        order
    }
}

impl fmt::Display for NFA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = self.display_order();
        let rank: IndexMap<usize, usize> = order.iter().enumerate().map(|(i, &n)| (n, i)).collect();

        for (i, &id) in order.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let is_final = self.nodes.finals().contains(&id);
            if is_final {
                writeln!(f, "[{}]", i)?;
            } else {
                writeln!(f, "({})", i)?;
            }
            let node = self.nodes.node(id);
            if node.out_edges().is_empty() {
                writeln!(f, "  -> none")?;
            } else {
                let mut edges: Vec<(usize, &CharSet)> =
                    node.out_edges().iter().map(|(&to, chars)| (to, chars)).collect();
                edges.sort_by_key(|(_, chars)| chars.ranges().first().map(|r| r.min).unwrap_or(0));
                for (to, chars) in edges {
                    let to_final = self.nodes.finals().contains(&to);
                    let to_rank = rank[&to];
                    let label = if to_final {
                        format!("[{}]", to_rank)
                    } else {
                        format!("({})", to_rank)
                    };
                    writeln!(f, "-> {} : {}", label, chars)?;
                }
            }
        }
        Ok(())
    }
}

/// Lazy breadth-first enumeration of accepted word-sets up to increasing
/// depth. Each item is the sequence of edge labels along one accepting
/// path.
pub struct WordSets<'a> {
    nfa: &'a NFA,
    frontier: std::collections::VecDeque<(Vec<CharSet>, usize)>,
    max_depth: usize,
}

impl<'a> WordSets<'a> {
    fn new(nfa: &'a NFA) -> WordSets<'a> {
        let mut frontier = std::collections::VecDeque::new();
        frontier.push_back((Vec::new(), nfa.nodes.initial()));
        WordSets {
            nfa,
            frontier,
            max_depth: usize::MAX,
        }
    }

    /// Caps how many transitions a yielded path may contain. Callers
    /// enumerating a possibly-infinite language should always bound this.
    pub fn up_to_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl<'a> Iterator for WordSets<'a> {
    type Item = Vec<CharSet>;

    fn next(&mut self) -> Option<Vec<CharSet>> {
        loop {
            let (path, node) = self.frontier.pop_front()?;
            let is_final = self.nfa.nodes.finals().contains(&node);
            if path.len() < self.max_depth {
                for (&next, chars) in self.nfa.nodes.node(node).out_edges() {
                    let mut extended = path.clone();
                    extended.push(chars.clone());
                    self.frontier.push_back((extended, next));
                }
            }
            if is_final {
                return Some(path);
            }
        }
    }
}

/// Lazy enumeration of concrete accepted words, one representative code
/// point drawn per transition of each accepted word-set.
pub struct Words<'a> {
    inner: WordSets<'a>,
}

impl<'a> Words<'a> {
    fn new(nfa: &'a NFA) -> Words<'a> {
        Words {
            inner: WordSets::new(nfa),
        }
    }

    pub fn up_to_depth(mut self, max_depth: usize) -> Self {
        self.inner = self.inner.up_to_depth(max_depth);
        self
    }
}

impl<'a> Iterator for Words<'a> {
    type Item = Vec<u32>;

    fn next(&mut self) -> Option<Vec<u32>> {
        let set = self.inner.next()?;
        Some(set.iter().map(|cs| cs.ranges()[0].min).collect())
    }
}
