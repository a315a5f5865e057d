//! The node arena an NFA's graph lives in.
//!
//! A [`NodeList`] owns every [`Node`] of one automaton: it creates them,
//! links/unlinks their edges, and is the only thing that ever deletes one
//! (via [`NodeList::remove_unreachable`]). A [`SubList`] is a transient
//! `{initial, final}` view into a [`NodeList`] used while a sub-automaton is
//! under construction; it owns nothing.

use crate::charset::CharSet;
use crate::error::{NfaError, Result};
use indexmap::{IndexMap, IndexSet};
use std::collections::VecDeque;

/// A single automaton state. `out`/`in` are insertion-ordered so that
/// iteration (and hence `to_string` and product-construction indexing) is
/// reproducible across runs with identical construction histories.
#[derive(Debug, Clone)]
pub struct Node {
    id: usize,
    out: IndexMap<usize, CharSet>,
    inn: IndexMap<usize, CharSet>,
}

impl Node {
    fn new(id: usize) -> Node {
        Node {
            id,
            out: IndexMap::new(),
            inn: IndexMap::new(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn out_edges(&self) -> &IndexMap<usize, CharSet> {
        &self.out
    }

    pub fn in_edges(&self) -> &IndexMap<usize, CharSet> {
        &self.inn
    }
}

/// A transient `{initial, final}` view into a [`NodeList`]. Not a container:
/// it borrows node ids that live in some `NodeList`, and the sub-list
/// transformers in [`crate::transform`] consume these destructively.
#[derive(Debug, Clone)]
pub struct SubList {
    pub initial: usize,
    pub finals: IndexSet<usize>,
}

impl SubList {
    pub fn new(initial: usize) -> SubList {
        SubList {
            initial,
            finals: IndexSet::new(),
        }
    }

    pub fn is_final(&self, id: usize) -> bool {
        self.finals.contains(&id)
    }
}

/// Owns every node of one automaton and names its current initial and final
/// states — in effect, the arena plus the "root" sub-list being built inside
/// it.
#[derive(Debug, Clone)]
pub struct NodeList {
    nodes: Vec<Node>,
    initial: usize,
    finals: IndexSet<usize>,
    max_character: u32,
}

impl NodeList {
    /// A fresh list with one node (the initial), no edges, no finals.
    pub fn new(max_character: u32) -> NodeList {
        NodeList {
            nodes: vec![Node::new(0)],
            initial: 0,
            finals: IndexSet::new(),
            max_character,
        }
    }

    pub fn max_character(&self) -> u32 {
        self.max_character
    }

    pub fn initial(&self) -> usize {
        self.initial
    }

    pub fn finals(&self) -> &IndexSet<usize> {
        &self.finals
    }

    pub fn finals_mut(&mut self) -> &mut IndexSet<usize> {
        &mut self.finals
    }

    pub fn set_finals(&mut self, finals: IndexSet<usize>) {
        self.finals = finals;
    }

    /// A [`SubList`] view over this list's own root (its initial and finals).
    pub fn root(&self) -> SubList {
        SubList {
            initial: self.initial,
            finals: self.finals.clone(),
        }
    }

    pub fn node(&self, id: usize) -> &Node {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty_list(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn create_node(&mut self) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::new(id));
        id
    }

    fn check_owned(&self, id: usize) -> Result<()> {
        if id >= self.nodes.len() {
            return Err(NfaError::CrossListLink { from: id, to: id });
        }
        Ok(())
    }

    /// Links `from -> to` labelled `chars`, unioning with any existing label.
    pub fn link_nodes(&mut self, from: usize, to: usize, chars: &CharSet) -> Result<()> {
        if self.check_owned(from).is_err() || self.check_owned(to).is_err() {
            return Err(NfaError::CrossListLink { from, to });
        }
        if chars.is_empty() {
            return Err(NfaError::EmptyLabel);
        }
        let merged = match self.nodes[from].out.get(&to) {
            Some(existing) => existing.union(chars).unwrap_or_else(|| chars.clone()),
            None => chars.clone(),
        };
        self.nodes[from].out.insert(to, merged.clone());
        self.nodes[to].inn.insert(from, merged);
        Ok(())
    }

    /// Removes the edge `from -> to`. Fails with `MissingEdge` if absent.
    pub fn unlink_nodes(&mut self, from: usize, to: usize) -> Result<()> {
        let had = self.nodes[from].out.shift_remove(&to).is_some();
        let had_rev = self.nodes[to].inn.shift_remove(&from).is_some();
        if !had || !had_rev {
            return Err(NfaError::MissingEdge { from, to });
        }
        Ok(())
    }

    /// Every node forward-reachable from `initial`, in BFS order.
    pub fn bfs_from_initial(&self) -> Vec<usize> {
        self.bfs_from(self.initial)
    }

    pub fn bfs_from(&self, start: usize) -> Vec<usize> {
        let mut seen = IndexSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::new();
        seen.insert(start);
        queue.push_back(start);
        while let Some(n) = queue.pop_front() {
            order.push(n);
            for &succ in self.nodes[n].out.keys() {
                if seen.insert(succ) {
                    queue.push_back(succ);
                }
            }
        }
        order
    }

    fn forward_reachable(&self) -> IndexSet<usize> {
        self.bfs_from_initial().into_iter().collect()
    }

    fn backward_reachable_from<I: IntoIterator<Item = usize>>(&self, starts: I) -> IndexSet<usize> {
        let mut seen = IndexSet::new();
        let mut queue = VecDeque::new();
        for s in starts {
            if seen.insert(s) {
                queue.push_back(s);
            }
        }
        while let Some(n) = queue.pop_front() {
            for &pred in self.nodes[n].inn.keys() {
                if seen.insert(pred) {
                    queue.push_back(pred);
                }
            }
        }
        seen
    }

    /// Detaches every edge; reduces to the canonical empty-language list
    /// (initial retained, no edges, no finals).
    fn clear_to_empty_language(&mut self) {
        let targets: Vec<(usize, usize)> = self
            .nodes
            .iter()
            .flat_map(|n| n.out.keys().map(move |&to| (n.id(), to)))
            .collect();
        for (from, to) in targets {
            let _ = self.unlink_nodes(from, to);
        }
        self.finals.clear();
    }

    /// Establishes invariant 6: after returning, every remaining node is
    /// both forward-reachable from `initial` and backward-reachable from
    /// some final (or, if `final` is empty, only `initial` remains).
    pub fn remove_unreachable(&mut self) -> Result<()> {
        if self.finals.is_empty() {
            self.clear_to_empty_language();
            let keep: IndexSet<usize> = std::iter::once(self.initial).collect();
            self.compact(&keep)?;
            return Ok(());
        }

        let forward = self.forward_reachable();
        self.finals.retain(|f| forward.contains(f));

        if self.finals.is_empty() {
            self.clear_to_empty_language();
            let keep: IndexSet<usize> = std::iter::once(self.initial).collect();
            self.compact(&keep)?;
            return Ok(());
        }

        let backward = self.backward_reachable_from(self.finals.iter().copied());
        let keep: IndexSet<usize> = forward.into_iter().filter(|n| backward.contains(n)).collect();
        self.compact(&keep)
    }

    /// Depth-first clones `to_copy` (a sub-automaton owned by `source`,
    /// possibly a different list) into `self`, preserving edge labels. Used
    /// by the NFA facade to splice another automaton's graph into this
    /// one before `base_union`/`base_concat` act on it; within a single
    /// list, `transform::local_copy` does the equivalent job without the
    /// second borrow this needs.
    pub fn copy_from(&mut self, source: &NodeList, to_copy: &SubList) -> SubList {
        let mut mapping: IndexMap<usize, usize> = IndexMap::new();
        let new_initial = self.create_node();
        mapping.insert(to_copy.initial, new_initial);

        let order = source.bfs_from(to_copy.initial);
        for &old in &order {
            mapping.entry(old).or_insert_with(|| self.create_node());
        }

        for &old in &order {
            let new_from = mapping[&old];
            for (&old_to, chars) in source.node(old).out_edges() {
                let new_to = mapping[&old_to];
                let _ = self.link_nodes(new_from, new_to, chars);
            }
        }

        let finals = to_copy.finals.iter().map(|old| mapping[old]).collect();
        SubList {
            initial: new_initial,
            finals,
        }
    }

    /// Deletes every node not in `keep`, detaching its edges first, and
    /// renumbers the survivors densely from 0. `initial` is always kept.
    fn compact(&mut self, keep: &IndexSet<usize>) -> Result<()> {
        if !keep.contains(&self.initial) {
            return Err(NfaError::InitialRemoval);
        }
        if keep.len() == self.nodes.len() {
            return Ok(());
        }

        let mut remap: IndexMap<usize, usize> = IndexMap::new();
        for old_id in self.nodes.iter().map(Node::id) {
            if keep.contains(&old_id) {
                remap.insert(old_id, remap.len());
            }
        }

        let mut new_nodes: Vec<Node> = remap.iter().map(|(_, &new_id)| Node::new(new_id)).collect();
        for node in &self.nodes {
            let new_from = match remap.get(&node.id) {
                Some(&n) => n,
                None => continue,
            };
            for (&to, chars) in node.out.iter() {
                if let Some(&new_to) = remap.get(&to) {
                    new_nodes[new_from].out.insert(new_to, chars.clone());
                    new_nodes[new_to].inn.insert(new_from, chars.clone());
                }
            }
        }

        self.initial = remap[&self.initial];
        self.finals = self.finals.iter().filter_map(|f| remap.get(f).copied()).collect();
        self.nodes = new_nodes;
        Ok(())
    }
}
