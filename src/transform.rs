//! Sub-list transformers: the destructive construction algebra that all of
//! the NFA facade's public operations (`union`, `concat`, `quantify`, ...)
//! bottom out in.
//!
//! Every function here takes a `base: &mut SubList` and, where noted,
//! *consumes* another `SubList` by value — the teacher's whole-automaton
//! `unite`/`concatenate`/`kleene`/`repeat` combinators, generalized from
//! splicing two separately owned automata to splicing two views into one
//! shared [`NodeList`].

use crate::graph::{NodeList, SubList};
use indexmap::IndexSet;

/// Detaches every outgoing edge of `base.initial` and clears its finals.
/// Post: `base` accepts the empty language.
pub fn base_make_empty(list: &mut NodeList, base: &mut SubList) {
    let out_targets: Vec<usize> = list.node(base.initial).out_edges().keys().copied().collect();
    for to in out_targets {
        let _ = list.unlink_nodes(base.initial, to);
    }
    base.finals.clear();
}

/// Replaces `base` in place with `replacement`, destroying `replacement`.
pub fn base_replace_with(list: &mut NodeList, base: &mut SubList, replacement: SubList) {
    base_make_empty(list, base);

    for f in replacement.finals.iter().copied() {
        if f == replacement.initial {
            base.finals.insert(base.initial);
        } else {
            base.finals.insert(f);
        }
    }

    let edges: Vec<(usize, crate::charset::CharSet)> = list
        .node(replacement.initial)
        .out_edges()
        .iter()
        .map(|(&to, chars)| (to, chars.clone()))
        .collect();
    for (to, chars) in edges {
        let _ = list.unlink_nodes(replacement.initial, to);
        let target = if to == replacement.initial { base.initial } else { to };
        let _ = list.link_nodes(base.initial, target, &chars);
    }
}

/// Alters `base` to accept `L(base) ∪ L(alt)`, destroying `alt`.
pub fn base_union(list: &mut NodeList, base: &mut SubList, alt: SubList) {
    for f in alt.finals.iter().copied() {
        if f == alt.initial {
            base.finals.insert(base.initial);
        } else {
            base.finals.insert(f);
        }
    }

    let edges: Vec<(usize, crate::charset::CharSet)> = list
        .node(alt.initial)
        .out_edges()
        .iter()
        .map(|(&to, chars)| (to, chars.clone()))
        .collect();
    for (to, chars) in edges {
        let _ = list.unlink_nodes(alt.initial, to);
        let target = if to == alt.initial { base.initial } else { to };
        let _ = list.link_nodes(base.initial, target, &chars);
    }

    base_optimization_reuse_final_states(list, base);
}

/// Alters `base` to accept `L(base) · L(after)`, destroying `after`.
pub fn base_concat(list: &mut NodeList, base: &mut SubList, after: SubList) {
    if base.finals.is_empty() {
        return;
    }
    if after.finals.is_empty() {
        base_make_empty(list, base);
        return;
    }

    let after_initial_was_final = after.finals.contains(&after.initial);

    let edges: Vec<(usize, crate::charset::CharSet)> = list
        .node(after.initial)
        .out_edges()
        .iter()
        .map(|(&to, chars)| (to, chars.clone()))
        .collect();

    let bases: Vec<usize> = base.finals.iter().copied().collect();
    for f in &bases {
        for (to, chars) in &edges {
            let _ = list.link_nodes(*f, *to, chars);
        }
    }

    for (to, _) in &edges {
        let _ = list.unlink_nodes(after.initial, *to);
    }

    if !after_initial_was_final {
        base.finals.clear();
    }

    for f in after.finals.iter().copied() {
        if f != after.initial {
            base.finals.insert(f);
        }
    }
}

/// Turns `base` into `L(base)⁺` by copying `base.initial`'s out-edges onto
/// every non-initial final.
pub fn base_plus(list: &mut NodeList, base: &mut SubList) {
    let edges: Vec<(usize, crate::charset::CharSet)> = list
        .node(base.initial)
        .out_edges()
        .iter()
        .map(|(&to, chars)| (to, chars.clone()))
        .collect();

    let finals: Vec<usize> = base.finals.iter().copied().filter(|&f| f != base.initial).collect();
    for f in finals {
        for (to, chars) in &edges {
            let _ = list.link_nodes(f, *to, chars);
        }
    }
}

/// Produces `L(base)ⁿ`.
pub fn base_repeat(list: &mut NodeList, base: &mut SubList, n: usize) {
    if n == 1 {
        return;
    }
    if n == 0 {
        base_make_empty(list, base);
        base.finals.insert(base.initial);
        return;
    }

    let is_epsilon_or_empty = {
        let finals = &base.finals;
        finals.is_empty() || (finals.len() == 1 && finals.contains(&base.initial) && list.node(base.initial).out_edges().is_empty())
    };
    if is_epsilon_or_empty {
        return;
    }

    if !base.finals.contains(&base.initial) {
        let copy = local_copy(list, base);
        for _ in 0..n.saturating_sub(2) {
            let extra = local_copy(list, &copy);
            base_concat(list, base, extra);
        }
        base_concat(list, base, copy);
    } else {
        let mut real_finals: IndexSet<usize> = base.finals.clone();
        real_finals.shift_remove(&base.initial);
        base.finals.shift_remove(&base.initial);

        let copy = local_copy(list, base);
        for _ in 0..n.saturating_sub(2) {
            let extra = local_copy(list, &copy);
            base_concat(list, base, extra);
            for f in base.finals.iter().copied() {
                real_finals.insert(f);
            }
        }
        base_concat(list, base, copy);
        for f in base.finals.iter().copied() {
            real_finals.insert(f);
        }
        base.finals = real_finals;
    }
}

/// Produces the language of `base` repeated between `min` and `max` times
/// (`max = None` meaning unbounded).
pub fn base_quantify(list: &mut NodeList, base: &mut SubList, min: usize, max: Option<usize>) {
    if max == Some(0) {
        base_make_empty(list, base);
        base.finals.insert(base.initial);
        return;
    }

    let mut min = min;
    if base.finals.contains(&base.initial) {
        min = 0;
    }
    if min == 0 {
        base.finals.insert(base.initial);
    }
    if max == Some(1) {
        return;
    }

    match max {
        Some(max) if min == max => base_repeat(list, base, min),
        Some(max) => {
            let mut copy = local_copy(list, base);
            copy.finals.insert(copy.initial);
            base_repeat(list, &mut copy, max - min);
            base_repeat(list, base, min);
            base_concat(list, base, copy);
        }
        None if min <= 1 => {
            base_plus(list, base);
        }
        None => {
            let mut copy = local_copy(list, base);
            base_plus(list, &mut copy);
            base_repeat(list, base, min - 1);
            base_concat(list, base, copy);
        }
    }
}

/// Merges childless non-initial finals of `base` into a single shared sink.
/// A size optimization; does not change the accepted language.
pub fn base_optimization_reuse_final_states(list: &mut NodeList, base: &mut SubList) {
    let childless: Vec<usize> = base
        .finals
        .iter()
        .copied()
        .filter(|&f| f != base.initial && list.node(f).out_edges().is_empty())
        .collect();

    if childless.len() < 2 {
        return;
    }

    let representative = childless[0];
    for &extra in &childless[1..] {
        let preds: Vec<(usize, crate::charset::CharSet)> = list
            .node(extra)
            .in_edges()
            .iter()
            .map(|(&from, chars)| (from, chars.clone()))
            .collect();
        for (from, chars) in preds {
            let _ = list.unlink_nodes(from, extra);
            let _ = list.link_nodes(from, representative, &chars);
        }
        base.finals.shift_remove(&extra);
    }
}

/// Depth-first clones the sub-automaton `to_copy` into the same `list`,
/// preserving edge labels. The clone's initial is freshly created, so it
/// trivially satisfies normalization.
pub fn local_copy(list: &mut NodeList, to_copy: &SubList) -> SubList {
    let mut mapping: indexmap::IndexMap<usize, usize> = indexmap::IndexMap::new();
    let new_initial = list.create_node();
    mapping.insert(to_copy.initial, new_initial);

    let order = list.bfs_from(to_copy.initial);
    for &old in &order {
        if !mapping.contains_key(&old) {
            mapping.insert(old, list.create_node());
        }
    }

    for &old in &order {
        let edges: Vec<(usize, crate::charset::CharSet)> = list
            .node(old)
            .out_edges()
            .iter()
            .map(|(&to, chars)| (to, chars.clone()))
            .collect();
        let new_from = mapping[&old];
        for (old_to, chars) in edges {
            let new_to = *mapping
                .entry(old_to)
                .or_insert_with(|| unreachable!("bfs from initial visits every out-neighbor"));
            let _ = list.link_nodes(new_from, new_to, &chars);
        }
    }

    let finals = to_copy
        .finals
        .iter()
        .map(|old| mapping[old])
        .collect();

    SubList {
        initial: new_initial,
        finals,
    }
}
