//! Builds an NFA from a set of words: a longest-common-prefix trie, with
//! childless finals merged into a shared sink once every word has been
//! inserted. Grounded in the word-walking construction style used by
//! word-based NFA builders elsewhere in the retrieval pack (e.g.
//! `CMDJojo-dandy`'s trie-from-words code): walk from the root one code
//! point at a time, reusing an edge that already carries the code point,
//! creating a fresh child otherwise.

use crate::charset::CharSet;
use crate::error::{NfaError, Result};
use crate::graph::NodeList;
use crate::nfa::NFA;
use crate::options::NFAOptions;
use crate::transform::base_optimization_reuse_final_states;

/// Builds an NFA accepting exactly the given set of words.
pub fn from_words<I, W>(words: I, options: NFAOptions) -> Result<NFA>
where
    I: IntoIterator<Item = W>,
    W: IntoIterator<Item = u32>,
{
    let mut list = NodeList::new(options.max_character);

    for word in words {
        let mut current = list.initial();
        for cp in word {
            if cp > options.max_character {
                return Err(NfaError::InvalidCodepoint(cp));
            }
            current = find_or_create_child(&mut list, current, cp, options.max_character)?;
        }
        list.finals_mut().insert(current);
    }

    let mut root = list.root();
    base_optimization_reuse_final_states(&mut list, &mut root);
    list.set_finals(root.finals);

    Ok(NFA::from_parts(list, options))
}

fn find_or_create_child(list: &mut NodeList, from: usize, cp: u32, maximum: u32) -> Result<usize> {
    let existing = list
        .node(from)
        .out_edges()
        .iter()
        .find(|(_, chars)| chars.has(cp))
        .map(|(&to, _)| to);

    if let Some(to) = existing {
        return Ok(to);
    }

    let child = list.create_node();
    let singleton = CharSet::single(cp, maximum).expect("cp already checked against maximum");
    list.link_nodes(from, child, &singleton)?;
    Ok(child)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: u32 = 0xffff;

    fn word(s: &str) -> Vec<u32> {
        s.chars().map(|c| c as u32).collect()
    }

    #[test]
    fn accepts_exactly_the_inserted_words() {
        let nfa = from_words(vec![word("foo"), word("bar")], NFAOptions::new(MAX)).unwrap();
        assert!(nfa.test(&word("foo")));
        assert!(nfa.test(&word("bar")));
        assert!(!nfa.test(&word("ba")));
        assert!(!nfa.test(&word("food")));
    }

    #[test]
    fn shares_common_prefixes() {
        let nfa = from_words(vec![word("foo"), word("food")], NFAOptions::new(MAX)).unwrap();
        assert!(nfa.test(&word("foo")));
        assert!(nfa.test(&word("food")));
        assert!(!nfa.test(&word("foodx")));
    }

    #[test]
    fn empty_word_list_accepts_nothing() {
        let nfa = from_words(Vec::<Vec<u32>>::new(), NFAOptions::new(MAX)).unwrap();
        assert!(nfa.is_empty());
    }

    #[test]
    fn single_empty_word_accepts_only_epsilon() {
        let nfa = from_words(vec![Vec::<u32>::new()], NFAOptions::new(MAX)).unwrap();
        assert!(nfa.test(&[]));
        assert!(!nfa.test(&word("a")));
    }

    #[test]
    fn rejects_out_of_range_codepoint() {
        let err = from_words(vec![vec![0x10000]], NFAOptions::new(0xff)).unwrap_err();
        assert_eq!(err, NfaError::InvalidCodepoint(0x10000));
    }

    #[test]
    fn merges_childless_finals_into_a_shared_sink() {
        let nfa = from_words(
            vec![word("foo"), word("bar"), word("baz"), word("food")],
            NFAOptions::new(MAX),
        )
        .unwrap();
        for w in ["foo", "bar", "baz", "food"] {
            assert!(nfa.test(&word(w)), "{w} should be accepted");
        }
        assert!(!nfa.test(&word("ba")));
        assert!(!nfa.test(&word("fooz")));

        let text = nfa.to_string();
        assert_eq!(
            text,
            "(0)\n-> (1) : 62\n-> (2) : 66\n\n\
             (1)\n-> (3) : 61\n\n\
             (2)\n-> (4) : 6f\n\n\
             (3)\n-> [5] : 72,7a\n\n\
             (4)\n-> [6] : 6f\n\n\
             [5]\n  -> none\n\n\
             [6]\n-> [5] : 64\n"
        );
    }
}
