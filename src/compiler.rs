//! Lowers a regex AST (§`ast`) into an [`NFA`], recursively compiling each
//! [`Expression`]/[`Concatenation`]/[`Element`] into a [`SubList`] inside one
//! shared [`NodeList`] and splicing the pieces together with the sub-list
//! transformers — the same shape as the teacher's `Operations::to_nfa`
//! recursive lowering, one level closer to the graph.

use crate::ast::{Concatenation, Element, Expression};
use crate::error::{NfaError, Result};
use crate::graph::{NodeList, SubList};
use crate::nfa::NFA;
use crate::options::NFAOptions;
use crate::transform::{base_concat, base_make_empty, base_quantify, base_replace_with, base_union};

/// Compiles a regex AST into a fresh NFA under `options`.
pub fn from_regex(expr: &Expression, options: NFAOptions) -> Result<NFA> {
    let mut list = NodeList::new(options.max_character);
    let compiled = compile_expression(&mut list, expr, options.max_character)?;
    let mut root = list.root();
    base_replace_with(&mut list, &mut root, compiled);
    list.set_finals(root.finals);
    Ok(NFA::from_parts(list, options))
}

fn compile_expression(list: &mut NodeList, expr: &Expression, maximum: u32) -> Result<SubList> {
    let mut alternatives = expr.alternatives.iter();
    let first = match alternatives.next() {
        Some(first) => first,
        None => return Ok(SubList::new(list.create_node())),
    };

    let mut base = compile_concatenation(list, first, maximum)?;
    for alt in alternatives {
        let sub = compile_concatenation(list, alt, maximum)?;
        base_union(list, &mut base, sub);
    }
    Ok(base)
}

fn compile_concatenation(list: &mut NodeList, concat: &Concatenation, maximum: u32) -> Result<SubList> {
    let initial = list.create_node();
    let mut base = SubList::new(initial);
    base.finals.insert(initial);

    for element in &concat.elements {
        if base.finals.is_empty() {
            break;
        }
        compile_element(list, &mut base, element, maximum)?;
    }
    Ok(base)
}

fn compile_element(list: &mut NodeList, base: &mut SubList, element: &Element, maximum: u32) -> Result<()> {
    match element {
        Element::CharacterClass(chars) => {
            if chars.maximum() != maximum {
                return Err(NfaError::AlphabetMismatch {
                    left: chars.maximum(),
                    right: maximum,
                });
            }
            if chars.is_empty() {
                base_make_empty(list, base);
            } else {
                let s = list.create_node();
                let sources: Vec<usize> = base.finals.iter().copied().collect();
                for f in sources {
                    list.link_nodes(f, s, chars)?;
                }
                base.finals = std::iter::once(s).collect();
            }
            Ok(())
        }
        Element::Alternation(expr) => {
            let sub = compile_expression(list, expr, maximum)?;
            base_concat(list, base, sub);
            Ok(())
        }
        Element::Quantifier { alternatives, min, max } => {
            let mut sub = compile_expression(list, alternatives, maximum)?;
            base_quantify(list, &mut sub, *min, *max);
            base_concat(list, base, sub);
            Ok(())
        }
        Element::Assertion { .. } => Err(NfaError::UnsupportedConstruct),
    }
}
