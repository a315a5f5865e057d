//! Test-only collaborators standing in for the external lexer/parser and
//! regex emitter this crate does not implement: a small recursive-descent
//! parser for a textual mini-regex syntax, and a state-elimination emitter
//! that turns an NFA back into the same AST shape the parser produces.
//! Neither is part of the crate's public API.

#![allow(dead_code)]

use nfa_core::ast::{Concatenation, Element, Expression};
use nfa_core::CharSet;
use nfa_core::NFA;
use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;

/// Parses `|`, concatenation, `*`/`+`/`?`/`{m,n}`, parentheses, `.`, and
/// literal characters (backslash-escaped for the specials) into an
/// [`Expression`].
pub fn parse(input: &str, max_character: u32) -> Expression {
    let mut parser = Parser {
        chars: input.chars().peekable(),
        max_character,
    };
    parser.parse_expression()
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    max_character: u32,
}

impl<'a> Parser<'a> {
    fn parse_expression(&mut self) -> Expression {
        let mut alternatives = vec![self.parse_concatenation()];
        while self.peek_is('|') {
            self.chars.next();
            alternatives.push(self.parse_concatenation());
        }
        Expression { alternatives }
    }

    fn parse_concatenation(&mut self) -> Concatenation {
        let mut elements = Vec::new();
        while let Some(&c) = self.chars.peek() {
            if c == '|' || c == ')' {
                break;
            }
            elements.push(self.parse_quantified());
        }
        Concatenation { elements }
    }

    fn parse_quantified(&mut self) -> Element {
        let atom = self.parse_atom();
        match self.chars.peek().copied() {
            Some('*') => {
                self.chars.next();
                self.wrap_quantifier(atom, 0, None)
            }
            Some('+') => {
                self.chars.next();
                self.wrap_quantifier(atom, 1, None)
            }
            Some('?') => {
                self.chars.next();
                self.wrap_quantifier(atom, 0, Some(1))
            }
            Some('{') => {
                self.chars.next();
                let min = self.parse_number();
                let max = if self.peek_is(',') {
                    self.chars.next();
                    if self.peek_is('}') {
                        None
                    } else {
                        Some(self.parse_number())
                    }
                } else {
                    Some(min)
                };
                self.expect('}');
                self.wrap_quantifier(atom, min, max)
            }
            _ => atom,
        }
    }

    fn wrap_quantifier(&self, atom: Element, min: usize, max: Option<usize>) -> Element {
        Element::Quantifier {
            alternatives: Expression {
                alternatives: vec![Concatenation { elements: vec![atom] }],
            },
            min,
            max,
        }
    }

    fn parse_atom(&mut self) -> Element {
        match self.chars.next().expect("unexpected end of pattern") {
            '(' => {
                let expr = self.parse_expression();
                self.expect(')');
                Element::Alternation(expr)
            }
            '.' => Element::CharacterClass(CharSet::full(self.max_character)),
            '\\' => {
                let c = self.chars.next().expect("dangling escape at end of pattern");
                self.literal(c)
            }
            c => self.literal(c),
        }
    }

    fn literal(&self, c: char) -> Element {
        Element::CharacterClass(CharSet::single(c as u32, self.max_character).expect("literal within alphabet"))
    }

    fn parse_number(&mut self) -> usize {
        let mut digits = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        digits.parse().expect("expected a number in quantifier")
    }

    fn peek_is(&mut self, c: char) -> bool {
        self.chars.peek() == Some(&c)
    }

    fn expect(&mut self, c: char) {
        assert_eq!(self.chars.next(), Some(c), "expected '{}'", c);
    }
}

/// A state-elimination regex expression, matching the teacher's own
/// `Operations`/`ToRegex` matrix-elimination algorithm generalized to
/// CharSet-labelled edges.
#[derive(Clone)]
enum Elim {
    Empty,
    Epsilon,
    Literal(CharSet),
    Concat(Vec<Elim>),
    Union(Vec<Elim>),
    Star(Box<Elim>),
}

fn union(a: Elim, b: Elim) -> Elim {
    match (a, b) {
        (Elim::Empty, x) | (x, Elim::Empty) => x,
        (Elim::Union(mut v1), Elim::Union(v2)) => {
            v1.extend(v2);
            Elim::Union(v1)
        }
        (Elim::Union(mut v1), b) => {
            v1.push(b);
            Elim::Union(v1)
        }
        (a, Elim::Union(mut v2)) => {
            v2.insert(0, a);
            Elim::Union(v2)
        }
        (a, b) => Elim::Union(vec![a, b]),
    }
}

fn concat(a: Elim, b: Elim) -> Elim {
    match (a, b) {
        (Elim::Empty, _) | (_, Elim::Empty) => Elim::Empty,
        (Elim::Epsilon, x) => x,
        (x, Elim::Epsilon) => x,
        (Elim::Concat(mut v1), Elim::Concat(v2)) => {
            v1.extend(v2);
            Elim::Concat(v1)
        }
        (Elim::Concat(mut v1), b) => {
            v1.push(b);
            Elim::Concat(v1)
        }
        (a, Elim::Concat(mut v2)) => {
            v2.insert(0, a);
            Elim::Concat(v2)
        }
        (a, b) => Elim::Concat(vec![a, b]),
    }
}

fn star(a: Elim) -> Elim {
    match a {
        Elim::Empty | Elim::Epsilon => Elim::Epsilon,
        other => Elim::Star(Box::new(other)),
    }
}

/// Converts `nfa` back into an [`Expression`] via classical GNFA state
/// elimination: a virtual start links to the initial state, every final
/// links to a virtual accept, then every other reachable state is
/// eliminated in turn, folding its self-loop and pass-through paths into
/// the regex labelling the states that used it as a waypoint.
pub fn emit_regex(nfa: &NFA) -> Expression {
    let nodes = nfa.nodes();
    let order = nodes.bfs_from_initial();
    let n = order.len();
    let index: HashMap<usize, usize> = order.iter().enumerate().map(|(i, &id)| (id, i)).collect();
    let start = n;
    let accept = n + 1;

    let mut r: HashMap<(usize, usize), Elim> = HashMap::new();
    let get = |r: &HashMap<(usize, usize), Elim>, i: usize, j: usize| r.get(&(i, j)).cloned().unwrap_or(Elim::Empty);

    r.insert((start, index[&nodes.initial()]), Elim::Epsilon);
    for &fin in nodes.finals() {
        if let Some(&i) = index.get(&fin) {
            let cur = get(&r, i, accept);
            r.insert((i, accept), union(cur, Elim::Epsilon));
        }
    }
    for &id in &order {
        let i = index[&id];
        for (&to, chars) in nodes.node(id).out_edges() {
            if let Some(&j) = index.get(&to) {
                let cur = get(&r, i, j);
                r.insert((i, j), union(cur, Elim::Literal(chars.clone())));
            }
        }
    }

    let mut active = vec![true; n];
    for k in 0..n {
        let rkk = star(get(&r, k, k));
        let incoming: Vec<usize> = std::iter::once(start)
            .chain((0..n).filter(|&i| active[i] && i != k))
            .collect();
        let outgoing: Vec<usize> = std::iter::once(accept)
            .chain((0..n).filter(|&j| active[j] && j != k))
            .collect();

        for &i in &incoming {
            let rik = get(&r, i, k);
            if matches!(rik, Elim::Empty) {
                continue;
            }
            for &j in &outgoing {
                let rkj = get(&r, k, j);
                if matches!(rkj, Elim::Empty) {
                    continue;
                }
                let through = concat(concat(rik.clone(), rkk.clone()), rkj);
                let cur = get(&r, i, j);
                r.insert((i, j), union(cur, through));
            }
        }
        active[k] = false;
    }

    to_expression(&get(&r, start, accept))
}

fn to_expression(e: &Elim) -> Expression {
    match e {
        Elim::Empty => Expression { alternatives: vec![] },
        Elim::Epsilon => Expression {
            alternatives: vec![Concatenation { elements: vec![] }],
        },
        Elim::Literal(chars) => Expression {
            alternatives: vec![Concatenation {
                elements: vec![Element::CharacterClass(chars.clone())],
            }],
        },
        Elim::Union(items) => Expression {
            alternatives: items.iter().flat_map(|it| to_expression(it).alternatives).collect(),
        },
        Elim::Concat(items) => Expression {
            alternatives: vec![Concatenation {
                elements: items.iter().map(elem_of).collect(),
            }],
        },
        Elim::Star(inner) => Expression {
            alternatives: vec![Concatenation {
                elements: vec![Element::Quantifier {
                    alternatives: to_expression(inner),
                    min: 0,
                    max: None,
                }],
            }],
        },
    }
}

fn elem_of(e: &Elim) -> Element {
    match e {
        Elim::Literal(chars) => Element::CharacterClass(chars.clone()),
        other => Element::Alternation(to_expression(other)),
    }
}
