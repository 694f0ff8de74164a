// SPDX-License-Identifier: AGPL-3.0-or-later
// Hornet - Embeddable Logic Query Server
// Copyright (C) 2026 Sushanth Reddy Vanagala (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Structural term representation.
//!
//! Lists get their own variant rather than being encoded as `'.'/2` cons
//! cells: the JSON conversion wants arrays and the engine's builtins want
//! indexable elements, so there is no payoff in the classical encoding.
//! A partial list keeps its unresolved tail in the `tail` slot.

use std::fmt;

/// A named variable slot. Slots are numbered per parsed term by the parser;
/// the name is kept as written by the client so unbound variables can be
/// reported back under their source name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Var {
    pub name: String,
    pub id: usize,
}

/// A structural logic term.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Atom(String),
    Int(i64),
    Float(f64),
    Str(String),
    Var(Var),
    /// `items` with an optional non-list tail (`[a, b | T]`).
    List(Vec<Term>, Option<Box<Term>>),
    Compound(String, Vec<Term>),
}

impl Term {
    pub fn atom(name: impl Into<String>) -> Self {
        Term::Atom(name.into())
    }

    pub fn compound(name: impl Into<String>, args: Vec<Term>) -> Self {
        Term::Compound(name.into(), args)
    }

    pub fn nil() -> Self {
        Term::List(Vec::new(), None)
    }

    /// The principal functor name: the atom itself, or the compound's name.
    pub fn functor_name(&self) -> Option<&str> {
        match self {
            Term::Atom(name) => Some(name),
            Term::Compound(name, _) => Some(name),
            _ => None,
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Term::Compound(_, args) => args.len(),
            _ => 0,
        }
    }

    /// True for terms a goal position will accept: atoms and compounds.
    pub fn is_callable(&self) -> bool {
        matches!(self, Term::Atom(_) | Term::Compound(_, _))
    }

    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Term::Atom(name) => Some(name),
            _ => None,
        }
    }
}

fn atom_needs_quotes(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        None => true,
        Some(c) if c.is_ascii_lowercase() => {
            !chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        Some(_) => {
            // Symbolic atoms print bare when made entirely of symbol chars.
            !name.chars().all(is_symbol_char)
        }
    }
}

pub(crate) fn is_symbol_char(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '*' | '/' | '\\' | '^' | '<' | '>' | '=' | '~' | ':' | '.' | '?' | '@' | '#'
            | '&' | '$'
    )
}

impl fmt::Display for Term {
    /// Canonical form: compounds as `name(arg, ...)`, no operator layout.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Atom(name) => {
                if atom_needs_quotes(name) {
                    write!(f, "'{}'", name.replace('\\', "\\\\").replace('\'', "\\'"))
                } else {
                    write!(f, "{name}")
                }
            }
            Term::Int(v) => write!(f, "{v}"),
            Term::Float(v) => write!(f, "{v}"),
            Term::Str(s) => write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
            Term::Var(v) => write!(f, "{}", v.name),
            Term::List(items, tail) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                }
                if let Some(tail) = tail {
                    write!(f, "|{tail}")?;
                }
                write!(f, "]")
            }
            Term::Compound(name, args) => {
                if atom_needs_quotes(name) {
                    write!(f, "'{}'(", name.replace('\\', "\\\\").replace('\'', "\\'"))?;
                } else {
                    write!(f, "{name}(")?;
                }
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_functor_name() {
        assert_eq!(Term::atom("foo").functor_name(), Some("foo"));
        assert_eq!(
            Term::compound("bar", vec![Term::Int(1)]).functor_name(),
            Some("bar")
        );
        assert_eq!(Term::Int(3).functor_name(), None);
    }

    #[test]
    fn test_display_canonical() {
        let term = Term::compound(
            "point",
            vec![Term::Int(1), Term::atom("a"), Term::atom("Weird Atom")],
        );
        assert_eq!(term.to_string(), "point(1,a,'Weird Atom')");
    }

    #[test]
    fn test_display_list_with_tail() {
        let term = Term::List(
            vec![Term::Int(1), Term::Int(2)],
            Some(Box::new(Term::Var(Var {
                name: "T".into(),
                id: 0,
            }))),
        );
        assert_eq!(term.to_string(), "[1,2|T]");
    }

    #[test]
    fn test_symbolic_atom_prints_bare() {
        assert_eq!(Term::atom("=").to_string(), "=");
        assert_eq!(Term::atom("=<").to_string(), "=<");
    }
}
