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

//! Textual term parser.
//!
//! Accepts terms in conventional logic-term syntax with the standard
//! operator table subset used in goal position:
//!
//! | Priority | Type | Operators |
//! |----------|------|-----------|
//! | 1100 | xfy | `;` |
//! | 1050 | xfy | `->` |
//! | 1000 | xfy | `,` |
//! | 900  | fy  | `\+` |
//! | 700  | xfx | `=` `\=` `==` `\==` `<` `>` `=<` `>=` `=:=` `=\=` `is` |
//! | 500  | yfx | `+` `-` |
//! | 400  | yfx | `*` `/` `mod` |
//! | 200  | fy  | `-` (numeric negation) |
//!
//! Argument positions (compound args, list items) parse at priority 999,
//! so a bare `,` separates rather than conjoins there.
//!
//! Variables are assigned slot ids in order of first occurrence; the
//! anonymous variable `_` gets a fresh slot on every occurrence and is
//! never recorded in the named-variable table.

use std::collections::HashMap;

use crate::error::{Result, TermError};
use crate::term::{is_symbol_char, Term, Var};

/// A parsed term plus its named-variable table, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTerm {
    pub term: Term,
    /// `(name as written, slot id)` for every named variable, ordered by
    /// first occurrence. Anonymous `_` occurrences are excluded.
    pub vars: Vec<(String, usize)>,
}

/// Parse one term. A single trailing `.` end marker is accepted and
/// consumed; anything after it is a syntax error.
pub fn parse_term(input: &str) -> Result<ParsedTerm> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(TermError::Empty);
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        var_ids: HashMap::new(),
        var_order: Vec::new(),
        next_var: 0,
    };
    let term = parser.term(1200)?;
    parser.expect_end()?;
    Ok(ParsedTerm {
        term,
        vars: parser.var_order,
    })
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Atom(String),
    Var(String),
    Int(i64),
    Float(f64),
    Str(String),
    Open,
    Close,
    OpenList,
    CloseList,
    Comma,
    Bar,
    End,
}

fn tokenize(input: &str) -> Result<Vec<Tok>> {
    let mut toks = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\r' | '\n' => i += 1,
            '%' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '(' => {
                toks.push(Tok::Open);
                i += 1;
            }
            ')' => {
                toks.push(Tok::Close);
                i += 1;
            }
            '[' => {
                toks.push(Tok::OpenList);
                i += 1;
            }
            ']' => {
                toks.push(Tok::CloseList);
                i += 1;
            }
            ',' => {
                toks.push(Tok::Comma);
                i += 1;
            }
            '|' => {
                toks.push(Tok::Bar);
                i += 1;
            }
            '!' => {
                toks.push(Tok::Atom("!".into()));
                i += 1;
            }
            ';' => {
                toks.push(Tok::Atom(";".into()));
                i += 1;
            }
            '\'' => {
                let (atom, next) = scan_quoted(&chars, i + 1, '\'')?;
                toks.push(Tok::Atom(atom));
                i = next;
            }
            '"' => {
                let (s, next) = scan_quoted(&chars, i + 1, '"')?;
                toks.push(Tok::Str(s));
                i = next;
            }
            c if c.is_ascii_digit() => {
                let (tok, next) = scan_number(&chars, i)?;
                toks.push(tok);
                i = next;
            }
            c if c.is_ascii_lowercase() => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                toks.push(Tok::Atom(chars[start..i].iter().collect()));
            }
            c if c.is_ascii_uppercase() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                toks.push(Tok::Var(chars[start..i].iter().collect()));
            }
            c if is_symbol_char(c) => {
                let start = i;
                while i < chars.len() && is_symbol_char(chars[i]) {
                    i += 1;
                }
                let sym: String = chars[start..i].iter().collect();
                // A lone '.' before end-of-input or whitespace is the term
                // end marker, not a symbolic atom.
                if sym == "." && (i >= chars.len() || chars[i].is_whitespace()) {
                    toks.push(Tok::End);
                } else {
                    toks.push(Tok::Atom(sym));
                }
            }
            _ => return Err(TermError::Syntax("unexpected_character".into())),
        }
    }
    Ok(toks)
}

fn scan_quoted(chars: &[char], mut i: usize, quote: char) -> Result<(String, usize)> {
    let mut out = String::new();
    while i < chars.len() {
        let c = chars[i];
        if c == quote {
            // Doubled quote is an escaped quote.
            if i + 1 < chars.len() && chars[i + 1] == quote {
                out.push(quote);
                i += 2;
                continue;
            }
            return Ok((out, i + 1));
        }
        if c == '\\' && i + 1 < chars.len() {
            let esc = chars[i + 1];
            let translated = match esc {
                'n' => '\n',
                't' => '\t',
                'r' => '\r',
                '\\' => '\\',
                '\'' => '\'',
                '"' => '"',
                other => other,
            };
            out.push(translated);
            i += 2;
            continue;
        }
        out.push(c);
        i += 1;
    }
    Err(TermError::Syntax("unterminated_quoted".into()))
}

fn scan_number(chars: &[char], mut i: usize) -> Result<(Tok, usize)> {
    let start = i;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    let mut is_float = false;
    // A '.' is a decimal point only when a digit follows; otherwise it is
    // the end marker.
    if i + 1 < chars.len() && chars[i] == '.' && chars[i + 1].is_ascii_digit() {
        is_float = true;
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
            j += 1;
        }
        if j < chars.len() && chars[j].is_ascii_digit() {
            is_float = true;
            i = j;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
        }
    }
    let text: String = chars[start..i].iter().collect();
    if is_float {
        let v = text
            .parse::<f64>()
            .map_err(|_| TermError::Syntax("malformed_number".into()))?;
        Ok((Tok::Float(v), i))
    } else {
        let v = text
            .parse::<i64>()
            .map_err(|_| TermError::Syntax("malformed_number".into()))?;
        Ok((Tok::Int(v), i))
    }
}

/// Infix operator table: `(priority, left_max, right_max)`.
fn infix_op(name: &str) -> Option<(u32, u32, u32)> {
    Some(match name {
        ";" => (1100, 1099, 1100),
        "->" => (1050, 1049, 1050),
        "," => (1000, 999, 1000),
        "=" | "\\=" | "==" | "\\==" | "<" | ">" | "=<" | ">=" | "=:=" | "=\\=" | "is" => {
            (700, 699, 699)
        }
        "+" | "-" => (500, 500, 499),
        "*" | "/" | "mod" => (400, 400, 399),
        _ => return None,
    })
}

/// Prefix operator table: `(priority, arg_max)`.
fn prefix_op(name: &str) -> Option<(u32, u32)> {
    Some(match name {
        "\\+" => (900, 900),
        "-" => (200, 200),
        _ => return None,
    })
}

struct Parser {
    tokens: Vec<Tok>,
    pos: usize,
    var_ids: HashMap<String, usize>,
    var_order: Vec<(String, usize)>,
    next_var: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, tok: &Tok, missing: &str) -> Result<()> {
        if self.peek() == Some(tok) {
            self.pos += 1;
            Ok(())
        } else {
            Err(TermError::Syntax(missing.into()))
        }
    }

    fn expect_end(&mut self) -> Result<()> {
        if self.peek() == Some(&Tok::End) {
            self.pos += 1;
        }
        if self.pos == self.tokens.len() {
            Ok(())
        } else {
            Err(TermError::Syntax("operator_expected".into()))
        }
    }

    fn var_term(&mut self, name: String) -> Term {
        if name == "_" {
            let id = self.next_var;
            self.next_var += 1;
            return Term::Var(Var { name, id });
        }
        let id = match self.var_ids.get(&name) {
            Some(&id) => id,
            None => {
                let id = self.next_var;
                self.next_var += 1;
                self.var_ids.insert(name.clone(), id);
                self.var_order.push((name.clone(), id));
                id
            }
        };
        Term::Var(Var { name, id })
    }

    fn term(&mut self, max_prec: u32) -> Result<Term> {
        let mut left = self.primary(max_prec)?;
        loop {
            let op = match self.peek() {
                Some(Tok::Atom(name)) => name.clone(),
                Some(Tok::Comma) if max_prec >= 1000 => ",".to_string(),
                Some(Tok::Bar) if max_prec >= 1100 => ";".to_string(),
                _ => break,
            };
            let Some((prec, _left_max, right_max)) = infix_op(&op) else {
                break;
            };
            if prec > max_prec {
                break;
            }
            self.pos += 1;
            let right = self.term(right_max)?;
            left = Term::Compound(op, vec![left, right]);
        }
        Ok(left)
    }

    fn primary(&mut self, max_prec: u32) -> Result<Term> {
        match self.bump() {
            Some(Tok::Int(v)) => Ok(Term::Int(v)),
            Some(Tok::Float(v)) => Ok(Term::Float(v)),
            Some(Tok::Str(s)) => Ok(Term::Str(s)),
            Some(Tok::Var(name)) => Ok(self.var_term(name)),
            Some(Tok::Open) => {
                let inner = self.term(1200)?;
                self.expect(&Tok::Close, "paren_expected")?;
                Ok(inner)
            }
            Some(Tok::OpenList) => self.list_tail(),
            Some(Tok::Atom(name)) => self.after_atom(name, max_prec),
            Some(Tok::End) | None => Err(TermError::Syntax("unexpected_end_of_term".into())),
            Some(_) => Err(TermError::Syntax("unexpected_token".into())),
        }
    }

    fn after_atom(&mut self, name: String, max_prec: u32) -> Result<Term> {
        // Compound: atom immediately followed by an argument list.
        if self.peek() == Some(&Tok::Open) {
            self.pos += 1;
            let mut args = vec![self.term(999)?];
            while self.peek() == Some(&Tok::Comma) {
                self.pos += 1;
                args.push(self.term(999)?);
            }
            self.expect(&Tok::Close, "paren_expected")?;
            return Ok(Term::Compound(name, args));
        }
        // Negative numeric literal.
        if name == "-" {
            match self.peek() {
                Some(Tok::Int(v)) => {
                    let v = *v;
                    self.pos += 1;
                    return Ok(Term::Int(-v));
                }
                Some(Tok::Float(v)) => {
                    let v = *v;
                    self.pos += 1;
                    return Ok(Term::Float(-v));
                }
                _ => {}
            }
        }
        if let Some((prec, arg_max)) = prefix_op(&name) {
            if prec <= max_prec && self.starts_term() {
                let arg = self.term(arg_max)?;
                return Ok(Term::Compound(name, vec![arg]));
            }
        }
        Ok(Term::Atom(name))
    }

    fn starts_term(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Tok::Atom(_)
                    | Tok::Var(_)
                    | Tok::Int(_)
                    | Tok::Float(_)
                    | Tok::Str(_)
                    | Tok::Open
                    | Tok::OpenList
            )
        )
    }

    fn list_tail(&mut self) -> Result<Term> {
        if self.peek() == Some(&Tok::CloseList) {
            self.pos += 1;
            return Ok(Term::nil());
        }
        let mut items = vec![self.term(999)?];
        loop {
            match self.peek() {
                Some(Tok::Comma) => {
                    self.pos += 1;
                    items.push(self.term(999)?);
                }
                Some(Tok::Bar) => {
                    self.pos += 1;
                    let tail = self.term(999)?;
                    self.expect(&Tok::CloseList, "list_close_expected")?;
                    // Collapse a literal list tail into the items.
                    return Ok(match tail {
                        Term::List(tail_items, tail_tail) => {
                            items.extend(tail_items);
                            Term::List(items, tail_tail)
                        }
                        other => Term::List(items, Some(Box::new(other))),
                    });
                }
                Some(Tok::CloseList) => {
                    self.pos += 1;
                    return Ok(Term::List(items, None));
                }
                _ => return Err(TermError::Syntax("list_close_expected".into())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> ParsedTerm {
        parse_term(input).unwrap()
    }

    #[test]
    fn test_atom_and_compound() {
        assert_eq!(parse("foo").term, Term::atom("foo"));
        assert_eq!(
            parse("foo(bar, 1)").term,
            Term::compound("foo", vec![Term::atom("bar"), Term::Int(1)])
        );
    }

    #[test]
    fn test_variables_recorded_in_source_order() {
        let parsed = parse("pair(X, Y, X)");
        assert_eq!(
            parsed.vars,
            vec![("X".to_string(), 0), ("Y".to_string(), 1)]
        );
        // Both X occurrences share a slot.
        match &parsed.term {
            Term::Compound(_, args) => {
                assert_eq!(args[0], args[2]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_anonymous_variable_is_fresh_and_unrecorded() {
        let parsed = parse("pair(_, _)");
        assert!(parsed.vars.is_empty());
        match &parsed.term {
            Term::Compound(_, args) => assert_ne!(args[0], args[1]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_conjunction_binds_right() {
        let parsed = parse("(a, b, c)");
        assert_eq!(
            parsed.term,
            Term::compound(
                ",",
                vec![
                    Term::atom("a"),
                    Term::compound(",", vec![Term::atom("b"), Term::atom("c")])
                ]
            )
        );
    }

    #[test]
    fn test_comma_separates_inside_args() {
        let parsed = parse("f(a, (b, c))");
        match &parsed.term {
            Term::Compound(name, args) => {
                assert_eq!(name, "f");
                assert_eq!(args.len(), 2);
                assert_eq!(args[1].functor_name(), Some(","));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_operator_priorities() {
        // 1 + 2 * 3 parses as +(1, *(2, 3))
        let parsed = parse("X = 1 + 2 * 3");
        let expected = Term::compound(
            "=",
            vec![
                Term::Var(Var {
                    name: "X".into(),
                    id: 0,
                }),
                Term::compound(
                    "+",
                    vec![
                        Term::Int(1),
                        Term::compound("*", vec![Term::Int(2), Term::Int(3)]),
                    ],
                ),
            ],
        );
        assert_eq!(parsed.term, expected);
    }

    #[test]
    fn test_lists() {
        assert_eq!(parse("[]").term, Term::nil());
        assert_eq!(
            parse("[a, 1]").term,
            Term::List(vec![Term::atom("a"), Term::Int(1)], None)
        );
        let parsed = parse("[a | T]");
        match parsed.term {
            Term::List(items, Some(tail)) => {
                assert_eq!(items, vec![Term::atom("a")]);
                assert!(matches!(*tail, Term::Var(_)));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_negative_numbers() {
        assert_eq!(parse("f(-3)").term, Term::compound("f", vec![Term::Int(-3)]));
        assert_eq!(parse("-2.5").term, Term::Float(-2.5));
    }

    #[test]
    fn test_floats_and_end_marker() {
        assert_eq!(parse("1.5").term, Term::Float(1.5));
        assert_eq!(parse("foo.").term, Term::atom("foo"));
        assert_eq!(parse("f(2).").term, Term::compound("f", vec![Term::Int(2)]));
    }

    #[test]
    fn test_quoted_atom() {
        assert_eq!(parse("'hello world'").term, Term::atom("hello world"));
        assert_eq!(parse("'it''s'").term, Term::atom("it's"));
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(
            parse_term("member(X, [a, b"),
            Err(TermError::Syntax(_))
        ));
        assert!(matches!(parse_term("f(,)"), Err(TermError::Syntax(_))));
        assert!(matches!(parse_term(""), Err(TermError::Empty)));
        assert!(matches!(parse_term("a b"), Err(TermError::Syntax(_))));
    }

    #[test]
    fn test_if_then_else_shape() {
        let parsed = parse("(a -> b ; c)");
        assert_eq!(parsed.term.functor_name(), Some(";"));
        match &parsed.term {
            Term::Compound(_, args) => assert_eq!(args[0].functor_name(), Some("->")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
