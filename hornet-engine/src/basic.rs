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

//! The builtin backtracking engine.
//!
//! A small depth-first evaluator over an explicit goal stack with
//! clone-on-choicepoint backtracking. No clause database, no cut: the
//! supported goal language is the control constructs plus builtins.
//!
//! Control: `true`, `fail`/`false`, `','/2`, `';'/2`, `'->'/2` (also inside
//! `;` as if-then-else), `'\+'/1`.
//! Builtins: `'='/2`, `'\='/2`, `'=='/2`, `'\=='/2`, arithmetic comparison
//! (`<` `>` `=<` `>=` `=:=` `=\=`), `is/2`, `member/2`, `between/3`,
//! `sleep/1`, `throw/1`, `atom/1`, `number/1`, `integer/1`, `var/1`,
//! `nonvar/1`.
//!
//! The [`Interrupt`] token is polled once per resolution step, so a
//! runaway conjunction or a `between/3` enumeration notices cancellation
//! and deadline expiry without any engine-specific support.

use std::collections::HashMap;

use hornet_core::{Term, Var};

use crate::{Bindings, Engine, Exception, Interrupt, Session, Solutions, Stop};

/// The builtin engine. Stateless; every connection gets a fresh
/// [`BasicSession`].
#[derive(Debug, Default)]
pub struct BasicEngine;

impl BasicEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Engine for BasicEngine {
    fn session(&self) -> Box<dyn Session> {
        Box::new(BasicSession)
    }
}

/// Per-connection session of the builtin engine.
pub struct BasicSession;

impl Session for BasicSession {
    fn solve(&mut self, goal: &Term, interrupt: Interrupt) -> Box<dyn Solutions + '_> {
        Box::new(Machine::new(goal.clone(), interrupt))
    }
}

type Subst = HashMap<usize, Term>;

struct State {
    /// Remaining goals, last entry is executed next.
    goals: Vec<Term>,
    subst: Subst,
}

struct Machine {
    interrupt: Interrupt,
    current: Option<State>,
    alternatives: Vec<State>,
    done: bool,
}

impl Machine {
    fn new(goal: Term, interrupt: Interrupt) -> Self {
        Machine {
            interrupt,
            current: Some(State {
                goals: vec![goal],
                subst: Subst::new(),
            }),
            alternatives: Vec::new(),
            done: false,
        }
    }

    /// Run to the next solution, returning its substitution.
    fn next_subst(&mut self) -> Result<Option<Subst>, Exception> {
        if self.done {
            return Ok(None);
        }
        loop {
            if let Err(stop) = self.interrupt.check() {
                self.done = true;
                return Err(stop_exception(stop));
            }
            let mut state = match self.current.take().or_else(|| self.alternatives.pop()) {
                Some(state) => state,
                None => {
                    self.done = true;
                    return Ok(None);
                }
            };
            let Some(goal) = state.goals.pop() else {
                // Goal stack empty: a solution. Leave `current` empty so the
                // next call backtracks into the remaining alternatives.
                return Ok(Some(state.subst));
            };
            match self.step(goal, &mut state) {
                Ok(true) => self.current = Some(state),
                Ok(false) => {} // fail: backtrack on the next iteration
                Err(e) => {
                    self.done = true;
                    return Err(e);
                }
            }
        }
    }

    fn step(&mut self, goal: Term, state: &mut State) -> Result<bool, Exception> {
        let goal = walk(&goal, &state.subst);
        match &goal {
            Term::Var(_) => Err(Exception::error(Term::atom("instantiation_error"))),
            Term::Atom(name) => match name.as_str() {
                "true" => Ok(true),
                "fail" | "false" => Ok(false),
                _ => Err(existence_error(name, 0)),
            },
            Term::Compound(name, args) => match (name.as_str(), args.len()) {
                (",", 2) => {
                    state.goals.push(args[1].clone());
                    state.goals.push(args[0].clone());
                    Ok(true)
                }
                (";", 2) => self.disjunction(&args[0], &args[1], state),
                ("->", 2) => self.if_then(&args[0], &args[1], None, state),
                ("\\+", 1) => {
                    match self.sub_solve(&args[0], &state.subst)? {
                        Some(_) => Ok(false),
                        None => Ok(true),
                    }
                }
                ("=", 2) => Ok(unify(&args[0], &args[1], &mut state.subst)),
                ("\\=", 2) => {
                    let mut probe = state.subst.clone();
                    Ok(!unify(&args[0], &args[1], &mut probe))
                }
                ("==", 2) => Ok(resolve(&args[0], &state.subst) == resolve(&args[1], &state.subst)),
                ("\\==", 2) => {
                    Ok(resolve(&args[0], &state.subst) != resolve(&args[1], &state.subst))
                }
                ("<", 2) | (">", 2) | ("=<", 2) | (">=", 2) | ("=:=", 2) | ("=\\=", 2) => {
                    let left = eval_arith(&args[0], &state.subst)?;
                    let right = eval_arith(&args[1], &state.subst)?;
                    Ok(compare_nums(name, left, right))
                }
                ("is", 2) => {
                    let value = eval_arith(&args[1], &state.subst)?;
                    Ok(unify(&args[0], &value.to_term(), &mut state.subst))
                }
                ("member", 2) => self.member(&args[0], &args[1], state),
                ("between", 3) => self.between(&args[0], &args[1], &args[2], state),
                ("sleep", 1) => self.sleep(&args[0], state),
                ("throw", 1) => Err(Exception(resolve(&args[0], &state.subst))),
                ("atom", 1) => Ok(matches!(walk(&args[0], &state.subst), Term::Atom(_))),
                ("number", 1) => Ok(matches!(
                    walk(&args[0], &state.subst),
                    Term::Int(_) | Term::Float(_)
                )),
                ("integer", 1) => Ok(matches!(walk(&args[0], &state.subst), Term::Int(_))),
                ("var", 1) => Ok(matches!(walk(&args[0], &state.subst), Term::Var(_))),
                ("nonvar", 1) => Ok(!matches!(walk(&args[0], &state.subst), Term::Var(_))),
                (name, arity) => Err(existence_error(name, arity)),
            },
            _ => Err(Exception::error(Term::compound(
                "type_error",
                vec![Term::atom("callable"), goal.clone()],
            ))),
        }
    }

    fn disjunction(&mut self, left: &Term, right: &Term, state: &mut State) -> Result<bool, Exception> {
        // (Cond -> Then ; Else) is if-then-else, not a plain choicepoint.
        if let Term::Compound(name, args) = &walk(left, &state.subst) {
            if name == "->" && args.len() == 2 {
                return self.if_then(&args[0], &args[1], Some(right), state);
            }
        }
        let mut alternative = State {
            goals: state.goals.clone(),
            subst: state.subst.clone(),
        };
        alternative.goals.push(right.clone());
        self.alternatives.push(alternative);
        state.goals.push(left.clone());
        Ok(true)
    }

    fn if_then(
        &mut self,
        cond: &Term,
        then: &Term,
        otherwise: Option<&Term>,
        state: &mut State,
    ) -> Result<bool, Exception> {
        match self.sub_solve(cond, &state.subst)? {
            Some(subst) => {
                state.subst = subst;
                state.goals.push(then.clone());
                Ok(true)
            }
            None => match otherwise {
                Some(else_goal) => {
                    state.goals.push(else_goal.clone());
                    Ok(true)
                }
                None => Ok(false),
            },
        }
    }

    /// First solution of `goal` under `subst`, or `None`. Used by
    /// if-then-else and negation, which commit to the first answer.
    fn sub_solve(&self, goal: &Term, subst: &Subst) -> Result<Option<Subst>, Exception> {
        let mut machine = Machine {
            interrupt: self.interrupt.clone(),
            current: Some(State {
                goals: vec![goal.clone()],
                subst: subst.clone(),
            }),
            alternatives: Vec::new(),
            done: false,
        };
        machine.next_subst()
    }

    fn member(&mut self, item: &Term, list: &Term, state: &mut State) -> Result<bool, Exception> {
        // Deep resolution folds substitution-bound tails into the items.
        let list = resolve(list, &state.subst);
        match &list {
            Term::List(items, _) => {
                if items.is_empty() {
                    return Ok(false);
                }
                for candidate in items.iter().skip(1).rev() {
                    let mut alternative = State {
                        goals: state.goals.clone(),
                        subst: state.subst.clone(),
                    };
                    alternative
                        .goals
                        .push(Term::compound("=", vec![item.clone(), candidate.clone()]));
                    self.alternatives.push(alternative);
                }
                state
                    .goals
                    .push(Term::compound("=", vec![item.clone(), items[0].clone()]));
                Ok(true)
            }
            Term::Var(_) => Err(Exception::error(Term::atom("instantiation_error"))),
            other => Err(Exception::error(Term::compound(
                "type_error",
                vec![Term::atom("list"), other.clone()],
            ))),
        }
    }

    fn between(
        &mut self,
        low: &Term,
        high: &Term,
        value: &Term,
        state: &mut State,
    ) -> Result<bool, Exception> {
        let low = expect_int(low, &state.subst)?;
        let high = expect_int(high, &state.subst)?;
        match walk(value, &state.subst) {
            Term::Int(v) => Ok(low <= v && v <= high),
            Term::Var(_) => {
                if low > high {
                    return Ok(false);
                }
                for candidate in (low + 1..=high).rev() {
                    let mut alternative = State {
                        goals: state.goals.clone(),
                        subst: state.subst.clone(),
                    };
                    alternative
                        .goals
                        .push(Term::compound("=", vec![value.clone(), Term::Int(candidate)]));
                    self.alternatives.push(alternative);
                }
                state
                    .goals
                    .push(Term::compound("=", vec![value.clone(), Term::Int(low)]));
                Ok(true)
            }
            other => Err(Exception::error(Term::compound(
                "type_error",
                vec![Term::atom("integer"), other],
            ))),
        }
    }

    fn sleep(&self, duration: &Term, state: &State) -> Result<bool, Exception> {
        let seconds = match walk(duration, &state.subst) {
            Term::Int(v) if v >= 0 => v as f64,
            Term::Float(v) if v >= 0.0 => v,
            Term::Var(_) => return Err(Exception::error(Term::atom("instantiation_error"))),
            other => {
                return Err(Exception::error(Term::compound(
                    "type_error",
                    vec![Term::atom("number"), other],
                )))
            }
        };
        self.interrupt
            .sleep(std::time::Duration::from_secs_f64(seconds))
            .map_err(stop_exception)?;
        Ok(true)
    }
}

impl Solutions for Machine {
    fn next_solution(&mut self) -> Option<Result<Bindings, Exception>> {
        match self.next_subst() {
            Ok(Some(subst)) => {
                let bindings = subst
                    .keys()
                    .map(|&id| (id, resolve(&Term::Var(Var { name: String::new(), id }), &subst)))
                    .collect();
                Some(Ok(bindings))
            }
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

fn stop_exception(stop: Stop) -> Exception {
    Exception::tag(stop.as_atom())
}

fn existence_error(name: &str, arity: usize) -> Exception {
    Exception::error(Term::compound(
        "existence_error",
        vec![
            Term::atom("procedure"),
            Term::compound("/", vec![Term::atom(name), Term::Int(arity as i64)]),
        ],
    ))
}

/// Follow variable chains one level past bindings: the result is either a
/// non-variable term (whose arguments may still contain variables) or an
/// unbound variable.
fn walk(term: &Term, subst: &Subst) -> Term {
    let mut current = term.clone();
    while let Term::Var(v) = &current {
        match subst.get(&v.id) {
            Some(bound) => current = bound.clone(),
            None => break,
        }
    }
    current
}

/// Deep substitution: every bound variable in `term` is replaced by its
/// binding, recursively.
fn resolve(term: &Term, subst: &Subst) -> Term {
    match walk(term, subst) {
        Term::List(items, tail) => {
            let items = items.iter().map(|t| resolve(t, subst)).collect();
            let tail = tail.map(|t| Box::new(resolve(&t, subst)));
            match tail {
                // A tail that resolved to a list folds into the items.
                Some(boxed) => match *boxed {
                    Term::List(mut more, deeper) => {
                        let mut all: Vec<Term> = items;
                        all.append(&mut more);
                        Term::List(all, deeper)
                    }
                    other => Term::List(items, Some(Box::new(other))),
                },
                None => Term::List(items, None),
            }
        }
        Term::Compound(name, args) => {
            Term::Compound(name, args.iter().map(|t| resolve(t, subst)).collect())
        }
        other => other,
    }
}

fn unify(a: &Term, b: &Term, subst: &mut Subst) -> bool {
    let a = walk(a, subst);
    let b = walk(b, subst);
    match (&a, &b) {
        (Term::Var(va), Term::Var(vb)) if va.id == vb.id => true,
        (Term::Var(v), _) => {
            subst.insert(v.id, b);
            true
        }
        (_, Term::Var(v)) => {
            subst.insert(v.id, a);
            true
        }
        (Term::Atom(x), Term::Atom(y)) => x == y,
        (Term::Int(x), Term::Int(y)) => x == y,
        (Term::Float(x), Term::Float(y)) => x == y,
        (Term::Str(x), Term::Str(y)) => x == y,
        (Term::Compound(na, aa), Term::Compound(nb, ab)) => {
            na == nb
                && aa.len() == ab.len()
                && aa.iter().zip(ab).all(|(x, y)| unify(x, y, subst))
        }
        (Term::List(_, _), Term::List(_, _)) => unify_lists(&a, &b, subst),
        _ => false,
    }
}

fn unify_lists(a: &Term, b: &Term, subst: &mut Subst) -> bool {
    let (Term::List(items_a, tail_a), Term::List(items_b, tail_b)) = (a, b) else {
        return false;
    };
    let shared = items_a.len().min(items_b.len());
    for (x, y) in items_a[..shared].iter().zip(&items_b[..shared]) {
        if !unify(x, y, subst) {
            return false;
        }
    }
    let rest_a = list_remainder(&items_a[shared..], tail_a.as_deref());
    let rest_b = list_remainder(&items_b[shared..], tail_b.as_deref());
    match (rest_a, rest_b) {
        (None, None) => true,
        (Some(rest), None) | (None, Some(rest)) => unify(&rest, &Term::nil(), subst),
        (Some(ra), Some(rb)) => unify(&ra, &rb, subst),
    }
}

/// The unconsumed remainder of a list: `None` when fully consumed and
/// proper, otherwise the leftover as a term.
fn list_remainder(items: &[Term], tail: Option<&Term>) -> Option<Term> {
    if items.is_empty() {
        tail.cloned()
    } else {
        Some(Term::List(
            items.to_vec(),
            tail.map(|t| Box::new(t.clone())),
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Num {
    I(i64),
    F(f64),
}

impl Num {
    fn to_term(self) -> Term {
        match self {
            Num::I(v) => Term::Int(v),
            Num::F(v) => Term::Float(v),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Num::I(v) => v as f64,
            Num::F(v) => v,
        }
    }
}

fn eval_arith(term: &Term, subst: &Subst) -> Result<Num, Exception> {
    let term = walk(term, subst);
    match &term {
        Term::Int(v) => Ok(Num::I(*v)),
        Term::Float(v) => Ok(Num::F(*v)),
        Term::Var(_) => Err(Exception::error(Term::atom("instantiation_error"))),
        Term::Compound(name, args) if args.len() == 2 => {
            let left = eval_arith(&args[0], subst)?;
            let right = eval_arith(&args[1], subst)?;
            apply_arith(name, left, right)
        }
        Term::Compound(name, args) if args.len() == 1 && name == "-" => {
            Ok(match eval_arith(&args[0], subst)? {
                Num::I(v) => Num::I(-v),
                Num::F(v) => Num::F(-v),
            })
        }
        other => Err(Exception::error(Term::compound(
            "type_error",
            vec![Term::atom("evaluable"), other.clone()],
        ))),
    }
}

fn apply_arith(op: &str, left: Num, right: Num) -> Result<Num, Exception> {
    use Num::*;
    Ok(match (op, left, right) {
        ("+", I(a), I(b)) => I(a.wrapping_add(b)),
        ("-", I(a), I(b)) => I(a.wrapping_sub(b)),
        ("*", I(a), I(b)) => I(a.wrapping_mul(b)),
        ("+", a, b) => F(a.as_f64() + b.as_f64()),
        ("-", a, b) => F(a.as_f64() - b.as_f64()),
        ("*", a, b) => F(a.as_f64() * b.as_f64()),
        ("/", I(a), I(b)) => {
            if b == 0 {
                return Err(Exception::error(Term::compound(
                    "evaluation_error",
                    vec![Term::atom("zero_divisor")],
                )));
            }
            if a % b == 0 {
                I(a / b)
            } else {
                F(a as f64 / b as f64)
            }
        }
        ("/", a, b) => {
            if b.as_f64() == 0.0 {
                return Err(Exception::error(Term::compound(
                    "evaluation_error",
                    vec![Term::atom("zero_divisor")],
                )));
            }
            F(a.as_f64() / b.as_f64())
        }
        ("mod", I(a), I(b)) => {
            if b == 0 {
                return Err(Exception::error(Term::compound(
                    "evaluation_error",
                    vec![Term::atom("zero_divisor")],
                )));
            }
            I(a.rem_euclid(b))
        }
        _ => {
            return Err(Exception::error(Term::compound(
                "type_error",
                vec![Term::atom("evaluable"), Term::atom(op)],
            )))
        }
    })
}

fn compare_nums(op: &str, left: Num, right: Num) -> bool {
    let (a, b) = (left.as_f64(), right.as_f64());
    match op {
        "<" => a < b,
        ">" => a > b,
        "=<" => a <= b,
        ">=" => a >= b,
        "=:=" => a == b,
        "=\\=" => a != b,
        _ => false,
    }
}

fn expect_int(term: &Term, subst: &Subst) -> Result<i64, Exception> {
    match walk(term, subst) {
        Term::Int(v) => Ok(v),
        Term::Var(_) => Err(Exception::error(Term::atom("instantiation_error"))),
        other => Err(Exception::error(Term::compound(
            "type_error",
            vec![Term::atom("integer"), other],
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hornet_core::parse_term;

    fn solutions(goal: &str) -> Vec<Result<Bindings, Exception>> {
        let parsed = parse_term(goal).unwrap();
        let mut session = BasicSession;
        let mut cursor = session.solve(&parsed.term, Interrupt::new());
        let mut out = Vec::new();
        while let Some(item) = cursor.next_solution() {
            out.push(item);
        }
        out
    }

    fn binding(goal: &str, index: usize, var: &str) -> Term {
        let parsed = parse_term(goal).unwrap();
        let slot = parsed
            .vars
            .iter()
            .find(|(name, _)| name == var)
            .map(|&(_, id)| id)
            .unwrap();
        let mut session = BasicSession;
        let mut cursor = session.solve(&parsed.term, Interrupt::new());
        let mut solutions = Vec::new();
        while let Some(item) = cursor.next_solution() {
            solutions.push(item.unwrap());
        }
        solutions[index][&slot].clone()
    }

    #[test]
    fn test_true_succeeds_once() {
        let results = solutions("true");
        assert_eq!(results.len(), 1);
        assert!(results[0].as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_fail_has_no_solutions() {
        assert!(solutions("fail").is_empty());
        assert!(solutions("false").is_empty());
    }

    #[test]
    fn test_member_enumerates_in_order() {
        assert_eq!(binding("member(X, [a, b, c])", 0, "X"), Term::atom("a"));
        assert_eq!(binding("member(X, [a, b, c])", 1, "X"), Term::atom("b"));
        assert_eq!(binding("member(X, [a, b, c])", 2, "X"), Term::atom("c"));
        assert_eq!(solutions("member(X, [a, b, c])").len(), 3);
    }

    #[test]
    fn test_member_checks_membership() {
        assert_eq!(solutions("member(b, [a, b, c])").len(), 1);
        assert!(solutions("member(z, [a, b, c])").is_empty());
    }

    #[test]
    fn test_member_sees_through_bound_tail() {
        assert_eq!(solutions("(L = [b, c], member(X, [a | L]))").len(), 3);
    }

    #[test]
    fn test_conjunction_threads_bindings() {
        assert_eq!(binding("(X = f(Y), Y = 1)", 0, "X"), Term::compound("f", vec![Term::Int(1)]));
    }

    #[test]
    fn test_disjunction_both_branches() {
        let results = solutions("(X = 1 ; X = 2)");
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_if_then_else_commits() {
        // The condition succeeds twice but if-then-else commits to the first.
        assert_eq!(solutions("(member(X, [a, b]) -> true ; fail)").len(), 1);
        assert_eq!(binding("(fail -> X = 1 ; X = 2)", 0, "X"), Term::Int(2));
    }

    #[test]
    fn test_negation() {
        assert_eq!(solutions("\\+ fail").len(), 1);
        assert!(solutions("\\+ true").is_empty());
    }

    #[test]
    fn test_unification_of_lists_with_tail() {
        assert_eq!(
            binding("[a, b, c] = [a | T]", 0, "T"),
            Term::List(vec![Term::atom("b"), Term::atom("c")], None)
        );
    }

    #[test]
    fn test_between_enumerates() {
        let results = solutions("between(1, 4, X)");
        assert_eq!(results.len(), 4);
        assert_eq!(binding("between(1, 4, X)", 2, "X"), Term::Int(3));
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(binding("X is 1 + 2 * 3", 0, "X"), Term::Int(7));
        assert_eq!(binding("X is 7 / 2", 0, "X"), Term::Float(3.5));
        assert_eq!(solutions("1 + 1 =:= 2").len(), 1);
        assert!(solutions("3 < 2").is_empty());
    }

    #[test]
    fn test_division_by_zero_raises() {
        let results = solutions("X is 1 / 0");
        assert_eq!(results.len(), 1);
        let err = results[0].as_ref().unwrap_err();
        assert_eq!(err.0.functor_name(), Some("error"));
    }

    #[test]
    fn test_throw_surfaces_term() {
        let results = solutions("throw(test)");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].as_ref().unwrap_err().0, Term::atom("test"));
    }

    #[test]
    fn test_unknown_procedure_is_existence_error() {
        let results = solutions("no_such_predicate(1)");
        let err = results[0].as_ref().unwrap_err();
        assert_eq!(err.0.functor_name(), Some("error"));
    }

    #[test]
    fn test_exception_mid_enumeration_stops_stream() {
        let results = solutions("(member(X, [1, 2]), throw(boom))");
        // First pick raises; nothing after the exception.
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }

    #[test]
    fn test_cancel_interrupts_sleep() {
        let parsed = parse_term("sleep(30)").unwrap();
        let interrupt = Interrupt::new();
        let remote = interrupt.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(50));
            remote.cancel();
        });
        let mut session = BasicSession;
        let mut cursor = session.solve(&parsed.term, interrupt);
        let result = cursor.next_solution().unwrap();
        handle.join().unwrap();
        assert_eq!(result.unwrap_err().0, Term::atom("cancel_goal"));
    }

    #[test]
    fn test_deadline_maps_to_time_limit_exceeded() {
        let parsed = parse_term("sleep(30)").unwrap();
        let interrupt = Interrupt::new();
        interrupt.begin_query(Some(
            std::time::Instant::now() + std::time::Duration::from_millis(50),
        ));
        let mut session = BasicSession;
        let mut cursor = session.solve(&parsed.term, interrupt);
        let result = cursor.next_solution().unwrap();
        assert_eq!(result.unwrap_err().0, Term::atom("time_limit_exceeded"));
    }

    #[test]
    fn test_var_and_nonvar() {
        assert_eq!(solutions("var(X)").len(), 1);
        assert!(solutions("nonvar(X)").is_empty());
        assert_eq!(solutions("(X = a, nonvar(X))").len(), 1);
    }
}
