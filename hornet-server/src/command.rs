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

//! Command recognition.
//!
//! A client frame payload is a textual term. The recognized top-level
//! commands are `run/2`, `run_async/3`, `async_result/1`, `cancel_async`,
//! `close` and `quit`; anything else is answered with
//! `exception(unknown_command)`. Parse failures surface as the exception
//! term the reply serializer will encode (`syntax_error/1` or
//! `could_not_parse_command`).

use hornet_core::{parse_term, Term, TermError};

/// The timeout argument of `run/2`, `run_async/3` and `async_result/1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeoutArg {
    /// An unbound variable: use the server's configured default.
    Default,
    /// Negative: no limit.
    Unbounded,
    /// Seconds; fractional values are accepted.
    Seconds(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run {
        goal: Term,
        vars: Vec<(String, usize)>,
        timeout: TimeoutArg,
    },
    RunAsync {
        goal: Term,
        vars: Vec<(String, usize)>,
        timeout: TimeoutArg,
        find_all: bool,
    },
    AsyncResult {
        timeout: TimeoutArg,
    },
    CancelAsync,
    Close,
    Quit,
}

/// Parse one command payload. `Err` carries the exception term to reply
/// with.
pub fn parse_command(payload: &str) -> Result<Command, Term> {
    let parsed = match parse_term(payload) {
        Ok(parsed) => parsed,
        Err(TermError::Syntax(detail)) => {
            return Err(Term::compound("syntax_error", vec![Term::atom(detail)]))
        }
        Err(TermError::Empty) => return Err(Term::atom("could_not_parse_command")),
    };

    match &parsed.term {
        Term::Atom(name) => match name.as_str() {
            "cancel_async" => Ok(Command::CancelAsync),
            "close" => Ok(Command::Close),
            "quit" => Ok(Command::Quit),
            _ => Err(Term::atom("unknown_command")),
        },
        Term::Compound(name, args) => match (name.as_str(), args.len()) {
            ("run", 2) => Ok(Command::Run {
                goal: args[0].clone(),
                vars: parsed.vars.clone(),
                timeout: timeout_arg(&args[1])?,
            }),
            ("run_async", 3) => Ok(Command::RunAsync {
                goal: args[0].clone(),
                vars: parsed.vars.clone(),
                timeout: timeout_arg(&args[1])?,
                find_all: bool_arg(&args[2])?,
            }),
            ("async_result", 1) => Ok(Command::AsyncResult {
                timeout: timeout_arg(&args[0])?,
            }),
            _ => Err(Term::atom("unknown_command")),
        },
        _ => Err(Term::atom("unknown_command")),
    }
}

fn timeout_arg(term: &Term) -> Result<TimeoutArg, Term> {
    match term {
        Term::Var(_) => Ok(TimeoutArg::Default),
        Term::Int(v) if *v < 0 => Ok(TimeoutArg::Unbounded),
        Term::Int(v) => Ok(TimeoutArg::Seconds(*v as f64)),
        Term::Float(v) if *v < 0.0 => Ok(TimeoutArg::Unbounded),
        Term::Float(v) => Ok(TimeoutArg::Seconds(*v)),
        _ => Err(Term::atom("unknown_command")),
    }
}

fn bool_arg(term: &Term) -> Result<bool, Term> {
    match term.as_atom() {
        Some("true") => Ok(true),
        Some("false") => Ok(false),
        _ => Err(Term::atom("unknown_command")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_with_goal_and_timeout() {
        let cmd = parse_command("run(member(X, [a, b]), -1)").unwrap();
        match cmd {
            Command::Run { goal, vars, timeout } => {
                assert_eq!(goal.functor_name(), Some("member"));
                assert_eq!(vars, vec![("X".to_string(), 0)]);
                assert_eq!(timeout, TimeoutArg::Unbounded);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_run_with_default_timeout_placeholder() {
        let cmd = parse_command("run(atom(a), _)").unwrap();
        match cmd {
            Command::Run { timeout, .. } => assert_eq!(timeout, TimeoutArg::Default),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_fractional_timeout() {
        let cmd = parse_command("run(atom(a), 0.5)").unwrap();
        match cmd {
            Command::Run { timeout, .. } => assert_eq!(timeout, TimeoutArg::Seconds(0.5)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_run_async() {
        let cmd = parse_command("run_async((a, b), 10, false)").unwrap();
        match cmd {
            Command::RunAsync {
                goal,
                timeout,
                find_all,
                ..
            } => {
                assert_eq!(goal.functor_name(), Some(","));
                assert_eq!(timeout, TimeoutArg::Seconds(10.0));
                assert!(!find_all);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_zero_arity_commands() {
        assert_eq!(parse_command("cancel_async").unwrap(), Command::CancelAsync);
        assert_eq!(parse_command("close").unwrap(), Command::Close);
        assert_eq!(parse_command("quit").unwrap(), Command::Quit);
    }

    #[test]
    fn test_trailing_end_marker_accepted() {
        assert_eq!(parse_command("close.").unwrap(), Command::Close);
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_command("frobnicate(1)").unwrap_err(),
            Term::atom("unknown_command")
        );
        assert_eq!(
            parse_command("run(a)").unwrap_err(),
            Term::atom("unknown_command")
        );
        assert_eq!(
            parse_command("42").unwrap_err(),
            Term::atom("unknown_command")
        );
    }

    #[test]
    fn test_syntax_error_carries_tag() {
        let err = parse_command("run(member(X, [a, b), -1)").unwrap_err();
        assert_eq!(err.functor_name(), Some("syntax_error"));
    }

    #[test]
    fn test_bad_find_all_flag() {
        assert_eq!(
            parse_command("run_async(a, -1, maybe)").unwrap_err(),
            Term::atom("unknown_command")
        );
    }
}
