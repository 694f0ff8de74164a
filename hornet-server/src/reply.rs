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

//! Reply serializer.
//!
//! Every reply frame carries one JSON object:
//!
//! - `{"functor":"true","args":[[ ...answer rows... ]]}` - each row is a
//!   list of `{"functor":"=","args":[Name, Value]}` binding objects.
//! - `{"functor":"false","args":[]}`
//! - `{"functor":"exception","args":[ErrorValue]}` - a structured
//!   `error(Inner, _Context)` exception is unwrapped to `Inner`; a bare
//!   atom stays as that atom; any other compound collapses to its functor
//!   name.

use serde_json::{json, Value};

use hornet_core::json::term_to_json;
use hornet_core::Term;

/// One answer: the ordered `(variable name, value)` bindings. A successful
/// goal with no named variables has an empty binding list.
pub type Answer = Vec<(String, Term)>;

/// `true(Answers)` with zero or more answer rows.
pub fn reply_true(answers: &[Answer]) -> String {
    let rows: Vec<Value> = answers
        .iter()
        .map(|answer| {
            answer
                .iter()
                .map(|(name, value)| {
                    json!({"functor": "=", "args": [name, term_to_json(value)]})
                })
                .collect()
        })
        .collect();
    json!({"functor": "true", "args": [rows]}).to_string()
}

/// `true([[]])`: success with one empty answer row; the standard
/// acknowledgement for commands that carry no bindings.
pub fn reply_true_empty() -> String {
    reply_true(&[Vec::new()])
}

pub fn reply_false() -> String {
    json!({"functor": "false", "args": []}).to_string()
}

/// `exception(E)` from an arbitrary raised term.
pub fn reply_exception(error: &Term) -> String {
    let value = match error {
        // error(Inner, _Context) carries its payload in Inner.
        Term::Compound(name, args) if name == "error" && args.len() == 2 => {
            term_to_json(&args[0])
        }
        Term::Atom(name) => Value::String(name.clone()),
        Term::Compound(name, _) => Value::String(name.clone()),
        other => term_to_json(other),
    };
    json!({"functor": "exception", "args": [value]}).to_string()
}

/// `exception(<tag>)` from a protocol-error tag such as `frame_error`.
pub fn reply_exception_tag(tag: &str) -> String {
    json!({"functor": "exception", "args": [tag]}).to_string()
}

/// The greeting reply: `true([[threads(CommId, GoalId)]])`.
pub fn reply_threads(comm_id: &str, goal_id: &str) -> String {
    json!({
        "functor": "true",
        "args": [[[ {"functor": "threads", "args": [comm_id, goal_id]} ]]],
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn parse(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_true_with_bindings() {
        let answers = vec![
            vec![("X".to_string(), Term::atom("a"))],
            vec![("X".to_string(), Term::atom("b"))],
        ];
        assert_eq!(
            parse(&reply_true(&answers)),
            json!({"functor": "true", "args": [[
                [{"functor": "=", "args": ["X", "a"]}],
                [{"functor": "=", "args": ["X", "b"]}],
            ]]})
        );
    }

    #[test]
    fn test_true_empty_row() {
        assert_eq!(
            parse(&reply_true_empty()),
            json!({"functor": "true", "args": [[[]]]})
        );
    }

    #[test]
    fn test_false() {
        assert_eq!(
            parse(&reply_false()),
            json!({"functor": "false", "args": []})
        );
    }

    #[test]
    fn test_exception_unwraps_iso_error() {
        let error = Term::compound(
            "error",
            vec![
                Term::compound("type_error", vec![Term::atom("list"), Term::Int(1)]),
                Term::atom("context"),
            ],
        );
        assert_eq!(
            parse(&reply_exception(&error)),
            json!({"functor": "exception", "args": [
                {"functor": "type_error", "args": ["list", 1]}
            ]})
        );
    }

    #[test]
    fn test_exception_bare_atom() {
        assert_eq!(
            parse(&reply_exception(&Term::atom("time_limit_exceeded"))),
            json!({"functor": "exception", "args": ["time_limit_exceeded"]})
        );
    }

    #[test]
    fn test_exception_compound_collapses_to_functor_name() {
        let error = Term::compound("test", vec![Term::Int(1)]);
        assert_eq!(
            parse(&reply_exception(&error)),
            json!({"functor": "exception", "args": ["test"]})
        );
    }

    #[test]
    fn test_threads_greeting_shape() {
        assert_eq!(
            parse(&reply_threads("comm-1", "goal-1")),
            json!({"functor": "true", "args": [[[
                {"functor": "threads", "args": ["comm-1", "goal-1"]}
            ]]]})
        );
    }
}
