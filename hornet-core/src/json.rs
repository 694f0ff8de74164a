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

//! Term -> JSON conversion.
//!
//! The mapping is the wire contract clients decode against:
//!
//! - atom -> JSON string
//! - variable -> JSON string of its source name
//! - integer / float -> JSON number
//! - string -> JSON string
//! - list -> JSON array (an unresolved tail is appended as its own value)
//! - compound -> `{"functor": Name, "args": [...]}`

use serde_json::{json, Value};

use crate::term::Term;

/// Convert a term to its JSON wire representation.
pub fn term_to_json(term: &Term) -> Value {
    match term {
        Term::Atom(name) => Value::String(name.clone()),
        Term::Var(v) => Value::String(v.name.clone()),
        Term::Int(v) => json!(v),
        Term::Float(v) => json!(v),
        Term::Str(s) => Value::String(s.clone()),
        Term::List(items, tail) => {
            let mut out: Vec<Value> = items.iter().map(term_to_json).collect();
            if let Some(tail) = tail {
                out.push(term_to_json(tail));
            }
            Value::Array(out)
        }
        Term::Compound(name, args) => json!({
            "functor": name,
            "args": args.iter().map(term_to_json).collect::<Vec<_>>(),
        }),
    }
}
