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

//! The logic-engine seam.
//!
//! The query server evaluates goals through the [`Engine`] / [`Session`]
//! traits so hosts can plug in their own evaluator. A [`Session`] is owned
//! by exactly one goal worker and evaluates one goal at a time; solutions
//! stream out of the [`Solutions`] cursor in the engine's natural answer
//! order.
//!
//! Rust has no asynchronous exception injection, so cancellation, query
//! timeout and connection abort all ride the cooperative [`Interrupt`]
//! token: the engine polls it between resolution steps (and inside
//! suspending builtins such as `sleep/1`) and surfaces the corresponding
//! exception term when it trips.
//!
//! [`BasicEngine`] is the batteries-included implementation: a compact
//! backtracking evaluator with the control constructs and builtins an
//! interactive session needs.

pub mod basic;
pub mod interrupt;

use hornet_core::Term;
use std::collections::HashMap;

pub use basic::BasicEngine;
pub use interrupt::{Interrupt, Stop};

/// One solution: variable slot id -> fully resolved binding. Slots the
/// engine left unbound are absent from the map.
pub type Bindings = HashMap<usize, Term>;

/// An exception raised by goal evaluation, carried as a term.
#[derive(Debug, Clone, PartialEq)]
pub struct Exception(pub Term);

impl Exception {
    /// A bare atomic exception such as `cancel_goal`.
    pub fn tag(name: &str) -> Self {
        Exception(Term::atom(name))
    }

    /// An ISO-style `error(Inner, _Context)` exception.
    pub fn error(inner: Term) -> Self {
        Exception(Term::compound(
            "error",
            vec![
                inner,
                Term::Var(hornet_core::Var {
                    name: "_".into(),
                    id: usize::MAX,
                }),
            ],
        ))
    }
}

impl From<Stop> for Exception {
    fn from(stop: Stop) -> Self {
        Exception::tag(stop.as_atom())
    }
}

impl std::fmt::Display for Exception {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A cursor over the solutions of one goal.
///
/// Contract: items arrive in the engine's answer order; after the first
/// `Some(Err(_))` or the first `None`, every subsequent call returns `None`.
pub trait Solutions {
    fn next_solution(&mut self) -> Option<Result<Bindings, Exception>>;
}

/// One engine session: the per-connection evaluation context. Session
/// state (whatever the engine keeps between goals) survives across
/// queries and across cancellation; it dies with the connection.
pub trait Session: Send {
    /// Begin evaluating `goal`. Evaluation is lazy: work happens in
    /// [`Solutions::next_solution`] calls.
    fn solve(&mut self, goal: &Term, interrupt: Interrupt) -> Box<dyn Solutions + '_>;
}

/// An engine: a factory for per-connection sessions.
pub trait Engine: Send + Sync {
    fn session(&self) -> Box<dyn Session>;
}
