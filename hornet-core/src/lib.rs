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

//! Core term model for Hornet.
//!
//! Everything that crosses the Hornet wire is a *term*: client goals arrive
//! as text in conventional logic-term syntax, answers leave as JSON. This
//! crate holds the pieces both sides share:
//!
//! - [`Term`] - the structural term representation
//! - [`parser`] - textual term -> [`Term`] plus the named-variable table
//! - [`json`] - [`Term`] -> `serde_json::Value` conversion
//!
//! The crate is deliberately engine-agnostic: it knows nothing about
//! resolution, sessions or the wire protocol.

pub mod error;
pub mod json;
pub mod parser;
pub mod term;

pub use error::{Result, TermError};
pub use parser::{parse_term, ParsedTerm};
pub use term::{Term, Var};
