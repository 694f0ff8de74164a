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

//! Error types for the Hornet core term layer

use thiserror::Error;

/// Errors raised while turning text into terms.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TermError {
    /// The input is not a well-formed term. The detail is an atom-shaped
    /// tag suitable for embedding in a `syntax_error/1` reply term.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// The input was empty or contained only whitespace.
    #[error("empty term")]
    Empty,
}

pub type Result<T> = std::result::Result<T, TermError>;
