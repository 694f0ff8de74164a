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

//! Error types for the Hornet server.
//!
//! Protocol-level conditions (`password_mismatch`, `no_query`, ...) are not
//! errors here: they are reply values the communication worker sends back.
//! This enum covers the infrastructure failures only.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The peer closed the stream mid-frame or before a frame.
    #[error("connection closed")]
    ConnectionClosed,

    /// The byte stream does not obey the framing contract.
    #[error("frame error: {0}")]
    Frame(&'static str),

    /// A local-socket endpoint was given a relative path.
    #[error("domain error: unix domain socket path must be absolute: {0}")]
    SocketPathNotAbsolute(PathBuf),

    /// A reply the wire client could not make sense of.
    #[error("protocol error: {0}")]
    Protocol(String),
}

pub type Result<T> = std::result::Result<T, ServerError>;
