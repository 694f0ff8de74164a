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

//! Server configuration.
//!
//! The recognized option set, defaults matching standalone development
//! use. An embedding host typically sets `write_connection_values`,
//! `halt_on_connection_failure` and either `port` or
//! `unix_domain_socket`.

use std::path::PathBuf;

/// Configuration for one server instance.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP loopback port; `None` or `Some(0)` lets the kernel pick.
    /// Ignored when `unix_domain_socket` is set.
    pub port: Option<u16>,

    /// Absolute filesystem path for a local-socket endpoint.
    pub unix_domain_socket: Option<PathBuf>,

    /// Shared secret; `None` generates a strong random one. The password
    /// is held as opaque bytes and never interned anywhere engine code
    /// could enumerate.
    pub password: Option<String>,

    /// Default per-query timeout in seconds; `None` is unbounded.
    pub query_timeout: Option<f64>,

    /// Accept backlog.
    pub pending_connections: u32,

    /// Dispatched on by `Server::launch`: `true` puts the supervisor on
    /// its own thread and returns a handle immediately, `false` blocks
    /// the caller until shutdown.
    pub run_server_on_thread: bool,

    /// Name for the supervisor (accept-loop) thread.
    pub server_thread: Option<String>,

    /// Write `<port-or-path>\n<password>\n` to standard output once the
    /// endpoint is bound, for embedding hosts that parse them.
    pub write_connection_values: bool,

    /// Redirect the process's standard output and error to this file.
    /// Applied by the launch glue, not by the library.
    pub write_output_to_file: Option<PathBuf>,

    /// Install a signal policy that ignores interrupts, so a client-side
    /// debugger cannot suspend the server. Applied by the launch glue.
    pub ignore_sig_int: bool,

    /// Embedded mode: an abnormal connection loss shuts the server down
    /// (and the launch glue exits the process non-zero).
    pub halt_on_connection_failure: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: None,
            unix_domain_socket: None,
            password: None,
            query_timeout: None,
            pending_connections: 5,
            run_server_on_thread: true,
            server_thread: None,
            write_connection_values: false,
            write_output_to_file: None,
            ignore_sig_int: false,
            halt_on_connection_failure: false,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_unix_domain_socket(mut self, path: impl Into<PathBuf>) -> Self {
        self.unix_domain_socket = Some(path.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_query_timeout(mut self, seconds: f64) -> Self {
        self.query_timeout = Some(seconds);
        self
    }

    pub fn with_pending_connections(mut self, backlog: u32) -> Self {
        self.pending_connections = backlog;
        self
    }

    pub fn with_halt_on_connection_failure(mut self, halt: bool) -> Self {
        self.halt_on_connection_failure = halt;
        self
    }

    pub fn with_write_connection_values(mut self, write: bool) -> Self {
        self.write_connection_values = write;
        self
    }

    pub fn with_server_thread(mut self, name: impl Into<String>) -> Self {
        self.server_thread = Some(name.into());
        self
    }
}
