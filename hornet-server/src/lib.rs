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

//! Hornet query server.
//!
//! Embeds a logic engine behind a local, single-tenant,
//! password-authenticated query server on a loopback TCP port or a
//! Unix-domain socket. Each accepted connection gets a dedicated
//! {communication worker, goal worker} pair: the communication worker
//! owns the socket and the protocol state machine, the goal worker owns
//! one engine session and evaluates one goal at a time.
//!
//! ```text
//! client ─ socket ─ frame codec ─ comm worker ─ inbox ─ goal worker ─ engine
//!                                     ▲                     │
//!                                     └────── outbox ◄──────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use hornet_engine::BasicEngine;
//! use hornet_server::{Client, Server, ServerConfig};
//!
//! # fn main() -> hornet_server::Result<()> {
//! let handle = Server::start(ServerConfig::new(), Arc::new(BasicEngine::new()))?;
//! let mut client = Client::connect_tcp(handle.port().unwrap(), handle.password())?;
//! let reply = client.run("member(X, [a, b, c])", None)?;
//! println!("{reply:?}");
//! client.close()?;
//! handle.stop();
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod command;
pub mod comm;
pub mod config;
pub mod error;
pub mod frame;
pub mod reply;
pub mod server;
pub mod socket;
pub mod worker;

pub use client::{Client, Reply};
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use server::{Launched, Server, ServerHandle, ShutdownReason};
pub use socket::ListenAddr;
