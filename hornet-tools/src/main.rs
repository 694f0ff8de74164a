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

//! hornetd - standalone Hornet query server.
//!
//! Launch glue for embedding hosts: parses options, starts the server,
//! writes the endpoint and password to standard output when asked, and
//! maps the shutdown reason to the process exit code.
//!
//! # Usage
//!
//! ```bash
//! # Loopback TCP on a kernel-assigned port, connection values on stdout
//! hornetd --write-connection-values
//!
//! # Unix-domain socket endpoint for an embedded host
//! hornetd --unix-domain-socket /tmp/hornet.sock --write-connection-values \
//!         --halt-on-connection-failure --ignore-sig-int
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hornet_engine::BasicEngine;
use hornet_server::{Server, ServerConfig, ShutdownReason};

/// Exit code for the halt-on-connection-failure path.
const EXIT_CONNECTION_FAILURE: u8 = 2;

/// Hornet query server
#[derive(Parser, Debug)]
#[command(name = "hornetd")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TCP loopback port (0 = kernel-assigned). Ignored with --unix-domain-socket
    #[arg(short, long, default_value = "0")]
    port: u16,

    /// Absolute path for a Unix-domain socket endpoint
    #[arg(short, long)]
    unix_domain_socket: Option<PathBuf>,

    /// Shared secret; omit to generate a strong random one
    #[arg(long)]
    password: Option<String>,

    /// Default per-query timeout in seconds (-1 = unbounded)
    #[arg(short, long, default_value = "-1", allow_hyphen_values = true)]
    query_timeout: f64,

    /// Accept backlog
    #[arg(long, default_value = "5")]
    pending_connections: u32,

    /// Write "<port-or-path>\n<password>\n" to standard output after binding
    #[arg(short, long)]
    write_connection_values: bool,

    /// Redirect standard output and error to this file
    #[arg(long)]
    write_output_to_file: Option<PathBuf>,

    /// Ignore interrupt signals so a client-side debugger cannot suspend the server
    #[arg(long)]
    ignore_sig_int: bool,

    /// Embedded mode: exit non-zero when a connection is lost abnormally
    #[arg(long)]
    halt_on_connection_failure: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(args.log_level.clone())),
        )
        .with_writer(std::io::stderr)
        .init();

    if args.ignore_sig_int {
        // An empty handler replaces the default terminate-on-interrupt
        // disposition.
        if let Err(e) = ctrlc::set_handler(|| {}) {
            error!(error = %e, "could not install interrupt policy");
            return ExitCode::FAILURE;
        }
    }

    let mut config = ServerConfig::new()
        .with_pending_connections(args.pending_connections)
        .with_halt_on_connection_failure(args.halt_on_connection_failure)
        .with_write_connection_values(args.write_connection_values);
    config.write_output_to_file = args.write_output_to_file.clone();
    config.ignore_sig_int = args.ignore_sig_int;
    if let Some(path) = args.unix_domain_socket {
        config = config.with_unix_domain_socket(path);
    } else if args.port != 0 {
        config = config.with_port(args.port);
    }
    if let Some(password) = args.password {
        config = config.with_password(password);
    }
    if args.query_timeout >= 0.0 {
        config = config.with_query_timeout(args.query_timeout);
    }

    // hornetd blocks its main thread, but cannot go through
    // Server::launch: the redirect must land after the connection values
    // reach the real standard output, between bind and wait.
    let handle = match Server::start(config, Arc::new(BasicEngine::new())) {
        Ok(handle) => handle,
        Err(e) => {
            error!(error = %e, "server failed to start");
            return ExitCode::FAILURE;
        }
    };

    if let Some(path) = &args.write_output_to_file {
        if let Err(e) = redirect_output(path) {
            error!(path = %path.display(), error = %e, "cannot redirect output");
            handle.stop();
            return ExitCode::FAILURE;
        }
    }

    match handle.wait() {
        ShutdownReason::Quit | ShutdownReason::Stopped => {
            info!("server shut down cleanly");
            ExitCode::SUCCESS
        }
        ShutdownReason::ConnectionFailure => {
            error!("halting after abnormal connection loss");
            ExitCode::from(EXIT_CONNECTION_FAILURE)
        }
    }
}

/// Point the process's stdout and stderr at `path`.
#[cfg(unix)]
fn redirect_output(path: &std::path::Path) -> std::io::Result<()> {
    use std::os::unix::io::AsRawFd;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let fd = file.as_raw_fd();
    unsafe {
        if libc::dup2(fd, libc::STDOUT_FILENO) < 0 || libc::dup2(fd, libc::STDERR_FILENO) < 0 {
            return Err(std::io::Error::last_os_error());
        }
    }
    // The descriptor is duplicated; the File can drop.
    Ok(())
}

#[cfg(not(unix))]
fn redirect_output(_path: &std::path::Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "output redirection requires a Unix platform",
    ))
}
