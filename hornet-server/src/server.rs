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

//! Listener and supervisor.
//!
//! [`Server::start`] binds the endpoint, optionally emits the connection
//! values to standard output, then accepts connections on a dedicated
//! thread, spawning a {communication, goal} worker pair per accept. Live
//! pairs are tracked so shutdown can abort them.
//!
//! Shutdown paths:
//!
//! - [`ServerHandle::stop`] - close the listener (a self-connection
//!   unblocks the accept loop), abort every registered pair, unlink the
//!   socket file.
//! - a client `quit` - same, then [`ServerHandle::wait`] returns
//!   [`ShutdownReason::Quit`].
//! - abnormal connection loss with `halt_on_connection_failure` - same,
//!   `wait` returns [`ShutdownReason::ConnectionFailure`]; the launch
//!   glue turns that into a non-zero process exit.

use std::collections::HashMap;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use hornet_engine::{Engine, Interrupt};

use crate::comm::{CommWorker, SessionEnd};
use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::socket::{ListenAddr, Listener, Socket};
use crate::worker::{spawn_goal_worker, CancelGate, OUTBOX_CAPACITY};

/// Why the server stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// `ServerHandle::stop` was called.
    Stopped,
    /// A client sent `quit`.
    Quit,
    /// Abnormal connection loss in embedded mode.
    ConnectionFailure,
}

/// Outcome of [`Server::launch`].
pub enum Launched {
    /// `run_server_on_thread = true`: the supervisor is running on its
    /// own thread, the server is already accepting.
    Handle(ServerHandle),
    /// `run_server_on_thread = false`: the call blocked until shutdown.
    Finished(ShutdownReason),
}

enum ServerEvent {
    Quit,
    ConnectionLost,
    Stopped,
}

/// A connection pair as the supervisor sees it: enough to force it down.
struct PairHandle {
    socket: Socket,
    interrupt: Interrupt,
}

struct Shared {
    server_id: String,
    running: AtomicBool,
    stopping: AtomicBool,
    next_pair: AtomicU64,
    registry: Mutex<HashMap<u64, PairHandle>>,
    events: Sender<ServerEvent>,
    password: Vec<u8>,
    default_timeout: Option<f64>,
}

/// Server entry points.
pub struct Server;

impl Server {
    /// Bind and start accepting on a supervisor thread; returns
    /// immediately.
    pub fn start(config: ServerConfig, engine: Arc<dyn Engine>) -> Result<ServerHandle> {
        let (listener, addr) = bind_endpoint(&config)?;

        let password = match &config.password {
            Some(password) => password.clone().into_bytes(),
            None => Uuid::new_v4().simple().to_string().into_bytes(),
        };

        if config.write_connection_values {
            write_connection_values(&addr, &password)?;
        }

        let (events_tx, events_rx) = unbounded();
        let shared = Arc::new(Shared {
            server_id: Uuid::new_v4().simple().to_string(),
            running: AtomicBool::new(true),
            stopping: AtomicBool::new(false),
            next_pair: AtomicU64::new(1),
            registry: Mutex::new(HashMap::new()),
            events: events_tx,
            password,
            default_timeout: config.query_timeout,
        });

        info!(server = %shared.server_id, endpoint = %addr.connection_value(), "server listening");

        let thread_name = config
            .server_thread
            .clone()
            .unwrap_or_else(|| format!("hornet-accept-{}", shared.server_id));
        let accept_shared = shared.clone();
        let accept_thread = std::thread::Builder::new()
            .name(thread_name)
            .spawn(move || accept_loop(listener, accept_shared, engine))
            .map_err(ServerError::Io)?;

        Ok(ServerHandle {
            addr,
            shared,
            events: events_rx,
            accept_thread: Mutex::new(Some(accept_thread)),
            halt_on_connection_failure: config.halt_on_connection_failure,
        })
    }

    /// Bind, accept and block the caller until shutdown.
    pub fn run(config: ServerConfig, engine: Arc<dyn Engine>) -> Result<ShutdownReason> {
        let handle = Self::start(config, engine)?;
        Ok(handle.wait())
    }

    /// Launch honoring `config.run_server_on_thread`: return a handle
    /// immediately when the supervisor gets its own thread, block until
    /// shutdown otherwise.
    pub fn launch(config: ServerConfig, engine: Arc<dyn Engine>) -> Result<Launched> {
        if config.run_server_on_thread {
            Ok(Launched::Handle(Self::start(config, engine)?))
        } else {
            Ok(Launched::Finished(Self::run(config, engine)?))
        }
    }
}

/// Handle to a running server.
pub struct ServerHandle {
    addr: ListenAddr,
    shared: Arc<Shared>,
    events: Receiver<ServerEvent>,
    accept_thread: Mutex<Option<JoinHandle<()>>>,
    halt_on_connection_failure: bool,
}

impl ServerHandle {
    /// The bound endpoint.
    pub fn addr(&self) -> &ListenAddr {
        &self.addr
    }

    /// The TCP port, when listening on TCP.
    pub fn port(&self) -> Option<u16> {
        match &self.addr {
            ListenAddr::Tcp(addr) => Some(addr.port()),
            _ => None,
        }
    }

    /// The effective password (configured or generated).
    pub fn password(&self) -> &str {
        std::str::from_utf8(&self.shared.password).unwrap_or("")
    }

    pub fn server_id(&self) -> &str {
        &self.shared.server_id
    }

    /// Block until the server shuts down, driving the supervisor's
    /// reaction to connection events.
    pub fn wait(&self) -> ShutdownReason {
        loop {
            match self.events.recv() {
                Ok(ServerEvent::Quit) => {
                    info!(server = %self.shared.server_id, "quit requested");
                    self.shutdown();
                    return ShutdownReason::Quit;
                }
                Ok(ServerEvent::ConnectionLost) => {
                    if self.halt_on_connection_failure {
                        warn!(server = %self.shared.server_id, "connection lost, halting");
                        self.shutdown();
                        return ShutdownReason::ConnectionFailure;
                    }
                    // Standalone mode: keep serving the remaining and
                    // future connections.
                }
                Ok(ServerEvent::Stopped) | Err(_) => return ShutdownReason::Stopped,
            }
        }
    }

    /// Orderly stop: unblock the accept loop, abort every live pair,
    /// remove the socket file.
    pub fn stop(&self) {
        self.shutdown();
        let _ = self.shared.events.send(ServerEvent::Stopped);
    }

    fn shutdown(&self) {
        if self.shared.stopping.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shared.running.store(false, Ordering::SeqCst);
        // A throwaway connection unblocks a blocking accept.
        self.addr.poke();
        if let Some(handle) = self.accept_thread.lock().take() {
            let _ = handle.join();
        }
        let pairs: Vec<PairHandle> = {
            let mut registry = self.shared.registry.lock();
            registry.drain().map(|(_, pair)| pair).collect()
        };
        for pair in &pairs {
            pair.interrupt.abort();
            pair.socket.shutdown();
        }
        if let ListenAddr::Unix(path) = &self.addr {
            let _ = std::fs::remove_file(path);
        }
        info!(server = %self.shared.server_id, "server stopped");
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn bind_endpoint(config: &ServerConfig) -> Result<(Listener, ListenAddr)> {
    match &config.unix_domain_socket {
        Some(path) => bind_unix(path, config.pending_connections),
        None => Listener::bind_tcp(config.port.unwrap_or(0), config.pending_connections),
    }
}

#[cfg(unix)]
fn bind_unix(path: &Path, backlog: u32) -> Result<(Listener, ListenAddr)> {
    if !path.is_absolute() {
        return Err(ServerError::SocketPathNotAbsolute(path.to_path_buf()));
    }
    // A stale socket file from an earlier unclean exit would fail the bind.
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Listener::bind_unix(path, backlog)
}

#[cfg(not(unix))]
fn bind_unix(_path: &Path, _backlog: u32) -> Result<(Listener, ListenAddr)> {
    Err(ServerError::Protocol(
        "unix domain sockets are not supported on this platform".into(),
    ))
}

/// Port (or path) first, then the password, one line each.
fn write_connection_values(addr: &ListenAddr, password: &[u8]) -> Result<()> {
    use std::io::Write;
    let mut out = std::io::stdout().lock();
    writeln!(out, "{}", addr.connection_value())?;
    out.write_all(password)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

fn accept_loop(listener: Listener, shared: Arc<Shared>, engine: Arc<dyn Engine>) {
    while shared.running.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok(socket) => {
                if !shared.running.load(Ordering::SeqCst) {
                    break;
                }
                spawn_pair(&shared, &engine, socket);
            }
            Err(e) => {
                if shared.running.load(Ordering::SeqCst) {
                    error!(server = %shared.server_id, error = %e, "accept failed");
                }
                break;
            }
        }
    }
    debug!(server = %shared.server_id, "accept loop exiting");
}

fn spawn_pair(shared: &Arc<Shared>, engine: &Arc<dyn Engine>, socket: Socket) {
    let pair_id = shared.next_pair.fetch_add(1, Ordering::SeqCst);
    let comm_id = format!("comm-{}-{}", shared.server_id, pair_id);
    let goal_id = format!("goal-{}-{}", shared.server_id, pair_id);

    let reader = match socket.try_clone() {
        Ok(clone) => BufReader::new(clone),
        Err(e) => {
            warn!(error = %e, "could not clone accepted socket");
            return;
        }
    };
    let supervisor_socket = match socket.try_clone() {
        Ok(clone) => clone,
        Err(e) => {
            warn!(error = %e, "could not clone accepted socket");
            return;
        }
    };

    // At most one outstanding query per connection; the inbox never needs
    // more than a single slot.
    let (inbox_tx, inbox_rx) = bounded(1);
    let (outbox_tx, outbox_rx) = bounded(OUTBOX_CAPACITY);
    let gate = Arc::new(CancelGate::new());
    let interrupt = Interrupt::new();

    let goal_thread = spawn_goal_worker(
        goal_id.clone(),
        engine.clone(),
        inbox_rx,
        outbox_tx,
        gate.clone(),
        interrupt.clone(),
    );

    shared.registry.lock().insert(
        pair_id,
        PairHandle {
            socket: supervisor_socket,
            interrupt: interrupt.clone(),
        },
    );
    debug!(pair = pair_id, "connection pair registered");

    let worker = CommWorker::new(
        socket,
        reader,
        shared.password.clone(),
        comm_id.clone(),
        goal_id,
        inbox_tx,
        outbox_rx,
        gate,
        interrupt.clone(),
        shared.default_timeout,
    );

    let pair_shared = shared.clone();
    let spawned = std::thread::Builder::new().name(comm_id).spawn(move || {
        let end = worker.run();
        // `worker` is consumed: its inbox sender is gone, and the abort
        // flag stops any in-flight goal, so the goal worker winds down.
        interrupt.abort();
        let _ = goal_thread.join();
        if let Some(pair) = pair_shared.registry.lock().remove(&pair_id) {
            pair.socket.shutdown();
        }
        debug!(pair = pair_id, ?end, "connection pair finished");
        if !pair_shared.stopping.load(Ordering::SeqCst) {
            match end {
                SessionEnd::Quit => {
                    let _ = pair_shared.events.send(ServerEvent::Quit);
                }
                SessionEnd::Lost => {
                    let _ = pair_shared.events.send(ServerEvent::ConnectionLost);
                }
                SessionEnd::Closed => {}
            }
        }
    });
    if let Err(e) = spawned {
        error!(error = %e, "could not spawn communication worker");
        shared.registry.lock().remove(&pair_id);
    }
}
