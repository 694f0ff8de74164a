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

//! Communication worker: the per-connection protocol state machine.
//!
//! Owns the socket (sole reader, sole writer) and mediates between client
//! frames and the goal worker's queues. Phases per connection:
//!
//! 1. **Greeting** - first frame must match the server password byte for
//!    byte; reply `true([[threads(CommId, GoalId)]])` or
//!    `exception(password_mismatch)` and terminate.
//! 2. **Ready** - read a frame, parse it, dispatch the command.
//! 3. **Running-sync** - a `run` is outstanding; while blocked on the
//!    outbox, write one raw `.` heartbeat byte every two seconds so peer
//!    death is noticed.
//! 4. **Running-async** - replied `true([[]])` immediately; results are
//!    pulled later via `async_result`.
//! 5. **Draining** - a new `run`/`run_async` found stale results pending:
//!    consume and discard through the terminal message first.
//!
//! Requests are strictly serialized: read, dispatch, reply, then read the
//! next frame. `query_in_progress` is true exactly while unconsumed
//! results remain on the outbox; it is cleared only after the terminal
//! result is taken off.

use std::io::{BufReader, Write};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use tracing::{debug, trace, warn};

use hornet_core::Term;
use hornet_engine::Interrupt;

use crate::command::{parse_command, Command, TimeoutArg};
use crate::error::ServerError;
use crate::frame::{read_frame, write_frame};
use crate::reply;
use crate::socket::Socket;
use crate::worker::{CancelGate, QueryRequest, ResultMsg};

/// Interval between liveness heartbeats while a synchronous `run` waits.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(2);

/// How a session ended; decides the supervisor's follow-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// `close` observed, or the greeting was rejected: deliberate
    /// termination, never halts the server.
    Closed,
    /// `quit` observed: the whole server shuts down.
    Quit,
    /// Socket fault or goal-worker death with no `close`/`quit` in
    /// progress: the abnormal path.
    Lost,
}

pub struct CommWorker {
    reader: BufReader<Socket>,
    writer: Socket,
    password: Vec<u8>,
    comm_id: String,
    goal_id: String,
    inbox: Sender<QueryRequest>,
    outbox: Receiver<ResultMsg>,
    gate: std::sync::Arc<CancelGate>,
    interrupt: Interrupt,
    default_timeout: Option<f64>,
    query_in_progress: bool,
}

/// Internal control flow: `Err` carries the session end.
type Step<T = ()> = std::result::Result<T, SessionEnd>;

impl CommWorker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        socket: Socket,
        reader: BufReader<Socket>,
        password: Vec<u8>,
        comm_id: String,
        goal_id: String,
        inbox: Sender<QueryRequest>,
        outbox: Receiver<ResultMsg>,
        gate: std::sync::Arc<CancelGate>,
        interrupt: Interrupt,
        default_timeout: Option<f64>,
    ) -> Self {
        CommWorker {
            reader,
            writer: socket,
            password,
            comm_id,
            goal_id,
            inbox,
            outbox,
            gate,
            interrupt,
            default_timeout,
            query_in_progress: false,
        }
    }

    /// Drive the connection to completion.
    pub fn run(mut self) -> SessionEnd {
        match self.greeting() {
            Ok(true) => {}
            Ok(false) => return SessionEnd::Closed,
            Err(end) => return end,
        }
        debug!(worker = %self.comm_id, "session established");
        loop {
            let payload = match read_frame(&mut self.reader) {
                Ok(payload) => payload,
                Err(ServerError::Frame(detail)) => {
                    trace!(worker = %self.comm_id, detail, "bad frame");
                    if self.reply(&reply::reply_exception_tag("frame_error")).is_err() {
                        return SessionEnd::Lost;
                    }
                    continue;
                }
                Err(_) => return SessionEnd::Lost,
            };
            trace!(worker = %self.comm_id, %payload, "frame received");
            let command = match parse_command(&payload) {
                Ok(command) => command,
                Err(error) => {
                    if self.reply(&reply::reply_exception(&error)).is_err() {
                        return SessionEnd::Lost;
                    }
                    continue;
                }
            };
            let step = match command {
                Command::Run { goal, vars, timeout } => self.handle_run(goal, vars, timeout),
                Command::RunAsync {
                    goal,
                    vars,
                    timeout,
                    find_all,
                } => self.handle_run_async(goal, vars, timeout, find_all),
                Command::AsyncResult { timeout } => self.handle_async_result(timeout),
                Command::CancelAsync => self.handle_cancel_async(),
                Command::Close => {
                    let _ = self.reply(&reply::reply_true_empty());
                    return SessionEnd::Closed;
                }
                Command::Quit => {
                    let _ = self.reply(&reply::reply_true_empty());
                    return SessionEnd::Quit;
                }
            };
            if let Err(end) = step {
                return end;
            }
        }
    }

    /// Phase 1. `Ok(false)` means the password was rejected.
    fn greeting(&mut self) -> Step<bool> {
        let payload = match read_frame(&mut self.reader) {
            Ok(payload) => payload,
            Err(_) => return Err(SessionEnd::Lost),
        };
        if !constant_time_eq(payload.as_bytes(), &self.password) {
            warn!(worker = %self.comm_id, "password mismatch");
            let _ = self.reply(&reply::reply_exception_tag("password_mismatch"));
            return Ok(false);
        }
        self.reply(&reply::reply_threads(&self.comm_id, &self.goal_id))
            .map_err(|_| SessionEnd::Lost)?;
        Ok(true)
    }

    fn handle_run(
        &mut self,
        goal: Term,
        vars: Vec<(String, usize)>,
        timeout: TimeoutArg,
    ) -> Step {
        self.drain_stale(true)?;
        self.dispatch(goal, vars, timeout, true)?;
        // Running-sync: await the single terminal message, proving
        // liveness to the peer every two seconds.
        loop {
            match self.outbox.recv_timeout(HEARTBEAT_INTERVAL) {
                Ok(msg) => {
                    self.query_in_progress = false;
                    let text = match msg {
                        ResultMsg::Success { answers, .. } => reply::reply_true(&answers),
                        ResultMsg::Failure { .. } => reply::reply_false(),
                        ResultMsg::Exception { error, .. } => reply::reply_exception(&error),
                    };
                    return self.reply(&text).map_err(|_| SessionEnd::Lost);
                }
                Err(RecvTimeoutError::Timeout) => self.heartbeat()?,
                Err(RecvTimeoutError::Disconnected) => return Err(self.goal_worker_died()),
            }
        }
    }

    fn handle_run_async(
        &mut self,
        goal: Term,
        vars: Vec<(String, usize)>,
        timeout: TimeoutArg,
        find_all: bool,
    ) -> Step {
        self.drain_stale(false)?;
        self.dispatch(goal, vars, timeout, find_all)?;
        self.reply(&reply::reply_true_empty())
            .map_err(|_| SessionEnd::Lost)
    }

    fn handle_async_result(&mut self, timeout: TimeoutArg) -> Step {
        if !self.query_in_progress {
            return self
                .reply(&reply::reply_exception_tag("no_query"))
                .map_err(|_| SessionEnd::Lost);
        }
        let received = match timeout {
            TimeoutArg::Default | TimeoutArg::Unbounded => {
                self.outbox.recv().map_err(|_| TryRecvError::Disconnected)
            }
            TimeoutArg::Seconds(seconds) if seconds == 0.0 => self.outbox.try_recv(),
            TimeoutArg::Seconds(seconds) => self
                .outbox
                .recv_timeout(Duration::from_secs_f64(seconds))
                .map_err(|e| match e {
                    RecvTimeoutError::Timeout => TryRecvError::Empty,
                    RecvTimeoutError::Disconnected => TryRecvError::Disconnected,
                }),
        };
        let text = match received {
            Ok(msg) => {
                if msg.is_terminal() {
                    self.query_in_progress = false;
                }
                match msg {
                    ResultMsg::Success { answers, .. } => reply::reply_true(&answers),
                    ResultMsg::Failure { .. } => reply::reply_false(),
                    ResultMsg::Exception { error, .. } => reply::reply_exception(&error),
                }
            }
            Err(TryRecvError::Empty) => reply::reply_exception_tag("result_not_available"),
            Err(TryRecvError::Disconnected) => return Err(self.goal_worker_died()),
        };
        self.reply(&text).map_err(|_| SessionEnd::Lost)
    }

    fn handle_cancel_async(&mut self) -> Step {
        let text = if self.gate.cancel_if_safe(&self.interrupt) {
            reply::reply_true_empty()
        } else if self.query_in_progress {
            // Results are pending but the engine is outside the
            // cancellable region; the client can still drain.
            reply::reply_true_empty()
        } else {
            reply::reply_exception_tag("no_query")
        };
        self.reply(&text).map_err(|_| SessionEnd::Lost)
    }

    /// Phase 5: consume and discard results left over from a previous
    /// async session. During a `run` drain the heartbeat keeps ticking;
    /// for `run_async` the drain is silent and synchronous.
    fn drain_stale(&mut self, heartbeats: bool) -> Step {
        while self.query_in_progress {
            let msg = if heartbeats {
                match self.outbox.recv_timeout(HEARTBEAT_INTERVAL) {
                    Ok(msg) => msg,
                    Err(RecvTimeoutError::Timeout) => {
                        self.heartbeat()?;
                        continue;
                    }
                    Err(RecvTimeoutError::Disconnected) => return Err(self.goal_worker_died()),
                }
            } else {
                match self.outbox.recv() {
                    Ok(msg) => msg,
                    Err(_) => return Err(self.goal_worker_died()),
                }
            };
            if msg.is_terminal() {
                self.query_in_progress = false;
            }
            trace!(worker = %self.comm_id, "stale result discarded");
        }
        Ok(())
    }

    fn dispatch(
        &mut self,
        goal: Term,
        vars: Vec<(String, usize)>,
        timeout: TimeoutArg,
        find_all: bool,
    ) -> Step {
        let timeout = match timeout {
            TimeoutArg::Default => self.default_timeout,
            TimeoutArg::Unbounded => None,
            TimeoutArg::Seconds(seconds) => Some(seconds),
        };
        let request = QueryRequest {
            goal,
            vars,
            timeout,
            find_all,
        };
        if self.inbox.send(request).is_err() {
            return Err(self.goal_worker_died());
        }
        self.query_in_progress = true;
        Ok(())
    }

    /// The goal worker is gone: tell the client once, then stop serving
    /// this connection.
    fn goal_worker_died(&mut self) -> SessionEnd {
        warn!(worker = %self.comm_id, "goal worker died unexpectedly");
        let _ = self.reply(&reply::reply_exception_tag("connection_failed"));
        SessionEnd::Lost
    }

    /// One raw `.` byte, not a frame. A failed write means the peer is
    /// gone.
    fn heartbeat(&mut self) -> Step {
        trace!(worker = %self.comm_id, "heartbeat");
        self.writer
            .write_all(b".")
            .and_then(|_| self.writer.flush())
            .map_err(|_| SessionEnd::Lost)
    }

    fn reply(&mut self, text: &str) -> crate::error::Result<()> {
        trace!(worker = %self.comm_id, reply = %text, "reply");
        write_frame(&mut self.writer, text)
    }
}

/// Byte-exact comparison that does not leak the mismatch position through
/// timing.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"secret", b"secret"));
        assert!(!constant_time_eq(b"secret", b"secres"));
        assert!(!constant_time_eq(b"secret", b"secre"));
        assert!(!constant_time_eq(b"", b"x"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn test_terminality_drives_query_in_progress() {
        // Streamed successes are not terminal; the batched ones are.
        assert!(!ResultMsg::Success {
            answers: vec![],
            find_all: false
        }
        .is_terminal());
        assert!(ResultMsg::Success {
            answers: vec![],
            find_all: true
        }
        .is_terminal());
        assert!(ResultMsg::Exception {
            error: Term::atom("no_more_results"),
            find_all: false
        }
        .is_terminal());
    }
}
