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

//! Goal worker.
//!
//! One per connection. Owns the engine session and runs a serial loop:
//! block on the inbox for the next [`QueryRequest`], evaluate it to
//! completion, emit [`ResultMsg`]s on the outbox, repeat. An engine
//! exception never tears the worker down; only inbox closure or a tripped
//! abort flag does.
//!
//! The `safe_to_cancel` bracket around the engine call lives in
//! [`CancelGate`]: the communication worker injects a cancellation only
//! while the gate is held open, under the gate's mutex, so the injection
//! cannot land between two goal messages and corrupt bookkeeping.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, trace};

use hornet_core::{Term, Var};
use hornet_engine::{Engine, Exception, Interrupt, Session};

use crate::reply::Answer;

/// Bound on unconsumed streamed answers. One `async_result` per answer is
/// the expected client pattern, so the goal worker may block on a full
/// outbox.
pub const OUTBOX_CAPACITY: usize = 64;

/// One goal dispatched to the goal worker.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub goal: Term,
    /// Named variables of the goal, `(name, slot id)` in source order.
    pub vars: Vec<(String, usize)>,
    /// Wall-clock limit in seconds; `None` is unbounded.
    pub timeout: Option<f64>,
    /// Batched (`true`) vs streamed (`false`) answer delivery.
    pub find_all: bool,
}

/// One element of the goal outbox.
#[derive(Debug, Clone)]
pub enum ResultMsg {
    Success { answers: Vec<Answer>, find_all: bool },
    Failure { find_all: bool },
    Exception { error: Term, find_all: bool },
}

impl ResultMsg {
    /// A terminal message is the last one a query will produce: any
    /// exception, or the single batched success/failure.
    pub fn is_terminal(&self) -> bool {
        match self {
            ResultMsg::Exception { .. } => true,
            ResultMsg::Success { find_all, .. } | ResultMsg::Failure { find_all } => *find_all,
        }
    }
}

/// The `safe_to_cancel` flag and its mutex. Held open only while the goal
/// worker is inside the engine call.
#[derive(Default)]
pub struct CancelGate {
    safe: Mutex<bool>,
}

impl CancelGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn enter(&self) {
        *self.safe.lock() = true;
    }

    fn exit(&self) {
        *self.safe.lock() = false;
    }

    /// Inject a cancellation if the goal worker is inside the cancellable
    /// region. The injection happens under the same lock that brackets the
    /// region.
    pub fn cancel_if_safe(&self, interrupt: &Interrupt) -> bool {
        let safe = self.safe.lock();
        if *safe {
            interrupt.cancel();
            true
        } else {
            false
        }
    }
}

/// Spawn the goal worker thread for one connection.
pub fn spawn_goal_worker(
    goal_id: String,
    engine: Arc<dyn Engine>,
    inbox: Receiver<QueryRequest>,
    outbox: Sender<ResultMsg>,
    gate: Arc<CancelGate>,
    interrupt: Interrupt,
) -> JoinHandle<()> {
    std::thread::Builder::new()
        .name(goal_id.clone())
        .spawn(move || {
            let mut session = engine.session();
            debug!(worker = %goal_id, "goal worker started");
            loop {
                let request = match inbox.recv() {
                    Ok(request) => request,
                    Err(_) => break,
                };
                if interrupt.is_aborted() {
                    break;
                }
                let deadline = request
                    .timeout
                    .map(|seconds| Instant::now() + Duration::from_secs_f64(seconds));
                interrupt.begin_query(deadline);
                gate.enter();
                let delivered = run_query(session.as_mut(), &request, &interrupt, &outbox);
                gate.exit();
                interrupt.end_query();
                if delivered.is_err() {
                    // The outbox consumer is gone; the connection is over.
                    break;
                }
                if interrupt.is_aborted() {
                    break;
                }
            }
            debug!(worker = %goal_id, "goal worker exiting");
        })
        .expect("failed to spawn goal worker thread")
}

/// Evaluate one request, pushing results onto the outbox. `Err(())` means
/// the outbox receiver disappeared.
fn run_query(
    session: &mut dyn Session,
    request: &QueryRequest,
    interrupt: &Interrupt,
    outbox: &Sender<ResultMsg>,
) -> Result<(), ()> {
    let find_all = request.find_all;
    let mut cursor = session.solve(&request.goal, interrupt.clone());

    if find_all {
        let mut answers = Vec::new();
        loop {
            match cursor.next_solution() {
                Some(Ok(bindings)) => {
                    answers.push(project(&request.vars, &bindings));
                }
                Some(Err(Exception(error))) => {
                    trace!(%error, "query raised");
                    return send(outbox, ResultMsg::Exception { error, find_all });
                }
                None => break,
            }
        }
        if answers.is_empty() {
            send(outbox, ResultMsg::Failure { find_all })
        } else {
            send(outbox, ResultMsg::Success { answers, find_all })
        }
    } else {
        let mut produced = 0usize;
        loop {
            match cursor.next_solution() {
                Some(Ok(bindings)) => {
                    produced += 1;
                    send(
                        outbox,
                        ResultMsg::Success {
                            answers: vec![project(&request.vars, &bindings)],
                            find_all,
                        },
                    )?;
                }
                Some(Err(Exception(error))) => {
                    trace!(%error, "query raised");
                    return send(outbox, ResultMsg::Exception { error, find_all });
                }
                None => break,
            }
        }
        if produced == 0 {
            send(outbox, ResultMsg::Failure { find_all })?;
        }
        send(
            outbox,
            ResultMsg::Exception {
                error: Term::atom("no_more_results"),
                find_all,
            },
        )
    }
}

/// Build the answer row for one solution: every named variable of the
/// goal, in source order. Slots the engine left unbound keep their source
/// name.
fn project(vars: &[(String, usize)], bindings: &hornet_engine::Bindings) -> Answer {
    vars.iter()
        .map(|(name, id)| {
            let value = bindings.get(id).cloned().unwrap_or_else(|| {
                Term::Var(Var {
                    name: name.clone(),
                    id: *id,
                })
            });
            (name.clone(), value)
        })
        .collect()
}

fn send(outbox: &Sender<ResultMsg>, msg: ResultMsg) -> Result<(), ()> {
    outbox.send(msg).map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use hornet_core::parse_term;
    use hornet_engine::BasicEngine;

    fn start_worker() -> (
        Sender<QueryRequest>,
        Receiver<ResultMsg>,
        Arc<CancelGate>,
        Interrupt,
        JoinHandle<()>,
    ) {
        let (inbox_tx, inbox_rx) = bounded(1);
        let (outbox_tx, outbox_rx) = bounded(OUTBOX_CAPACITY);
        let gate = Arc::new(CancelGate::new());
        let interrupt = Interrupt::new();
        let handle = spawn_goal_worker(
            "goal-test".into(),
            Arc::new(BasicEngine::new()),
            inbox_rx,
            outbox_tx,
            gate.clone(),
            interrupt.clone(),
        );
        (inbox_tx, outbox_rx, gate, interrupt, handle)
    }

    fn request(goal: &str, timeout: Option<f64>, find_all: bool) -> QueryRequest {
        let parsed = parse_term(goal).unwrap();
        QueryRequest {
            goal: parsed.term,
            vars: parsed.vars,
            timeout,
            find_all,
        }
    }

    #[test]
    fn test_find_all_batches_answers() {
        let (inbox, outbox, _gate, interrupt, handle) = start_worker();
        inbox
            .send(request("member(X, [a, b, c])", None, true))
            .unwrap();
        let msg = outbox.recv().unwrap();
        match &msg {
            ResultMsg::Success { answers, find_all } => {
                assert!(*find_all);
                assert_eq!(answers.len(), 3);
                assert_eq!(answers[0][0].0, "X");
                assert_eq!(answers[0][0].1, Term::atom("a"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(msg.is_terminal());
        interrupt.abort();
        drop(inbox);
        handle.join().unwrap();
    }

    #[test]
    fn test_streamed_answers_end_with_no_more_results() {
        let (inbox, outbox, _gate, interrupt, handle) = start_worker();
        inbox
            .send(request("member(X, [1, 2])", None, false))
            .unwrap();
        assert!(matches!(
            outbox.recv().unwrap(),
            ResultMsg::Success { ref answers, find_all: false } if answers.len() == 1
        ));
        assert!(matches!(
            outbox.recv().unwrap(),
            ResultMsg::Success { find_all: false, .. }
        ));
        match outbox.recv().unwrap() {
            ResultMsg::Exception { error, .. } => {
                assert_eq!(error, Term::atom("no_more_results"))
            }
            other => panic!("unexpected {other:?}"),
        }
        interrupt.abort();
        drop(inbox);
        handle.join().unwrap();
    }

    #[test]
    fn test_streamed_failure_emits_false_then_terminal() {
        let (inbox, outbox, _gate, interrupt, handle) = start_worker();
        inbox.send(request("fail", None, false)).unwrap();
        assert!(matches!(
            outbox.recv().unwrap(),
            ResultMsg::Failure { find_all: false }
        ));
        assert!(matches!(
            outbox.recv().unwrap(),
            ResultMsg::Exception { .. }
        ));
        interrupt.abort();
        drop(inbox);
        handle.join().unwrap();
    }

    #[test]
    fn test_timeout_surfaces_time_limit_exceeded() {
        let (inbox, outbox, _gate, interrupt, handle) = start_worker();
        inbox.send(request("sleep(30)", Some(0.05), true)).unwrap();
        match outbox.recv().unwrap() {
            ResultMsg::Exception { error, .. } => {
                assert_eq!(error, Term::atom("time_limit_exceeded"))
            }
            other => panic!("unexpected {other:?}"),
        }
        interrupt.abort();
        drop(inbox);
        handle.join().unwrap();
    }

    #[test]
    fn test_worker_survives_engine_exception() {
        let (inbox, outbox, _gate, interrupt, handle) = start_worker();
        inbox.send(request("throw(boom)", None, true)).unwrap();
        assert!(matches!(
            outbox.recv().unwrap(),
            ResultMsg::Exception { .. }
        ));
        // The worker is still serving.
        inbox.send(request("true", None, true)).unwrap();
        assert!(matches!(
            outbox.recv().unwrap(),
            ResultMsg::Success { .. }
        ));
        interrupt.abort();
        drop(inbox);
        handle.join().unwrap();
    }

    #[test]
    fn test_cancel_through_gate_only_when_safe() {
        let (inbox, outbox, gate, interrupt, handle) = start_worker();
        // Nothing running: the gate is shut.
        assert!(!gate.cancel_if_safe(&interrupt));

        inbox.send(request("sleep(30)", None, true)).unwrap();
        // Wait for the worker to enter the cancellable region.
        let deadline = Instant::now() + Duration::from_secs(5);
        while !gate.cancel_if_safe(&interrupt) {
            assert!(Instant::now() < deadline, "gate never opened");
            std::thread::sleep(Duration::from_millis(5));
        }
        match outbox.recv().unwrap() {
            ResultMsg::Exception { error, .. } => {
                assert_eq!(error, Term::atom("cancel_goal"))
            }
            other => panic!("unexpected {other:?}"),
        }
        // Cancellation must not kill the worker.
        inbox.send(request("true", None, true)).unwrap();
        assert!(matches!(
            outbox.recv().unwrap(),
            ResultMsg::Success { .. }
        ));
        interrupt.abort();
        drop(inbox);
        handle.join().unwrap();
    }

    #[test]
    fn test_goal_with_no_variables_yields_empty_binding_row() {
        let (inbox, outbox, _gate, interrupt, handle) = start_worker();
        inbox.send(request("atom(a)", None, true)).unwrap();
        match outbox.recv().unwrap() {
            ResultMsg::Success { answers, .. } => {
                assert_eq!(answers, vec![Vec::new()]);
            }
            other => panic!("unexpected {other:?}"),
        }
        interrupt.abort();
        drop(inbox);
        handle.join().unwrap();
    }

    #[test]
    fn test_unbound_variable_keeps_source_name() {
        let (inbox, outbox, _gate, interrupt, handle) = start_worker();
        inbox.send(request("X = f(Y)", None, true)).unwrap();
        match outbox.recv().unwrap() {
            ResultMsg::Success { answers, .. } => {
                let row = &answers[0];
                assert_eq!(row[0].0, "X");
                assert_eq!(row[1].0, "Y");
                assert!(matches!(&row[1].1, Term::Var(v) if v.name == "Y"));
            }
            other => panic!("unexpected {other:?}"),
        }
        interrupt.abort();
        drop(inbox);
        handle.join().unwrap();
    }

    #[test]
    fn test_abort_stops_worker_mid_query() {
        let (inbox, outbox, _gate, interrupt, handle) = start_worker();
        inbox.send(request("sleep(30)", None, true)).unwrap();
        std::thread::sleep(Duration::from_millis(50));
        interrupt.abort();
        drop(inbox);
        // The aborted query surfaces a terminal exception, then the worker
        // exits.
        match outbox.recv().unwrap() {
            ResultMsg::Exception { error, .. } => {
                assert_eq!(error, Term::atom("$aborted"))
            }
            other => panic!("unexpected {other:?}"),
        }
        handle.join().unwrap();
    }
}
