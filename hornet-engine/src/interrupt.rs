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

//! Cooperative interrupt token.
//!
//! Cloned across the communication worker, the goal worker and the engine.
//! Three conditions can trip it, with abort taking precedence over
//! cancellation, and cancellation over the query deadline:
//!
//! - `abort()` - the connection is going away; never cleared.
//! - `cancel()` - a `cancel_async` injection; cleared at the next query.
//! - the per-query wall-clock deadline armed by `begin_query()`.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Why evaluation was interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stop {
    Cancelled,
    TimedOut,
    Aborted,
}

impl Stop {
    /// The exception atom carried to the client for this stop reason.
    pub fn as_atom(&self) -> &'static str {
        match self {
            Stop::Cancelled => "cancel_goal",
            Stop::TimedOut => "time_limit_exceeded",
            Stop::Aborted => "$aborted",
        }
    }
}

#[derive(Default)]
struct InterruptState {
    cancelled: AtomicBool,
    aborted: AtomicBool,
    deadline: Mutex<Option<Instant>>,
}

/// Shared interrupt token. Cheap to clone; all clones observe the same
/// state.
#[derive(Clone, Default)]
pub struct Interrupt {
    state: Arc<InterruptState>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cooperative cancellation of the current goal.
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
    }

    /// Tear the session down. Unlike `cancel`, this is permanent.
    pub fn abort(&self) {
        self.state.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.state.aborted.load(Ordering::SeqCst)
    }

    /// Arm the token for a fresh query: clear any stale cancellation and
    /// install the wall-clock deadline (`None` = unbounded).
    pub fn begin_query(&self, deadline: Option<Instant>) {
        self.state.cancelled.store(false, Ordering::SeqCst);
        *self.state.deadline.lock() = deadline;
    }

    /// Disarm the deadline once the query has produced its terminal result.
    pub fn end_query(&self) {
        *self.state.deadline.lock() = None;
    }

    /// Poll the token. `Err` carries the highest-precedence tripped reason.
    pub fn check(&self) -> Result<(), Stop> {
        if self.state.aborted.load(Ordering::SeqCst) {
            return Err(Stop::Aborted);
        }
        if self.state.cancelled.load(Ordering::SeqCst) {
            return Err(Stop::Cancelled);
        }
        if let Some(deadline) = *self.state.deadline.lock() {
            if Instant::now() >= deadline {
                return Err(Stop::TimedOut);
            }
        }
        Ok(())
    }

    /// Sleep for `duration`, polling the token so an interrupt cuts the
    /// sleep short.
    pub fn sleep(&self, duration: Duration) -> Result<(), Stop> {
        const SLICE: Duration = Duration::from_millis(10);
        let until = Instant::now() + duration;
        loop {
            self.check()?;
            let now = Instant::now();
            if now >= until {
                return Ok(());
            }
            std::thread::sleep(SLICE.min(until - now));
        }
    }
}
