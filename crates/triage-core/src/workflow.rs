//! Workflow tracker for the fixed, forward-only request lifecycle.
//!
//! ```text
//! NEW → TRIAGE → ASSIGNED → IN_PROGRESS → RESOLVED → CLOSED
//! ```
//!
//! Transition legality lives in one place, [`LifecycleState::next`].  The
//! tracker applies it to a [`Request`] and stamps `updated_at` from its
//! [`Clock`].  Advancing a closed request is an idempotent no-op.

use std::cell::Cell;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, TriageError};
use crate::request::Request;

// ---------------------------------------------------------------------------
// Lifecycle states
// ---------------------------------------------------------------------------

/// One of the six lifecycle states of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    New,
    Triage,
    Assigned,
    InProgress,
    Resolved,
    Closed,
}

impl LifecycleState {
    /// All states in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::New,
        Self::Triage,
        Self::Assigned,
        Self::InProgress,
        Self::Resolved,
        Self::Closed,
    ];

    /// The sole initial state.
    pub const INITIAL: Self = Self::New;

    /// The state that follows this one, or `None` for `CLOSED`.
    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.position() + 1).copied()
    }

    /// Zero-based position in the lifecycle.
    pub fn position(self) -> usize {
        self as usize
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Triage => "TRIAGE",
            Self::Assigned => "ASSIGNED",
            Self::InProgress => "IN_PROGRESS",
            Self::Resolved => "RESOLVED",
            Self::Closed => "CLOSED",
        }
    }

    /// Parse the exact canonical name (`IN_PROGRESS`, not `in progress`).
    ///
    /// Persisted records go through this parse so a damaged status fails
    /// with [`TriageError::InvalidState`] instead of being reinterpreted.
    pub fn from_canonical(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| TriageError::InvalidState {
                value: s.to_string(),
            })
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for LifecycleState {
    type Err = TriageError;

    /// Case-insensitive; spaces and dashes are read as underscores, so
    /// `in-progress` parses as `IN_PROGRESS`.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_uppercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == normalized)
            .ok_or_else(|| TriageError::InvalidState {
                value: s.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of the timestamps stamped onto requests.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock that moves forward by a fixed step on every read.
///
/// Handy for demos and tests that need distinct, predictable timestamps.
#[derive(Debug)]
pub struct StepClock {
    next: Cell<DateTime<Utc>>,
    step: Duration,
}

impl StepClock {
    pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            next: Cell::new(start),
            step,
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        let now = self.next.get();
        self.next.set(now + self.step);
        now
    }
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// Result of a single [`WorkflowTracker::advance`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The request moved one step forward.
    Advanced {
        from: LifecycleState,
        to: LifecycleState,
    },
    /// The request was already `CLOSED`; nothing changed.
    AlreadyTerminal,
}

/// Advances requests through the lifecycle.
#[derive(Debug, Default)]
pub struct WorkflowTracker<C: Clock = SystemClock> {
    clock: C,
}

impl WorkflowTracker<SystemClock> {
    /// Create a tracker that stamps wall-clock time.
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> WorkflowTracker<C> {
    /// Create a tracker that reads time from `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Move `request` to its next lifecycle state.
    ///
    /// `updated_at` becomes the later of the clock reading and the previous
    /// `updated_at`, so it never goes backwards.  A `CLOSED` request is left
    /// untouched and [`AdvanceOutcome::AlreadyTerminal`] is returned.
    pub fn advance(&self, request: &mut Request) -> AdvanceOutcome {
        let from = request.status();
        let Some(to) = from.next() else {
            warn!(request_id = request.id(), "request already closed, advance ignored");
            return AdvanceOutcome::AlreadyTerminal;
        };

        let at = self.clock.now().max(request.updated_at());
        request.transition(to, at);

        info!(
            request_id = request.id(),
            from = %from,
            to = %to,
            "request advanced"
        );
        AdvanceOutcome::Advanced { from, to }
    }

    /// The request's current lifecycle state.
    pub fn current_state(&self, request: &Request) -> LifecycleState {
        request.status()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
