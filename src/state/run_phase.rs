//! Lifecycle phases of a crawl run

use std::fmt;

/// Represents the current phase of one orchestrator run
///
/// Phases only move forward: `Idle → Seeding → Running → Draining → Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RunPhase {
    /// Constructed, nothing enqueued yet
    Idle,

    /// Activated site roots are being enqueued
    Seeding,

    /// Pages are being dispatched and handled
    Running,

    /// No new requests are accepted; in-flight pages finish
    Draining,

    /// Terminal
    Done,
}

impl RunPhase {
    /// Returns the phase that legally follows this one
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Seeding),
            Self::Seeding => Some(Self::Running),
            Self::Running => Some(Self::Draining),
            Self::Draining => Some(Self::Done),
            Self::Done => None,
        }
    }

    /// Returns true if `to` is the immediate successor of this phase
    pub fn can_transition_to(&self, to: RunPhase) -> bool {
        self.next() == Some(to)
    }

    /// Returns true if new requests may still be enqueued
    pub fn accepts_requests(&self) -> bool {
        matches!(self, Self::Seeding | Self::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Seeding => "seeding",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
