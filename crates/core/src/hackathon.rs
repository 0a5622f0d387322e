//! Wall-clock derivation of a hackathon's phase.
//!
//! A hackathon's phase is a pure function of the current time against its
//! stored window boundaries. The persisted `status` column is only an
//! opportunistic snapshot refreshed on read; the boundaries are the source
//! of truth.

use crate::types::Timestamp;

/// Lifecycle phase of a hackathon, derived from its time windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HackathonPhase {
    /// Before registration opens, or between registration close and start.
    Upcoming,
    RegistrationOpen,
    InProgress,
    Judging,
    Completed,
}

impl HackathonPhase {
    /// Stable string form stored in the `hackathons.status` snapshot column.
    pub fn as_str(&self) -> &'static str {
        match self {
            HackathonPhase::Upcoming => "upcoming",
            HackathonPhase::RegistrationOpen => "registration_open",
            HackathonPhase::InProgress => "in_progress",
            HackathonPhase::Judging => "judging",
            HackathonPhase::Completed => "completed",
        }
    }
}

/// The stored window boundaries of a hackathon.
#[derive(Debug, Clone, Copy)]
pub struct HackathonWindows {
    pub registration_starts_at: Timestamp,
    pub registration_ends_at: Timestamp,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub judging_ends_at: Timestamp,
}

impl HackathonWindows {
    /// Derive the phase at instant `now`.
    ///
    /// Later boundaries win, so overlapping windows resolve to the most
    /// advanced phase.
    pub fn phase_at(&self, now: Timestamp) -> HackathonPhase {
        if now >= self.judging_ends_at {
            HackathonPhase::Completed
        } else if now >= self.ends_at {
            HackathonPhase::Judging
        } else if now >= self.starts_at {
            HackathonPhase::InProgress
        } else if now >= self.registration_starts_at && now < self.registration_ends_at {
            HackathonPhase::RegistrationOpen
        } else {
            HackathonPhase::Upcoming
        }
    }

    /// Whether new participant registrations are accepted at instant `now`.
    pub fn registration_open_at(&self, now: Timestamp) -> bool {
        self.phase_at(now) == HackathonPhase::RegistrationOpen
    }
}
