//! Mission status transitions.
//!
//! These functions do no existence or permission checks; the guard runs
//! first, then the transition, then the planner turns it into a persist effect.

use chrono::{DateTime, Utc};

use crate::core::types::MissionStatus;

/// New status plus the fields derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    pub status: MissionStatus,
    /// Set to `now` exactly when entering `Complete`.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Status every new mission starts in.
pub fn initial_status() -> MissionStatus {
    MissionStatus::Active
}

pub fn apply_status_transition(new_status: MissionStatus, now: DateTime<Utc>) -> StatusTransition {
    StatusTransition {
        status: new_status,
        completed_at: (new_status == MissionStatus::Complete).then_some(now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap()
    }

    #[test]
    fn new_missions_start_active() {
        assert_eq!(initial_status(), MissionStatus::Active);
    }

    #[test]
    fn completing_stamps_completed_at() {
        let transition = apply_status_transition(MissionStatus::Complete, now());
        assert_eq!(transition.status, MissionStatus::Complete);
        assert_eq!(transition.completed_at, Some(now()));
    }

    /// Every other status clears the completion timestamp, including archive.
    #[test]
    fn other_statuses_have_no_completed_at() {
        for status in [
            MissionStatus::Active,
            MissionStatus::Paused,
            MissionStatus::Archived,
        ] {
            let transition = apply_status_transition(status, now());
            assert_eq!(transition.status, status);
            assert_eq!(transition.completed_at, None);
        }
    }
}
