//! Lifecycle transition rules and the cancellation/grace-period automaton.
//!
//! Pure decision logic only. The repository layer enforces the same edges
//! with conditional UPDATEs so concurrent requests cannot race a stale
//! status; this module is the single place the edge set is written down.

use crate::error::CoreError;
use crate::status::ProjectStatus;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Transition rules
// ---------------------------------------------------------------------------

/// Returns `true` if `from -> to` is a legal lifecycle edge.
///
/// Cancellation is reachable from every non-terminal status except
/// `Processing` (an in-flight generation settles to `Generated` or `Draft`
/// first). Reactivation restores the status the project held when it was
/// cancelled, so every pre-cancellation status is a legal target from
/// `Cancelled`.
pub fn can_transition(from: ProjectStatus, to: ProjectStatus) -> bool {
    use ProjectStatus::*;
    match (from, to) {
        (Draft, Processing) => true,
        (Processing, Generated) | (Processing, Draft) => true,
        (Generated, Published) | (Published, Generated) => true,
        (Published, Live) => true,
        // Unpublishing a live project takes it all the way back to Generated.
        (Live, Generated) => true,
        (Draft | Generated | Published | Live, Cancelled) => true,
        (Cancelled, Draft | Generated | Published | Live) => true,
        _ => false,
    }
}

/// Validate a lifecycle edge, returning a conflict error naming both ends.
pub fn validate_transition(from: ProjectStatus, to: ProjectStatus) -> Result<(), CoreError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Illegal status transition: {from} -> {to}"
        )))
    }
}

// ---------------------------------------------------------------------------
// Grace period and reminder milestones
// ---------------------------------------------------------------------------

/// Days a cancelled project is retained before permanent deletion.
pub const GRACE_PERIOD_DAYS: i64 = 90;

/// Days a project may sit in `Draft` without generating before the nurture
/// job reminds its owner.
pub const NURTURE_DRAFT_AFTER_DAYS: i64 = 3;

/// How urgently a cancellation reminder should be worded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Notice,
    Warning,
    Final,
}

impl Urgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Notice => "notice",
            Self::Warning => "warning",
            Self::Final => "final",
        }
    }
}

/// One reminder milestone in the cancellation grace period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderMilestone {
    /// Days since cancellation at which this reminder becomes due.
    pub day: i32,
    /// Short label used in notification subjects and logs.
    pub label: &'static str,
    pub urgency: Urgency,
}

/// Reminder schedule, ascending by day. Each milestone is sent at most once
/// per project regardless of how often the automaton runs.
pub const REMINDER_MILESTONES: &[ReminderMilestone] = &[
    ReminderMilestone {
        day: 7,
        label: "one week since cancellation",
        urgency: Urgency::Notice,
    },
    ReminderMilestone {
        day: 30,
        label: "one month since cancellation",
        urgency: Urgency::Warning,
    },
    ReminderMilestone {
        day: 60,
        label: "two months since cancellation",
        urgency: Urgency::Warning,
    },
    ReminderMilestone {
        day: 83,
        label: "one week until deletion",
        urgency: Urgency::Final,
    },
];

/// Whole days elapsed between `cancelled_at` and `now`.
///
/// Negative intervals (clock skew) clamp to zero so a freshly cancelled
/// project never matches a milestone early.
pub fn days_since(cancelled_at: Timestamp, now: Timestamp) -> i64 {
    (now - cancelled_at).num_days().max(0)
}

/// What the cancellation automaton should do for one project.
#[derive(Debug, PartialEq, Eq)]
pub enum CancellationDecision {
    /// Grace period elapsed: permanently delete the project and all
    /// dependent records.
    Delete,
    /// Send these milestones (ascending), then mark each as sent.
    Remind(Vec<ReminderMilestone>),
    /// Nothing is due today.
    Nothing,
}

/// Decide the automaton's action for a project cancelled `days_since` days
/// ago, given the milestone days already notified.
pub fn evaluate_cancellation(days_since: i64, sent: &[i32]) -> CancellationDecision {
    if days_since >= GRACE_PERIOD_DAYS {
        return CancellationDecision::Delete;
    }
    let due: Vec<ReminderMilestone> = REMINDER_MILESTONES
        .iter()
        .filter(|m| days_since >= i64::from(m.day) && !sent.contains(&m.day))
        .copied()
        .collect();
    if due.is_empty() {
        CancellationDecision::Nothing
    } else {
        CancellationDecision::Remind(due)
    }
}

/// Returns `true` if a draft project is stale enough for a nurture reminder.
pub fn nurture_due(days_since_created: i64, already_notified: bool) -> bool {
    !already_notified && days_since_created >= NURTURE_DRAFT_AFTER_DAYS
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use ProjectStatus::*;

    // -- Transition edges --

    #[test]
    fn generation_edges() {
        assert!(can_transition(Draft, Processing));
        assert!(can_transition(Processing, Generated));
        assert!(can_transition(Processing, Draft));
        assert!(!can_transition(Generated, Processing));
        assert!(!can_transition(Draft, Generated));
    }

    #[test]
    fn publish_edges() {
        assert!(can_transition(Generated, Published));
        assert!(can_transition(Published, Generated));
        assert!(can_transition(Published, Live));
        assert!(can_transition(Live, Generated));
        assert!(!can_transition(Generated, Live));
        assert!(!can_transition(Draft, Published));
    }

    #[test]
    fn cancellation_edges() {
        for status in [Draft, Generated, Published, Live] {
            assert!(can_transition(status, Cancelled));
            assert!(can_transition(Cancelled, status));
        }
        assert!(!can_transition(Processing, Cancelled));
        assert!(!can_transition(Cancelled, Processing));
    }

    #[test]
    fn validate_transition_names_both_ends() {
        let err = validate_transition(Draft, Live).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("draft"));
        assert!(msg.contains("live"));
    }

    // -- Days since --

    #[test]
    fn days_since_whole_days() {
        let now = Utc::now();
        assert_eq!(days_since(now - Duration::days(31), now), 31);
        assert_eq!(days_since(now - Duration::hours(47), now), 1);
    }

    #[test]
    fn days_since_clamps_negative() {
        let now = Utc::now();
        assert_eq!(days_since(now + Duration::hours(2), now), 0);
    }

    // -- Cancellation decisions --

    #[test]
    fn day_31_with_30_unsent_sends_exactly_one() {
        let decision = evaluate_cancellation(31, &[7]);
        match decision {
            CancellationDecision::Remind(due) => {
                assert_eq!(due.len(), 1);
                assert_eq!(due[0].day, 30);
            }
            other => panic!("expected Remind, got {other:?}"),
        }
    }

    #[test]
    fn second_run_same_day_sends_nothing() {
        assert_eq!(
            evaluate_cancellation(31, &[7, 30]),
            CancellationDecision::Nothing
        );
    }

    #[test]
    fn missed_milestones_catch_up_in_ascending_order() {
        // Automaton never ran before day 31: both 7 and 30 are due.
        let decision = evaluate_cancellation(31, &[]);
        match decision {
            CancellationDecision::Remind(due) => {
                let days: Vec<i32> = due.iter().map(|m| m.day).collect();
                assert_eq!(days, vec![7, 30]);
            }
            other => panic!("expected Remind, got {other:?}"),
        }
    }

    #[test]
    fn grace_period_elapsed_deletes() {
        assert_eq!(evaluate_cancellation(90, &[]), CancellationDecision::Delete);
        assert_eq!(
            evaluate_cancellation(91, &[7, 30, 60, 83]),
            CancellationDecision::Delete
        );
    }

    #[test]
    fn before_first_milestone_nothing_is_due() {
        assert_eq!(evaluate_cancellation(3, &[]), CancellationDecision::Nothing);
    }

    #[test]
    fn milestones_are_ascending() {
        let days: Vec<i32> = REMINDER_MILESTONES.iter().map(|m| m.day).collect();
        let mut sorted = days.clone();
        sorted.sort_unstable();
        assert_eq!(days, sorted);
        assert!(days.iter().all(|d| i64::from(*d) < GRACE_PERIOD_DAYS));
    }

    // -- Nurture --

    #[test]
    fn nurture_due_once_after_threshold() {
        assert!(!nurture_due(1, false));
        assert!(nurture_due(3, false));
        assert!(!nurture_due(10, true));
    }
}
