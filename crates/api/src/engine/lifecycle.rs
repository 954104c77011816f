//! Time-driven automatons: cancellation sweep and draft nurture.
//!
//! Both are invoked by an external periodic trigger through the `/cron`
//! routes and are idempotent per calendar trigger: milestone reminders are
//! latched per day, the nurture nudge per project. Decisions are pure
//! (`siteforge_core::lifecycle`); this module performs the side effects.

use chrono::{Duration, Utc};
use serde::Serialize;

use siteforge_core::lifecycle::{
    days_since, evaluate_cancellation, CancellationDecision, NURTURE_DRAFT_AFTER_DAYS,
};
use siteforge_db::repositories::ProjectRepo;
use siteforge_notify::Notification;

use crate::error::AppResult;
use crate::state::AppState;

/// What one cancellation sweep did.
#[derive(Debug, Default, Serialize)]
pub struct SweepReport {
    pub examined: usize,
    pub reminders_sent: usize,
    pub deleted: usize,
}

/// What one nurture sweep did.
#[derive(Debug, Default, Serialize)]
pub struct NurtureReport {
    pub examined: usize,
    pub reminders_sent: usize,
}

/// Run the cancellation/grace-period automaton over every cancelled project.
pub async fn run_cancellation_sweep(state: &AppState) -> AppResult<SweepReport> {
    let projects = ProjectRepo::list_cancelled(&state.pool).await?;
    let now = Utc::now();
    let mut report = SweepReport::default();

    for project in projects {
        let Some(cancelled_at) = project.cancelled_at else {
            continue;
        };
        report.examined += 1;
        let days = days_since(cancelled_at, now);

        match evaluate_cancellation(days, &project.sent_reminder_milestones) {
            CancellationDecision::Delete => {
                if ProjectRepo::hard_delete(&state.pool, project.id).await? {
                    tracing::info!(
                        project_id = project.id,
                        days_since_cancellation = days,
                        "Grace period elapsed, project permanently deleted"
                    );
                    notify(state, &project.owner_email, &Notification::DeletionConfirmed).await;
                    report.deleted += 1;
                }
            }
            CancellationDecision::Remind(due) => {
                for milestone in due {
                    // The latch decides; losing it means another run (or a
                    // concurrent one) already sent this milestone.
                    if ProjectRepo::mark_milestone_sent(&state.pool, project.id, milestone.day)
                        .await?
                    {
                        notify(
                            state,
                            &project.owner_email,
                            &Notification::CancellationReminder {
                                milestone,
                                days_since_cancellation: days,
                            },
                        )
                        .await;
                        report.reminders_sent += 1;
                    }
                }
            }
            CancellationDecision::Nothing => {}
        }
    }

    tracing::info!(
        examined = report.examined,
        reminders_sent = report.reminders_sent,
        deleted = report.deleted,
        "Cancellation sweep complete"
    );
    Ok(report)
}

/// Nudge owners of draft projects that never generated a site.
pub async fn run_nurture_sweep(state: &AppState) -> AppResult<NurtureReport> {
    let cutoff = Utc::now() - Duration::days(NURTURE_DRAFT_AFTER_DAYS);
    let projects = ProjectRepo::list_stale_drafts(&state.pool, cutoff).await?;
    let mut report = NurtureReport::default();

    for project in projects {
        report.examined += 1;
        if ProjectRepo::mark_nurture_notified(&state.pool, project.id).await? {
            notify(state, &project.owner_email, &Notification::DraftNurture).await;
            report.reminders_sent += 1;
        }
    }

    tracing::info!(
        examined = report.examined,
        reminders_sent = report.reminders_sent,
        "Nurture sweep complete"
    );
    Ok(report)
}

/// Best-effort notification: an unconfigured mailer or a transport failure
/// is logged, never fatal to the sweep.
async fn notify(state: &AppState, to_email: &str, notification: &Notification) {
    let Some(mailer) = &state.mailer else {
        tracing::debug!(to = to_email, "Mailer not configured, skipping notification");
        return;
    };
    if let Err(e) = mailer.deliver(to_email, notification).await {
        tracing::warn!(to = to_email, error = %e, "Notification delivery failed");
    }
}
