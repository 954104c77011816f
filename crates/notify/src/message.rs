//! Notification messages rendered to subject and plain-text body.

use siteforge_core::lifecycle::{ReminderMilestone, Urgency, GRACE_PERIOD_DAYS};

/// Every notification the engine sends to a project owner.
#[derive(Debug, Clone)]
pub enum Notification {
    /// A cancellation grace-period reminder at one milestone.
    CancellationReminder {
        milestone: ReminderMilestone,
        days_since_cancellation: i64,
    },
    /// The grace period elapsed and the project was permanently deleted.
    DeletionConfirmed,
    /// Nudge for a draft project whose site was never generated.
    DraftNurture,
}

impl Notification {
    /// Email subject line.
    pub fn subject(&self) -> String {
        match self {
            Self::CancellationReminder { milestone, .. } => match milestone.urgency {
                Urgency::Notice => "A reminder about your cancelled website".to_string(),
                Urgency::Warning => "Your cancelled website will be deleted".to_string(),
                Urgency::Final => "Final notice: your website is about to be deleted".to_string(),
            },
            Self::DeletionConfirmed => "Your website has been deleted".to_string(),
            Self::DraftNurture => "Your website is one step from going live".to_string(),
        }
    }

    /// Plain-text body.
    pub fn body(&self) -> String {
        match self {
            Self::CancellationReminder {
                milestone,
                days_since_cancellation,
            } => {
                let days_left = (GRACE_PERIOD_DAYS - days_since_cancellation).max(0);
                format!(
                    "It has been {} ({} days) since your subscription ended.\n\n\
                     Your website and its content will be permanently deleted in \
                     {days_left} days. Reactivate your subscription at any time \
                     before then to keep everything exactly as you left it.",
                    milestone.label, days_since_cancellation
                )
            }
            Self::DeletionConfirmed => format!(
                "The {GRACE_PERIOD_DAYS}-day retention period after your \
                 cancellation has ended. Your website, media, and billing \
                 history have been permanently deleted.\n\n\
                 You are welcome back any time -- a new subscription starts a \
                 fresh project."
            ),
            Self::DraftNurture => "You described your business but have not \
                 generated your website yet. It takes one click -- come back \
                 and see what it looks like."
                .to_string(),
        }
    }
}
