//! Token ledger pricing and plan grants.
//!
//! The ledger's atomicity lives in the repository layer (a single
//! conditional UPDATE per debit); this module holds the fixed pricing,
//! plan grants, and the outcome type handed back to callers.

use serde::{Deserialize, Serialize};

/// Fixed price of one AI edit, in tokens. Not dynamic per request.
pub const EDIT_TOKEN_COST: i64 = 50;

/// Outcome of a debit attempt against a project's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitOutcome {
    /// The debit applied; `remaining` is the balance after the decrement.
    Applied { remaining: i64 },
    /// The balance was too low. Nothing was decremented and no external
    /// call may be made. Both figures are returned for display.
    Insufficient { required: i64, balance: i64 },
}

/// Subscription plan assigned by the payment collaborator at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    Starter,
    Standard,
    Pro,
}

impl Plan {
    /// Tokens granted when a subscription of this plan is purchased.
    pub fn initial_token_grant(self) -> i64 {
        match self {
            Self::Starter => 100,
            Self::Standard => 500,
            Self::Pro => 2000,
        }
    }

    /// String representation for storage and logging.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starter => "starter",
            Self::Standard => "standard",
            Self::Pro => "pro",
        }
    }

    /// Parse the stored representation.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "starter" => Some(Self::Starter),
            "standard" => Some(Self::Standard),
            "pro" => Some(Self::Pro),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_roundtrip() {
        for plan in [Plan::Starter, Plan::Standard, Plan::Pro] {
            assert_eq!(Plan::parse(plan.as_str()), Some(plan));
        }
        assert_eq!(Plan::parse("enterprise"), None);
    }

    #[test]
    fn grants_scale_with_plan() {
        assert!(Plan::Starter.initial_token_grant() < Plan::Standard.initial_token_grant());
        assert!(Plan::Standard.initial_token_grant() < Plan::Pro.initial_token_grant());
    }

    #[test]
    fn starter_grant_covers_at_least_one_edit() {
        assert!(Plan::Starter.initial_token_grant() >= EDIT_TOKEN_COST);
    }
}
