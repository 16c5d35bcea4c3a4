//! Order intents — what a decision policy wants to do, before sizing.

use serde::{Deserialize, Serialize};

/// What action the policy wants to take. Quantity is resolved later by the
/// position sizer; an intent carries direction and a reason only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntentAction {
    /// Open or extend a long leg.
    EnterLong,
    /// Open or extend a short leg.
    EnterShort,
    /// Close the open leg entirely.
    Exit,
}

/// Order intent emitted by a decision policy.
///
/// The reason string travels onto the resulting trade record (entry reason for
/// entries, exit reason for closes) for post-run inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderIntent {
    pub action: IntentAction,
    pub reason: String,
}

impl OrderIntent {
    pub fn enter_long(reason: impl Into<String>) -> Self {
        Self {
            action: IntentAction::EnterLong,
            reason: reason.into(),
        }
    }

    pub fn enter_short(reason: impl Into<String>) -> Self {
        Self {
            action: IntentAction::EnterShort,
            reason: reason.into(),
        }
    }

    pub fn exit(reason: impl Into<String>) -> Self {
        Self {
            action: IntentAction::Exit,
            reason: reason.into(),
        }
    }
}
