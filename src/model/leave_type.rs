use serde::{Deserialize, Serialize};

/// Casual leave: Sundays and holidays inside the range are not charged.
pub const CASUAL_LEAVE: &str = "CL";
/// Leave without pay: may drive the balance below zero.
pub const LEAVE_WITHOUT_PAY: &str = "LWP";

/// Leave type as far as day counting is concerned, identified by its short
/// code (`CL`, `LWP`, `STL`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct LeaveTypeRule {
    code: String,
}

impl LeaveTypeRule {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.trim().to_uppercase(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn is_blank(&self) -> bool {
        self.code.is_empty()
    }

    pub fn excludes_non_working_days(&self) -> bool {
        self.code == CASUAL_LEAVE
    }

    pub fn blocks_negative_balance(&self) -> bool {
        self.code != LEAVE_WITHOUT_PAY
    }
}

impl From<String> for LeaveTypeRule {
    fn from(code: String) -> Self {
        Self::new(&code)
    }
}

impl From<LeaveTypeRule> for String {
    fn from(rule: LeaveTypeRule) -> Self {
        rule.code
    }
}
