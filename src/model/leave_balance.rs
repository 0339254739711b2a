use rust_decimal::Decimal;

use crate::errors::Rejection;
use crate::model::leave_type::LeaveTypeRule;

/// Balance of one leave type while a form is being filled in.
///
/// `allocated` comes from the employee's leave balance when the form opens;
/// `charged` follows every date or portion change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveBalanceState {
    allocated: Decimal,
    charged: Decimal,
}

impl LeaveBalanceState {
    pub fn new(allocated: Decimal) -> Self {
        Self {
            allocated,
            charged: Decimal::ZERO,
        }
    }

    pub fn allocated(&self) -> Decimal {
        self.allocated
    }

    pub fn charged(&self) -> Decimal {
        self.charged
    }

    pub fn remaining(&self) -> Decimal {
        self.allocated - self.charged
    }

    /// Commits `chargeable` as the charged amount unless the rule forbids
    /// the resulting negative balance. On rejection the previous charge stays.
    pub fn charge(&mut self, chargeable: Decimal, rule: &LeaveTypeRule) -> Result<Decimal, Rejection> {
        let remaining = self.allocated - chargeable;
        if rule.blocks_negative_balance() && remaining < Decimal::ZERO {
            return Err(Rejection::InsufficientBalance);
        }
        self.charged = chargeable;
        Ok(remaining)
    }

    pub fn reset(&mut self) {
        self.charged = Decimal::ZERO;
    }
}
