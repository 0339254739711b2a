pub mod date_range;
pub mod day_portion;
pub mod form_state;
pub mod holiday;
pub mod leave_balance;
pub mod leave_type;
pub mod role;
