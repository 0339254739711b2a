pub mod attendance;
pub mod leave_calculation;
pub mod leave_form;
pub mod short_leave;
