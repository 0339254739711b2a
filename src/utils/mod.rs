pub mod attendance_calc;
pub mod form_sessions;
pub mod holiday_client;
pub mod leave_calculator;
