//! Attendance calendar derivation.

pub mod dates;
pub mod display;
pub mod generator;
pub mod summary;

pub use generator::generate_monthly_calendar;
pub use summary::calculate_attendance_summary;
