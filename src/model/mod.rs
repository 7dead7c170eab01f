pub mod calendar;
pub mod leave_record;
pub mod role;
