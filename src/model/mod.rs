pub mod attendance;
pub mod employee;
pub mod payroll;
pub mod period;
pub mod role;
pub mod user;
