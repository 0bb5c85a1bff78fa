pub mod attendance;
pub mod leave_balance;
