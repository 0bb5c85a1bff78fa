pub mod accrual;
pub mod filter;
pub mod range;
