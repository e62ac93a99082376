pub mod balance;
pub mod leave;
