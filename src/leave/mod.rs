pub mod conversion;
pub mod ledger;
pub mod lifecycle;
pub mod tenure;
pub mod validate;
