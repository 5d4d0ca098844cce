pub mod allocator;
pub mod balance;
pub mod expense;
pub mod ledger;
pub mod member;
pub mod settlement;
