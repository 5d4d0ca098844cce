pub mod expense;
pub mod member;
pub mod settlement;
