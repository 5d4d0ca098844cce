//! Household expense ledger: per-member balances, debt simplification and an
//! interactive percentage split allocator.

pub mod app;
pub mod cli;
pub mod common;
pub mod domain;
pub mod io;
pub mod worker;
