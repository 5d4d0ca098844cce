use crate::{
    common::money::Money,
    domain::{expense::ExpenseId, member::MemberId},
};

/// Rejections raised by the ledger store. None of them leave the ledger modified.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("unknown member: {0}")]
    UnknownMember(MemberId),
    #[error("member id already in use: {0}")]
    DuplicateMember(MemberId),
    #[error("expense id already in use: {0}")]
    DuplicateExpense(ExpenseId),
    #[error(
        "cannot delete member {member} with non-zero balance ({balance}). Please settle debts first."
    )]
    OutstandingBalance { member: MemberId, balance: Money },
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(Money),
    #[error("amount {0} would exceed what the ledger can hold")]
    AmountOutOfRange(Money),
    #[error("split for {0} has a negative amount")]
    NegativeSplit(MemberId),
    #[error("expense has no splits")]
    EmptySplits,
    #[error("splits add up to {splits} but the expense total is {total}")]
    SplitMismatch { total: Money, splits: Money },
    #[error("member {0} cannot settle a debt with themselves")]
    SelfSettlement(MemberId),
}

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}
