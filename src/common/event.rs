use crate::{
    common::money::Money,
    domain::{expense::ExpenseId, member::MemberId},
};

/// A ledger operation sent from the reader to the worker for processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    AddMember {
        id: MemberId,
        name: String,
        color: Option<String>,
    },
    DeleteMember {
        id: MemberId,
    },
    Expense {
        id: ExpenseId,
        title: String,
        payer: MemberId,
        amount: Money,
        /// Empty means every member takes part.
        participants: Vec<Participant>,
    },
    Settlement {
        id: ExpenseId,
        title: Option<String>,
        from: MemberId,
        to: MemberId,
        amount: Money,
    },
}

/// A member taking part in an expense, optionally with the percentage typed
/// for them. The text goes through the split allocator unvalidated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub member: MemberId,
    pub percentage: Option<String>,
}
