use std::{borrow::Cow, fmt};

use chrono::{DateTime, Utc};

use crate::{
    common::money::{Money, Percentage},
    domain::member::MemberId,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpenseId(String);

impl ExpenseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExpenseId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One member's share of an expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub member: MemberId,
    /// Amount owed by `member`.
    pub amount: Money,
    pub percentage: Percentage,
}

impl Split {
    pub fn new(member: impl Into<MemberId>, amount: Money, percentage: Percentage) -> Self {
        Self {
            member: member.into(),
            amount,
            percentage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseKind {
    /// A shared cost divided among the split members.
    Expense { splits: Vec<Split> },
    /// A payment from the payer to `to`. It always carries exactly one split
    /// crediting `to` with the full amount, so there is nothing to store.
    Settlement { to: MemberId },
}

/// An entry of the append-only expense log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expense {
    pub id: ExpenseId,
    pub title: String,
    pub amount: Money,
    pub description: String,
    pub payer: MemberId,
    pub date: DateTime<Utc>,
    /// Receipt or payment voucher reference.
    pub receipt: Option<String>,
    pub kind: ExpenseKind,
}

impl Expense {
    pub fn is_settlement(&self) -> bool {
        matches!(self.kind, ExpenseKind::Settlement { .. })
    }

    /// The splits this record debits. A settlement yields its single
    /// 100% split to the recipient.
    pub fn splits(&self) -> Cow<'_, [Split]> {
        match &self.kind {
            ExpenseKind::Expense { splits } => Cow::Borrowed(splits),
            ExpenseKind::Settlement { to } => Cow::Owned(vec![Split::new(
                to.clone(),
                self.amount,
                Percentage::FULL,
            )]),
        }
    }
}

/// The caller-provided part of an expense; the ledger assigns the rest.
#[derive(Debug, Clone)]
pub struct NewExpense {
    /// Caller-chosen id, e.g. when replaying an imported log. Generated when absent.
    pub id: Option<ExpenseId>,
    pub title: String,
    pub amount: Money,
    pub description: String,
    pub payer: MemberId,
    pub splits: Vec<Split>,
    pub receipt: Option<String>,
}

impl NewExpense {
    pub fn new(
        title: impl Into<String>,
        amount: Money,
        payer: impl Into<MemberId>,
        splits: Vec<Split>,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            amount,
            description: String::new(),
            payer: payer.into(),
            splits,
            receipt: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<ExpenseId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_receipt(mut self, receipt: impl Into<String>) -> Self {
        self.receipt = Some(receipt.into());
        self
    }
}
