use indexmap::IndexMap;

use crate::{
    common::money::Money,
    domain::{
        expense::Expense,
        member::{Member, MemberId},
    },
};

/// Net position per member, in member-list order.
///
/// Positive means the member is owed money, negative means they owe.
/// Looking up an id that is not present yields zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Balances(IndexMap<MemberId, Money>);

impl Balances {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn get(&self, member: &MemberId) -> Money {
        self.0.get(member).copied().unwrap_or_default()
    }

    pub fn contains(&self, member: &MemberId) -> bool {
        self.0.contains_key(member)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MemberId, Money)> + '_ {
        self.0.iter().map(|(id, money)| (id, *money))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of every balance. Zero for a log whose splits add up to each total.
    pub fn total(&self) -> Money {
        self.0.values().sum()
    }

    fn adjust(&mut self, member: &MemberId, delta: Money) {
        if let Some(balance) = self.0.get_mut(member) {
            *balance += delta;
        }
    }
}

impl FromIterator<(MemberId, Money)> for Balances {
    fn from_iter<T: IntoIterator<Item = (MemberId, Money)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Derives every member's net balance from the full expense log.
///
/// Each record credits its payer with the whole amount and debits every split
/// member with their share; settlements go through the same rule. Ids that are
/// not in `members` are skipped without creating an entry.
pub fn compute_balances(members: &[Member], expenses: &[Expense]) -> Balances {
    let mut balances: Balances = members
        .iter()
        .map(|m| (m.id.clone(), Money::zero()))
        .collect();

    for expense in expenses {
        balances.adjust(&expense.payer, expense.amount);
        for split in expense.splits().iter() {
            balances.adjust(&split.member, -split.amount);
        }
    }

    balances
}

/// How a balance reads to the member it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceStatus {
    Owed(Money),
    Owes(Money),
    Settled,
}

impl BalanceStatus {
    pub fn of(balance: Money) -> Self {
        let rounded = balance.round_to_cents();
        if rounded.is_positive() {
            BalanceStatus::Owed(rounded)
        } else if rounded.is_negative() {
            BalanceStatus::Owes(rounded.abs())
        } else {
            BalanceStatus::Settled
        }
    }

    pub fn label(&self) -> String {
        match self {
            BalanceStatus::Owed(amount) => format!("Owed {amount}"),
            BalanceStatus::Owes(amount) => format!("Owes {amount}"),
            BalanceStatus::Settled => "Settled".to_string(),
        }
    }
}
