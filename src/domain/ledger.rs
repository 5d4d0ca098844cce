use chrono::Utc;
use tracing::{debug, info};

use crate::{
    common::{error::LedgerError, money::Money},
    domain::{
        balance::{Balances, compute_balances},
        expense::{Expense, ExpenseId, ExpenseKind, NewExpense, Split},
        member::{FALLBACK_COLOR, Member, MemberId, UNKNOWN_NAME},
        settlement::{Transfer, simplify_debts},
    },
};

/// Upper bound on the sum of every amount in the log, in `Money` units. Every
/// balance and every intermediate sum over the log stays within `i64`.
const MAX_LOG_VOLUME: i64 = i64::MAX / 4;

/// Which records an activity listing shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KindFilter {
    #[default]
    All,
    Expenses,
    Settlements,
}

#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub kind: KindFilter,
    /// Case-insensitive match against the title or the payer's name.
    pub search: String,
}

/// Members plus the append-only expense log.
///
/// Balances and debts are never stored; every read recomputes them from the
/// whole log.
#[derive(Debug, Default)]
pub struct Ledger {
    members: Vec<Member>,
    expenses: Vec<Expense>,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            expenses: Vec::new(),
        }
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn member(&self, id: &MemberId) -> Option<&Member> {
        self.members.iter().find(|m| m.id == *id)
    }

    pub fn add_member(&mut self, name: impl Into<String>, color: impl Into<String>) -> MemberId {
        let member = Member::new(MemberId::new(uuid::Uuid::new_v4().to_string()), name, color);
        let id = member.id.clone();
        info!(member = %id, name = %member.name, "member added");
        self.members.push(member);
        id
    }

    /// Adds a member under a caller-chosen id.
    pub fn insert_member(&mut self, member: Member) -> Result<(), LedgerError> {
        if self.member(&member.id).is_some() {
            return Err(LedgerError::DuplicateMember(member.id));
        }
        info!(member = %member.id, name = %member.name, "member added");
        self.members.push(member);
        Ok(())
    }

    pub fn update_member(
        &mut self,
        id: &MemberId,
        name: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<(), LedgerError> {
        let member = self
            .members
            .iter_mut()
            .find(|m| m.id == *id)
            .ok_or_else(|| LedgerError::UnknownMember(id.clone()))?;
        member.name = name.into();
        member.color = color.into();
        debug!(member = %id, "member updated");
        Ok(())
    }

    /// Removes a member whose balance is zero to within a cent.
    pub fn delete_member(&mut self, id: &MemberId) -> Result<(), LedgerError> {
        if self.member(id).is_none() {
            return Err(LedgerError::UnknownMember(id.clone()));
        }
        let balance = self.balances().get(id);
        if balance.abs() > Money::cent() {
            return Err(LedgerError::OutstandingBalance {
                member: id.clone(),
                balance,
            });
        }
        self.members.retain(|m| m.id != *id);
        info!(member = %id, "member deleted");
        Ok(())
    }

    /// Validates and appends an expense.
    ///
    /// The payer and every split member must be known and the splits must add
    /// up to the amount. A shortfall or excess of at most one cent per split is
    /// rounding drift and is folded into the largest split; anything larger is
    /// rejected.
    pub fn add_expense(&mut self, new: NewExpense) -> Result<ExpenseId, LedgerError> {
        let id = self.claim_id(new.id)?;
        if !new.amount.is_positive() {
            return Err(LedgerError::NonPositiveAmount(new.amount));
        }
        self.ensure_member(&new.payer)?;
        if new.splits.is_empty() {
            return Err(LedgerError::EmptySplits);
        }
        for split in &new.splits {
            self.ensure_member(&split.member)?;
            if split.amount.is_negative() {
                return Err(LedgerError::NegativeSplit(split.member.clone()));
            }
        }
        self.ensure_capacity(new.amount)?;
        let splits = reconcile_splits(new.amount, new.splits)?;

        debug!(expense = %id, payer = %new.payer, amount = %new.amount, "expense recorded");
        self.expenses.push(Expense {
            id: id.clone(),
            title: new.title,
            amount: new.amount,
            description: new.description,
            payer: new.payer,
            date: Utc::now(),
            receipt: new.receipt,
            kind: ExpenseKind::Expense { splits },
        });
        Ok(id)
    }

    /// Records that `from` paid `to`, as a settlement entry.
    pub fn settle_debt(
        &mut self,
        from: &MemberId,
        to: &MemberId,
        amount: Money,
        voucher: Option<String>,
    ) -> Result<ExpenseId, LedgerError> {
        self.record_settlement(None, None, from, to, amount, voucher)
    }

    /// Accepts a suggested transfer as-is.
    pub fn accept_transfer(&mut self, transfer: &Transfer) -> Result<ExpenseId, LedgerError> {
        self.settle_debt(&transfer.from, &transfer.to, transfer.amount, None)
    }

    /// Like [`Ledger::settle_debt`], with an optional caller-chosen id and title.
    pub fn record_settlement(
        &mut self,
        id: Option<ExpenseId>,
        title: Option<String>,
        from: &MemberId,
        to: &MemberId,
        amount: Money,
        voucher: Option<String>,
    ) -> Result<ExpenseId, LedgerError> {
        let id = self.claim_id(id)?;
        if !amount.is_positive() {
            return Err(LedgerError::NonPositiveAmount(amount));
        }
        self.ensure_member(from)?;
        self.ensure_member(to)?;
        if from == to {
            return Err(LedgerError::SelfSettlement(from.clone()));
        }
        self.ensure_capacity(amount)?;

        let title = title.unwrap_or_else(|| {
            format!(
                "Payment: {} -> {}",
                self.member_name(from),
                self.member_name(to)
            )
        });
        info!(from = %from, to = %to, amount = %amount, "debt settled");
        self.expenses.push(Expense {
            id: id.clone(),
            title,
            amount,
            description: "Debt settlement".to_string(),
            payer: from.clone(),
            date: Utc::now(),
            receipt: voucher,
            kind: ExpenseKind::Settlement { to: to.clone() },
        });
        Ok(id)
    }

    pub fn balances(&self) -> Balances {
        compute_balances(&self.members, &self.expenses)
    }

    pub fn simplified_debts(&self) -> Vec<Transfer> {
        simplify_debts(&self.balances())
    }

    pub fn member_name(&self, id: &MemberId) -> &str {
        self.member(id).map(|m| m.name.as_str()).unwrap_or(UNKNOWN_NAME)
    }

    pub fn member_color(&self, id: &MemberId) -> &str {
        self.member(id)
            .map(|m| m.color.as_str())
            .unwrap_or(FALLBACK_COLOR)
    }

    /// Total of all shared expenses; settlements only move money around.
    pub fn total_spent(&self) -> Money {
        self.expenses
            .iter()
            .filter(|e| !e.is_settlement())
            .map(|e| e.amount)
            .sum()
    }

    /// Records newest first (reverse log order), narrowed by kind and search text.
    pub fn activity(&self, filter: &ActivityFilter) -> Vec<&Expense> {
        self.expenses
            .iter()
            .rev()
            .filter(|e| match filter.kind {
                KindFilter::All => true,
                KindFilter::Expenses => !e.is_settlement(),
                KindFilter::Settlements => e.is_settlement(),
            })
            .filter(|e| self.matches_search(e, &filter.search))
            .collect()
    }

    /// Settlements matching `search`, newest first.
    pub fn settlement_history(&self, search: &str) -> Vec<&Expense> {
        let mut settlements = self.activity(&ActivityFilter {
            kind: KindFilter::Settlements,
            search: search.to_string(),
        });
        // Stable: settlements recorded at the same instant keep reverse log order.
        settlements.sort_by(|a, b| b.date.cmp(&a.date));
        settlements
    }

    fn matches_search(&self, expense: &Expense, search: &str) -> bool {
        let needle = search.to_lowercase();
        expense.title.to_lowercase().contains(&needle)
            || self
                .member_name(&expense.payer)
                .to_lowercase()
                .contains(&needle)
    }

    fn ensure_member(&self, id: &MemberId) -> Result<(), LedgerError> {
        match self.member(id) {
            Some(_) => Ok(()),
            None => Err(LedgerError::UnknownMember(id.clone())),
        }
    }

    fn ensure_capacity(&self, amount: Money) -> Result<(), LedgerError> {
        let volume = self
            .expenses
            .iter()
            .try_fold(amount, |acc, e| acc.checked_add(e.amount));
        match volume {
            Some(v) if v <= Money::new(MAX_LOG_VOLUME) => Ok(()),
            _ => Err(LedgerError::AmountOutOfRange(amount)),
        }
    }

    fn claim_id(&self, id: Option<ExpenseId>) -> Result<ExpenseId, LedgerError> {
        match id {
            Some(id) if self.expenses.iter().any(|e| e.id == id) => {
                Err(LedgerError::DuplicateExpense(id))
            }
            Some(id) => Ok(id),
            None => Ok(ExpenseId::generate()),
        }
    }
}

/// Makes the splits add up to `total` exactly, or rejects them.
fn reconcile_splits(total: Money, mut splits: Vec<Split>) -> Result<Vec<Split>, LedgerError> {
    let split_sum = splits
        .iter()
        .try_fold(Money::zero(), |acc, s| acc.checked_add(s.amount))
        .ok_or(LedgerError::AmountOutOfRange(total))?;
    let drift = total
        .checked_sub(split_sum)
        .ok_or(LedgerError::AmountOutOfRange(total))?;
    if drift.is_zero() {
        return Ok(splits);
    }

    let tolerance = Money::new(Money::cent().as_i64() * splits.len() as i64);
    if drift.abs() > tolerance {
        return Err(LedgerError::SplitMismatch {
            total,
            splits: split_sum,
        });
    }

    // First of the largest shares absorbs the drift.
    let largest = splits
        .iter()
        .enumerate()
        .rev()
        .max_by_key(|(_, s)| s.amount)
        .map(|(i, _)| i);
    if let Some(i) = largest {
        debug!(drift = %drift, member = %splits[i].member, "split drift absorbed");
        splits[i].amount += drift;
    }
    Ok(splits)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::common::money::Percentage;

    fn money(s: &str) -> Money {
        Money::from_str(s).unwrap()
    }

    fn trio() -> Ledger {
        let mut ledger = Ledger::new();
        for (id, name) in [("a", "Ana"), ("b", "Ben"), ("c", "Cy")] {
            ledger
                .insert_member(Member::new(id, name, "#0ea5e9"))
                .unwrap();
        }
        ledger
    }

    fn split(member: &str, amount: &str) -> Split {
        Split::new(member, money(amount), Percentage::ZERO)
    }

    fn even_groceries() -> NewExpense {
        NewExpense::new(
            "Groceries",
            money("90"),
            "a",
            vec![split("a", "30"), split("b", "30"), split("c", "30")],
        )
    }

    #[test]
    fn add_member_generates_unique_ids() {
        let mut ledger = Ledger::new();
        let first = ledger.add_member("Me", "#0ea5e9");
        let second = ledger.add_member("You", "#ff0000");

        assert_ne!(first, second);
        assert_eq!(ledger.member_name(&first), "Me");
        assert_eq!(ledger.member_color(&second), "#ff0000");
    }

    #[test]
    fn insert_member_rejects_duplicate_id() {
        let mut ledger = trio();
        let err = ledger
            .insert_member(Member::new("a", "Again", "#000000"))
            .unwrap_err();
        assert_eq!(err, LedgerError::DuplicateMember("a".into()));
        assert_eq!(ledger.members().len(), 3);
    }

    #[test]
    fn update_member_renames_and_recolors() {
        let mut ledger = trio();
        ledger.update_member(&"b".into(), "Benny", "#123456").unwrap();

        assert_eq!(ledger.member_name(&"b".into()), "Benny");
        assert_eq!(ledger.member_color(&"b".into()), "#123456");
        assert!(matches!(
            ledger.update_member(&"z".into(), "Zed", "#000000"),
            Err(LedgerError::UnknownMember(_))
        ));
    }

    #[test]
    fn unknown_ids_fall_back_for_display() {
        let ledger = trio();
        assert_eq!(ledger.member_name(&"ghost".into()), UNKNOWN_NAME);
        assert_eq!(ledger.member_color(&"ghost".into()), FALLBACK_COLOR);
    }

    #[test]
    fn expense_updates_balances_and_debts() {
        let mut ledger = trio();
        ledger.add_expense(even_groceries()).unwrap();

        let balances = ledger.balances();
        assert_eq!(balances.get(&"a".into()), money("60"));
        assert_eq!(balances.get(&"b".into()), money("-30"));

        let debts = ledger.simplified_debts();
        assert_eq!(debts.len(), 2);
        assert_eq!(debts[0].from, MemberId::new("b"));
        assert_eq!(debts[0].to, MemberId::new("a"));
        assert_eq!(debts[0].amount, money("30"));
    }

    #[test]
    fn delete_member_rejected_while_balance_outstanding() {
        let mut ledger = trio();
        ledger.add_expense(even_groceries()).unwrap();

        let err = ledger.delete_member(&"b".into()).unwrap_err();
        assert_eq!(
            err,
            LedgerError::OutstandingBalance {
                member: "b".into(),
                balance: money("-30"),
            }
        );
        assert!(err.to_string().contains("settle debts first"));
        assert_eq!(ledger.members().len(), 3);

        ledger
            .settle_debt(&"b".into(), &"a".into(), money("30"), None)
            .unwrap();
        ledger.delete_member(&"b".into()).unwrap();
        assert_eq!(ledger.members().len(), 2);
        assert!(ledger.member(&"b".into()).is_none());
    }

    #[test]
    fn delete_member_allows_sub_cent_balance() {
        let mut ledger = trio();
        ledger
            .add_expense(NewExpense::new(
                "Gum",
                money("0.01"),
                "a",
                vec![split("b", "0.01")],
            ))
            .unwrap();

        ledger.delete_member(&"b".into()).unwrap();
    }

    #[test]
    fn expense_validation() {
        let mut ledger = trio();

        let unknown_payer = NewExpense::new("x", money("10"), "z", vec![split("a", "10")]);
        assert_eq!(
            ledger.add_expense(unknown_payer),
            Err(LedgerError::UnknownMember("z".into()))
        );

        let unknown_split = NewExpense::new("x", money("10"), "a", vec![split("z", "10")]);
        assert_eq!(
            ledger.add_expense(unknown_split),
            Err(LedgerError::UnknownMember("z".into()))
        );

        let zero = NewExpense::new("x", Money::zero(), "a", vec![split("a", "0")]);
        assert_eq!(
            ledger.add_expense(zero),
            Err(LedgerError::NonPositiveAmount(Money::zero()))
        );

        let negative = NewExpense::new(
            "x",
            money("10"),
            "a",
            vec![split("a", "20"), split("b", "-10")],
        );
        assert_eq!(
            ledger.add_expense(negative),
            Err(LedgerError::NegativeSplit("b".into()))
        );

        let empty = NewExpense::new("x", money("10"), "a", Vec::new());
        assert_eq!(ledger.add_expense(empty), Err(LedgerError::EmptySplits));

        let short = NewExpense::new("x", money("10"), "a", vec![split("a", "5")]);
        assert_eq!(
            ledger.add_expense(short),
            Err(LedgerError::SplitMismatch {
                total: money("10"),
                splits: money("5"),
            })
        );

        assert!(ledger.expenses().is_empty());
    }

    #[test]
    fn amounts_beyond_capacity_are_rejected() {
        let mut ledger = trio();

        let huge = NewExpense::new(
            "x",
            money("900000000000000"),
            "a",
            vec![split("b", "900000000000000")],
        );
        assert_eq!(
            ledger.add_expense(huge),
            Err(LedgerError::AmountOutOfRange(money("900000000000000")))
        );

        let large = || {
            NewExpense::new(
                "x",
                money("200000000000000"),
                "a",
                vec![split("b", "200000000000000")],
            )
        };
        ledger.add_expense(large()).unwrap();
        assert_eq!(
            ledger.add_expense(large()),
            Err(LedgerError::AmountOutOfRange(money("200000000000000")))
        );
        assert_eq!(
            ledger.settle_debt(&"b".into(), &"a".into(), money("200000000000000"), None),
            Err(LedgerError::AmountOutOfRange(money("200000000000000")))
        );

        let balances = ledger.balances();
        assert_eq!(balances.get(&"a".into()), money("200000000000000"));
        assert_eq!(balances.get(&"b".into()), money("-200000000000000"));
        assert_eq!(ledger.expenses().len(), 1);
    }

    #[test]
    fn overflowing_split_amounts_are_rejected() {
        let mut ledger = trio();
        let splits = vec![
            Split::new("a", Money::new(i64::MAX), Percentage::ZERO),
            Split::new("b", Money::new(i64::MAX), Percentage::ZERO),
        ];
        assert_eq!(
            ledger.add_expense(NewExpense::new("x", money("10"), "a", splits)),
            Err(LedgerError::AmountOutOfRange(money("10")))
        );
        assert!(ledger.expenses().is_empty());
    }

    #[test]
    fn rounding_drift_goes_to_largest_split() {
        let mut ledger = trio();
        let id = ledger
            .add_expense(NewExpense::new(
                "Internet",
                money("100"),
                "a",
                vec![split("a", "33.33"), split("b", "33.33"), split("c", "33.33")],
            ))
            .unwrap();

        let expense = ledger.expenses().iter().find(|e| e.id == id).unwrap();
        let amounts: Vec<Money> = expense.splits().iter().map(|s| s.amount).collect();
        assert_eq!(amounts, vec![money("33.34"), money("33.33"), money("33.33")]);
        assert!(ledger.balances().total().is_zero());
    }

    #[test]
    fn duplicate_expense_id_is_rejected() {
        let mut ledger = trio();
        ledger.add_expense(even_groceries().with_id("e1")).unwrap();

        assert_eq!(
            ledger.add_expense(even_groceries().with_id("e1")),
            Err(LedgerError::DuplicateExpense("e1".into()))
        );
        assert_eq!(ledger.expenses().len(), 1);
    }

    #[test]
    fn settlement_record_shape() {
        let mut ledger = trio();
        let id = ledger
            .settle_debt(
                &"b".into(),
                &"a".into(),
                money("30"),
                Some("voucher.png".to_string()),
            )
            .unwrap();

        let record = ledger.expenses().iter().find(|e| e.id == id).unwrap();
        assert_eq!(record.title, "Payment: Ben -> Ana");
        assert_eq!(record.description, "Debt settlement");
        assert_eq!(record.payer, MemberId::new("b"));
        assert_eq!(record.receipt.as_deref(), Some("voucher.png"));
        let splits = record.splits();
        assert_eq!(splits.len(), 1);
        assert_eq!(splits[0].member, MemberId::new("a"));
        assert_eq!(splits[0].percentage, Percentage::FULL);
    }

    #[test]
    fn settlement_validation() {
        let mut ledger = trio();
        assert_eq!(
            ledger.settle_debt(&"a".into(), &"a".into(), money("1"), None),
            Err(LedgerError::SelfSettlement("a".into()))
        );
        assert_eq!(
            ledger.settle_debt(&"a".into(), &"z".into(), money("1"), None),
            Err(LedgerError::UnknownMember("z".into()))
        );
        assert_eq!(
            ledger.settle_debt(&"a".into(), &"b".into(), money("-1"), None),
            Err(LedgerError::NonPositiveAmount(money("-1")))
        );
    }

    #[test]
    fn accepting_every_transfer_settles_the_ledger() {
        let mut ledger = trio();
        ledger.add_expense(even_groceries()).unwrap();
        ledger
            .add_expense(NewExpense::new(
                "Power",
                money("45"),
                "b",
                vec![split("a", "15"), split("c", "30")],
            ))
            .unwrap();

        for transfer in ledger.simplified_debts() {
            ledger.accept_transfer(&transfer).unwrap();
        }

        assert!(ledger.simplified_debts().is_empty());
        assert!(ledger.balances().iter().all(|(_, b)| b.is_zero()));
    }

    #[test]
    fn queries_over_the_log() {
        let mut ledger = trio();
        ledger.add_expense(even_groceries()).unwrap();
        ledger
            .add_expense(NewExpense::new(
                "Rent",
                money("300"),
                "c",
                vec![split("a", "100"), split("b", "100"), split("c", "100")],
            ))
            .unwrap();
        ledger
            .settle_debt(&"b".into(), &"a".into(), money("10"), None)
            .unwrap();
        ledger
            .settle_debt(&"b".into(), &"c".into(), money("20"), None)
            .unwrap();

        assert_eq!(ledger.total_spent(), money("390"));

        let all = ledger.activity(&ActivityFilter::default());
        let titles: Vec<&str> = all.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Payment: Ben -> Cy", "Payment: Ben -> Ana", "Rent", "Groceries"]
        );

        let expenses = ledger.activity(&ActivityFilter {
            kind: KindFilter::Expenses,
            search: String::new(),
        });
        assert_eq!(expenses.len(), 2);

        let by_payer = ledger.activity(&ActivityFilter {
            kind: KindFilter::Expenses,
            search: "CY".to_string(),
        });
        assert_eq!(by_payer.len(), 1);
        assert_eq!(by_payer[0].title, "Rent");

        let by_title = ledger.activity(&ActivityFilter {
            kind: KindFilter::All,
            search: "payment".to_string(),
        });
        assert_eq!(by_title.len(), 2);

        let history = ledger.settlement_history("");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].amount, money("20"));
        assert_eq!(history[1].amount, money("10"));

        assert_eq!(ledger.settlement_history("cy").len(), 1);
    }
}
