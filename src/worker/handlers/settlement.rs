use crate::{
    common::{error::LedgerError, money::Money},
    domain::{expense::ExpenseId, ledger::Ledger, member::MemberId},
};

pub fn handle(
    ledger: &mut Ledger,
    id: ExpenseId,
    title: Option<String>,
    from: &MemberId,
    to: &MemberId,
    amount: Money,
) -> Result<ExpenseId, LedgerError> {
    let title = title.filter(|t| !t.trim().is_empty());
    ledger.record_settlement(Some(id), title, from, to, amount, None)
}
