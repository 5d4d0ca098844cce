use crate::{
    common::{error::LedgerError, event::Participant, money::Money},
    domain::{
        allocator::SplitAllocator,
        expense::{ExpenseId, NewExpense, Split},
        ledger::Ledger,
        member::{Member, MemberId},
    },
};

pub fn handle(
    ledger: &mut Ledger,
    id: ExpenseId,
    title: String,
    payer: MemberId,
    amount: Money,
    participants: &[Participant],
) -> Result<ExpenseId, LedgerError> {
    // The allocator drops unknown ids silently; an imported row naming one is a mistake.
    if let Some(unknown) = participants
        .iter()
        .find(|p| ledger.member(&p.member).is_none())
    {
        return Err(LedgerError::UnknownMember(unknown.member.clone()));
    }

    let splits = allocate(ledger.members(), amount, participants);
    ledger.add_expense(NewExpense::new(title, amount, payer, splits).with_id(id))
}

/// Runs the split allocator the way the expense form drives it: start with
/// everyone, remove whoever is not taking part, then commit each typed
/// percentage in order.
pub fn allocate(members: &[Member], total: Money, participants: &[Participant]) -> Vec<Split> {
    let mut allocator = SplitAllocator::new(members.iter().map(|m| m.id.clone()).collect(), total);

    if !participants.is_empty() {
        for member in members {
            if !participants.iter().any(|p| p.member == member.id) {
                allocator = allocator.remove(&member.id);
            }
        }
    }

    for participant in participants {
        if let Some(text) = &participant.percentage {
            allocator = allocator.commit(&participant.member, text);
        }
    }

    allocator.into_splits()
}
