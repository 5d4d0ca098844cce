use crate::{
    common::error::LedgerError,
    domain::{
        ledger::Ledger,
        member::{DEFAULT_COLOR, Member, MemberId},
    },
};

pub fn add(
    ledger: &mut Ledger,
    id: MemberId,
    name: String,
    color: Option<String>,
) -> Result<(), LedgerError> {
    let color = color
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_COLOR.to_string());
    ledger.insert_member(Member { id, name, color })
}

pub fn delete(ledger: &mut Ledger, id: &MemberId) -> Result<(), LedgerError> {
    ledger.delete_member(id)
}
