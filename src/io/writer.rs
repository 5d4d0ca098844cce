use std::io::Write;

use crate::domain::{
    balance::{BalanceStatus, Balances},
    ledger::Ledger,
    settlement::Transfer,
};

#[derive(serde::Serialize)]
/// Internal CSV output row for the balance report.
///
/// Headers written (in this order): `member,name,balance,status`.
struct BalanceRow<'a> {
    member: &'a str,
    name: &'a str,
    balance: String,
    status: String,
}

#[derive(serde::Serialize)]
/// Internal CSV output row for the settle-up plan.
///
/// Headers written (in this order): `from,to,amount`.
struct TransferRow<'a> {
    from: &'a str,
    to: &'a str,
    amount: String,
}

/// Writes every member's balance to a CSV writer.
///
/// Rows follow the balance order, which is the member-list order. Monetary
/// fields are formatted with exactly 2 decimal places; names come from the
/// ledger (`Unknown` for ids it no longer holds).
///
/// # Errors
///
/// Returns a `csv::Error` if writing/serializing any row fails.
///
/// # Examples
///
/// ```
/// use roomie_ledger::domain::ledger::Ledger;
/// use roomie_ledger::domain::member::Member;
/// use roomie_ledger::io::writer::write_balances;
///
/// let mut ledger = Ledger::new();
/// ledger.insert_member(Member::new("a", "Ana", "#0ea5e9")).unwrap();
///
/// let mut out = Vec::new();
/// write_balances(&mut out, &ledger, &ledger.balances()).unwrap();
///
/// let s = String::from_utf8(out).unwrap();
/// assert_eq!(s, "member,name,balance,status\na,Ana,0.00,Settled\n");
/// ```
pub fn write_balances<W: Write>(
    writer: W,
    ledger: &Ledger,
    balances: &Balances,
) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    for (member, balance) in balances.iter() {
        wtr.serialize(BalanceRow {
            member: member.as_str(),
            name: ledger.member_name(member),
            balance: balance.to_string_2dp(),
            status: BalanceStatus::of(balance).label(),
        })?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes the settle-up plan to a CSV writer, in the order it was produced.
///
/// # Errors
///
/// Returns a `csv::Error` if writing/serializing any row fails.
pub fn write_transfers<W: Write>(writer: W, transfers: &[Transfer]) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    // Written by hand so that an empty plan still has its header.
    wtr.write_record(["from", "to", "amount"])?;
    for transfer in transfers {
        wtr.serialize(TransferRow {
            from: transfer.from.as_str(),
            to: transfer.to.as_str(),
            amount: transfer.amount.to_string_2dp(),
        })?;
    }

    wtr.flush()?;
    Ok(())
}
