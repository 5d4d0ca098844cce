use crate::common::{
    event::{LedgerEvent, Participant},
    money::Money,
};
use std::{io::Read, str::FromStr};

#[derive(serde::Deserialize)]
/// Internal CSV row representation matching the input headers. Columns a row
/// type does not use stay empty.
struct CsvRow {
    #[serde(rename = "type")]
    kind: String,
    id: String,
    name: Option<String>,
    payer: Option<String>,
    amount: Option<String>,
    // splits for expenses, recipient for settlements, color for members
    detail: Option<String>,
}

/// Reads and validates ledger rows from a CSV reader.
///
/// Supported headers: `type,id,name,payer,amount,detail`.
/// Normalizes the `type` field to lowercase; errors include the row id.
///
/// | type         | name    | payer | amount   | detail                          |
/// |--------------|---------|-------|----------|---------------------------------|
/// | `member`     | name    |       |          | color (optional)                |
/// | `expense`    | title   | payer | required | `a;b=40;c` participants (opt.)  |
/// | `settlement` | title   | payer | required | recipient                       |
/// | `delete`     |         |       |          |                                 |
///
/// # Examples
///
/// ```
/// use roomie_ledger::io::reader::read_events;
/// use roomie_ledger::common::event::LedgerEvent;
/// use csv::ReaderBuilder;
///
/// let data = "type,id,name,payer,amount,detail\n\
/// member,a,Ana,,,\n\
/// expense,e1,Rent,a,90,\n";
/// let mut rdr = ReaderBuilder::new().from_reader(data.as_bytes());
/// let events: Vec<_> = read_events(&mut rdr).collect();
///
/// assert!(matches!(events[0], Ok(LedgerEvent::AddMember { .. })));
/// assert!(matches!(events[1], Ok(LedgerEvent::Expense { .. })));
/// ```
pub fn read_events<R: Read>(
    rdr: &mut csv::Reader<R>,
) -> impl Iterator<Item = Result<LedgerEvent, String>> + '_ {
    rdr.deserialize::<CsvRow>().map(|res| {
        let row = res.map_err(|e| e.to_string())?;
        let kind = row.kind.trim().to_ascii_lowercase();
        let id = row.id.trim().to_string();
        if id.is_empty() {
            return Err(format!("{kind} row is missing its id"));
        }

        match kind.as_str() {
            "member" => Ok(LedgerEvent::AddMember {
                name: non_empty(row.name).unwrap_or_else(|| id.clone()),
                color: non_empty(row.detail),
                id: id.as_str().into(),
            }),
            "delete" => Ok(LedgerEvent::DeleteMember {
                id: id.as_str().into(),
            }),
            "expense" => {
                let payer = non_empty(row.payer)
                    .ok_or_else(|| format!("expense {id} missing payer"))?;
                let amount = parse_amount(row.amount, "expense", &id)?;
                let participants = parse_participants(row.detail.as_deref().unwrap_or(""), &id)?;
                Ok(LedgerEvent::Expense {
                    title: non_empty(row.name).unwrap_or_default(),
                    payer: payer.as_str().into(),
                    amount,
                    participants,
                    id: id.as_str().into(),
                })
            }
            "settlement" => {
                let from = non_empty(row.payer)
                    .ok_or_else(|| format!("settlement {id} missing payer"))?;
                let to = non_empty(row.detail)
                    .ok_or_else(|| format!("settlement {id} missing recipient"))?;
                let amount = parse_amount(row.amount, "settlement", &id)?;
                Ok(LedgerEvent::Settlement {
                    title: non_empty(row.name),
                    from: from.as_str().into(),
                    to: to.as_str().into(),
                    amount,
                    id: id.as_str().into(),
                })
            }
            other => Err(format!("unknown row type: {other} for id {id}")),
        }
    })
}

fn non_empty(field: Option<String>) -> Option<String> {
    field
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
}

fn parse_amount(field: Option<String>, kind: &str, id: &str) -> Result<Money, String> {
    let amount = non_empty(field).ok_or_else(|| format!("{kind} {id} missing amount"))?;
    Money::from_str(&amount).map_err(|e| format!("{kind} {id} has invalid amount {amount}: {e}"))
}

/// `a;b=40;c` into participants. Percent text is passed on as typed.
fn parse_participants(detail: &str, id: &str) -> Result<Vec<Participant>, String> {
    detail
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (member, percentage) = match entry.split_once('=') {
                Some((member, pct)) => (member.trim(), Some(pct.trim().to_string())),
                None => (entry, None),
            };
            if member.is_empty() {
                return Err(format!("expense {id} has a split without a member: {entry}"));
            }
            Ok(Participant {
                member: member.into(),
                percentage,
            })
        })
        .collect()
}
