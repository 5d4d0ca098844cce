use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "roomie-ledger")]
#[command(about = "Replays a household expense ledger and prints who owes whom")]
pub struct Cli {
    /// Ledger rows: `type,id,name,payer,amount,detail`
    #[arg(value_name = "LEDGER_CSV")]
    pub input: PathBuf,

    /// Which report to print
    #[arg(short, long, value_enum, default_value_t = Report::All)]
    pub report: Report,

    /// Stop at the first row the ledger rejects instead of skipping it
    #[arg(long)]
    pub strict: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Report {
    /// Net balance per member
    Balances,
    /// Suggested payments
    Transfers,
    /// Balances, a blank line, then transfers
    All,
}
