use std::io::{BufWriter, Read, Write, stdout};

use tracing::info;

use crate::{
    cli::{Cli, Report},
    common::error::AppError,
    domain::ledger::Ledger,
    io::{reader, writer},
    worker::processor::Processor,
};

pub fn run(cli: &Cli) -> Result<(), AppError> {
    let file = std::fs::File::open(&cli.input)?;
    let ledger = load_ledger(file, cli.strict)?;

    // After replaying every row, write the requested report to stdout
    let stdout = stdout();
    let writer = BufWriter::new(stdout.lock());
    write_report(writer, &ledger, cli.report)
}

/// Replays CSV ledger rows into a fresh [`Ledger`].
///
/// Malformed rows abort the replay. Rows the ledger rejects (say, deleting a
/// member who still owes money) are skipped unless `strict` is set.
pub fn load_ledger<R: Read>(input: R, strict: bool) -> Result<Ledger, AppError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);

    let mut ledger = Ledger::new();
    let mut processor = Processor::new();

    for event in reader::read_events(&mut rdr) {
        let event = event.map_err(AppError::Parse)?;
        if let Err(err) = processor.process(&mut ledger, event) {
            if strict {
                return Err(err.into());
            }
        }
    }

    let stats = processor.stats();
    info!(
        applied = stats.applied,
        rejected = stats.rejected,
        members = ledger.members().len(),
        "ledger replayed"
    );
    Ok(ledger)
}

pub fn write_report<W: Write>(mut out: W, ledger: &Ledger, report: Report) -> Result<(), AppError> {
    match report {
        Report::Balances => writer::write_balances(&mut out, ledger, &ledger.balances())?,
        Report::Transfers => writer::write_transfers(&mut out, &ledger.simplified_debts())?,
        Report::All => {
            writer::write_balances(&mut out, ledger, &ledger.balances())?;
            writeln!(out)?;
            writer::write_transfers(&mut out, &ledger.simplified_debts())?;
        }
    }
    out.flush()?;
    Ok(())
}
