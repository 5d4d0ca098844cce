use tracing::{debug, warn};

use crate::{
    common::{error::LedgerError, event::LedgerEvent},
    domain::ledger::Ledger,
    worker::handlers::{expense, member, settlement},
};

/// Counts of events the processor applied or the ledger turned down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessStats {
    pub applied: usize,
    pub rejected: usize,
}

#[derive(Debug, Default)]
pub struct Processor {
    stats: ProcessStats,
}
impl Processor {
    pub fn new() -> Self {
        Self {
            stats: ProcessStats::default(),
        }
    }

    pub fn stats(&self) -> ProcessStats {
        self.stats
    }

    /// Applies one event. A rejected event leaves the ledger untouched; the
    /// error is returned so callers can decide whether to carry on.
    pub fn process(&mut self, ledger: &mut Ledger, event: LedgerEvent) -> Result<(), LedgerError> {
        let outcome = match event {
            LedgerEvent::AddMember { id, name, color } => member::add(ledger, id, name, color),
            LedgerEvent::DeleteMember { id } => member::delete(ledger, &id),
            LedgerEvent::Expense {
                id,
                title,
                payer,
                amount,
                participants,
            } => expense::handle(ledger, id, title, payer, amount, &participants).map(|_| ()),
            LedgerEvent::Settlement {
                id,
                title,
                from,
                to,
                amount,
            } => settlement::handle(ledger, id, title, &from, &to, amount).map(|_| ()),
        };

        match &outcome {
            Ok(()) => {
                self.stats.applied += 1;
                debug!("event applied");
            }
            Err(err) => {
                self.stats.rejected += 1;
                warn!(%err, "event rejected");
            }
        }
        outcome
    }
}
