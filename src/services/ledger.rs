//! Balance ledger recording
//!
//! Every event that touches an allocation's balance goes through [`record`],
//! which snapshots the balance before and after so the ledger forms a
//! contiguous chain per allocation.

use tracing::debug;

use crate::error::FundwatchResult;
use crate::models::{Allocation, LedgerEntry, LedgerKind, Money};
use crate::storage::Storage;

/// Append a ledger entry for an allocation balance event
///
/// `previous_balance` is the remaining balance captured before the mutation;
/// the new balance is read off the allocation, so planning-side events (where
/// the balance does not move) produce an entry with equal snapshots.
///
/// The entry is appended in memory; the caller persists the ledger alongside
/// the mutated records.
pub fn record(
    storage: &Storage,
    allocation: &Allocation,
    kind: LedgerKind,
    amount: Money,
    previous_balance: Money,
    actor: &str,
    remarks: impl Into<String>,
) -> FundwatchResult<LedgerEntry> {
    let entry = LedgerEntry::new(
        allocation.id,
        kind,
        amount,
        previous_balance,
        allocation.remaining_balance(),
        actor,
        remarks,
    );

    debug!(
        allocation = %allocation.id,
        kind = %kind,
        amount = %amount,
        "ledger entry recorded"
    );

    storage.ledger.append(entry.clone())?;
    Ok(entry)
}
