use anchor_lang::solana_program::pubkey::Pubkey;

use crate::ledger::TransactionRecord;
use crate::state::PurchaseEvent;

/// Sums realized commission for one season across a set of records.
///
/// A fee-wallet credit counts only when the same transaction independently
/// matched a purchase event for the season; commission attribution requires
/// that co-occurrence. Bare transfers to the fee wallet (manual top-ups,
/// unrelated payments) contribute zero. Saturating addition keeps the
/// running total inside u64 no matter how hostile the history is.
#[derive(Debug)]
pub struct CommissionAccumulator {
    fee_wallet: Pubkey,
    season_id: u32,
    total: u64,
}

impl CommissionAccumulator {
    pub fn new(fee_wallet: Pubkey, season_id: u32) -> Self {
        Self {
            fee_wallet,
            season_id,
            total: 0,
        }
    }

    /// Feeds one record and whatever purchase event it parsed into.
    pub fn observe(&mut self, record: &TransactionRecord, event: Option<&PurchaseEvent>) {
        let matched = event.is_some_and(|e| e.season_id == self.season_id);
        if !matched {
            return;
        }
        self.total = self
            .total
            .saturating_add(record.credited_lamports(&self.fee_wallet));
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}
