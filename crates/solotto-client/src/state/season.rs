use anchor_lang::prelude::*;

// 8 discriminator + 4 season_id + 4 total_tickets_sold + 8 total_prize_pool
// + 1 is_active + 8 end_time + 33 winner + 37 winner_ticket_id + 32 admin
pub const SEASON_ACCOUNT_SIZE: usize = 8 + 4 + 4 + 8 + 1 + 8 + 33 + 37 + 32;

/// Mirror of the deployed program's season account. The field order is the
/// on-chain layout and must not be rearranged.
#[account]
pub struct Season {
    pub season_id: u32,
    pub total_tickets_sold: u32,
    pub total_prize_pool: u64,
    pub is_active: bool,
    pub end_time: i64,
    pub winner: Option<Pubkey>,
    pub winner_ticket_id: Option<String>,
    pub admin: Pubkey,
}

/// Which source produced a snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SnapshotSource {
    /// Decoded from the structured season account, the trusted path.
    Account = 0,
    /// Aggregated from transaction history.
    History = 1,
    /// Safe default after a reconciliation failure.
    Fallback = 2,
}

/// Reconciled view of one season.
///
/// `total_tickets_sold` equals the sum of event quantities attributed to
/// the season, deduplicated by transaction signature. The prize pool is
/// gross: commission is charged on top and never deducted from it.
#[derive(Clone, Debug)]
pub struct SeasonSnapshot {
    pub season_id: u32,
    pub total_tickets_sold: u64,
    pub total_prize_pool_lamports: u64,
    /// Realized commission observed during history aggregation; zero on the
    /// structured path, where no history is walked.
    pub commission_lamports: u64,
    pub is_active: bool,
    pub end_time: i64,
    pub winner: Option<Pubkey>,
    pub winner_ticket_id: Option<String>,
    pub source: SnapshotSource,
}

/// One completed season, as reported by `winners_history`.
#[derive(Clone, Debug)]
pub struct SeasonWinner {
    pub season_id: u32,
    pub winner: Pubkey,
    pub winner_ticket_id: Option<String>,
    pub prize_pool_lamports: u64,
    pub end_time: i64,
}
