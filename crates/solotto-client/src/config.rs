use anchor_lang::solana_program::pubkey;
use anchor_lang::solana_program::pubkey::Pubkey;

use crate::error::ClientError;

/// Wallet that receives the platform commission. The original deployment
/// also uses it as the treasury (admin wallet holds the prize pool).
pub const COMMISSION_WALLET: Pubkey = pubkey!("43kyNFpG5sje54EZYWQvRXuQjerCYvfWv715mPucnypo");

/// SPL Memo program, carrier of the purchase notes.
pub const MEMO_PROGRAM_ID: Pubkey = pubkey!("MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr");

pub const DEFAULT_TICKET_PRICE_LAMPORTS: u64 = 100_000_000; // 0.1 SOL
pub const DEFAULT_COMMISSION_BPS: u64 = 1_000; // 10%, charged on top of the gross price
pub const DEFAULT_SEASON_DURATION_SECS: i64 = 7 * 24 * 60 * 60;
pub const DEFAULT_FEE_BUFFER_LAMPORTS: u64 = 5_000; // headroom for the network fee
pub const DEFAULT_SEASON_SCAN_LIMIT: usize = 1_000;
pub const DEFAULT_WALLET_SCAN_LIMIT: usize = 100;

/// The one season whose purchases predate purchase memos entirely.
/// Amount-only inference is restricted to it.
pub const LEGACY_AMOUNT_ONLY_SEASON: u32 = 1;

/// Process-wide client configuration.
///
/// Constructed once at startup and passed by reference to the reconciler
/// and the write-side builders; there is no global instance. All prices are
/// lamports; currency conversion belongs to the presentation boundary.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Deployed lottery program.
    pub program_id: Pubkey,
    /// Account receiving gross ticket proceeds (the prize pool).
    pub treasury: Pubkey,
    /// Account receiving the platform commission.
    pub fee_wallet: Pubkey,
    /// Gross price of one ticket in lamports.
    pub ticket_price_lamports: u64,
    /// Commission rate in basis points, charged on top of the gross price.
    pub commission_bps: u64,
    /// Length of a season.
    pub season_duration_secs: i64,
    /// Lamports reserved for the network fee in the pre-submission check.
    pub fee_buffer_lamports: u64,
    /// How many treasury / fee-wallet signatures a season scan walks.
    pub season_scan_limit: usize,
    /// How many wallet signatures a ticket scan walks.
    pub wallet_scan_limit: usize,
    /// Season id the amount-only recognizer is pinned to.
    pub amount_only_season: u32,
    /// Emit verbose reconciliation traces to the `tracing` log.
    pub verbose_diagnostics: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            program_id: crate::ID,
            treasury: COMMISSION_WALLET,
            fee_wallet: COMMISSION_WALLET,
            ticket_price_lamports: DEFAULT_TICKET_PRICE_LAMPORTS,
            commission_bps: DEFAULT_COMMISSION_BPS,
            season_duration_secs: DEFAULT_SEASON_DURATION_SECS,
            fee_buffer_lamports: DEFAULT_FEE_BUFFER_LAMPORTS,
            season_scan_limit: DEFAULT_SEASON_SCAN_LIMIT,
            wallet_scan_limit: DEFAULT_WALLET_SCAN_LIMIT,
            amount_only_season: LEGACY_AMOUNT_ONLY_SEASON,
            verbose_diagnostics: false,
        }
    }
}

impl ClientConfig {
    /// Gross cost of `quantity` tickets.
    pub fn gross_lamports(&self, quantity: u32) -> Result<u64, ClientError> {
        self.ticket_price_lamports
            .checked_mul(u64::from(quantity))
            .ok_or(ClientError::Overflow)
    }

    /// Commission charged on top of a gross amount.
    pub fn commission_lamports(&self, gross: u64) -> Result<u64, ClientError> {
        gross
            .checked_mul(self.commission_bps)
            .map(|v| v / 10_000)
            .ok_or(ClientError::Overflow)
    }
}
