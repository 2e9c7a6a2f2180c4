use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::hash;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::{AnchorDeserialize, Discriminator};
use arrayref::array_ref;
use async_trait::async_trait;

use crate::config::MEMO_PROGRAM_ID;
use crate::error::ClientError;
use crate::state::Season;

/// One decoded instruction of a fetched transaction, top-level or inner.
#[derive(Clone, Debug)]
pub struct RecordInstruction {
    pub program: Pubkey,
    pub data: Vec<u8>,
}

/// Signed lamport movement of one account within a transaction
/// (post-balance minus pre-balance).
#[derive(Clone, Debug)]
pub struct BalanceDelta {
    pub address: Pubkey,
    pub delta: i64,
}

/// Everything the parser needs from one fetched transaction.
#[derive(Clone, Debug)]
pub struct TransactionRecord {
    pub signature: String,
    pub instructions: Vec<RecordInstruction>,
    pub inner_instructions: Vec<RecordInstruction>,
    pub balance_deltas: Vec<BalanceDelta>,
    pub block_time: Option<i64>,
    /// Fee payer, taken as the purchase signer.
    pub signer: Pubkey,
}

impl TransactionRecord {
    /// Lamports credited to `address` by this transaction. Debits count as
    /// zero; a transaction that never touches the address contributes zero.
    pub fn credited_lamports(&self, address: &Pubkey) -> u64 {
        self.balance_deltas
            .iter()
            .filter(|d| d.address == *address && d.delta > 0)
            .map(|d| d.delta as u64)
            .sum()
    }

    /// UTF-8 payloads of every memo instruction, top-level first.
    pub fn memo_payloads(&self) -> impl Iterator<Item = &str> {
        self.instructions
            .iter()
            .chain(self.inner_instructions.iter())
            .filter(|ix| ix.program == MEMO_PROGRAM_ID)
            .filter_map(|ix| std::str::from_utf8(&ix.data).ok())
    }
}

/// Read/write boundary to the ledger. The core consumes this capability;
/// transports (RPC, test fakes) implement it.
#[async_trait]
pub trait LedgerQuery: Send + Sync {
    /// Raw data of an account, or `None` when the account does not exist.
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, ClientError>;

    /// Most recent transaction signatures touching `address`, newest first.
    async fn get_signatures_for_address(
        &self,
        address: &Pubkey,
        limit: usize,
    ) -> Result<Vec<String>, ClientError>;

    /// Full record of one confirmed transaction, or `None` when the ledger
    /// no longer holds it.
    async fn get_transaction_record(
        &self,
        signature: &str,
    ) -> Result<Option<TransactionRecord>, ClientError>;

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, ClientError>;

    /// Submits a transaction built from `instructions` with `fee_payer` as
    /// payer and signer, returning its signature.
    async fn submit_transaction(
        &self,
        instructions: Vec<Instruction>,
        fee_payer: &Pubkey,
    ) -> Result<String, ClientError>;
}

/// Decodes a structured season account, failing closed.
///
/// Historical deployments exposed the account under two namespace casings,
/// so both `account:Season` and `account:season` discriminators are
/// accepted. Anything else (short data, a foreign discriminator, a
/// malformed body) is treated as an absent account, never an error.
pub fn decode_season(data: &[u8]) -> Option<Season> {
    if data.len() < 8 {
        return None;
    }
    let disc = array_ref![data, 0, 8];
    if disc[..] != *Season::DISCRIMINATOR && disc[..] != lowercase_season_discriminator() {
        return None;
    }
    Season::deserialize(&mut &data[8..]).ok()
}

fn lowercase_season_discriminator() -> [u8; 8] {
    let digest = hash::hash(b"account:season");
    let mut disc = [0u8; 8];
    disc.copy_from_slice(&digest.to_bytes()[..8]);
    disc
}
