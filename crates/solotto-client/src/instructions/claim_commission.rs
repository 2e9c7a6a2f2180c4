use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::pubkey::Pubkey;
use anchor_lang::solana_program::system_program;

use crate::config::ClientConfig;

use super::instruction_discriminator;

/// Builds the admin's `claim_commission` instruction. The program enforces
/// the admin identity on-chain; the client only assembles the payload.
pub fn claim_commission(config: &ClientConfig, admin: &Pubkey) -> Instruction {
    Instruction {
        program_id: config.program_id,
        accounts: vec![
            AccountMeta::new(*admin, true),
            AccountMeta::new(config.treasury, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data: instruction_discriminator("claim_commission").to_vec(),
    }
}
