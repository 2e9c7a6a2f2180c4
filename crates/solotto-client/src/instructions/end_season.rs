use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::pubkey::Pubkey;

use crate::config::ClientConfig;
use crate::pda::season_address;

use super::instruction_discriminator;

/// Builds the admin's `end_season` instruction for an active season. The
/// program records the end time and, once drawn, the winner.
pub fn end_season(config: &ClientConfig, admin: &Pubkey, season_id: u32) -> Instruction {
    let season = season_address(&config.program_id, season_id);
    Instruction {
        program_id: config.program_id,
        accounts: vec![
            AccountMeta::new(*admin, true),
            AccountMeta::new(season, false),
        ],
        data: instruction_discriminator("end_season").to_vec(),
    }
}
