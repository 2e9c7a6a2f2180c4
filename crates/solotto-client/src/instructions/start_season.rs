use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::pubkey::Pubkey;
use anchor_lang::solana_program::system_program;

use crate::config::ClientConfig;
use crate::pda::season_address;

use super::instruction_discriminator;

/// Builds the admin's `start_season(season_id)` instruction, which creates
/// the structured season account at its derived address.
///
/// # Arguments
/// * `config` - client configuration
/// * `admin` - wallet funding and signing the account creation
/// * `season_id` - externally assigned id of the new season; ids increase
///   across rounds and are never reused
pub fn start_season(config: &ClientConfig, admin: &Pubkey, season_id: u32) -> Instruction {
    let season = season_address(&config.program_id, season_id);
    let mut data = instruction_discriminator("start_season").to_vec();
    data.extend_from_slice(&season_id.to_le_bytes());
    Instruction {
        program_id: config.program_id,
        accounts: vec![
            AccountMeta::new(*admin, true),
            AccountMeta::new(season, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_the_derived_season_account() {
        let config = ClientConfig::default();
        let ix = start_season(&config, &Pubkey::new_unique(), 9);
        assert_eq!(
            ix.accounts[1].pubkey,
            season_address(&config.program_id, 9)
        );
        assert_eq!(&ix.data[8..], &9u32.to_le_bytes());
    }
}
