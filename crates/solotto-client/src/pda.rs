use anchor_lang::solana_program::pubkey::Pubkey;

pub const SEASON_SEED: &[u8] = b"season";
pub const COMMISSION_SEED: &[u8] = b"commission";

/// Address of the structured season account for `season_id`.
///
/// The deployed program derives it from the literal seed `"season"`
/// followed by the season id as 4-byte little-endian; this derivation must
/// not change while the program is live.
pub fn season_address(program_id: &Pubkey, season_id: u32) -> Pubkey {
    Pubkey::find_program_address(&[SEASON_SEED, &season_id.to_le_bytes()], program_id).0
}

/// Address of the commission vault for `season_id`, seed `"commission"`
/// plus the same 4-byte little-endian id.
pub fn commission_vault_address(program_id: &Pubkey, season_id: u32) -> Pubkey {
    Pubkey::find_program_address(&[COMMISSION_SEED, &season_id.to_le_bytes()], program_id).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let program = Pubkey::new_unique();
        assert_eq!(season_address(&program, 3), season_address(&program, 3));
        assert_ne!(season_address(&program, 3), season_address(&program, 4));
    }

    #[test]
    fn season_and_commission_namespaces_differ() {
        let program = Pubkey::new_unique();
        assert_ne!(
            season_address(&program, 1),
            commission_vault_address(&program, 1)
        );
    }
}
