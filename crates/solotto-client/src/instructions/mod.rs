pub use buy_ticket::*;
pub use claim_commission::*;
pub use end_season::*;
pub use start_season::*;

pub mod buy_ticket;
pub mod claim_commission;
pub mod end_season;
pub mod start_season;

use anchor_lang::solana_program::hash;

/// Anchor instruction discriminator: the first 8 bytes of
/// `sha256("global:<name>")`.
pub(crate) fn instruction_discriminator(name: &str) -> [u8; 8] {
    let digest = hash::hash(format!("global:{name}").as_bytes());
    let mut disc = [0u8; 8];
    disc.copy_from_slice(&digest.to_bytes()[..8]);
    disc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminators_differ_per_instruction() {
        let buy = instruction_discriminator("buy_ticket");
        let claim = instruction_discriminator("claim_commission");
        assert_ne!(buy, claim);
        assert_eq!(buy, instruction_discriminator("buy_ticket"));
    }
}
