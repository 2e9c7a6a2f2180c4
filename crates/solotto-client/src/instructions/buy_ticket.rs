use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::pubkey::Pubkey;
use anchor_lang::solana_program::{system_instruction, system_program};

use crate::config::{ClientConfig, MEMO_PROGRAM_ID};
use crate::error::ClientError;
use crate::memo::encode_purchase_memo;

use super::instruction_discriminator;

/// A fully priced purchase, ready for the pre-submission funds check and
/// submission.
#[derive(Clone, Debug)]
pub struct BuyTicketPlan {
    pub gross_lamports: u64,
    pub commission_lamports: u64,
    /// Gross plus commission plus the network-fee buffer.
    pub required_lamports: u64,
    pub instructions: Vec<Instruction>,
}

impl BuyTicketPlan {
    /// Pre-submission funds check. Surfaces the shortfall to the caller as
    /// a user-actionable condition before any submission attempt.
    pub fn check_funds(&self, available: u64) -> Result<(), ClientError> {
        if available < self.required_lamports {
            return Err(ClientError::InsufficientFunds {
                required: self.required_lamports,
                available,
            });
        }
        Ok(())
    }
}

/// Builds the ticket-purchase transaction payload.
///
/// Three instructions, in order:
/// 1. the program's `buy_ticket(quantity)`, which moves the gross price
///    from the buyer to the treasury;
/// 2. a system transfer of the commission to the fee wallet (instant
///    settlement; commission is charged on top, never deducted from the
///    prize pool);
/// 3. a purchase note in the current verbose encoding, so history
///    reconciliation can attribute the purchase without the structured
///    season account.
///
/// # Arguments
/// * `config` - client configuration (program, treasury, fee wallet, price)
/// * `buyer` - wallet paying for and signing the purchase
/// * `season_id` - season the tickets belong to
/// * `quantity` - number of tickets, must be greater than 0
/// * `timestamp` - unix time stamped into the purchase note
pub fn buy_ticket(
    config: &ClientConfig,
    buyer: &Pubkey,
    season_id: u32,
    quantity: u32,
    timestamp: i64,
) -> Result<BuyTicketPlan, ClientError> {
    if quantity == 0 {
        return Err(ClientError::InvalidTicketCount);
    }
    let gross = config.gross_lamports(quantity)?;
    let commission = config.commission_lamports(gross)?;
    let required = gross
        .checked_add(commission)
        .and_then(|v| v.checked_add(config.fee_buffer_lamports))
        .ok_or(ClientError::Overflow)?;

    let mut data = instruction_discriminator("buy_ticket").to_vec();
    data.extend_from_slice(&quantity.to_le_bytes());
    let program_ix = Instruction {
        program_id: config.program_id,
        accounts: vec![
            AccountMeta::new(*buyer, true),
            AccountMeta::new(config.treasury, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data,
    };

    let commission_ix = system_instruction::transfer(buyer, &config.fee_wallet, commission);

    let memo = encode_purchase_memo(season_id, quantity, buyer, vec![], timestamp)
        .map_err(|_| ClientError::MemoEncoding)?;
    let memo_ix = Instruction {
        program_id: MEMO_PROGRAM_ID,
        accounts: vec![AccountMeta::new_readonly(*buyer, true)],
        data: memo.into_bytes(),
    };

    Ok(BuyTicketPlan {
        gross_lamports: gross,
        commission_lamports: commission,
        required_lamports: required,
        instructions: vec![program_ix, commission_ix, memo_ix],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prices_three_tickets() {
        let config = ClientConfig::default();
        let buyer = Pubkey::new_unique();
        let plan = buy_ticket(&config, &buyer, 2, 3, 1_700_000_000).unwrap();
        assert_eq!(plan.gross_lamports, 300_000_000);
        assert_eq!(plan.commission_lamports, 30_000_000);
        assert_eq!(plan.required_lamports, 330_005_000);
    }

    #[test]
    fn rejects_zero_quantity() {
        let config = ClientConfig::default();
        assert!(matches!(
            buy_ticket(&config, &Pubkey::new_unique(), 2, 0, 0),
            Err(ClientError::InvalidTicketCount)
        ));
    }

    #[test]
    fn program_instruction_carries_quantity() {
        let config = ClientConfig::default();
        let buyer = Pubkey::new_unique();
        let plan = buy_ticket(&config, &buyer, 2, 5, 0).unwrap();
        let program_ix = &plan.instructions[0];
        assert_eq!(program_ix.program_id, config.program_id);
        assert_eq!(&program_ix.data[8..], &5u32.to_le_bytes());
        assert_eq!(program_ix.accounts[0].pubkey, buyer);
        assert!(program_ix.accounts[0].is_signer);
        assert_eq!(program_ix.accounts[1].pubkey, config.treasury);
    }

    #[test]
    fn note_rides_the_memo_program() {
        let config = ClientConfig::default();
        let plan = buy_ticket(&config, &Pubkey::new_unique(), 2, 1, 0).unwrap();
        let memo_ix = &plan.instructions[2];
        assert_eq!(memo_ix.program_id, MEMO_PROGRAM_ID);
        let payload = std::str::from_utf8(&memo_ix.data).unwrap();
        assert!(payload.contains("\"type\":\"TICKET_PURCHASE\""));
        assert!(payload.contains("\"seasonId\":2"));
    }

    #[test]
    fn funds_check_reports_shortfall() {
        let config = ClientConfig::default();
        let plan = buy_ticket(&config, &Pubkey::new_unique(), 2, 1, 0).unwrap();
        let err = plan.check_funds(plan.required_lamports - 1).unwrap_err();
        match err {
            ClientError::InsufficientFunds { required, available } => {
                assert_eq!(required, plan.required_lamports);
                assert_eq!(available, plan.required_lamports - 1);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(plan.check_funds(plan.required_lamports).is_ok());
    }
}
