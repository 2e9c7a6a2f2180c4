use anchor_lang::solana_program::pubkey::Pubkey;
use serde::{Deserialize, Serialize};

/// A user-facing numbered ticket.
///
/// Cache-minted tickets carry sequential `TKT-%06d` labels; ledger-derived
/// tickets synthesize a label from the transaction signature, since no
/// ledger-assigned numbering exists for the historical formats. Field names
/// serialize in the camelCase shape the persisted cache has always used.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub season_id: u32,
    pub wallet_address: String,
    pub purchase_time: i64,
    pub ticket_number: String,
}

/// Sequential display label for cache-minted tickets.
pub fn ticket_label(number: u64) -> String {
    format!("TKT-{number:06}")
}

/// One reconciled ticket purchase, derived from a transaction record.
///
/// The signature is the sole identity: at most one event exists per
/// transaction, no matter how many recognizers could match it.
#[derive(Clone, Debug)]
pub struct PurchaseEvent {
    pub signature: String,
    pub season_id: u32,
    pub quantity: u32,
    pub buyer: Pubkey,
    pub gross_lamports: u64,
    pub block_time: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_zero_padded() {
        assert_eq!(ticket_label(1), "TKT-000001");
        assert_eq!(ticket_label(123_456), "TKT-123456");
    }

    #[test]
    fn cache_shape_is_camel_case() {
        let ticket = Ticket {
            id: "1700000000_1".into(),
            season_id: 2,
            wallet_address: "W1".into(),
            purchase_time: 1_700_000_000,
            ticket_number: ticket_label(7),
        };
        let json = serde_json::to_string(&ticket).unwrap();
        assert!(json.contains("\"seasonId\":2"));
        assert!(json.contains("\"walletAddress\":\"W1\""));
        assert!(json.contains("\"ticketNumber\":\"TKT-000007\""));
    }
}
