//! Price boundary.
//!
//! The SOL/USD feed is an external collaborator; the core never converts
//! currency during aggregation, where lamports are canonical. Consumers
//! quote a price only at the presentation boundary, through an injected
//! [`PriceQuery`] instead of a process-global feed.

use anchor_lang::solana_program::native_token::LAMPORTS_PER_SOL;
use async_trait::async_trait;

use crate::error::ClientError;

#[async_trait]
pub trait PriceQuery: Send + Sync {
    /// Current SOL price in USD.
    async fn sol_price_usd(&self) -> Result<f64, ClientError>;
}

/// Constant quote, for tests and offline display.
pub struct FixedPrice(pub f64);

#[async_trait]
impl PriceQuery for FixedPrice {
    async fn sol_price_usd(&self) -> Result<f64, ClientError> {
        Ok(self.0)
    }
}

pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

pub fn lamports_to_usd(lamports: u64, sol_price_usd: f64) -> f64 {
    lamports_to_sol(lamports) * sol_price_usd
}

/// Display form used for SOL amounts, four decimals.
pub fn format_sol(amount: f64) -> String {
    format!("{amount:.4}")
}

/// Display form used for USD amounts, two decimals.
pub fn format_usd(amount: f64) -> String {
    format!("{amount:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_at_the_boundary_only() {
        assert_eq!(lamports_to_sol(1_500_000_000), 1.5);
        assert_eq!(lamports_to_usd(1_000_000_000, 100.0), 100.0);
    }

    #[test]
    fn display_precision_matches_the_ui() {
        assert_eq!(format_sol(0.012345), "0.0123");
        assert_eq!(format_usd(2.346), "2.35");
        assert_eq!(format_usd(1.0), "1.00");
    }

    #[tokio::test]
    async fn fixed_quote_answers_immediately() {
        let price = FixedPrice(95.5);
        assert_eq!(price.sol_price_usd().await.unwrap(), 95.5);
    }
}
