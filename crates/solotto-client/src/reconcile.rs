//! Season and ticket state reconciliation.
//!
//! The structured season account is the trusted source when it exists.
//! When it does not (early seasons never had one, and the account access
//! layer has failed in the field) state is rebuilt by walking the
//! treasury and fee-wallet transaction histories and aggregating the
//! purchase events the note recognizers extract. Aggregation is a sum over
//! signature-deduplicated events, so it is commutative, associative, and
//! idempotent: record order and duplicate fetches cannot change a total.
//! Read operations never fail; anything unrecoverable degrades to a safe
//! default snapshot so a season in progress always renders.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anchor_lang::solana_program::pubkey::Pubkey;

use crate::cache::CacheStore;
use crate::commission::CommissionAccumulator;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::instructions;
use crate::ledger::{decode_season, LedgerQuery};
use crate::memo::{parse_purchase, ParseContext};
use crate::pda::season_address;
use crate::state::{
    Season, SeasonSnapshot, SeasonWinner, SnapshotSource, Ticket,
};

/// Orchestrates reads against the ledger adapter and the local cache, and
/// assembles write payloads for submission. One instance per process,
/// injected wherever season or ticket state is consumed.
#[derive(Clone)]
pub struct Reconciler {
    ledger: Arc<dyn LedgerQuery>,
    cache: Arc<CacheStore>,
    config: ClientConfig,
}

impl Reconciler {
    pub fn new(ledger: Arc<dyn LedgerQuery>, cache: Arc<CacheStore>, config: ClientConfig) -> Self {
        Self {
            ledger,
            cache,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Reconciled view of one season.
    ///
    /// The structured account short-circuits all history work. Absence or
    /// any fetch error falls back to history aggregation, and a failure
    /// there degrades to the default snapshot; this call never errors.
    pub async fn season_state(&self, season_id: u32) -> SeasonSnapshot {
        match self.fetch_structured_season(season_id).await {
            Ok(Some(season)) => {
                if self.config.verbose_diagnostics {
                    tracing::debug!(season_id, tickets = season.total_tickets_sold, "structured season account hit");
                }
                return self.snapshot_from_account(season);
            }
            Ok(None) => {}
            Err(err) => {
                tracing::debug!(season_id, %err, "structured season fetch failed, aggregating history");
            }
        }
        match self.aggregate_season_history(season_id).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!(season_id, %err, "season aggregation failed, serving default snapshot");
                self.default_snapshot(season_id)
            }
        }
    }

    /// Tickets held by one wallet.
    ///
    /// Ledger-derived tickets are authoritative when the scan finds any;
    /// otherwise the wallet's cached tickets are returned wholesale. The
    /// two sources are never merged within one call.
    pub async fn user_tickets(&self, wallet: &Pubkey) -> Vec<Ticket> {
        match self.tickets_from_history(wallet).await {
            Ok(tickets) if !tickets.is_empty() => tickets,
            Ok(_) => self.cache.wallet_tickets(&wallet.to_string()),
            Err(err) => {
                tracing::warn!(%wallet, %err, "ticket scan failed, serving cached tickets");
                self.cache.wallet_tickets(&wallet.to_string())
            }
        }
    }

    /// Realized commission for one season, recomputed from history.
    pub async fn realized_commission(&self, season_id: u32) -> u64 {
        match self.aggregate_season_history(season_id).await {
            Ok(snapshot) => snapshot.commission_lamports,
            Err(err) => {
                tracing::warn!(season_id, %err, "commission aggregation failed");
                0
            }
        }
    }

    /// Completed seasons with winners, scanned over an inclusive id range.
    /// Seasons without a structured account or without a winner are
    /// skipped, as are fetch failures.
    pub async fn winners_history(&self, first: u32, last: u32) -> Vec<SeasonWinner> {
        let mut winners = Vec::new();
        for season_id in first..=last {
            let season = match self.fetch_structured_season(season_id).await {
                Ok(Some(season)) => season,
                Ok(None) => continue,
                Err(_) => continue,
            };
            if let Some(winner) = season.winner {
                winners.push(SeasonWinner {
                    season_id: season.season_id,
                    winner,
                    winner_ticket_id: season.winner_ticket_id,
                    prize_pool_lamports: season.total_prize_pool,
                    end_time: season.end_time,
                });
            }
        }
        winners
    }

    /// Buys tickets: prices the purchase, checks funds, submits, and mints
    /// the buyer's cache tickets once the ledger accepts the transaction.
    /// Returns the transaction signature and the minted tickets.
    pub async fn buy_tickets(
        &self,
        buyer: &Pubkey,
        season_id: u32,
        quantity: u32,
    ) -> Result<(String, Vec<Ticket>), ClientError> {
        let now = unix_now();
        let plan = instructions::buy_ticket(&self.config, buyer, season_id, quantity, now)?;
        let available = self.ledger.get_balance(buyer).await?;
        plan.check_funds(available)?;

        let signature = self
            .submit(plan.instructions, buyer, "ticket purchase")
            .await?;
        let minted = self
            .cache
            .mint_tickets(&buyer.to_string(), season_id, quantity, now);
        Ok((signature, minted))
    }

    /// Submits the admin's commission claim.
    pub async fn claim_commission(&self, admin: &Pubkey) -> Result<String, ClientError> {
        let ix = instructions::claim_commission(&self.config, admin);
        self.submit(vec![ix], admin, "commission claim").await
    }

    /// Starts a new season and persists its countdown end time locally.
    pub async fn start_season(&self, admin: &Pubkey, season_id: u32) -> Result<String, ClientError> {
        let ix = instructions::start_season(&self.config, admin, season_id);
        let signature = self.submit(vec![ix], admin, "season start").await?;
        self.cache
            .set_season_end_time(season_id, unix_now() + self.config.season_duration_secs);
        Ok(signature)
    }

    /// Ends an active season.
    pub async fn end_season(&self, admin: &Pubkey, season_id: u32) -> Result<String, ClientError> {
        let ix = instructions::end_season(&self.config, admin, season_id);
        self.submit(vec![ix], admin, "season end").await
    }

    async fn submit(
        &self,
        instructions: Vec<anchor_lang::solana_program::instruction::Instruction>,
        fee_payer: &Pubkey,
        operation: &str,
    ) -> Result<String, ClientError> {
        match self.ledger.submit_transaction(instructions, fee_payer).await {
            Ok(signature) => Ok(signature),
            Err(err) => {
                // Full detail stays in the operator log; callers get a
                // generic actionable failure.
                tracing::error!(operation, %err, "transaction submission failed");
                Err(ClientError::Submission)
            }
        }
    }

    async fn fetch_structured_season(&self, season_id: u32) -> Result<Option<Season>, ClientError> {
        let address = season_address(&self.config.program_id, season_id);
        let Some(data) = self.ledger.get_account(&address).await? else {
            return Ok(None);
        };
        // decode_season fails closed; a mismatched id means the account is
        // not what this query asked for and is equally treated as absent.
        Ok(decode_season(&data).filter(|season| season.season_id == season_id))
    }

    fn snapshot_from_account(&self, season: Season) -> SeasonSnapshot {
        SeasonSnapshot {
            season_id: season.season_id,
            total_tickets_sold: u64::from(season.total_tickets_sold),
            total_prize_pool_lamports: season.total_prize_pool,
            commission_lamports: 0,
            is_active: season.is_active,
            end_time: season.end_time,
            winner: season.winner,
            winner_ticket_id: season.winner_ticket_id,
            source: SnapshotSource::Account,
        }
    }

    async fn aggregate_season_history(
        &self,
        season_id: u32,
    ) -> Result<SeasonSnapshot, ClientError> {
        let signatures = self.season_scan_signatures().await?;
        let ctx = self.parse_context();
        let mut total_tickets: u64 = 0;
        let mut commission = CommissionAccumulator::new(self.config.fee_wallet, season_id);

        for signature in &signatures {
            let record = match self.ledger.get_transaction_record(signature).await {
                Ok(Some(record)) => record,
                // Pruned from ledger history; nothing to aggregate.
                Ok(None) => continue,
                Err(err) => {
                    // One failed record must not abort the aggregation.
                    tracing::debug!(%signature, %err, "skipping unfetchable record");
                    continue;
                }
            };
            let event = parse_purchase(&record, &ctx);
            let matched = event.as_ref().filter(|e| e.season_id == season_id);
            if let Some(event) = matched {
                total_tickets = total_tickets.saturating_add(u64::from(event.quantity));
            }
            commission.observe(&record, matched);
        }

        let prize_pool = total_tickets
            .checked_mul(self.config.ticket_price_lamports)
            .ok_or(ClientError::Overflow)?;
        if self.config.verbose_diagnostics {
            tracing::debug!(
                season_id,
                records = signatures.len(),
                tickets = total_tickets,
                commission = commission.total(),
                "aggregated season history"
            );
        }
        Ok(SeasonSnapshot {
            season_id,
            total_tickets_sold: total_tickets,
            total_prize_pool_lamports: prize_pool,
            commission_lamports: commission.total(),
            is_active: true,
            end_time: self.season_end_time(season_id),
            winner: None,
            winner_ticket_id: None,
            source: SnapshotSource::History,
        })
    }

    /// Union of the treasury's and fee wallet's recent signatures, oldest
    /// kept first per listing, deduplicated. A purchase touches both
    /// addresses, so it shows up in both listings and must be walked once.
    async fn season_scan_signatures(&self) -> Result<Vec<String>, ClientError> {
        let limit = self.config.season_scan_limit;
        let mut signatures = self
            .ledger
            .get_signatures_for_address(&self.config.treasury, limit)
            .await?;
        if self.config.fee_wallet != self.config.treasury {
            signatures.extend(
                self.ledger
                    .get_signatures_for_address(&self.config.fee_wallet, limit)
                    .await?,
            );
        }
        let mut seen = HashSet::new();
        signatures.retain(|signature| seen.insert(signature.clone()));
        Ok(signatures)
    }

    async fn tickets_from_history(&self, wallet: &Pubkey) -> Result<Vec<Ticket>, ClientError> {
        let signatures = self
            .ledger
            .get_signatures_for_address(wallet, self.config.wallet_scan_limit)
            .await?;
        let ctx = self.parse_context();
        let mut seen = HashSet::new();
        let mut tickets = Vec::new();
        for signature in signatures {
            if !seen.insert(signature.clone()) {
                continue;
            }
            let record = match self.ledger.get_transaction_record(&signature).await {
                Ok(Some(record)) => record,
                Ok(None) => continue,
                Err(err) => {
                    tracing::debug!(%signature, %err, "skipping unfetchable record");
                    continue;
                }
            };
            let Some(event) = parse_purchase(&record, &ctx) else {
                continue;
            };
            if event.buyer != *wallet {
                continue;
            }
            tickets.extend(synthesize_tickets(&event, &wallet.to_string()));
        }
        Ok(tickets)
    }

    fn parse_context(&self) -> ParseContext<'_> {
        ParseContext {
            treasury: &self.config.treasury,
            ticket_price_lamports: self.config.ticket_price_lamports,
            amount_only_season: self.config.amount_only_season,
        }
    }

    /// Persisted countdown end time for the season, or a fresh
    /// `now + season duration` recorded for subsequent calls.
    fn season_end_time(&self, season_id: u32) -> i64 {
        if let Some(end_time) = self.cache.season_end_time(season_id) {
            return end_time;
        }
        let end_time = unix_now() + self.config.season_duration_secs;
        self.cache.set_season_end_time(season_id, end_time);
        end_time
    }

    pub(crate) fn default_snapshot(&self, season_id: u32) -> SeasonSnapshot {
        SeasonSnapshot {
            season_id,
            total_tickets_sold: 0,
            total_prize_pool_lamports: 0,
            commission_lamports: 0,
            is_active: true,
            end_time: self.season_end_time(season_id),
            winner: None,
            winner_ticket_id: None,
            source: SnapshotSource::Fallback,
        }
    }
}

/// One ticket per unit quantity of a ledger-derived event. No
/// ledger-assigned numbering exists for the historical formats, so labels
/// are synthesized from the signature.
fn synthesize_tickets(event: &crate::state::PurchaseEvent, wallet: &str) -> Vec<Ticket> {
    let prefix: String = event.signature.chars().take(8).collect();
    (0..event.quantity)
        .map(|index| Ticket {
            id: format!("{}:{}", event.signature, index),
            season_id: event.season_id,
            wallet_address: wallet.to_string(),
            purchase_time: event.block_time,
            ticket_number: format!("TKT-{}-{}", prefix, index + 1),
        })
        .collect()
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PurchaseEvent;

    #[test]
    fn synthesized_tickets_expand_quantity() {
        let event = PurchaseEvent {
            signature: "3xAmpleSignature".into(),
            season_id: 2,
            quantity: 3,
            buyer: Pubkey::new_unique(),
            gross_lamports: 300,
            block_time: 1_700_000_000,
        };
        let tickets = synthesize_tickets(&event, "W1");
        assert_eq!(tickets.len(), 3);
        assert_eq!(tickets[0].ticket_number, "TKT-3xAmpleS-1");
        assert_eq!(tickets[2].ticket_number, "TKT-3xAmpleS-3");
        assert!(tickets.iter().all(|t| t.season_id == 2));
        assert_ne!(tickets[0].id, tickets[1].id);
    }
}
