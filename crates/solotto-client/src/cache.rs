//! Append-only local ticket bookkeeping.
//!
//! Until a ledger-backed numbering scheme exists, this store is the ticket
//! numbering authority: the purchase flow mints sequentially labelled
//! tickets here, and reconciliation falls back to it when the ledger yields
//! nothing for a wallet. It persists as a single JSON file; persistence is
//! best-effort, eventually-consistent bookkeeping, never a source of truth.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::state::{ticket_label, Ticket};

#[derive(Default, Serialize, Deserialize)]
struct CacheInner {
    /// Per-wallet ticket lists, keyed by base58 wallet address.
    #[serde(default)]
    wallet_tickets: HashMap<String, Vec<Ticket>>,
    /// Per-season ticket lists.
    #[serde(default)]
    season_tickets: HashMap<u32, Vec<Ticket>>,
    /// Per-season countdown end times (unix seconds).
    #[serde(default)]
    season_end_times: HashMap<u32, i64>,
}

pub struct CacheStore {
    inner: Mutex<CacheInner>,
    path: Option<PathBuf>,
}

impl CacheStore {
    /// A store with no backing file; entries live for the process only.
    pub fn in_memory() -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            path: None,
        }
    }

    /// Opens a file-backed store. A missing or unreadable file starts
    /// empty; a malformed one is discarded with a warning, since local
    /// bookkeeping must never block reconciliation.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let inner = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), %err, "discarding malformed ticket cache");
                CacheInner::default()
            }),
            Err(_) => CacheInner::default(),
        };
        Self {
            inner: Mutex::new(inner),
            path: Some(path),
        }
    }

    /// Mints `quantity` sequentially numbered tickets for a confirmed
    /// purchase, appending them to both the wallet and season lists.
    /// Numbering continues from the season list's current length.
    pub fn mint_tickets(
        &self,
        wallet: &str,
        season_id: u32,
        quantity: u32,
        now: i64,
    ) -> Vec<Ticket> {
        let mut inner = self.lock();
        let start = inner
            .season_tickets
            .get(&season_id)
            .map(|list| list.len() as u64)
            .unwrap_or(0);
        let minted: Vec<Ticket> = (0..u64::from(quantity))
            .map(|offset| {
                let number = start + offset + 1;
                Ticket {
                    id: format!("{now}_{number}"),
                    season_id,
                    wallet_address: wallet.to_string(),
                    purchase_time: now,
                    ticket_number: ticket_label(number),
                }
            })
            .collect();
        inner
            .wallet_tickets
            .entry(wallet.to_string())
            .or_default()
            .extend(minted.iter().cloned());
        inner
            .season_tickets
            .entry(season_id)
            .or_default()
            .extend(minted.iter().cloned());
        self.persist(&inner);
        minted
    }

    pub fn append_wallet_tickets(&self, wallet: &str, tickets: &[Ticket]) {
        let mut inner = self.lock();
        inner
            .wallet_tickets
            .entry(wallet.to_string())
            .or_default()
            .extend(tickets.iter().cloned());
        self.persist(&inner);
    }

    pub fn append_season_tickets(&self, season_id: u32, tickets: &[Ticket]) {
        let mut inner = self.lock();
        inner
            .season_tickets
            .entry(season_id)
            .or_default()
            .extend(tickets.iter().cloned());
        self.persist(&inner);
    }

    pub fn wallet_tickets(&self, wallet: &str) -> Vec<Ticket> {
        let inner = self.lock();
        inner.wallet_tickets.get(wallet).cloned().unwrap_or_default()
    }

    pub fn season_tickets(&self, season_id: u32) -> Vec<Ticket> {
        let inner = self.lock();
        inner
            .season_tickets
            .get(&season_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn season_end_time(&self, season_id: u32) -> Option<i64> {
        let inner = self.lock();
        inner.season_end_times.get(&season_id).copied()
    }

    pub fn set_season_end_time(&self, season_id: u32, end_time: i64) {
        let mut inner = self.lock();
        inner.season_end_times.insert(season_id, end_time);
        self.persist(&inner);
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        // A writer that panicked mid-append leaves a usable map behind;
        // losing one entry is acceptable for best-effort bookkeeping.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, inner: &CacheInner) {
        let Some(path) = &self.path else { return };
        let write = serde_json::to_vec_pretty(inner)
            .map_err(std::io::Error::other)
            .and_then(|bytes| std::fs::write(path, bytes));
        if let Err(err) = write {
            tracing::warn!(path = %path.display(), %err, "ticket cache write failed");
        }
    }
}
