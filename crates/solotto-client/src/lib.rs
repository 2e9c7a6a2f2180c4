//! # solotto-client
//!
//! Off-chain client SDK for the Solotto season lottery on Solana.
//!
//! The ground truth for "how many tickets has this wallet bought, and what
//! commission has been realized" lives on the ledger, but the structured
//! season account may be absent, stale, or exposed under a historical
//! namespace casing. This crate reconciles a coherent per-season and
//! per-wallet view from whatever is available: the structured account when
//! it exists, otherwise the treasury and fee-wallet transaction histories
//! (four generations of purchase-note encodings), with a local append-only
//! ticket cache as the final fallback.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use solotto_client::{CacheStore, ClientConfig, Reconciler};
//!
//! let ledger = Arc::new(my_rpc_transport); // your LedgerQuery impl
//! let cache = Arc::new(CacheStore::open("solotto-cache.json"));
//! let client = Reconciler::new(ledger, cache, ClientConfig::default());
//!
//! let season = client.season_state(2).await;
//! let tickets = client.user_tickets(&wallet).await;
//! ```

use anchor_lang::prelude::*;

pub mod cache;
pub mod commission;
pub mod config;
pub mod error;
pub mod instructions;
pub mod ledger;
pub mod memo;
pub mod monitor;
pub mod pda;
pub mod price;
pub mod reconcile;
pub mod state;

declare_id!("8Nt53vsc4ZFtnWdMLLWtmjsaBXmBttzuFnouNCNbuXYj");

pub use cache::CacheStore;
pub use config::ClientConfig;
pub use error::ClientError;
pub use ledger::{BalanceDelta, LedgerQuery, RecordInstruction, TransactionRecord};
pub use monitor::{season_monitor, MonitorHandle, SeasonMonitor};
pub use price::{FixedPrice, PriceQuery};
pub use reconcile::Reconciler;
pub use state::{
    PurchaseEvent, Season, SeasonSnapshot, SeasonWinner, SnapshotSource, Ticket,
};
