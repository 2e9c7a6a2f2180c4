use thiserror::Error;

/// Errors surfaced by write-path operations and the ledger adapter.
///
/// Read-path reconciliation never returns these to callers: absent accounts
/// and transport failures degrade to default snapshots instead.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The ledger adapter failed to answer a query (timeout, rate limit,
    /// malformed response).
    #[error("ledger query failed: {0}")]
    Ledger(String),

    /// The wallet cannot cover the gross price plus commission and the
    /// submission fee buffer. Detected before any submission attempt.
    #[error("insufficient funds: need {required} lamports, have {available}")]
    InsufficientFunds { required: u64, available: u64 },

    /// The ledger rejected a submitted transaction. Diagnostic detail is
    /// written to the operator log, not carried here.
    #[error("transaction submission failed")]
    Submission,

    /// A purchase of zero tickets was requested.
    #[error("ticket quantity must be greater than zero")]
    InvalidTicketCount,

    /// A lamport computation exceeded the 64-bit range.
    #[error("lamport amount overflow")]
    Overflow,

    /// The purchase memo could not be encoded.
    #[error("memo encoding failed")]
    MemoEncoding,
}
