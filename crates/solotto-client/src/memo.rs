//! Purchase-note recognition.
//!
//! Four note encodings have accumulated over the program's lifetime. Each
//! is handled by one pure recognizer; the registry tries them in a fixed
//! priority order and the first structurally valid match wins, so a record
//! yields at most one purchase event no matter how many formats could
//! independently claim it. Adding a future format is an append to
//! [`FORMAT_REGISTRY`], never a modification of an existing recognizer.

use std::str::FromStr;

use anchor_lang::solana_program::pubkey::Pubkey;
use serde::{Deserialize, Serialize};

use crate::ledger::TransactionRecord;
use crate::state::PurchaseEvent;

/// Tag of the compact encoding, `{"t":"TIX","s":<season>}`.
pub const COMPACT_TAG: &str = "TIX";
/// Type of the verbose encoding.
pub const VERBOSE_TYPE: &str = "TICKET_PURCHASE";
/// Leading tag of the legacy delimited encoding, `SOLOTTO:<version>;...`.
pub const DELIMITED_TAG: &str = "SOLOTTO";

/// Inputs a recognizer may consult besides the record itself.
#[derive(Clone, Copy, Debug)]
pub struct ParseContext<'a> {
    pub treasury: &'a Pubkey,
    pub ticket_price_lamports: u64,
    /// The only season the amount-only recognizer may attribute to.
    pub amount_only_season: u32,
}

/// What one recognizer extracted from a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recognized {
    pub season_id: u32,
    pub quantity: u32,
    /// Gross lamports when the note states them; otherwise inferred from
    /// the treasury credit by the caller.
    pub gross_lamports: Option<u64>,
}

pub type Recognizer = fn(&TransactionRecord, &ParseContext<'_>) -> Option<Recognized>;

/// Recognizers in priority order. First match wins.
pub const FORMAT_REGISTRY: &[(&str, Recognizer)] = &[
    ("compact", recognize_compact),
    ("verbose", recognize_verbose),
    ("delimited", recognize_delimited),
    ("amount-only", recognize_amount_only),
];

/// Runs the registry over one record, producing zero or one purchase event.
pub fn parse_purchase(record: &TransactionRecord, ctx: &ParseContext<'_>) -> Option<PurchaseEvent> {
    for (format, recognize) in FORMAT_REGISTRY.iter().copied() {
        if let Some(hit) = recognize(record, ctx) {
            tracing::trace!(
                signature = %record.signature,
                format,
                season = hit.season_id,
                quantity = hit.quantity,
                "recognized purchase"
            );
            let gross = hit
                .gross_lamports
                .unwrap_or_else(|| record.credited_lamports(ctx.treasury));
            return Some(PurchaseEvent {
                signature: record.signature.clone(),
                season_id: hit.season_id,
                quantity: hit.quantity,
                buyer: record.signer,
                gross_lamports: gross,
                block_time: record.block_time.unwrap_or(0),
            });
        }
    }
    None
}

#[derive(Serialize, Deserialize)]
struct CompactMemo {
    t: String,
    s: u32,
}

/// Verbose purchase note, the format written by current clients.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerboseMemo {
    #[serde(rename = "type")]
    pub kind: String,
    pub season_id: u32,
    pub quantity: u32,
    pub buyer: String,
    #[serde(default)]
    pub ticket_numbers: Vec<String>,
    #[serde(default)]
    pub timestamp: i64,
}

/// Encodes the note attached to new purchases.
pub fn encode_purchase_memo(
    season_id: u32,
    quantity: u32,
    buyer: &Pubkey,
    ticket_numbers: Vec<String>,
    timestamp: i64,
) -> serde_json::Result<String> {
    serde_json::to_string(&VerboseMemo {
        kind: VERBOSE_TYPE.to_string(),
        season_id,
        quantity,
        buyer: buyer.to_string(),
        ticket_numbers,
        timestamp,
    })
}

/// Compact tagged note. Carries no quantity; it is inferred from the
/// treasury credit at the configured gross price, rounded down. A credit
/// below one ticket rejects the match so later formats get a look.
fn recognize_compact(record: &TransactionRecord, ctx: &ParseContext<'_>) -> Option<Recognized> {
    let memo = record.memo_payloads().find_map(|payload| {
        serde_json::from_str::<CompactMemo>(payload)
            .ok()
            .filter(|m| m.t == COMPACT_TAG)
    })?;
    let quantity = inferred_quantity(record, ctx)?;
    Some(Recognized {
        season_id: memo.s,
        quantity,
        gross_lamports: None,
    })
}

/// Verbose note with an explicit quantity. The stated buyer must be the
/// record's fee payer; a mismatch is a non-match, not an error.
fn recognize_verbose(record: &TransactionRecord, _ctx: &ParseContext<'_>) -> Option<Recognized> {
    let memo = record.memo_payloads().find_map(|payload| {
        serde_json::from_str::<VerboseMemo>(payload)
            .ok()
            .filter(|m| m.kind == VERBOSE_TYPE)
    })?;
    if memo.quantity == 0 {
        return None;
    }
    let buyer = Pubkey::from_str(&memo.buyer).ok()?;
    if buyer != record.signer {
        return None;
    }
    Some(Recognized {
        season_id: memo.season_id,
        quantity: memo.quantity,
        gross_lamports: None,
    })
}

/// Legacy `SOLOTTO:<version>;season=<N>;qty=<N>;lamports=<N>` note, parsed
/// by field-name lookup. Any missing or malformed field rejects the match.
fn recognize_delimited(record: &TransactionRecord, _ctx: &ParseContext<'_>) -> Option<Recognized> {
    record.memo_payloads().find_map(parse_delimited)
}

fn parse_delimited(payload: &str) -> Option<Recognized> {
    let mut segments = payload.split(';');
    let header = segments.next()?;
    let (tag, version) = header.split_once(':')?;
    if tag != DELIMITED_TAG {
        return None;
    }
    version.parse::<u32>().ok()?;

    let mut season_id = None;
    let mut quantity = None;
    let mut lamports = None;
    for segment in segments {
        match segment.split_once('=') {
            Some(("season", value)) => season_id = value.parse::<u32>().ok(),
            Some(("qty", value)) => quantity = value.parse::<u32>().ok(),
            Some(("lamports", value)) => lamports = value.parse::<u64>().ok(),
            _ => {}
        }
    }
    let quantity = quantity.filter(|q| *q > 0)?;
    Some(Recognized {
        season_id: season_id?,
        quantity,
        gross_lamports: Some(lamports?),
    })
}

/// Last-resort inference for the memo-less legacy season: a treasury credit
/// of at least one ticket's price, with no recognizable note anywhere in
/// the record. Deprecated: pinned to the single configured season id so
/// unrelated transfers can never be read as purchases elsewhere.
fn recognize_amount_only(record: &TransactionRecord, ctx: &ParseContext<'_>) -> Option<Recognized> {
    if record.memo_payloads().any(is_recognizable_note) {
        return None;
    }
    let quantity = inferred_quantity(record, ctx)?;
    Some(Recognized {
        season_id: ctx.amount_only_season,
        quantity,
        gross_lamports: None,
    })
}

/// Treasury credit divided by the gross ticket price, rounded down.
fn inferred_quantity(record: &TransactionRecord, ctx: &ParseContext<'_>) -> Option<u32> {
    if ctx.ticket_price_lamports == 0 {
        return None;
    }
    let credit = record.credited_lamports(ctx.treasury);
    u32::try_from(credit / ctx.ticket_price_lamports)
        .ok()
        .filter(|q| *q > 0)
}

/// Whether a payload is structurally one of the note formats, regardless of
/// whether its recognizer would accept it. A structurally valid note that
/// was rejected (say, a buyer mismatch) must keep amount-only inference
/// from firing.
fn is_recognizable_note(payload: &str) -> bool {
    if serde_json::from_str::<CompactMemo>(payload)
        .map(|m| m.t == COMPACT_TAG)
        .unwrap_or(false)
    {
        return true;
    }
    if serde_json::from_str::<VerboseMemo>(payload)
        .map(|m| m.kind == VERBOSE_TYPE)
        .unwrap_or(false)
    {
        return true;
    }
    payload
        .split_once(':')
        .is_some_and(|(tag, _)| tag == DELIMITED_TAG)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MEMO_PROGRAM_ID;
    use crate::ledger::{BalanceDelta, RecordInstruction};

    const PRICE: u64 = 100_000_000;

    fn test_pubkey(seed: u8) -> Pubkey {
        Pubkey::new_from_array([seed; 32])
    }

    fn record(memos: &[&str], treasury: Pubkey, credit: u64, signer: Pubkey) -> TransactionRecord {
        TransactionRecord {
            signature: "5ig".into(),
            instructions: memos
                .iter()
                .map(|m| RecordInstruction {
                    program: MEMO_PROGRAM_ID,
                    data: m.as_bytes().to_vec(),
                })
                .collect(),
            inner_instructions: vec![],
            balance_deltas: vec![BalanceDelta {
                address: treasury,
                delta: credit as i64,
            }],
            block_time: Some(1_700_000_000),
            signer,
        }
    }

    fn ctx(treasury: &Pubkey) -> ParseContext<'_> {
        ParseContext {
            treasury,
            ticket_price_lamports: PRICE,
            amount_only_season: 1,
        }
    }

    #[test]
    fn compact_infers_quantity_from_transfer() {
        let treasury = test_pubkey(1);
        let rec = record(&[r#"{"t":"TIX","s":7}"#], treasury, 3 * PRICE, test_pubkey(2));
        let event = parse_purchase(&rec, &ctx(&treasury)).unwrap();
        assert_eq!(event.season_id, 7);
        assert_eq!(event.quantity, 3);
        assert_eq!(event.gross_lamports, 3 * PRICE);
    }

    #[test]
    fn compact_rounds_down() {
        let treasury = test_pubkey(1);
        let rec = record(
            &[r#"{"t":"TIX","s":7}"#],
            treasury,
            2 * PRICE + PRICE / 2,
            test_pubkey(2),
        );
        assert_eq!(parse_purchase(&rec, &ctx(&treasury)).unwrap().quantity, 2);
    }

    #[test]
    fn compact_with_zero_quantity_is_no_match() {
        let treasury = test_pubkey(1);
        let rec = record(&[r#"{"t":"TIX","s":7}"#], treasury, PRICE / 2, test_pubkey(2));
        assert!(parse_purchase(&rec, &ctx(&treasury)).is_none());
    }

    #[test]
    fn verbose_takes_quantity_literally() {
        let treasury = test_pubkey(1);
        let buyer = test_pubkey(2);
        let memo = format!(
            r#"{{"type":"TICKET_PURCHASE","seasonId":5,"quantity":2,"buyer":"{buyer}"}}"#
        );
        let event = parse_purchase(&record(&[&memo], treasury, 0, buyer), &ctx(&treasury)).unwrap();
        assert_eq!(event.season_id, 5);
        assert_eq!(event.quantity, 2);
    }

    #[test]
    fn verbose_buyer_mismatch_rejects() {
        let treasury = test_pubkey(1);
        let stated = test_pubkey(2);
        let actual_signer = test_pubkey(3);
        let memo = format!(
            r#"{{"type":"TICKET_PURCHASE","seasonId":5,"quantity":2,"buyer":"{stated}"}}"#
        );
        assert!(parse_purchase(&record(&[&memo], treasury, 0, actual_signer), &ctx(&treasury)).is_none());
    }

    #[test]
    fn mismatched_verbose_note_blocks_amount_inference() {
        // A structurally valid note rejected on buyer identity must not let
        // the transfer be re-read as a legacy amount-only purchase.
        let treasury = test_pubkey(1);
        let stated = test_pubkey(2);
        let memo = format!(
            r#"{{"type":"TICKET_PURCHASE","seasonId":1,"quantity":2,"buyer":"{stated}"}}"#
        );
        let rec = record(&[&memo], treasury, 5 * PRICE, test_pubkey(3));
        assert!(parse_purchase(&rec, &ctx(&treasury)).is_none());
    }

    #[test]
    fn delimited_parses_by_field_name() {
        let treasury = test_pubkey(1);
        let rec = record(
            &["SOLOTTO:1;season=4;qty=6;lamports=600000000"],
            treasury,
            0,
            test_pubkey(2),
        );
        let event = parse_purchase(&rec, &ctx(&treasury)).unwrap();
        assert_eq!(event.season_id, 4);
        assert_eq!(event.quantity, 6);
        assert_eq!(event.gross_lamports, 600_000_000);
    }

    #[test]
    fn delimited_field_order_does_not_matter() {
        let hit = parse_delimited("SOLOTTO:2;lamports=100;qty=1;season=3").unwrap();
        assert_eq!(hit.season_id, 3);
        assert_eq!(hit.quantity, 1);
    }

    #[test]
    fn delimited_rejects_missing_or_malformed_fields() {
        assert!(parse_delimited("SOLOTTO:1;season=4;lamports=1").is_none());
        assert!(parse_delimited("SOLOTTO:1;season=4;qty=abc;lamports=1").is_none());
        assert!(parse_delimited("SOLOTTO:x;season=4;qty=1;lamports=1").is_none());
        assert!(parse_delimited("LOTTO:1;season=4;qty=1;lamports=1").is_none());
        assert!(parse_delimited("SOLOTTO:1;season=4;qty=0;lamports=1").is_none());
    }

    #[test]
    fn amount_only_applies_to_legacy_season_only() {
        let treasury = test_pubkey(1);
        let rec = record(&[], treasury, 2 * PRICE, test_pubkey(2));
        let event = parse_purchase(&rec, &ctx(&treasury)).unwrap();
        assert_eq!(event.season_id, 1);
        assert_eq!(event.quantity, 2);
    }

    #[test]
    fn amount_only_needs_a_full_ticket() {
        let treasury = test_pubkey(1);
        let rec = record(&[], treasury, PRICE - 1, test_pubkey(2));
        assert!(parse_purchase(&rec, &ctx(&treasury)).is_none());
    }

    #[test]
    fn unrelated_text_memo_does_not_block_amount_inference() {
        let treasury = test_pubkey(1);
        let rec = record(&["gm"], treasury, PRICE, test_pubkey(2));
        let event = parse_purchase(&rec, &ctx(&treasury)).unwrap();
        assert_eq!(event.season_id, 1);
        assert_eq!(event.quantity, 1);
    }

    #[test]
    fn compact_outranks_verbose() {
        let treasury = test_pubkey(1);
        let buyer = test_pubkey(2);
        let verbose = format!(
            r#"{{"type":"TICKET_PURCHASE","seasonId":9,"quantity":5,"buyer":"{buyer}"}}"#
        );
        let rec = record(
            &[r#"{"t":"TIX","s":7}"#, &verbose],
            treasury,
            2 * PRICE,
            buyer,
        );
        let event = parse_purchase(&rec, &ctx(&treasury)).unwrap();
        assert_eq!(event.season_id, 7);
        assert_eq!(event.quantity, 2);
    }

    #[test]
    fn formats_agree_on_equivalent_content() {
        // Same purchase, three note generations: identical season and
        // quantity. The compact encoding is inference-derived, so its
        // record carries the matching transfer.
        let treasury = test_pubkey(1);
        let buyer = test_pubkey(2);
        let verbose = format!(
            r#"{{"type":"TICKET_PURCHASE","seasonId":4,"quantity":2,"buyer":"{buyer}"}}"#
        );
        let records = [
            record(&[r#"{"t":"TIX","s":4}"#], treasury, 2 * PRICE, buyer),
            record(&[&verbose], treasury, 2 * PRICE, buyer),
            record(&["SOLOTTO:1;season=4;qty=2;lamports=200000000"], treasury, 2 * PRICE, buyer),
        ];
        for rec in &records {
            let event = parse_purchase(rec, &ctx(&treasury)).unwrap();
            assert_eq!((event.season_id, event.quantity), (4, 2));
        }
    }

    #[test]
    fn registry_order_is_fixed() {
        let names: Vec<&str> = FORMAT_REGISTRY.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["compact", "verbose", "delimited", "amount-only"]);
    }

    #[test]
    fn written_memo_reads_back() {
        let treasury = test_pubkey(1);
        let buyer = test_pubkey(2);
        let memo = encode_purchase_memo(3, 2, &buyer, vec![], 1_700_000_000).unwrap();
        let event = parse_purchase(&record(&[&memo], treasury, 0, buyer), &ctx(&treasury)).unwrap();
        assert_eq!(event.season_id, 3);
        assert_eq!(event.quantity, 2);
    }
}
