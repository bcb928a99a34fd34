use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;
use crate::models::{ActionKind, NormalizedEvent, RawEvent};

/// Converts a raw record into its canonical form.
///
/// Returns `None` when the amount or price is present but does not parse, or
/// the timestamp is out of range. Liquidations and unrecognized actions carry
/// no USD total, so a missing amount or price leaves them at zero value;
/// for every other action it is malformed.
pub fn normalize_event(raw: &RawEvent) -> Option<NormalizedEvent> {
    let timestamp = DateTime::<Utc>::from_timestamp(raw.timestamp, 0)?;

    let usd_value = match (raw.amount.as_deref(), raw.asset_price_usd.as_deref()) {
        (Some(amount), Some(price)) => parse_decimal(amount)? * parse_decimal(price)?,
        (Some(text), None) | (None, Some(text)) if !tracks_usd(raw.action) => {
            parse_decimal(text)?;
            0.0
        }
        (None, None) if !tracks_usd(raw.action) => 0.0,
        _ => return None,
    };
    if !usd_value.is_finite() {
        return None;
    }

    Some(NormalizedEvent {
        wallet: raw.wallet.clone(),
        action: raw.action,
        usd_value,
        timestamp,
    })
}

/// Normalizes a batch, dropping records that do not parse. Returns the kept
/// events and the number dropped.
pub fn normalize_all(raw_events: &[RawEvent]) -> (Vec<NormalizedEvent>, usize) {
    let mut events = Vec::with_capacity(raw_events.len());
    let mut dropped = 0;

    for raw in raw_events {
        match normalize_event(raw) {
            Some(event) => events.push(event),
            None => {
                debug!(
                    "Dropping {} event for {} at {}: amount={:?} price={:?}",
                    raw.action.as_str(), raw.wallet, raw.timestamp, raw.amount, raw.asset_price_usd
                );
                dropped += 1;
            }
        }
    }

    (events, dropped)
}

fn tracks_usd(action: ActionKind) -> bool {
    matches!(
        action,
        ActionKind::Deposit | ActionKind::Borrow | ActionKind::Repay | ActionKind::Redeem
    )
}

// Token amounts are raw integer units and can exceed Decimal's 96-bit
// mantissa; those fall back to a float parse.
fn parse_decimal(text: &str) -> Option<f64> {
    let text = text.trim();
    let value = match Decimal::from_str(text) {
        Ok(d) => d.to_f64()?,
        Err(_) => text.parse::<f64>().ok()?,
    };
    value.is_finite().then_some(value)
}
