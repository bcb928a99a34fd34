use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use crate::models::{ActionKind, RawEvent, Result, WalletScoreError};

/// Records read from an event source, plus how many were rejected because
/// they did not have the expected shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceBatch {
    pub events: Vec<RawEvent>,
    pub rejected: usize,
}

/// Anything that can hand over the full transaction log in one go.
#[cfg_attr(test, mockall::automock)]
pub trait EventSource {
    fn load(&self) -> Result<SourceBatch>;

    /// Human-readable origin, used in logs.
    fn describe(&self) -> String;
}

/// Transaction log stored as a JSON array of objects.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl EventSource for JsonFileSource {
    fn load(&self) -> Result<SourceBatch> {
        let contents = std::fs::read_to_string(&self.path)?;
        let batch = parse_records(&contents)?;
        info!("Loaded {} transactions from {}", batch.events.len(), self.path.display());
        Ok(batch)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "userWallet")]
    user_wallet: String,
    action: String,
    timestamp: NumericText,
    #[serde(rename = "actionData", default)]
    action_data: Option<ActionData>,
}

#[derive(Debug, Deserialize, Default)]
struct ActionData {
    #[serde(default)]
    amount: Option<NumericText>,
    #[serde(rename = "assetPriceUSD", default)]
    asset_price_usd: Option<NumericText>,
}

// Protocol exports mix quoted and bare numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumericText {
    Text(String),
    Number(serde_json::Number),
}

impl NumericText {
    fn into_text(self) -> String {
        match self {
            NumericText::Text(s) => s,
            NumericText::Number(n) => n.to_string(),
        }
    }

    /// Whole epoch seconds. Exports sometimes write them as `1629178166.0`.
    fn into_seconds(self) -> Option<i64> {
        match self {
            NumericText::Number(n) => n.as_i64().or_else(|| whole_seconds(n.as_f64()?)),
            NumericText::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| whole_seconds(s.parse::<f64>().ok()?))
            }
        }
    }
}

fn whole_seconds(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.is_finite() && value.fract() == 0.0 && in_range).then(|| value as i64)
}

impl RawRecord {
    fn into_event(self) -> Option<RawEvent> {
        let wallet = self.user_wallet.trim();
        if wallet.is_empty() {
            return None;
        }

        let timestamp = self.timestamp.into_seconds()?;
        let data = self.action_data.unwrap_or_default();

        Some(RawEvent {
            wallet: wallet.to_string(),
            action: ActionKind::from_action(&self.action),
            amount: data.amount.map(NumericText::into_text),
            asset_price_usd: data.asset_price_usd.map(NumericText::into_text),
            timestamp,
        })
    }
}

/// Parses a JSON array of transaction objects. A document that is not an
/// array is fatal; individual records that do not fit are skipped.
pub fn parse_records(json: &str) -> Result<SourceBatch> {
    let document: Value = serde_json::from_str(json)?;
    let records = match document {
        Value::Array(records) => records,
        other => {
            return Err(WalletScoreError::InvalidInput(format!(
                "expected a JSON array of transactions, found {}",
                json_kind(&other)
            )));
        }
    };

    let mut batch = SourceBatch::default();
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<RawRecord>(record) {
            Ok(raw) => match raw.into_event() {
                Some(event) => batch.events.push(event),
                None => {
                    debug!("Skipping record {}: missing wallet or bad timestamp", index);
                    batch.rejected += 1;
                }
            },
            Err(e) => {
                debug!("Skipping record {}: {}", index, e);
                batch.rejected += 1;
            }
        }
    }

    if batch.rejected > 0 {
        warn!("Skipped {} malformed transaction records", batch.rejected);
    }

    Ok(batch)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
