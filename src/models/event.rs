use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Lending-protocol action attached to a transaction record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    Deposit,
    Borrow,
    Repay,
    Redeem,
    Liquidation,
    Other,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Deposit => "deposit",
            ActionKind::Borrow => "borrow",
            ActionKind::Repay => "repay",
            ActionKind::Redeem => "redeemunderlying",
            ActionKind::Liquidation => "liquidationcall",
            ActionKind::Other => "other",
        }
    }

    /// Maps a protocol action name onto the closed vocabulary. Unknown names
    /// become `Other` rather than failing.
    pub fn from_action(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "deposit" => ActionKind::Deposit,
            "borrow" => ActionKind::Borrow,
            "repay" => ActionKind::Repay,
            "redeemunderlying" | "redeem" | "withdraw" => ActionKind::Redeem,
            "liquidationcall" | "liquidation" => ActionKind::Liquidation,
            _ => ActionKind::Other,
        }
    }
}

impl From<String> for ActionKind {
    fn from(s: String) -> Self {
        ActionKind::from_action(&s)
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        kind.as_str().to_string()
    }
}

/// A transaction record as it comes out of the event source. Amount and price
/// stay as text until normalization decides whether they parse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawEvent {
    pub wallet: String,
    pub action: ActionKind,
    pub amount: Option<String>,
    pub asset_price_usd: Option<String>,
    pub timestamp: i64,
}

impl RawEvent {
    pub fn new(
        wallet: impl Into<String>,
        action: ActionKind,
        amount: impl Into<String>,
        asset_price_usd: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            wallet: wallet.into(),
            action,
            amount: Some(amount.into()),
            asset_price_usd: Some(asset_price_usd.into()),
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedEvent {
    pub wallet: String,
    pub action: ActionKind,
    pub usd_value: f64,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parsing() {
        assert_eq!(ActionKind::from_action("deposit"), ActionKind::Deposit);
        assert_eq!(ActionKind::from_action("Borrow"), ActionKind::Borrow);
        assert_eq!(ActionKind::from_action("repay"), ActionKind::Repay);
        assert_eq!(ActionKind::from_action("redeemunderlying"), ActionKind::Redeem);
        assert_eq!(ActionKind::from_action("withdraw"), ActionKind::Redeem);
        assert_eq!(ActionKind::from_action("liquidationcall"), ActionKind::Liquidation);
        assert_eq!(ActionKind::from_action("flashloan"), ActionKind::Other);
    }

    #[test]
    fn test_action_serde_uses_protocol_names() {
        let json = serde_json::to_string(&ActionKind::Redeem).unwrap();
        assert_eq!(json, "\"redeemunderlying\"");

        let kind: ActionKind = serde_json::from_str("\"LiquidationCall\"").unwrap();
        assert_eq!(kind, ActionKind::Liquidation);
    }
}
