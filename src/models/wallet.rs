use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::models::{ActionKind, NormalizedEvent};

/// Running statistics for one wallet while the event stream is folded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WalletAccumulator {
    pub wallet: String,

    // USD totals per action
    pub total_deposit_usd: f64,
    pub total_borrow_usd: f64,
    pub total_repay_usd: f64,
    pub total_redeem_usd: f64,

    // Event counts per action
    pub deposit_count: u32,
    pub borrow_count: u32,
    pub repay_count: u32,
    pub redeem_count: u32,
    pub liquidation_count: u32,

    // Every timestamp seen, in arrival order
    pub timestamps: Vec<DateTime<Utc>>,
    pub first_seen: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
}

impl WalletAccumulator {
    pub fn new(wallet: impl Into<String>) -> Self {
        Self {
            wallet: wallet.into(),
            total_deposit_usd: 0.0,
            total_borrow_usd: 0.0,
            total_repay_usd: 0.0,
            total_redeem_usd: 0.0,
            deposit_count: 0,
            borrow_count: 0,
            repay_count: 0,
            redeem_count: 0,
            liquidation_count: 0,
            timestamps: Vec::new(),
            first_seen: None,
            last_seen: None,
        }
    }

    /// Folds one event in. The timestamp is tracked for every action kind,
    /// including `Other`; only the dispatch below depends on the kind.
    pub fn record(&mut self, event: &NormalizedEvent) {
        self.track_timestamp(event.timestamp);

        match event.action {
            ActionKind::Deposit => {
                self.total_deposit_usd += event.usd_value;
                self.deposit_count += 1;
            }
            ActionKind::Borrow => {
                self.total_borrow_usd += event.usd_value;
                self.borrow_count += 1;
            }
            ActionKind::Repay => {
                self.total_repay_usd += event.usd_value;
                self.repay_count += 1;
            }
            ActionKind::Redeem => {
                self.total_redeem_usd += event.usd_value;
                self.redeem_count += 1;
            }
            ActionKind::Liquidation => {
                self.liquidation_count += 1;
            }
            ActionKind::Other => {}
        }
    }

    fn track_timestamp(&mut self, ts: DateTime<Utc>) {
        self.timestamps.push(ts);
        self.first_seen = Some(match self.first_seen {
            Some(first) => first.min(ts),
            None => ts,
        });
        self.last_seen = Some(match self.last_seen {
            Some(last) => last.max(ts),
            None => ts,
        });
    }

    /// Combines a partial accumulator for the same wallet, e.g. one built
    /// from a different partition of the event log.
    pub fn merge(&mut self, other: &WalletAccumulator) {
        self.total_deposit_usd += other.total_deposit_usd;
        self.total_borrow_usd += other.total_borrow_usd;
        self.total_repay_usd += other.total_repay_usd;
        self.total_redeem_usd += other.total_redeem_usd;

        self.deposit_count += other.deposit_count;
        self.borrow_count += other.borrow_count;
        self.repay_count += other.repay_count;
        self.redeem_count += other.redeem_count;
        self.liquidation_count += other.liquidation_count;

        self.timestamps.extend_from_slice(&other.timestamps);

        if let Some(other_first) = other.first_seen {
            self.first_seen = Some(match self.first_seen {
                Some(self_first) => self_first.min(other_first),
                None => other_first,
            });
        }

        if let Some(other_last) = other.last_seen {
            self.last_seen = Some(match self.last_seen {
                Some(self_last) => self_last.max(other_last),
                None => other_last,
            });
        }
    }

    /// Deposit, borrow, repay and redeem events folded so far.
    pub fn action_count(&self) -> u32 {
        self.deposit_count + self.borrow_count + self.repay_count + self.redeem_count
    }

    pub fn event_count(&self) -> usize {
        self.timestamps.len()
    }
}

/// Behavioral features derived from a finalized accumulator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WalletFeatures {
    pub wallet: String,

    pub total_deposit_usd: f64,
    pub total_borrow_usd: f64,
    pub total_repay_usd: f64,
    pub total_redeem_usd: f64,

    pub deposit_count: u32,
    pub borrow_count: u32,
    pub repay_count: u32,
    pub redeem_count: u32,
    pub liquidation_count: u32,

    pub activity_span_days: i64,
    pub avg_tx_gap_days: f64,

    pub repay_rate: f64,
    pub borrow_to_repay_ratio: f64,
    pub deposit_to_withdraw_ratio: f64,
}
