use std::collections::BTreeMap;
use crate::models::{WalletAccumulator, WalletFeatures};
use crate::utils::finite_or_zero;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Derives ratios and time-span metrics from a finalized accumulator.
pub fn derive_features(acc: &WalletAccumulator) -> WalletFeatures {
    let total_deposit_usd = finite_or_zero(acc.total_deposit_usd);
    let total_borrow_usd = finite_or_zero(acc.total_borrow_usd);
    let total_repay_usd = finite_or_zero(acc.total_repay_usd);
    let total_redeem_usd = finite_or_zero(acc.total_redeem_usd);

    WalletFeatures {
        wallet: acc.wallet.clone(),
        total_deposit_usd,
        total_borrow_usd,
        total_repay_usd,
        total_redeem_usd,
        deposit_count: acc.deposit_count,
        borrow_count: acc.borrow_count,
        repay_count: acc.repay_count,
        redeem_count: acc.redeem_count,
        liquidation_count: acc.liquidation_count,
        activity_span_days: activity_span_days(acc),
        avg_tx_gap_days: avg_tx_gap_days(acc),
        repay_rate: if acc.borrow_count > 0 {
            acc.repay_count as f64 / acc.borrow_count as f64
        } else {
            0.0
        },
        borrow_to_repay_ratio: guarded_ratio(total_borrow_usd, total_repay_usd),
        deposit_to_withdraw_ratio: guarded_ratio(total_deposit_usd, total_redeem_usd),
    }
}

pub fn derive_all(wallets: &BTreeMap<String, WalletAccumulator>) -> Vec<WalletFeatures> {
    wallets.values().map(derive_features).collect()
}

/// Whole days between first and last activity, truncated.
fn activity_span_days(acc: &WalletAccumulator) -> i64 {
    match (acc.first_seen, acc.last_seen) {
        (Some(first), Some(last)) => (last - first).num_days().max(0),
        _ => 0,
    }
}

/// Mean gap between consecutive events, in fractional days.
///
/// Timestamps are recorded in arrival order, which need not be
/// chronological, so they are sorted before differencing. Duplicate
/// timestamps contribute a zero gap.
fn avg_tx_gap_days(acc: &WalletAccumulator) -> f64 {
    if acc.timestamps.len() < 2 {
        return 0.0;
    }

    let mut sorted = acc.timestamps.clone();
    sorted.sort_unstable();

    let gaps: Vec<f64> = sorted
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_seconds() as f64 / SECONDS_PER_DAY)
        .collect();

    finite_or_zero(gaps.iter().sum::<f64>() / gaps.len() as f64)
}

fn guarded_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        finite_or_zero(numerator / denominator)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActionKind, NormalizedEvent};
    use chrono::{TimeZone, Utc};

    const DAY: i64 = 86_400;

    fn acc_with(events: &[(ActionKind, f64, i64)]) -> WalletAccumulator {
        let mut acc = WalletAccumulator::new("0xabc");
        for (action, usd_value, secs) in events {
            acc.record(&NormalizedEvent {
                wallet: "0xabc".to_string(),
                action: *action,
                usd_value: *usd_value,
                timestamp: Utc.timestamp_opt(*secs, 0).unwrap(),
            });
        }
        acc
    }

    #[test]
    fn test_ratios() {
        let acc = acc_with(&[
            (ActionKind::Deposit, 300.0, 0),
            (ActionKind::Redeem, 100.0, DAY),
            (ActionKind::Borrow, 200.0, 2 * DAY),
            (ActionKind::Borrow, 200.0, 3 * DAY),
            (ActionKind::Repay, 100.0, 4 * DAY),
        ]);
        let f = derive_features(&acc);

        assert_eq!(f.repay_rate, 0.5);
        assert_eq!(f.borrow_to_repay_ratio, 4.0);
        assert_eq!(f.deposit_to_withdraw_ratio, 3.0);
        assert_eq!(f.activity_span_days, 4);
        assert_eq!(f.avg_tx_gap_days, 1.0);
    }

    #[test]
    fn test_zero_denominators_give_zero() {
        let acc = acc_with(&[
            (ActionKind::Deposit, 300.0, 0),
            (ActionKind::Borrow, 200.0, DAY),
        ]);
        let f = derive_features(&acc);

        assert_eq!(f.borrow_to_repay_ratio, 0.0);
        assert_eq!(f.deposit_to_withdraw_ratio, 0.0);

        let acc = acc_with(&[(ActionKind::Repay, 50.0, 0)]);
        let f = derive_features(&acc);
        assert_eq!(f.repay_rate, 0.0);
    }

    #[test]
    fn test_span_truncates_partial_days() {
        let acc = acc_with(&[
            (ActionKind::Deposit, 1.0, 0),
            (ActionKind::Deposit, 1.0, 2 * DAY + DAY / 2),
        ]);
        let f = derive_features(&acc);
        assert_eq!(f.activity_span_days, 2);
        assert_eq!(f.avg_tx_gap_days, 2.5);
    }

    #[test]
    fn test_gap_sorts_out_of_order_timestamps() {
        let acc = acc_with(&[
            (ActionKind::Deposit, 1.0, 4 * DAY),
            (ActionKind::Deposit, 1.0, 0),
            (ActionKind::Deposit, 1.0, 2 * DAY),
        ]);
        assert_eq!(derive_features(&acc).avg_tx_gap_days, 2.0);
    }

    #[test]
    fn test_duplicate_timestamps_count_as_zero_gap() {
        let acc = acc_with(&[
            (ActionKind::Deposit, 1.0, 0),
            (ActionKind::Borrow, 1.0, 0),
            (ActionKind::Repay, 1.0, 2 * DAY),
        ]);
        assert_eq!(derive_features(&acc).avg_tx_gap_days, 1.0);
    }

    #[test]
    fn test_single_event_has_no_gap_or_span() {
        let acc = acc_with(&[(ActionKind::Other, 1.0, 1_000)]);
        let f = derive_features(&acc);
        assert_eq!(f.avg_tx_gap_days, 0.0);
        assert_eq!(f.activity_span_days, 0);
    }

    #[test]
    fn test_empty_accumulator_is_all_zero() {
        let f = derive_features(&WalletAccumulator::new("0xempty"));
        assert_eq!(f.activity_span_days, 0);
        assert_eq!(f.avg_tx_gap_days, 0.0);
        assert_eq!(f.repay_rate, 0.0);
    }

    #[test]
    fn test_non_finite_totals_are_zeroed() {
        let mut acc = acc_with(&[(ActionKind::Borrow, 10.0, 0)]);
        acc.total_repay_usd = f64::NAN;
        acc.total_deposit_usd = f64::INFINITY;
        let f = derive_features(&acc);

        assert_eq!(f.total_repay_usd, 0.0);
        assert_eq!(f.total_deposit_usd, 0.0);
        assert_eq!(f.borrow_to_repay_ratio, 0.0);
        assert!(f.deposit_to_withdraw_ratio.is_finite());
    }
}
