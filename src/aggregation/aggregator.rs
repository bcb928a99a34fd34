use std::collections::BTreeMap;
use tracing::info;
use crate::models::{NormalizedEvent, WalletAccumulator};

/// Folds the normalized event stream into one accumulator per wallet.
///
/// Accumulators are created lazily on the first event for an address. The
/// result is only handed out by [`WalletAggregator::finish`], once the whole
/// stream has been consumed.
#[derive(Debug, Default)]
pub struct WalletAggregator {
    wallets: BTreeMap<String, WalletAccumulator>,
    events_seen: usize,
}

impl WalletAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest(&mut self, event: &NormalizedEvent) {
        self.wallets
            .entry(event.wallet.clone())
            .or_insert_with(|| WalletAccumulator::new(event.wallet.clone()))
            .record(event);
        self.events_seen += 1;
    }

    pub fn ingest_all<'a, I>(&mut self, events: I)
    where
        I: IntoIterator<Item = &'a NormalizedEvent>,
    {
        for event in events {
            self.ingest(event);
        }
    }

    /// Merges a partial aggregation (e.g. from another partition of the log)
    /// into this one.
    pub fn absorb(&mut self, other: WalletAggregator) {
        for (wallet, partial) in other.wallets {
            match self.wallets.get_mut(&wallet) {
                Some(existing) => existing.merge(&partial),
                None => {
                    self.wallets.insert(wallet, partial);
                }
            }
        }
        self.events_seen += other.events_seen;
    }

    pub fn unique_wallets(&self) -> usize {
        self.wallets.len()
    }

    pub fn event_count(&self) -> usize {
        self.events_seen
    }

    pub fn finish(self) -> BTreeMap<String, WalletAccumulator> {
        info!(
            "Aggregated {} events into {} wallets",
            self.events_seen,
            self.wallets.len()
        );
        self.wallets
    }
}

/// Single sequential pass over `events`.
pub fn aggregate(events: &[NormalizedEvent]) -> BTreeMap<String, WalletAccumulator> {
    let mut aggregator = WalletAggregator::new();
    aggregator.ingest_all(events);
    aggregator.finish()
}
