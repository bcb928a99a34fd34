pub mod aggregator;
pub mod features;

pub use aggregator::{aggregate, WalletAggregator};
pub use features::{derive_features, derive_all};
