use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Final integer score for one wallet, in `[0, score_ceiling]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoredWallet {
    pub wallet: String,
    pub score: u32,
}

impl ScoredWallet {
    pub fn new(wallet: impl Into<String>, score: u32) -> Self {
        Self {
            wallet: wallet.into(),
            score,
        }
    }

    /// Presentation order: highest score first, ties by address.
    pub fn ranking(a: &ScoredWallet, b: &ScoredWallet) -> Ordering {
        b.score.cmp(&a.score).then_with(|| a.wallet.cmp(&b.wallet))
    }
}
