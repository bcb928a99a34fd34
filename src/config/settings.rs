use serde::{Deserialize, Serialize};
use config::{Config, ConfigError, File};
use std::path::{Path, PathBuf};
use crate::models::WalletScoreError;
use crate::scoring::ScoringWeights;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub app: AppSettings,
    pub scoring: ScoringWeights,
    pub paths: PathSettings,
    pub distribution: DistributionSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub version: String,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    pub input: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionSettings {
    pub bin_width: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app: AppSettings {
                name: "Wallet Scorer".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                log_level: "info".to_string(),
            },
            scoring: ScoringWeights::default(),
            paths: PathSettings {
                input: PathBuf::from("data/user_transactions.json"),
                output: PathBuf::from("output/wallet_scores.csv"),
            },
            distribution: DistributionSettings {
                bin_width: 100,
            },
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("WALLET_SCORE").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Like `new`, but falls back to the defaults and hands back the load
    /// error so the caller can report it.
    pub fn load_or_default() -> (Self, Option<ConfigError>) {
        match Self::new() {
            Ok(settings) => (settings, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::from(path.as_ref()))
            .build()?;

        s.try_deserialize()
    }

    pub fn validate(&self) -> crate::models::Result<()> {
        self.scoring.validate().map_err(WalletScoreError::ConfigError)?;

        if self.distribution.bin_width == 0 {
            return Err(WalletScoreError::ConfigError(
                "Distribution bin width must be positive".to_string(),
            ));
        }

        if self.distribution.bin_width > self.scoring.score_ceiling {
            return Err(WalletScoreError::ConfigError(format!(
                "Distribution bin width {} exceeds score ceiling {}",
                self.distribution.bin_width, self.scoring.score_ceiling
            )));
        }

        Ok(())
    }
}
