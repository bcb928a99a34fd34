use clap::{Parser, Subcommand};
use wallet_scorer::{
    config::Settings,
    ingest::JsonFileSource,
    output::{ScoreDistribution, ScoreTable},
    scoring::ScoreCalculator,
};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(name = "wallet-scorer")]
#[clap(about = "Score lending-protocol wallets by repayment behavior", long_about = None)]
struct Cli {
    /// Settings file (defaults to config/default and config/local)
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every wallet in a transaction log
    Score {
        /// JSON transaction log
        #[clap(short, long)]
        input: Option<PathBuf>,

        /// Destination for the wallet,score table
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// Count transactions and unique wallets in a transaction log
    Stats {
        /// JSON transaction log
        #[clap(short, long)]
        input: Option<PathBuf>,
    },

    /// Print the score histogram of a written score table
    Distribution {
        /// wallet,score table
        #[clap(short, long)]
        scores: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (settings, load_error) = match &cli.config {
        Some(path) => (Settings::from_file(path)?, None),
        None => Settings::load_or_default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.app.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(e) = load_error {
        warn!("Could not load settings ({}), using defaults", e);
    }

    if let Err(e) = settings.validate() {
        error!("Invalid settings: {}", e);
        return Err(e.into());
    }

    match cli.command {
        Commands::Score { input, output } => {
            let input = input.unwrap_or_else(|| settings.paths.input.clone());
            let output = output.unwrap_or_else(|| settings.paths.output.clone());

            let calculator = ScoreCalculator::new(settings.scoring.clone());
            let report = calculator.run(&JsonFileSource::new(&input))?;
            report.table.write_csv(&output)?;

            info!("Loaded {} transactions", report.transactions_loaded);
            info!("Unique wallets in data: {}", report.unique_wallets);
            println!(
                "Done! {} wallets scored. Output saved to '{}'.",
                report.table.len(),
                output.display()
            );
            if report.records_rejected + report.events_dropped > 0 {
                println!(
                    "Skipped {} malformed records and {} events with unparseable amounts.",
                    report.records_rejected, report.events_dropped
                );
            }
        }

        Commands::Stats { input } => {
            let input = input.unwrap_or_else(|| settings.paths.input.clone());
            let summary = ScoreCalculator::summarize(&JsonFileSource::new(&input))?;

            println!("Total transactions: {}", summary.transactions);
            println!("Unique wallets: {}", summary.unique_wallets);
            if summary.records_rejected > 0 {
                println!("Malformed records skipped: {}", summary.records_rejected);
            }
        }

        Commands::Distribution { scores } => {
            let path = scores.unwrap_or_else(|| settings.paths.output.clone());
            let table = ScoreTable::read_csv(&path)?;
            let distribution = ScoreDistribution::from_scores(
                table.scores(),
                settings.distribution.bin_width,
                settings.scoring.score_ceiling,
            );

            println!("Wallet score distribution ({} wallets)", table.len());
            print!("{}", distribution);
        }
    }

    Ok(())
}
