use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use foodprint::config::AppConfig;
use foodprint::error::EngineError;
use foodprint::scoring::augment::ChatCompletionAugmenter;
use foodprint::scoring::{
    ImpactScorer, InMemoryMetricsProvider, ScoreRequest, TrendRequest, UserId, WeeklyMetrics,
};
use foodprint::telemetry;

/// Per-user, per-week metrics keyed by user id then week-start date.
type MetricsFixture = BTreeMap<String, BTreeMap<NaiveDate, WeeklyMetrics>>;

#[derive(Parser, Debug)]
#[command(
    name = "foodprint",
    about = "Compute weekly sustainability impact scores from a metrics file",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score one week and print the snapshot, insights, and steps
    Score(ScoreArgs),
    /// Score the most recent weeks and print the trend series
    Trend(TrendArgs),
}

#[derive(Args, Debug)]
struct ScoreArgs {
    /// JSON file with per-user, per-week metrics
    #[arg(long)]
    metrics: PathBuf,
    /// User to score
    #[arg(long)]
    user: String,
    /// Week-start date (YYYY-MM-DD)
    #[arg(long)]
    week: NaiveDate,
    /// Ask the configured generative-text service to phrase the insights
    #[arg(long)]
    ai: bool,
}

#[derive(Args, Debug)]
struct TrendArgs {
    /// JSON file with per-user, per-week metrics
    #[arg(long)]
    metrics: PathBuf,
    /// User to score
    #[arg(long)]
    user: String,
    /// Most recent week-start date (YYYY-MM-DD)
    #[arg(long)]
    week: NaiveDate,
    /// Number of consecutive weeks to score
    #[arg(long, default_value_t = 4)]
    weeks: u32,
}

fn main() -> Result<(), EngineError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match Cli::parse().command {
        Command::Score(args) => run_score(&config, args),
        Command::Trend(args) => run_trend(args),
    }
}

fn run_score(config: &AppConfig, args: ScoreArgs) -> Result<(), EngineError> {
    let provider = load_provider(&args.metrics)?;
    let mut scorer = ImpactScorer::new(Arc::new(provider));

    if args.ai && config.augmentation.is_available() {
        match ChatCompletionAugmenter::from_config(&config.augmentation) {
            Ok(augmenter) => scorer = scorer.with_augmenter(Arc::new(augmenter)),
            Err(err) => info!(error = %err, "augmentation unavailable, continuing rule-based"),
        }
    }

    let request = ScoreRequest::new(UserId(args.user), args.week).with_ai(args.ai);
    let report = scorer.compute_score(&request)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_trend(args: TrendArgs) -> Result<(), EngineError> {
    let provider = load_provider(&args.metrics)?;
    let scorer = ImpactScorer::new(Arc::new(provider));
    let request = TrendRequest::new(UserId(args.user), args.week, args.weeks);
    let series = scorer.trend(&request)?;
    println!("{}", serde_json::to_string_pretty(series.oldest_first())?);
    Ok(())
}

fn load_provider(path: &PathBuf) -> Result<InMemoryMetricsProvider, EngineError> {
    let raw = std::fs::read_to_string(path)?;
    let fixture: MetricsFixture = serde_json::from_str(&raw)?;

    let mut provider = InMemoryMetricsProvider::new();
    for (user, weeks) in fixture {
        for (week_start, metrics) in weeks {
            provider.insert(UserId(user.clone()), week_start, metrics);
        }
    }
    info!(entries = provider.len(), "loaded metrics fixture");
    Ok(provider)
}
