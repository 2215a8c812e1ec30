use analytics::PerformanceEngine;
use api_client::FallbackMarketData;
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use configuration::{Config, init_tracing, load_config, load_config_from};
use core_types::{SignalRecord, SignalStatus, Timeframe};
use database::{DbRepository, connect, run_migrations};
use engine::{AssetOutcome, QueryResponder, SignalGenerator};
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use signals::SignalConstructor;
use std::sync::Arc;
use uuid::Uuid;

/// The main entry point for the Clon signal application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, if there is one
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    let _log_guard = init_tracing(&config.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Analyze(args) => handle_analyze(args, &config).await,
        Commands::Overview(args) => handle_overview(args, &config).await,
        Commands::Generate => handle_generate(&config).await,
        Commands::Signals(args) => handle_signals(args).await,
        Commands::UpdateStatus(args) => handle_update_status(args).await,
        Commands::Performance(args) => handle_performance(args).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Technical-analysis trade signals for crypto markets.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to `config.toml` in the working directory).
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one symbol on one timeframe.
    Analyze(AnalyzeArgs),
    /// Two-timeframe overview of one symbol with a quick setup.
    Overview(OverviewArgs),
    /// Run one pass over the watchlist and store the resulting signals.
    Generate,
    /// List stored signals.
    Signals(SignalsArgs),
    /// Move a stored signal to a later status.
    UpdateStatus(UpdateStatusArgs),
    /// Track record of resolved signals.
    Performance(PerformanceArgs),
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// The symbol to analyze (e.g., "BTCUSDT").
    #[arg(long)]
    symbol: String,

    /// One of 5m, 15m, 1H, 4H, 1D.
    #[arg(long, default_value = "1H")]
    timeframe: Timeframe,

    /// Print the full report as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct OverviewArgs {
    #[arg(long)]
    symbol: String,

    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum SignalQuery {
    Today,
    Active,
    Closed,
}

#[derive(Parser)]
struct SignalsArgs {
    #[arg(value_enum, default_value = "today")]
    which: SignalQuery,

    /// Maximum number of closed signals to show.
    #[arg(long, default_value_t = 50)]
    limit: i64,
}

#[derive(Parser)]
struct UpdateStatusArgs {
    #[arg(long)]
    id: Uuid,

    /// e.g. "TP1 Hit", "SL Hit", "Closed".
    #[arg(long)]
    status: SignalStatus,

    /// Realized move in percent.
    #[arg(long, allow_hyphen_values = true)]
    result_pct: Option<Decimal>,
}

#[derive(Parser)]
struct PerformanceArgs {
    /// Only count signals closed on or after this date (format: YYYY-MM-DD).
    #[arg(long)]
    since: Option<NaiveDate>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn market_data(config: &Config) -> anyhow::Result<Arc<FallbackMarketData>> {
    Ok(Arc::new(FallbackMarketData::new(&config.market_data)?))
}

fn responder(config: &Config) -> anyhow::Result<QueryResponder> {
    Ok(QueryResponder::new(
        market_data(config)?,
        config.query.clone(),
        config.signals.candle_count,
        config.signals.disclaimer.clone(),
    ))
}

async fn repository() -> anyhow::Result<DbRepository> {
    let pool = connect().await?;
    run_migrations(&pool).await?;
    Ok(DbRepository::new(pool))
}

async fn handle_analyze(args: AnalyzeArgs, config: &Config) -> anyhow::Result<()> {
    let result = responder(config)?
        .analyze_symbol(&args.symbol, args.timeframe)
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!(
        "{} {} | {} ({}% 24h)",
        result.symbol, result.report.timeframe, result.ticker.price, result.ticker.change_24h
    );
    for line in &result.report.summary {
        println!("  {line}");
    }
    println!("\n{}", result.disclaimer);
    Ok(())
}

async fn handle_overview(args: OverviewArgs, config: &Config) -> anyhow::Result<()> {
    let overview = responder(config)?.overview(&args.symbol).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&overview)?);
        return Ok(());
    }

    println!("{} @ {}", overview.symbol, overview.current_price);
    for line in &overview.lines {
        println!("  {line}");
    }
    println!("Bias: {}", overview.bias);
    if let Some(setup) = &overview.setup {
        println!(
            "Setup: {} | Entry {} - {} | Stop {} | Targets {} / {}",
            setup.direction,
            setup.entry.low,
            setup.entry.high,
            setup.stop_loss,
            setup.targets[0],
            setup.targets[1]
        );
    }
    println!();
    for note in &overview.risk_notes {
        println!("- {note}");
    }
    Ok(())
}

async fn handle_generate(config: &Config) -> anyhow::Result<()> {
    let watchlist = config.effective_watchlist();
    tracing::info!(
        schedule = %config.signals.schedule,
        assets = watchlist.len(),
        "Running signal generation"
    );

    let generator = SignalGenerator::new(
        market_data(config)?,
        Arc::new(repository().await?),
        SignalConstructor::new(config.signals.disclaimer.clone()),
        config.signals.candle_count,
    )?;

    // Set up the progress bar
    let progress_bar = ProgressBar::new(watchlist.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let report = generator
        .run_watchlist_with(&watchlist, |entry, outcome| {
            let status = match outcome {
                AssetOutcome::Published(_) => "signal",
                AssetOutcome::Skipped => "neutral",
                AssetOutcome::Failed(_) => "failed",
            };
            progress_bar.set_message(format!("{} {}: {status}", entry.symbol, entry.timeframe));
            progress_bar.inc(1);
        })
        .await;

    progress_bar.finish_with_message("Generation complete!");

    let published: Vec<SignalRecord> = report.published().cloned().collect();
    println!("Generated {} signals.", published.len());
    if !published.is_empty() {
        println!("{}", signal_table(&published));
    }
    for (entry, e) in report.failures() {
        eprintln!("{} {} failed: {e}", entry.symbol, entry.timeframe);
    }
    Ok(())
}

async fn handle_signals(args: SignalsArgs) -> anyhow::Result<()> {
    let repo = repository().await?;
    let records = match args.which {
        SignalQuery::Today => repo.get_todays_signals().await?,
        SignalQuery::Active => repo.get_active_signals().await?,
        SignalQuery::Closed => repo.get_closed_signals(args.limit).await?,
    };

    if records.is_empty() {
        println!("No signals.");
    } else {
        println!("{}", signal_table(&records));
    }
    Ok(())
}

async fn handle_update_status(args: UpdateStatusArgs) -> anyhow::Result<()> {
    let record = repository()
        .await?
        .update_signal_status(args.id, args.status, args.result_pct)
        .await?;
    println!("{}", signal_table(std::slice::from_ref(&record)));
    Ok(())
}

async fn handle_performance(args: PerformanceArgs) -> anyhow::Result<()> {
    let since = args.since.map(|d| d.and_time(NaiveTime::MIN).and_utc());
    let records = repository().await?.get_closed_since(since).await?;
    let perf = PerformanceEngine::new().summarize(&records)?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Resolved signals".to_string(), perf.total.to_string()]);
    table.add_row(vec!["Wins".to_string(), perf.wins.to_string()]);
    table.add_row(vec!["Losses".to_string(), perf.losses.to_string()]);
    table.add_row(vec!["Win rate".to_string(), format!("{}%", perf.win_rate_pct)]);
    table.add_row(vec!["Average result".to_string(), format!("{}%", perf.avg_result_pct)]);
    table.add_row(vec!["Max drawdown".to_string(), format!("{}%", perf.max_drawdown_pct)]);
    println!("{table}");
    Ok(())
}

fn signal_table(records: &[SignalRecord]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Id", "Asset", "TF", "Dir", "Entry", "Stop", "TP1", "TP2", "R:R", "Status", "Created",
    ]);
    for r in records {
        table.add_row(vec![
            r.id.to_string(),
            r.asset.clone(),
            r.timeframe.to_string(),
            r.direction.to_string(),
            format!("{} - {}", r.entry_low, r.entry_high),
            r.stop_loss.to_string(),
            r.target_1.to_string(),
            r.target_2.to_string(),
            r.rr_ratio.clone(),
            r.status.to_string(),
            r.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }
    table
}
