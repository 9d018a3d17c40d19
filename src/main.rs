use std::sync::Arc;

use clap::Parser;
use s1_controller::backtest::{
    MarketScenario, PaperTrader, ReplayRunner, ReplaySummary, SyntheticDataGenerator,
};
use s1_controller::execution::StepPrecision;
use s1_controller::{S1Config, SymbolLimits};
use tracing_subscriber::EnvFilter;

/// Replay a synthetic market through the S1 position controller
#[derive(Debug, Parser)]
#[command(name = "s1-controller", version, about)]
struct Args {
    /// Market scenario to generate
    #[arg(long, value_enum, default_value = "crash-recovery")]
    scenario: MarketScenario,

    /// Days of hourly data to generate (must exceed the lookback)
    #[arg(long, default_value_t = 400)]
    days: usize,

    /// RNG seed for reproducible runs
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Starting quote balance
    #[arg(long, default_value_t = 5_000.0)]
    quote: f64,

    /// Starting base asset balance
    #[arg(long, default_value_t = 8.0)]
    base: f64,

    /// Proportional fee charged per fill
    #[arg(long, default_value_t = 0.001)]
    fee: f64,

    /// Exchange lot step for order amounts (default: floor to 3 decimals)
    #[arg(long)]
    lot_step: Option<f64>,

    /// Exchange minimum order value in quote currency
    #[arg(long)]
    min_notional: Option<f64>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let args = Args::parse();
    let config = S1Config::load()?;

    tracing::info!("🚀 S1 position controller replay starting");
    tracing::info!("\n📊 Configuration:");
    tracing::info!("  Symbol: {}", config.symbol);
    tracing::info!("  Lookback: {} days", config.lookback_days);
    tracing::info!("  Sell target: {:.0}%", config.sell_target_pct * 100.0);
    tracing::info!("  Buy target: {:.0}%", config.buy_target_pct * 100.0);
    tracing::info!("  Scenario: {:?}, {} days, seed {}", args.scenario, args.days, args.seed);

    let hourly = SyntheticDataGenerator::new(args.seed).generate(args.scenario, args.days * 24, 60);
    let mut trader =
        PaperTrader::new(config.base_asset(), hourly, args.quote, args.base).with_fee_rate(args.fee);
    if let Some(step) = args.lot_step {
        trader = trader.with_precision(Arc::new(StepPrecision::new(step)));
    }
    if let Some(min_notional) = args.min_notional {
        trader = trader.with_limits(Some(SymbolLimits {
            min_notional,
            ..Default::default()
        }));
    }
    let trader = Arc::new(trader);

    let summary = ReplayRunner::new(config).run(trader.clone()).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
        for trade in trader.trades() {
            println!(
                "  {} {:<4} {:>12.6} @ {:>10.4}  cost {:>10.2}  fee {:>6.2}  [{}]",
                trade.timestamp.format("%Y-%m-%d %H:%M"),
                trade.side,
                trade.amount,
                trade.price,
                trade.cost,
                trade.fee,
                trade.strategy
            );
        }
    }

    Ok(())
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("s1_controller=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_summary(summary: &ReplaySummary) {
    println!("\n╔═══════════════════════════════════════════════════════╗");
    println!("║              S1 REPLAY SUMMARY                        ║");
    println!("╚═══════════════════════════════════════════════════════╝\n");
    println!("  Ticks:            {}", summary.ticks);
    println!("  Refreshes:        {} ({} with trend gate open)", summary.refreshes, summary.gate_open_refreshes);
    println!("  Buys / Sells:     {} / {}", summary.buys, summary.sells);
    println!("  Rejected:         {}", summary.rejected);
    println!("  Failed:           {}", summary.failed);
    println!("  Aborted ticks:    {}", summary.aborted_ticks);
    println!("  Price:            {:.4} -> {:.4}", summary.start_price, summary.end_price);
    println!("  Portfolio value:  {:.2} -> {:.2} ({:+.2}%)", summary.start_value, summary.end_value, summary.return_pct());
    println!("  Final allocation: {:.2}%\n", summary.final_position_ratio * 100.0);
}
