// Replay harness: synthetic markets, paper trading host, controller replay
pub mod paper;
pub mod runner;
pub mod synthetic;

pub use paper::PaperTrader;
pub use runner::{ReplayRunner, ReplaySummary};
pub use synthetic::{aggregate_daily, merge_candles, MarketScenario, SyntheticDataGenerator};
