// Position control strategy: reference band, trend gate, rebalance rule
pub mod level_tracker;
pub mod rebalance;
pub mod trend;

pub use level_tracker::{compute_band, BandState, LevelTracker};
pub use rebalance::{Decision, PortfolioSnapshot, RebalanceAction, RebalanceEngine};
pub use trend::{TrendAnalyzer, TrendState};
