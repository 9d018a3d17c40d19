// Core modules
pub mod backtest;
pub mod config;
pub mod controller;
pub mod error;
pub mod execution;
pub mod host;
pub mod indicators;
pub mod models;
pub mod risk;
pub mod strategy;

// Re-export commonly used types
pub use config::S1Config;
pub use controller::{PositionController, RefreshReport, TickOutcome};
pub use error::ControllerError;
pub use host::{MarketDataFeed, OrderGateway, PortfolioView, SymbolMetadata, TradingHost};
pub use models::*;
