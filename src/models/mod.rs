use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// OHLCV candlestick, ordered oldest to newest wherever a series is passed around
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Order side
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "buy",
            TradeSide::Sell => "sell",
        }
    }
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Three-valued trend reading: a missing input is `Unknown`, never `Bearish`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TrendSignal {
    Bullish,
    Bearish,
    #[default]
    Unknown,
}

impl TrendSignal {
    pub fn from_bool(bullish: bool) -> Self {
        if bullish {
            TrendSignal::Bullish
        } else {
            TrendSignal::Bearish
        }
    }

    pub fn is_bullish(&self) -> bool {
        matches!(self, TrendSignal::Bullish)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, TrendSignal::Unknown)
    }
}

impl std::fmt::Display for TrendSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendSignal::Bullish => write!(f, "bullish"),
            TrendSignal::Bearish => write!(f, "bearish"),
            TrendSignal::Unknown => write!(f, "unknown"),
        }
    }
}

/// Exchange order limits for the traded symbol
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SymbolLimits {
    /// Minimum order value in quote currency
    pub min_notional: f64,
    /// Minimum order size in base asset
    pub min_amount: f64,
}

impl Default for SymbolLimits {
    fn default() -> Self {
        Self {
            min_notional: 10.0,
            min_amount: 0.0001,
        }
    }
}

/// What the trading collaborator reports back after placing an order.
/// Anything the exchange left out is `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderFill {
    pub id: String,
    pub price: Option<f64>,
    pub filled: Option<f64>,
    pub cost: Option<f64>,
    pub fee: Option<f64>,
}

/// Trade record tagged with the originating strategy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeRecord {
    pub id: Uuid,
    pub order_id: String,
    pub strategy: String,
    pub side: TradeSide,
    pub price: f64,
    pub amount: f64,
    pub cost: f64,
    pub fee: f64,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_signal_states() {
        assert!(TrendSignal::Bullish.is_bullish());
        assert!(TrendSignal::Bullish.is_known());
        assert!(!TrendSignal::Bearish.is_bullish());
        assert!(TrendSignal::Bearish.is_known());
        assert!(!TrendSignal::Unknown.is_bullish());
        assert!(!TrendSignal::Unknown.is_known());
        assert_eq!(TrendSignal::default(), TrendSignal::Unknown);
        assert_eq!(TrendSignal::from_bool(false), TrendSignal::Bearish);
    }

    #[test]
    fn test_default_symbol_limits() {
        let limits = SymbolLimits::default();
        assert_eq!(limits.min_notional, 10.0);
        assert_eq!(limits.min_amount, 0.0001);
    }

    #[test]
    fn test_trade_side_display() {
        assert_eq!(TradeSide::Buy.to_string(), "buy");
        assert_eq!(TradeSide::Sell.as_str(), "sell");
    }
}
