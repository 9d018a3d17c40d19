use crate::error::ControllerError;
use serde::{Deserialize, Serialize};

/// Upper bound for `refresh_interval_secs` (one year)
pub const MAX_REFRESH_INTERVAL_SECS: i64 = 365 * 86_400;

/// Configuration for the S1 position controller
///
/// Immutable once the controller is built. Loaded from defaults, an optional
/// `s1.toml` and `S1_*` environment variables (e.g. `S1_LOOKBACK_DAYS=30`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct S1Config {
    /// Trading pair, base asset first (e.g. "BNB/USDT")
    pub symbol: String,

    /// Number of completed daily candles in the high/low band
    pub lookback_days: usize,

    /// Allocation to sell down to when price breaks above the band
    pub sell_target_pct: f64,

    /// Allocation to buy up to when price breaks below the band
    pub buy_target_pct: f64,

    /// Minimum seconds between band refreshes (just under a day)
    pub refresh_interval_secs: i64,

    /// Tag attached to every trade record this controller produces
    pub strategy_tag: String,

    // Trend confirmation
    pub short_ema_period: usize,
    pub long_ema_period: usize,
    pub long_trend_ema_period: usize,
    pub long_trend_buffer: usize,

    /// Decimals used when the exchange offers no precision rule
    pub fallback_amount_decimals: u32,

    /// Sizes at or below this are dust and never traded
    pub min_trade_size: f64,
}

impl Default for S1Config {
    fn default() -> Self {
        Self {
            symbol: "BNB/USDT".to_string(),
            lookback_days: 52,
            sell_target_pct: 0.50,
            buy_target_pct: 0.70,
            refresh_interval_secs: 86_040, // 23.9 hours
            strategy_tag: "S1".to_string(),
            short_ema_period: 12,
            long_ema_period: 26,
            long_trend_ema_period: 200,
            long_trend_buffer: 50,
            fallback_amount_decimals: 3,
            min_trade_size: 1e-9,
        }
    }
}

impl S1Config {
    /// Load configuration from `s1.toml` (optional) and `S1_*` environment variables
    pub fn load() -> Result<Self, ControllerError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("s1").required(false))
            .add_source(config::Environment::with_prefix("S1").try_parsing(true))
            .build()
            .map_err(|e| ControllerError::InvalidConfig(e.to_string()))?;

        let cfg: S1Config = settings
            .try_deserialize()
            .map_err(|e| ControllerError::InvalidConfig(e.to_string()))?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ControllerError> {
        if self.lookback_days < 1 {
            return Err(ControllerError::InvalidConfig(
                "lookback_days must be at least 1".to_string(),
            ));
        }

        for (name, pct) in [
            ("sell_target_pct", self.sell_target_pct),
            ("buy_target_pct", self.buy_target_pct),
        ] {
            if !pct.is_finite() || pct <= 0.0 || pct >= 1.0 {
                return Err(ControllerError::InvalidConfig(format!(
                    "{} must be within (0, 1), got {}",
                    name, pct
                )));
            }
        }

        if self.refresh_interval_secs <= 0 || self.refresh_interval_secs > MAX_REFRESH_INTERVAL_SECS {
            return Err(ControllerError::InvalidConfig(format!(
                "refresh_interval_secs must be within 1..={}, got {}",
                MAX_REFRESH_INTERVAL_SECS, self.refresh_interval_secs
            )));
        }

        if self.short_ema_period == 0 || self.short_ema_period >= self.long_ema_period {
            return Err(ControllerError::InvalidConfig(format!(
                "short EMA period ({}) must be non-zero and below long EMA period ({})",
                self.short_ema_period, self.long_ema_period
            )));
        }

        if self.long_trend_ema_period == 0 {
            return Err(ControllerError::InvalidConfig(
                "long_trend_ema_period must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Base asset of the pair ("BNB" for "BNB/USDT")
    pub fn base_asset(&self) -> &str {
        self.symbol.split('/').next().unwrap_or(&self.symbol)
    }

    /// How many daily candles the level tracker requests
    pub fn daily_fetch_count(&self) -> usize {
        self.lookback_days + 2
    }

    /// Daily candles requested for the long-term EMA
    pub fn long_trend_fetch_count(&self) -> usize {
        self.long_trend_ema_period + self.long_trend_buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = S1Config::default();
        assert_eq!(cfg.lookback_days, 52);
        assert_eq!(cfg.sell_target_pct, 0.50);
        assert_eq!(cfg.buy_target_pct, 0.70);
        assert_eq!(cfg.refresh_interval_secs, 86_040);
        assert_eq!(cfg.daily_fetch_count(), 54);
        assert_eq!(cfg.long_trend_fetch_count(), 250);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_base_asset() {
        let cfg = S1Config::default();
        assert_eq!(cfg.base_asset(), "BNB");

        let cfg = S1Config {
            symbol: "SOL".to_string(),
            ..Default::default()
        };
        assert_eq!(cfg.base_asset(), "SOL");
    }

    #[test]
    fn test_validate_rejects_bad_targets() {
        let cfg = S1Config {
            sell_target_pct: 1.5,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(ControllerError::InvalidConfig(_))));

        let cfg = S1Config {
            buy_target_pct: f64::NAN,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_periods() {
        let cfg = S1Config {
            lookback_days: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = S1Config {
            short_ema_period: 26,
            long_ema_period: 12,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_refresh_interval() {
        for secs in [0, -1, MAX_REFRESH_INTERVAL_SECS + 1, i64::MAX] {
            let cfg = S1Config {
                refresh_interval_secs: secs,
                ..Default::default()
            };
            assert!(cfg.validate().is_err(), "{}", secs);
        }

        let cfg = S1Config {
            refresh_interval_secs: MAX_REFRESH_INTERVAL_SECS,
            ..Default::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let cfg: S1Config = serde_json::from_str(r#"{"lookback_days": 30}"#).unwrap();
        assert_eq!(cfg.lookback_days, 30);
        assert_eq!(cfg.buy_target_pct, 0.70);
        assert_eq!(cfg.strategy_tag, "S1");
    }
}
