// Technical indicators module
// EMA and MACD primitives used for trend confirmation

pub mod macd;
pub mod moving_average;

pub use macd::{calculate_macd, Macd};
pub use moving_average::{calculate_ema, calculate_ema_series, calculate_sma};
