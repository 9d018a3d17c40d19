use thiserror::Error;

/// Everything that can stop a refresh, a tick or an order inside the controller.
///
/// None of these escape the public pipeline entry points; they are logged and the
/// affected cycle degrades to "no action".
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("insufficient daily candles: got {got}, need at least {needed}")]
    InsufficientCandles { got: usize, needed: usize },

    #[error("invalid candle at {index}: {reason}")]
    InvalidCandle { index: usize, reason: String },

    #[error("invalid current price: {0}")]
    InvalidPrice(f64),

    #[error("invalid total assets value: {0}")]
    InvalidTotalAssets(f64),

    #[error("invalid portfolio reading: {field} = {value}")]
    InvalidPortfolioState { field: &'static str, value: f64 },

    #[error("adjusted amount is not a positive number ({0})")]
    NonPositiveAmount(f64),

    #[error("amount {amount:.8} is below minimum amount limit {min:.8}")]
    BelowMinAmount { amount: f64, min: f64 },

    #[error("order value {notional:.2} is below minimum notional {min:.2}")]
    BelowMinNotional { notional: f64, min: f64 },

    #[error("order was not filled: {0}")]
    OrderNotFilled(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("collaborator failure: {0}")]
    Collaborator(#[from] anyhow::Error),
}

impl ControllerError {
    /// Limit violations reject a single order and are never retried.
    pub fn is_limit_violation(&self) -> bool {
        matches!(
            self,
            ControllerError::NonPositiveAmount(_)
                | ControllerError::BelowMinAmount { .. }
                | ControllerError::BelowMinNotional { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_violation_classification() {
        assert!(ControllerError::BelowMinNotional { notional: 8.0, min: 10.0 }.is_limit_violation());
        assert!(ControllerError::NonPositiveAmount(0.0).is_limit_violation());
        assert!(!ControllerError::InvalidPrice(0.0).is_limit_violation());
        assert!(!ControllerError::Collaborator(anyhow::anyhow!("boom")).is_limit_violation());
    }

    #[test]
    fn test_error_messages() {
        let err = ControllerError::InsufficientCandles { got: 10, needed: 53 };
        assert_eq!(
            err.to_string(),
            "insufficient daily candles: got 10, need at least 53"
        );

        let err = ControllerError::BelowMinNotional { notional: 8.0, min: 10.0 };
        assert!(err.to_string().contains("8.00"));
    }
}
