/// Rounds a raw base-asset amount to what the exchange accepts
pub trait AmountPrecision: Send + Sync {
    fn adjust(&self, raw_amount: f64) -> f64;
}

/// Floors to a fixed number of decimals. Used when the host has no precision rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloorPrecision {
    decimals: u32,
}

impl FloorPrecision {
    pub fn new(decimals: u32) -> Self {
        Self { decimals }
    }
}

impl Default for FloorPrecision {
    fn default() -> Self {
        Self::new(3)
    }
}

impl AmountPrecision for FloorPrecision {
    fn adjust(&self, raw_amount: f64) -> f64 {
        let factor = 10f64.powi(self.decimals as i32);
        (raw_amount * factor).floor() / factor
    }
}

/// Floors to a multiple of the exchange's lot step (e.g. 0.01)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepPrecision {
    step: f64,
}

impl StepPrecision {
    pub fn new(step: f64) -> Self {
        Self { step }
    }
}

impl AmountPrecision for StepPrecision {
    fn adjust(&self, raw_amount: f64) -> f64 {
        if !(self.step > 0.0) {
            return raw_amount;
        }
        // Nudge before flooring so exact multiples survive float error
        let steps = (raw_amount / self.step + 1e-9).floor();
        steps * self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_three_decimals() {
        let precision = FloorPrecision::default();
        assert_eq!(precision.adjust(1.5151515), 1.515);
        assert_eq!(precision.adjust(2.0833333), 2.083);
        assert_eq!(precision.adjust(0.0009), 0.0);
    }

    #[test]
    fn test_floor_never_rounds_up() {
        let precision = FloorPrecision::new(2);
        assert_eq!(precision.adjust(0.999), 0.99);
    }

    #[test]
    fn test_step_precision() {
        let precision = StepPrecision::new(0.01);
        assert!((precision.adjust(1.2345) - 1.23).abs() < 1e-12);
        assert!((precision.adjust(0.3) - 0.3).abs() < 1e-12);
        assert_eq!(precision.adjust(0.005), 0.0);
    }
}
