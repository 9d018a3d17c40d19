// Order execution module
pub mod executor;
pub mod precision;

pub use executor::AdjustmentExecutor;
pub use precision::{AmountPrecision, FloorPrecision, StepPrecision};
