// Exchange order limit checks
pub mod order_limits;
