//! Fraud detection toolkit math utilities.

pub mod math;

pub use math::histogram::*;
pub use math::kolmogorov::*;
pub use math::quantile::*;
pub use math::stable::*;
