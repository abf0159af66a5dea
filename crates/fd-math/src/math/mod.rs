//! Core math modules.

pub mod histogram;
pub mod kolmogorov;
pub mod quantile;
pub mod stable;
