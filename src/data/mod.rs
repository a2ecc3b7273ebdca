//! Data layer: loading the rainfall table, resolving region queries and
//! aggregating them into annual series.

mod aggregate;
mod comparison;
mod models;
mod normalize;
mod resolver;
mod storage;
#[cfg(test)]
pub(crate) mod testdata;

pub use aggregate::{annual_series, average_over_period, linear_fit, trend_slope};
pub use comparison::compare;
pub use models::{AnnualSeries, LinearFit};
pub use resolver::resolve;
pub use storage::Dataset;
