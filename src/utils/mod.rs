//! Utility functions and types

pub mod data_loader;

pub use data_loader::DataLoader;

/// Round to a fixed number of decimal places.
///
/// Rounds the exact decimal expansion of `value` (as Python's `round` does),
/// not the product `value * 10^decimals`, so `0.00035` becomes `0.0003`.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    format!("{:.*}", decimals as usize, value)
        .parse()
        .unwrap_or(value)
}
