//! Data preprocessing module
//!
//! Provides the standard scaler shared by training and inference.

mod scaler;

pub use scaler::{ScaledVector, ScalerParams, StandardScaler};
