//! Standard (z-score) feature scaling

use crate::error::{HeartwiseError, Result};
use crate::features::{FeatureVector, FEATURE_NAMES, N_FEATURES};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Fitted parameters for one feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub feature: String,
    pub mean: f64,
    /// Population standard deviation (ddof = 0)
    pub std: f64,
}

impl ScalerParams {
    fn scale(&self, v: f64) -> f64 {
        // zero-variance features collapse to 0 after centering
        if self.std == 0.0 {
            0.0
        } else {
            (v - self.mean) / self.std
        }
    }

    fn unscale(&self, v: f64) -> f64 {
        v * self.std + self.mean
    }
}

/// Feature vector after standard scaling
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledVector(Array1<f64>);

impl ScaledVector {
    pub fn new(values: Array1<f64>) -> Self {
        Self(values)
    }

    pub fn view(&self) -> ArrayView1<'_, f64> {
        self.0.view()
    }

    pub fn as_array(&self) -> &Array1<f64> {
        &self.0
    }
}

/// Standard scaler: `(x - mean) / std` per feature.
///
/// Constructed only by fitting (or loading), so a value of this type is
/// always fitted and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    params: Vec<ScalerParams>,
    n_samples_seen: usize,
}

impl StandardScaler {
    /// Fit on a `(n_samples, 13)` matrix whose columns follow the feature contract
    pub fn fit(rows: &Array2<f64>) -> Result<Self> {
        if rows.nrows() == 0 {
            return Err(HeartwiseError::EmptyDataset(
                "cannot fit scaler on zero rows".to_string(),
            ));
        }
        if rows.ncols() != N_FEATURES {
            return Err(HeartwiseError::ShapeError {
                expected: format!("{} columns", N_FEATURES),
                actual: format!("{} columns", rows.ncols()),
            });
        }

        let n = rows.nrows() as f64;
        let params = rows
            .axis_iter(Axis(1))
            .zip(FEATURE_NAMES.iter())
            .map(|(col, name)| {
                // A constant column gets an exact zero std, not summation noise
                let first = col[0];
                if col.iter().all(|&v| v == first) {
                    return ScalerParams {
                        feature: name.to_string(),
                        mean: first,
                        std: 0.0,
                    };
                }
                let mean = col.sum() / n;
                let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                ScalerParams {
                    feature: name.to_string(),
                    mean,
                    std: var.sqrt(),
                }
            })
            .collect();

        Ok(Self {
            params,
            n_samples_seen: rows.nrows(),
        })
    }

    /// Scale one feature vector
    pub fn transform(&self, v: &FeatureVector) -> ScaledVector {
        let scaled = v
            .values()
            .iter()
            .zip(self.params.iter())
            .map(|(&x, p)| p.scale(x))
            .collect::<Array1<f64>>();
        ScaledVector(scaled)
    }

    /// Scale every row of a matrix
    pub fn transform_array(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.params.len() {
            return Err(HeartwiseError::ShapeError {
                expected: format!("{} columns", self.params.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }
        let mut out = x.clone();
        for (mut col, p) in out.axis_iter_mut(Axis(1)).zip(self.params.iter()) {
            col.mapv_inplace(|v| p.scale(v));
        }
        Ok(out)
    }

    /// Map a scaled vector back to raw units.
    ///
    /// Zero-variance features come back as their training mean.
    pub fn inverse_transform(&self, v: &ScaledVector) -> FeatureVector {
        let mut values = [0.0; N_FEATURES];
        for ((slot, &s), p) in values.iter_mut().zip(v.0.iter()).zip(self.params.iter()) {
            *slot = p.unscale(s);
        }
        FeatureVector::new(values)
    }

    pub fn params(&self) -> &[ScalerParams] {
        &self.params
    }

    pub fn means(&self) -> Array1<f64> {
        self.params.iter().map(|p| p.mean).collect()
    }

    pub fn stds(&self) -> Array1<f64> {
        self.params.iter().map(|p| p.std).collect()
    }

    pub fn n_samples_seen(&self) -> usize {
        self.n_samples_seen
    }

    /// Check that loaded parameters still match the feature contract
    pub fn check_integrity(&self) -> Result<()> {
        if self.params.len() != N_FEATURES {
            return Err(HeartwiseError::ShapeError {
                expected: format!("{} scaler entries", N_FEATURES),
                actual: format!("{} scaler entries", self.params.len()),
            });
        }
        for (p, expected) in self.params.iter().zip(FEATURE_NAMES.iter()) {
            if p.feature != *expected {
                return Err(HeartwiseError::FeatureNotFound(format!(
                    "scaler expects `{}` at this position, found `{}`",
                    expected, p.feature
                )));
            }
            if !p.mean.is_finite() || !p.std.is_finite() || p.std < 0.0 {
                return Err(HeartwiseError::InvalidParameter {
                    name: format!("scaler.{}", p.feature),
                    value: format!("mean={}, std={}", p.mean, p.std),
                    reason: "must be finite with non-negative std".to_string(),
                });
            }
        }
        Ok(())
    }
}
