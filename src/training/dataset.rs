//! Training dataset assembly: column selection, row cleaning, label binarization

use crate::error::{HeartwiseError, Result};
use crate::features::{FeatureVector, FEATURE_NAMES, N_FEATURES};
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use tracing::debug;

/// Collapse a raw severity target into {0, 1}
pub fn binarize(raw_target: f64) -> f64 {
    if raw_target > 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Row bookkeeping from the cleaning step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanStats {
    pub rows_loaded: usize,
    pub rows_dropped: usize,
}

impl CleanStats {
    pub fn rows_kept(&self) -> usize {
        self.rows_loaded - self.rows_dropped
    }
}

/// Complete rows ready for training
#[derive(Debug, Clone)]
pub struct TrainingDataset {
    /// `(n_rows, 13)` features in contract order
    pub features: Array2<f64>,
    /// Binarized labels
    pub labels: Array1<f64>,
}

impl TrainingDataset {
    /// Build from a loaded frame.
    ///
    /// Features are taken by name in contract order, so CSV column order and
    /// extra columns do not matter. A row with any missing or unparseable
    /// feature or target is dropped.
    pub fn from_frame(df: &DataFrame, target_column: &str) -> Result<(Self, CleanStats)> {
        let mut columns: Vec<Float64Chunked> = Vec::with_capacity(N_FEATURES + 1);
        let mut names: Vec<&str> = FEATURE_NAMES.to_vec();
        names.push(target_column);
        for name in names {
            let column = df
                .column(name)
                .map_err(|_| HeartwiseError::FeatureNotFound(name.to_string()))?;
            let cast = column.cast(&DataType::Float64)?;
            columns.push(cast.as_materialized_series().f64()?.clone());
        }

        let rows_loaded = df.height();
        let mut features = Vec::with_capacity(rows_loaded * N_FEATURES);
        let mut labels = Vec::with_capacity(rows_loaded);

        'rows: for i in 0..rows_loaded {
            let mut row = [0.0; N_FEATURES + 1];
            for (slot, ca) in row.iter_mut().zip(columns.iter()) {
                match ca.get(i) {
                    Some(v) if v.is_finite() => *slot = v,
                    _ => continue 'rows,
                }
            }
            features.extend_from_slice(&row[..N_FEATURES]);
            labels.push(binarize(row[N_FEATURES]));
        }

        let stats = CleanStats {
            rows_loaded,
            rows_dropped: rows_loaded - labels.len(),
        };
        debug!(
            rows_loaded = stats.rows_loaded,
            rows_dropped = stats.rows_dropped,
            "Dropped incomplete rows"
        );

        let dataset = Self {
            features: Array2::from_shape_vec((labels.len(), N_FEATURES), features)?,
            labels: Array1::from_vec(labels),
        };
        Ok((dataset, stats))
    }

    /// Build from validated vectors and raw (unbinarized) targets
    pub fn from_rows(rows: &[(FeatureVector, f64)]) -> Result<Self> {
        let flat: Vec<f64> = rows
            .iter()
            .flat_map(|(v, _)| v.values().iter().copied())
            .collect();
        Ok(Self {
            features: Array2::from_shape_vec((rows.len(), N_FEATURES), flat)?,
            labels: rows.iter().map(|(_, t)| binarize(*t)).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of positive (label 1) rows
    pub fn n_positive(&self) -> usize {
        self.labels.iter().filter(|&&v| v == 1.0).count()
    }

    /// Rows at the given indices, in index order
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            features: self.features.select(Axis(0), indices),
            labels: self.labels.select(Axis(0), indices),
        }
    }
}
