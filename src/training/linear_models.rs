//! Linear model implementations

use crate::error::{HeartwiseError, Result};
use crate::preprocessing::ScaledVector;
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Numerically stable logistic function
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Decision threshold on the positive-class probability
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Logistic regression for binary classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Fitted coefficients
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept
    pub intercept: Option<f64>,
    /// Regularization strength (L2)
    pub alpha: f64,
    /// Maximum iterations
    pub max_iter: usize,
    /// Convergence tolerance
    pub tol: f64,
    /// Learning rate
    pub learning_rate: f64,
    /// Iterations used by the last fit
    #[serde(default)]
    pub n_iter: usize,
    /// Whether model is fitted
    pub is_fitted: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    /// Create a new logistic regression model
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            alpha: 0.01,
            max_iter: 1000,
            tol: 1e-6,
            learning_rate: 0.1,
            n_iter: 0,
            is_fitted: false,
        }
    }

    /// Set regularization strength
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set maximum iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set learning rate
    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Set convergence tolerance
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Fit the model using full-batch gradient descent on the L2-penalized log loss.
    ///
    /// Labels must be 0 or 1.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples == 0 {
            return Err(HeartwiseError::EmptyDataset(
                "cannot fit classifier on zero rows".to_string(),
            ));
        }
        if n_samples != y.len() {
            return Err(HeartwiseError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if let Some(bad) = y.iter().find(|&&v| v != 0.0 && v != 1.0) {
            return Err(HeartwiseError::TrainingError(format!(
                "labels must be binarized to 0/1, found {}",
                bad
            )));
        }

        let mut weights = Array1::zeros(n_features);
        let mut bias = 0.0;

        let lr = self.learning_rate;
        let alpha = self.alpha;
        let mut iterations = 0;

        for _iter in 0..self.max_iter {
            iterations += 1;

            // Forward pass
            let linear = x.dot(&weights) + bias;
            let predictions = linear.mapv(sigmoid);

            // Gradients
            let errors = &predictions - y;
            let dw = (x.t().dot(&errors) / n_samples as f64) + (alpha * &weights);
            let db = errors.mean().unwrap_or(0.0);

            let grad_norm = (dw.mapv(|v| v * v).sum() + db * db).sqrt();
            if grad_norm < self.tol {
                break;
            }

            weights = weights - lr * dw;
            bias -= lr * db;
        }

        self.coefficients = Some(weights);
        self.intercept = Some(bias);
        self.n_iter = iterations;
        self.is_fitted = true;

        Ok(self)
    }

    fn fitted_params(&self) -> Result<(&Array1<f64>, f64)> {
        match (&self.coefficients, self.is_fitted) {
            (Some(coefficients), true) => Ok((coefficients, self.intercept.unwrap_or(0.0))),
            _ => Err(HeartwiseError::ModelNotFitted),
        }
    }

    fn check_width(coefficients: &Array1<f64>, width: usize) -> Result<()> {
        if coefficients.len() != width {
            return Err(HeartwiseError::ShapeError {
                expected: format!("{} features", coefficients.len()),
                actual: format!("{} features", width),
            });
        }
        Ok(())
    }

    /// Linear score `w·x + b` for one scaled row
    pub fn decision_function(&self, x: ArrayView1<'_, f64>) -> Result<f64> {
        let (coefficients, intercept) = self.fitted_params()?;
        Self::check_width(coefficients, x.len())?;
        Ok(coefficients.dot(&x) + intercept)
    }

    /// Predict probabilities of the positive class
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let (coefficients, intercept) = self.fitted_params()?;
        Self::check_width(coefficients, x.ncols())?;

        let linear = x.dot(coefficients) + intercept;
        Ok(linear.mapv(sigmoid))
    }

    /// Predict class labels
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p >= DECISION_THRESHOLD { 1.0 } else { 0.0 }))
    }

    /// Probability of the positive class for one scaled vector
    pub fn predict_probability(&self, v: &ScaledVector) -> Result<f64> {
        self.decision_function(v.view()).map(sigmoid)
    }

    /// Class label for one scaled vector
    pub fn predict_label(&self, v: &ScaledVector) -> Result<u8> {
        let p = self.predict_probability(v)?;
        Ok(u8::from(p >= DECISION_THRESHOLD))
    }

    /// Get accuracy score
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let y_pred = self.predict(x)?;

        let correct = y_pred
            .iter()
            .zip(y.iter())
            .filter(|(pred, actual)| (*pred - *actual).abs() < 0.5)
            .count();

        Ok(correct as f64 / y.len() as f64)
    }

    /// Check that a loaded model is usable with `n_features` inputs
    pub fn check_integrity(&self, n_features: usize) -> Result<()> {
        let (coefficients, intercept) = self.fitted_params()?;
        Self::check_width(coefficients, n_features)?;
        if !intercept.is_finite() || coefficients.iter().any(|w| !w.is_finite()) {
            return Err(HeartwiseError::InvalidParameter {
                name: "coefficients".to_string(),
                value: format!("{:?}", coefficients.to_vec()),
                reason: "all parameters must be finite".to_string(),
            });
        }
        Ok(())
    }
}
