//! HTTP request handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Html,
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::features::{RawRecord, EXAMPLE_RECORD, FEATURE_NAMES};
use crate::inference::PredictionResult;

use super::error::{Result, ServerError};
use super::state::AppState;

// ============================================================================
// Inference
// ============================================================================

/// `POST /predict`: one raw record in, `{prediction, probability}` out.
///
/// Any body that is not a JSON object of feature values is treated the same
/// as a record that fails validation.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<RawRecord>, JsonRejection>,
) -> Result<Json<PredictionResult>> {
    let Json(raw) = payload.map_err(|e| ServerError::InvalidInput(e.body_text()))?;
    let result = state.service.predict(&raw)?;
    info!(
        prediction = result.prediction,
        probability = result.probability,
        "Served prediction"
    );
    Ok(Json(result))
}

// ============================================================================
// System
// ============================================================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let uptime = chrono::Utc::now().signed_duration_since(state.started_at);
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": uptime.num_seconds(),
    }))
}

// ============================================================================
// UI Handler
// ============================================================================

pub async fn serve_index() -> Html<String> {
    Html(index_html())
}

/// Form page with one input per feature, in contract order
pub(crate) fn index_html() -> String {
    let fields: String = FEATURE_NAMES
        .iter()
        .zip(EXAMPLE_RECORD.iter())
        .map(|(name, value)| {
            format!(
                "      <label>{name}<input name=\"{name}\" value=\"{value}\" required></label>\n"
            )
        })
        .collect();
    EMBEDDED_INDEX_HTML.replace("{{FIELDS}}", &fields)
}

const EMBEDDED_INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Heart Disease Prediction</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 36rem; margin: 2rem auto; padding: 0 1rem; }
    form { display: grid; grid-template-columns: 1fr 1fr; gap: .5rem 1rem; }
    label { display: flex; justify-content: space-between; align-items: center; gap: .5rem; }
    input { width: 6rem; }
    button { grid-column: 1 / -1; padding: .5rem; }
    #result { margin-top: 1rem; font-weight: 600; }
    .error { color: #b00020; }
  </style>
</head>
<body>
  <h1>Heart Disease Prediction</h1>
  <form id="predict-form">
{{FIELDS}}    <button type="submit">Predict</button>
  </form>
  <div id="result"></div>
  <script>
    const form = document.getElementById('predict-form');
    const out = document.getElementById('result');
    form.addEventListener('submit', async (event) => {
      event.preventDefault();
      const body = Object.fromEntries(new FormData(form).entries());
      out.className = '';
      try {
        const res = await fetch('/predict', {
          method: 'POST',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify(body),
        });
        const data = await res.json();
        if (!res.ok) {
          out.className = 'error';
          out.textContent = data.error || 'Request failed';
          return;
        }
        const label = data.prediction === 1 ? 'Heart disease' : 'No heart disease';
        out.textContent = `Prediction: ${label} (class=${data.prediction}) · ` +
          `Probability of disease: ${(data.probability * 100).toFixed(2)}%`;
      } catch (err) {
        out.className = 'error';
        out.textContent = 'Request failed';
      }
    });
  </script>
</body>
</html>
"#;
