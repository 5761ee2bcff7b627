//! Terminal prediction form
//!
//! One prompt per feature, pre-filled with the example patient. A bad value
//! shows an error box and re-opens the form with everything the user typed.

use colored::*;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use std::path::Path;
use tracing::debug;

use super::{dim, line_box, line_box_bottom, line_box_empty, line_box_sep, line_box_top, ok, section, warn};
use crate::error::{HeartwiseError, Result};
use crate::features::{RawRecord, RawValue, EXAMPLE_RECORD, FEATURE_NAMES, N_FEATURES};
use crate::inference::{InferenceConfig, InferenceService, PredictionResult};

/// Shown for any missing or non-numeric field
pub const INVALID_INPUT_MESSAGE: &str = "Please enter valid numbers for all fields.";

/// What the form shows after a submit
#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome {
    Prediction(PredictionResult),
    Invalid,
}

impl FormOutcome {
    /// Box title and body lines
    pub fn render(&self) -> (&'static str, Vec<String>) {
        match self {
            FormOutcome::Prediction(result) => (
                "Result",
                vec![
                    format!("Prediction: {} (class={})", result.label_text(), result.prediction),
                    format!("Probability of disease: {}", result.percent_text()),
                ],
            ),
            FormOutcome::Invalid => ("Error", vec![INVALID_INPUT_MESSAGE.to_string()]),
        }
    }
}

/// Form values, kept across submits
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    values: [String; N_FEATURES],
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            values: EXAMPLE_RECORD.map(|v| v.to_string()),
        }
    }
}

impl FormState {
    pub fn values(&self) -> &[String; N_FEATURES] {
        &self.values
    }

    pub fn set(&mut self, index: usize, value: String) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }

    pub fn to_record(&self) -> RawRecord {
        FEATURE_NAMES
            .iter()
            .zip(self.values.iter())
            .map(|(name, v)| (name.to_string(), RawValue::from(v.as_str())))
            .collect()
    }

    /// Score the current values; validation failures become [`FormOutcome::Invalid`]
    pub fn submit(&self, service: &InferenceService) -> Result<FormOutcome> {
        match service.predict(&self.to_record()) {
            Ok(result) => Ok(FormOutcome::Prediction(result)),
            Err(HeartwiseError::Validation(e)) => {
                debug!(error = %e, "Form input rejected");
                Ok(FormOutcome::Invalid)
            }
            Err(e) => Err(e),
        }
    }
}

pub(crate) fn theme() -> ColorfulTheme {
    ColorfulTheme {
        active_item_prefix: dialoguer::console::style("  ›".to_string()).for_stderr().cyan(),
        active_item_style: dialoguer::console::Style::new().for_stderr().white().bold(),
        inactive_item_prefix: dialoguer::console::style("   ".to_string()).for_stderr(),
        inactive_item_style: dialoguer::console::Style::new().for_stderr().color256(245),
        prompt_prefix: dialoguer::console::style("  ?".to_string()).for_stderr().color256(111),
        prompt_style: dialoguer::console::Style::new().for_stderr().white().bold(),
        ..ColorfulTheme::default()
    }
}

fn show_outcome(outcome: &FormOutcome) {
    let (title, lines) = outcome.render();
    let title = match outcome {
        FormOutcome::Prediction(_) => ok(title),
        FormOutcome::Invalid => warn(title),
    };
    println!();
    line_box_top();
    line_box(&format!("{}", title.bold()));
    line_box_sep();
    line_box_empty();
    for line in &lines {
        line_box(&format!("{}", line.white()));
    }
    line_box_empty();
    line_box_bottom();
}

/// Run the form until the user stops
pub fn cmd_form(model: &Path, scaler: &Path) -> anyhow::Result<()> {
    let config = InferenceConfig::new()
        .with_model_path(model)
        .with_scaler_path(scaler);
    let service = InferenceService::load(&config)?;
    let theme = theme();
    let mut state = FormState::default();

    section("Heart Disease Prediction");
    println!("  {}", dim("edit each value and press enter"));

    loop {
        println!();
        for (i, name) in FEATURE_NAMES.iter().enumerate() {
            let value: String = Input::with_theme(&theme)
                .with_prompt(*name)
                .with_initial_text(state.values()[i].clone())
                .allow_empty(true)
                .interact_text()?;
            state.set(i, value);
        }

        let outcome = state.submit(&service)?;
        show_outcome(&outcome);
        if outcome == FormOutcome::Invalid {
            continue;
        }

        println!();
        let again = Confirm::with_theme(&theme)
            .with_prompt("Predict another patient")
            .default(false)
            .interact()?;
        if !again {
            break;
        }
    }

    println!();
    Ok(())
}
