//! Heartwise CLI Module
//!
//! Command-line interface for training, one-off predictions, the web server
//! and the terminal prediction form.

pub mod form;

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::features::{RawRecord, RawValue, EXAMPLE_RECORD, FEATURE_NAMES, N_FEATURES};
use crate::inference::{InferenceConfig, InferenceService};
use crate::server::ServerConfig;
use crate::training::{TrainingConfig, TrainingPipeline};

pub use form::cmd_form;

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

pub(crate) fn dim(s: &str) -> ColoredString { s.truecolor(100, 100, 100) }
pub(crate) fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
pub(crate) fn muted(s: &str) -> ColoredString { s.truecolor(140, 140, 140) }
pub(crate) fn ok(s: &str) -> ColoredString { s.truecolor(100, 210, 120) }
pub(crate) fn warn(s: &str) -> ColoredString { s.truecolor(240, 110, 100) }

pub(crate) fn line_box_top()    { println!("  {}", dim(&format!("┌{}┐", "─".repeat(W + 3)))); }
pub(crate) fn line_box_bottom() { println!("  {}", dim(&format!("└{}┘", "─".repeat(W + 3)))); }
pub(crate) fn line_box_sep()    { println!("  {}", dim(&format!("├{}┤", "─".repeat(W + 3)))); }

pub(crate) fn line_box(content: &str) {
    let pad = W.saturating_sub(visible_width(content));
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

pub(crate) fn line_box_center(content: &str) {
    let total_pad = W.saturating_sub(visible_width(content));
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

pub(crate) fn line_box_empty() { line_box(""); }

/// Printed width, ignoring ANSI color codes
pub(crate) fn visible_width(s: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        width += 1;
    }
    width
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

pub(crate) fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "heartwise")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Heart-disease risk classifier: train, serve and predict")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train the scaler and classifier from a CSV file
    Train {
        /// Input CSV (13 feature columns plus the target, `?` for missing)
        #[arg(short, long)]
        data: PathBuf,

        /// Target column name
        #[arg(short, long, default_value = "target")]
        target: String,

        /// Cell content treated as missing in the CSV
        #[arg(long, default_value = "?")]
        na_token: String,

        /// Directory receiving model.json and scaler.json
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Fraction of rows held out for evaluation
        #[arg(long, default_value = "0.2")]
        test_size: f64,

        /// Seed for the stratified split
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Maximum gradient descent iterations
        #[arg(long, default_value = "1000")]
        max_iter: usize,
    },

    /// Score one record given as comma-separated values in feature order
    Predict {
        /// e.g. "63,1,1,145,233,1,2,150,0,2.3,3,0,6" (defaults to that record)
        values: Option<String>,

        #[arg(short, long, env = "MODEL_PATH", default_value = "model.json")]
        model: PathBuf,

        #[arg(short, long, env = "SCALER_PATH", default_value = "scaler.json")]
        scaler: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the web server
    Serve {
        /// Server port
        #[arg(short, long, env = "API_PORT", default_value = "5000")]
        port: u16,

        /// Server host
        #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
        host: String,

        #[arg(short, long, env = "MODEL_PATH", default_value = "model.json")]
        model: PathBuf,

        #[arg(short, long, env = "SCALER_PATH", default_value = "scaler.json")]
        scaler: PathBuf,
    },

    /// Open the terminal prediction form
    Form {
        #[arg(short, long, env = "MODEL_PATH", default_value = "model.json")]
        model: PathBuf,

        #[arg(short, long, env = "SCALER_PATH", default_value = "scaler.json")]
        scaler: PathBuf,
    },
}

// ─── Input parsing ─────────────────────────────────────────────────────────────

/// Pair comma-separated values with feature names, in contract order.
///
/// Values stay as text so they go through the same validation as web input.
pub fn parse_record(values: &str) -> anyhow::Result<RawRecord> {
    let parts: Vec<&str> = values.split(',').collect();
    if parts.len() != N_FEATURES {
        anyhow::bail!(
            "expected {} comma-separated values ({}), got {}",
            N_FEATURES,
            FEATURE_NAMES.join(","),
            parts.len()
        );
    }
    Ok(FEATURE_NAMES
        .iter()
        .zip(parts)
        .map(|(name, v)| (name.to_string(), RawValue::from(v)))
        .collect())
}

fn example_csv() -> String {
    EXAMPLE_RECORD
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn load_service(model: &Path, scaler: &Path) -> anyhow::Result<InferenceService> {
    let config = InferenceConfig::new()
        .with_model_path(model)
        .with_scaler_path(scaler);
    Ok(InferenceService::load(&config)?)
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(config: TrainingConfig) -> anyhow::Result<()> {
    section("Train");

    step_run(&format!("Training on {}", config.data_path().display()));
    let start = Instant::now();
    let outcome = TrainingPipeline::new(config).run()?;
    step_done(&format!("{:?}", start.elapsed()));

    let report = &outcome.report;
    let metrics = &report.metrics;
    let auc = metrics
        .auc_roc
        .map(|v| format!("{:.3}", v))
        .unwrap_or_else(|| "n/a (single class in test split)".to_string());

    println!();
    println!("  {:<16} {} loaded, {} dropped", muted("Rows"), report.rows_loaded, report.rows_dropped);
    println!("  {:<16} {} train / {} test", muted("Split"), report.n_train, report.n_test);
    println!("  {:<16} {}", muted("Accuracy"), format!("{:.3}", metrics.accuracy).white().bold());
    println!("  {:<16} {}", muted("ROC-AUC"), auc.white().bold());
    println!(
        "  {:<16} {:.3} / {:.3} / {:.3}",
        muted("Prec/Rec/F1"),
        metrics.precision,
        metrics.recall,
        metrics.f1_score
    );
    println!("  {}", muted("Confusion matrix"));
    for line in metrics.confusion_matrix.to_string().lines() {
        println!("    {}", line);
    }
    println!();
    println!(
        "  {} Saved → {}, {}",
        ok("✓"),
        report.model_path.display(),
        report.scaler_path.display()
    );
    println!();

    Ok(())
}

pub fn cmd_predict(
    values: Option<&str>,
    model: &Path,
    scaler: &Path,
    json: bool,
) -> anyhow::Result<()> {
    let service = load_service(model, scaler)?;
    let values = values.map(str::to_string).unwrap_or_else(example_csv);
    let raw = parse_record(&values)?;
    let result = service.predict(&raw)?;

    if json {
        println!("{}", serde_json::to_string(&result)?);
        return Ok(());
    }

    section("Predict");
    println!(
        "  {:<16} {} {}",
        muted("Prediction"),
        result.label_text().white().bold(),
        dim(&format!("(class={})", result.prediction))
    );
    println!("  {:<16} {}", muted("Probability"), result.percent_text().white());
    println!();
    Ok(())
}

// ─── Serve ─────────────────────────────────────────────────────────────────────

pub async fn cmd_serve(host: &str, port: u16, model: &Path, scaler: &Path) -> anyhow::Result<()> {
    use crate::server::run_server;

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "Heartwise".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Form    ", &format!("http://{}:{}", host, port)));
    line_box(&kv("Predict ", &format!("POST http://{}:{}/predict", host, port)));
    line_box(&kv("Health  ", &format!("http://{}:{}/health", host, port)));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_empty();
    line_box_bottom();
    println!();

    let config = ServerConfig {
        host: host.to_string(),
        port,
        model_path: model.to_path_buf(),
        scaler_path: scaler.to_path_buf(),
        ..Default::default()
    };

    run_server(config).await
}

// ─── Interactive mode ──────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("       {}", "Heartwise".truecolor(120, 170, 255).bold());
    println!(
        "       {}",
        dim(&format!("heart-disease risk classifier  ·  v{}", env!("CARGO_PKG_VERSION")))
    );
    println!();
}

fn show_help() {
    section("Commands");

    let cmds: &[(&str, &str)] = &[
        ("heartwise", "Interactive launcher (default)"),
        ("heartwise train -d heart.csv", "Fit scaler + classifier"),
        ("heartwise predict 63,1,1,...", "Score one record"),
        ("heartwise form", "Terminal prediction form"),
        ("heartwise serve -p 5000", "Start the web form + API"),
    ];

    for (cmd, desc) in cmds {
        println!("  {:<36} {}", cmd.white(), muted(desc));
    }
    println!();
}

enum LauncherAction {
    Serve,
    Exit,
}

fn launcher_items(config: &ServerConfig) -> Vec<String> {
    vec![
        "Prediction Form       score a patient record".to_string(),
        format!("Start Server          web form + api on {}:{}", config.host, config.port),
        "Help                  commands".to_string(),
        "Exit".to_string(),
    ]
}

/// Blocking menu loop; returns once the user picks the server or leaves
fn launcher_menu(config: &ServerConfig) -> anyhow::Result<LauncherAction> {
    use dialoguer::Select;

    let theme = form::theme();
    let items = launcher_items(config);

    loop {
        println!();
        let sel = Select::with_theme(&theme)
            .with_prompt("What would you like to do")
            .items(items.as_slice())
            .default(0)
            .interact_opt()?;

        match sel {
            Some(0) => cmd_form(&config.model_path, &config.scaler_path)?,
            Some(1) => return Ok(LauncherAction::Serve),
            Some(2) => show_help(),
            Some(3) | None => return Ok(LauncherAction::Exit),
            _ => {}
        }
    }
}

/// Interactive launcher; settings come from the same env vars as `serve`
pub async fn cmd_interactive() -> anyhow::Result<()> {
    print_banner();
    let config = ServerConfig::default();

    let menu_config = config.clone();
    let action = tokio::task::spawn_blocking(move || launcher_menu(&menu_config)).await??;

    match action {
        LauncherAction::Serve => {
            cmd_serve(&config.host, config.port, &config.model_path, &config.scaler_path).await
        }
        LauncherAction::Exit => {
            println!();
            println!("  {}", dim("goodbye"));
            println!();
            Ok(())
        }
    }
}
