//! Heartwise - Main Entry Point
//!
//! Trains the heart-disease classifier and serves predictions from the CLI,
//! a terminal form or the web server.

use clap::Parser;
use heartwise::cli::{cmd_form, cmd_interactive, cmd_predict, cmd_serve, cmd_train, Cli, Commands};
use heartwise::training::TrainingConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "heartwise=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Train { data, target, na_token, output_dir, test_size, seed, max_iter }) => {
            let config = TrainingConfig::new(data)
                .with_target(target)
                .with_na_token(na_token)
                .with_output_dir(output_dir)
                .with_test_size(test_size)
                .with_random_state(seed)
                .with_max_iter(max_iter);
            cmd_train(config)?;
        }
        Some(Commands::Predict { values, model, scaler, json }) => {
            cmd_predict(values.as_deref(), &model, &scaler, json)?;
        }
        Some(Commands::Serve { port, host, model, scaler }) => {
            cmd_serve(&host, port, &model, &scaler).await?;
        }
        Some(Commands::Form { model, scaler }) => {
            // dialoguer prompts block, keep them off the runtime
            tokio::task::spawn_blocking(move || cmd_form(&model, &scaler)).await??;
        }
        None => {
            cmd_interactive().await?;
        }
    }

    Ok(())
}
