use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use std::time::Duration;
use vision_mailer::config::cli::{Cli, Command};
use vision_mailer::core::queue;
use vision_mailer::server::{self, AppState};
use vision_mailer::utils::error::ErrorCategory;
use vision_mailer::utils::{logger, validation::Validate};
use vision_mailer::{App, AppConfig, MailerError};

fn load_config(cli: &Cli) -> vision_mailer::Result<AppConfig> {
    match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            AppConfig::from_file(path)
        }
        None => AppConfig::from_env(),
    }
}

fn exit_with(e: &MailerError) -> ! {
    tracing::error!("❌ {} (Category: {:?})", e, e.category());
    eprintln!("❌ {}", e.user_friendly_message());

    let code = match e.category() {
        ErrorCategory::Configuration | ErrorCategory::Validation => 2,
        _ => 1,
    };
    std::process::exit(code);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting vision-mailer");

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    if let Err(e) = config.validate() {
        exit_with(&e);
    }

    match cli.command {
        Command::CheckConfig => {
            println!("✅ Configuration is valid");
            println!("   store: {}", config.store.endpoint);
            println!(
                "   batches of {} every {}ms, daily at {} UTC",
                config.scheduler.batch_size, config.scheduler.batch_delay_ms, config.scheduler.run_at
            );
            for name in config.missing_credentials() {
                println!("   ⚠️ {} not set", name);
            }
        }

        Command::SendTest { email, name } => {
            let app = App::build(config).context("failed to build application")?;
            let result = app.mailer.send_test(&email, &name).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.success {
                std::process::exit(1);
            }
        }

        Command::RunBatch { date } => {
            let app = App::build(config).context("failed to build application")?;
            let now = match date {
                Some(date) => date
                    .and_time(app.config.scheduler.run_time()?)
                    .and_utc(),
                None => Utc::now(),
            };
            let report = app.scheduler.run_daily_batch(now).await;
            println!(
                "📨 {} due, {} delivered, {} failed ({} registrations, {} groups)",
                report.due_today, report.delivered, report.failed, report.total_users, report.groups
            );
        }

        Command::Serve { bind, no_scheduler } => {
            let app = App::build(config).context("failed to build application")?;
            let addr = bind.unwrap_or_else(|| app.config.server.bind_addr.clone());

            let (submission, worker) = app.submission();

            if app.config.scheduler.enabled && !no_scheduler {
                let trigger = app.daily_trigger()?;
                tokio::spawn(trigger.run());
            } else {
                tracing::info!("Daily trigger disabled");
            }

            let state = AppState {
                submission,
                mailer: app.mailer.clone(),
                ai_backends: app.ai_backend_names(),
            };
            server::serve(&addr, state).await?;

            // the router owned the last queue sender, so the worker now sees a closed channel
            let grace = Duration::from_secs(app.config.server.shutdown_grace_seconds);
            queue::drain(worker, grace).await;
            tracing::info!("✅ Server stopped");
        }
    }

    Ok(())
}
