use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "vision-mailer")]
#[command(about = "Goal reminders by email: registration API and scheduled daily batch")]
pub struct Cli {
    /// TOML configuration file. Environment variables are used when omitted.
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Serve the HTTP API and run the daily batch on schedule
    Serve {
        /// Override the configured bind address
        #[arg(long)]
        bind: Option<String>,

        /// Do not start the daily trigger
        #[arg(long)]
        no_scheduler: bool,
    },

    /// Run the reminder batch once, now
    RunBatch {
        /// Pretend today is this date (YYYY-MM-DD) when matching reminder days
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Send a test welcome email through the provider chain
    SendTest {
        #[arg(long)]
        email: String,

        #[arg(long, default_value = "Usuario")]
        name: String,
    },

    /// Load and validate configuration, then exit
    CheckConfig,
}
