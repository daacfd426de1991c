pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod render;
pub mod server;
pub mod utils;

pub use app::App;
pub use config::AppConfig;
pub use crate::core::{
    dispatcher::FailoverDispatcher, generator::ContentGenerator, mailer::Mailer,
    scheduler::BatchScheduler, submission::SubmissionHandler,
};
pub use utils::error::{MailerError, Result};
