// Adapters layer: concrete implementations of the domain ports over HTTP.

pub mod ai;
pub mod email;
pub mod store;

use crate::utils::error::Result;
use reqwest::Client;
use std::time::Duration;

pub fn http_client(timeout_seconds: u64) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(concat!("vision-mailer/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}
