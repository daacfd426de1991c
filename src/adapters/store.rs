use crate::domain::model::Registration;
use crate::domain::ports::RegistrationStore;
use crate::utils::error::{MailerError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// Spreadsheet-backed store exposed as a script web app:
/// `POST` appends a row, `GET` lists every row.
pub struct SheetsStore {
    client: Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct SaveReply {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

impl SheetsStore {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl RegistrationStore for SheetsStore {
    async fn save(&self, registration: &Registration) -> Result<()> {
        tracing::debug!("Saving registration to: {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .json(registration)
            .send()
            .await
            .map_err(|e| MailerError::store(format!("Store unreachable: {}", e)))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(MailerError::store(format!("HTTP {}: {}", status.as_u16(), body)));
        }

        let reply: SaveReply = serde_json::from_str(&body)
            .map_err(|e| MailerError::store(format!("Unexpected store reply: {}", e)))?;

        if reply.success {
            Ok(())
        } else {
            Err(MailerError::store(
                reply.error.unwrap_or_else(|| "Store rejected the write".to_string()),
            ))
        }
    }

    async fn list_all(&self) -> Result<Vec<Registration>> {
        tracing::debug!("Listing registrations from: {}", self.endpoint);
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| MailerError::store(format!("Store unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MailerError::store(format!("HTTP {} listing rows", status.as_u16())));
        }

        let rows: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| MailerError::store(format!("Unexpected store listing: {}", e)))?;

        let mut registrations = Vec::with_capacity(rows.len());
        for (i, row) in rows.into_iter().enumerate() {
            match serde_json::from_value::<Registration>(row) {
                Ok(registration) => registrations.push(registration),
                Err(e) => tracing::warn!("Skipping store row {}: {}", i, e),
            }
        }

        Ok(registrations)
    }
}
