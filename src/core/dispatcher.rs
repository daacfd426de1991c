use crate::domain::model::{OutboundEmail, RenderedMessage, SendResult};
use crate::domain::ports::DynEmailProvider;

/// Tries each provider in order, one attempt each, and stops at the first success.
#[derive(Clone)]
pub struct FailoverDispatcher {
    providers: Vec<DynEmailProvider>,
}

impl FailoverDispatcher {
    pub fn new(providers: Vec<DynEmailProvider>) -> Self {
        Self { providers }
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    pub async fn send(&self, message: &RenderedMessage, recipient: &str) -> SendResult {
        let email = OutboundEmail::new(recipient, message);
        let mut last_error = "No email providers configured".to_string();

        for (attempt, provider) in self.providers.iter().enumerate() {
            tracing::debug!(
                "Attempt {} via {} for {}",
                attempt + 1,
                provider.name(),
                recipient
            );

            match provider.send(&email).await {
                Ok(()) => {
                    tracing::info!("📨 {} accepted message for {}", provider.name(), recipient);
                    return SendResult::delivered(provider.name());
                }
                Err(e) => {
                    tracing::warn!("{} failed for {}: {}", provider.name(), recipient, e);
                    last_error = e.to_string();
                }
            }
        }

        tracing::error!("❌ All providers failed for {}: {}", recipient, last_error);
        SendResult::failed(last_error)
    }
}
