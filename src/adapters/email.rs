use crate::config::{ProvidersConfig, SenderConfig};
use crate::domain::model::OutboundEmail;
use crate::domain::ports::{DynEmailProvider, EmailProvider};
use crate::utils::error::{MailerError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::json;
use std::sync::Arc;

fn require_key<'a>(provider: &str, key: &'a Option<String>) -> Result<&'a str> {
    key.as_deref()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| MailerError::MissingConfigError {
            field: format!("{} api key", provider),
        })
}

/// 2xx is success; anything else carries the body back as detail.
async fn check_response(provider: &str, response: Response) -> Result<()> {
    let status = response.status();
    tracing::debug!("{} response status: {}", provider, status);
    if status.is_success() {
        return Ok(());
    }

    let detail = response.text().await.unwrap_or_default();
    Err(MailerError::ProviderError {
        provider: provider.to_string(),
        status: status.as_u16(),
        detail,
    })
}

pub struct SendGridProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    from_email: String,
    from_name: String,
}

impl SendGridProvider {
    pub fn new(client: Client, providers: &ProvidersConfig, sender: &SenderConfig) -> Self {
        Self {
            client,
            base_url: providers.sendgrid_base_url.trim_end_matches('/').to_string(),
            api_key: providers.sendgrid_api_key.clone(),
            from_email: sender.from_email.clone(),
            from_name: sender.from_name.clone(),
        }
    }
}

#[async_trait]
impl EmailProvider for SendGridProvider {
    fn name(&self) -> &str {
        "sendgrid"
    }

    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        let api_key = require_key(self.name(), &self.api_key)?;
        let payload = json!({
            "personalizations": [{ "to": [{ "email": email.to }] }],
            "from": { "email": self.from_email, "name": self.from_name },
            "subject": email.subject,
            "content": [{ "type": "text/html", "value": email.html }]
        });

        let response = self
            .client
            .post(format!("{}/v3/mail/send", self.base_url))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        check_response(self.name(), response).await
    }
}

pub struct MailjetProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    secret_key: Option<String>,
    from_email: String,
    from_name: String,
}

impl MailjetProvider {
    pub fn new(client: Client, providers: &ProvidersConfig, sender: &SenderConfig) -> Self {
        Self {
            client,
            base_url: providers.mailjet_base_url.trim_end_matches('/').to_string(),
            api_key: providers.mailjet_api_key.clone(),
            secret_key: providers.mailjet_secret_key.clone(),
            from_email: sender.from_email.clone(),
            from_name: sender.from_name.clone(),
        }
    }
}

#[async_trait]
impl EmailProvider for MailjetProvider {
    fn name(&self) -> &str {
        "mailjet"
    }

    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        let api_key = require_key(self.name(), &self.api_key)?;
        let secret_key = require_key(self.name(), &self.secret_key)?;
        let recipient_name = email.to.split('@').next().unwrap_or_default();
        let payload = json!({
            "Messages": [{
                "From": { "Email": self.from_email, "Name": self.from_name },
                "To": [{ "Email": email.to, "Name": recipient_name }],
                "Subject": email.subject,
                "HTMLPart": email.html
            }]
        });

        let response = self
            .client
            .post(format!("{}/v3.1/send", self.base_url))
            .basic_auth(api_key, Some(secret_key))
            .json(&payload)
            .send()
            .await?;

        check_response(self.name(), response).await
    }
}

pub struct ResendProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    from: String,
}

impl ResendProvider {
    pub fn new(client: Client, providers: &ProvidersConfig, sender: &SenderConfig) -> Self {
        Self {
            client,
            base_url: providers.resend_base_url.trim_end_matches('/').to_string(),
            api_key: providers.resend_api_key.clone(),
            from: sender.resend_from.clone(),
        }
    }
}

#[async_trait]
impl EmailProvider for ResendProvider {
    fn name(&self) -> &str {
        "resend"
    }

    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        let api_key = require_key(self.name(), &self.api_key)?;
        let payload = json!({
            "from": self.from,
            "to": email.to,
            "subject": email.subject,
            "html": email.html
        });

        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        check_response(self.name(), response).await
    }
}

/// SendGrid, then Mailjet, then Resend.
pub fn default_chain(
    client: &Client,
    providers: &ProvidersConfig,
    sender: &SenderConfig,
) -> Vec<DynEmailProvider> {
    let sendgrid: DynEmailProvider = Arc::new(SendGridProvider::new(client.clone(), providers, sender));
    let mailjet: DynEmailProvider = Arc::new(MailjetProvider::new(client.clone(), providers, sender));
    let resend: DynEmailProvider = Arc::new(ResendProvider::new(client.clone(), providers, sender));
    vec![sendgrid, mailjet, resend]
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn email() -> OutboundEmail {
        OutboundEmail {
            to: "ana@example.com".to_string(),
            subject: "Hola".to_string(),
            html: "<p>hola</p>".to_string(),
        }
    }

    fn providers_for(server: &MockServer) -> ProvidersConfig {
        ProvidersConfig {
            sendgrid_api_key: Some("sg".to_string()),
            sendgrid_base_url: server.base_url(),
            mailjet_api_key: Some("mj".to_string()),
            mailjet_secret_key: Some("secret".to_string()),
            mailjet_base_url: server.base_url(),
            resend_api_key: Some("re".to_string()),
            resend_base_url: server.base_url(),
            ..ProvidersConfig::default()
        }
    }

    #[tokio::test]
    async fn sendgrid_payload_and_auth() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v3/mail/send")
                .header("authorization", "Bearer sg")
                .json_body_partial(
                    r#"{"personalizations":[{"to":[{"email":"ana@example.com"}]}],"subject":"Hola"}"#,
                );
            then.status(202);
        });

        let provider =
            SendGridProvider::new(Client::new(), &providers_for(&server), &SenderConfig::default());
        provider.send(&email()).await.unwrap();

        mock.assert();
    }

    #[tokio::test]
    async fn mailjet_uses_basic_auth() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v3.1/send")
                .header("authorization", "Basic bWo6c2VjcmV0")
                .json_body_partial(r#"{"Messages":[{"To":[{"Email":"ana@example.com","Name":"ana"}]}]}"#);
            then.status(200).json_body(serde_json::json!({"Messages": []}));
        });

        let provider =
            MailjetProvider::new(Client::new(), &providers_for(&server), &SenderConfig::default());
        provider.send(&email()).await.unwrap();

        mock.assert();
    }

    #[tokio::test]
    async fn resend_failure_keeps_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/emails").header("authorization", "Bearer re");
            then.status(422).body("invalid from");
        });

        let provider =
            ResendProvider::new(Client::new(), &providers_for(&server), &SenderConfig::default());
        let err = provider.send(&email()).await.unwrap_err();

        match err {
            MailerError::ProviderError {
                provider,
                status,
                detail,
            } => {
                assert_eq!(provider, "resend");
                assert_eq!(status, 422);
                assert_eq!(detail, "invalid from");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/v3/mail/send");
            then.status(202);
        });
        let mut config = providers_for(&server);
        config.sendgrid_api_key = None;

        let provider = SendGridProvider::new(Client::new(), &config, &SenderConfig::default());
        let err = provider.send(&email()).await.unwrap_err();

        assert!(matches!(err, MailerError::MissingConfigError { .. }));
        mock.assert_hits(0);
    }

    #[test]
    fn default_chain_order() {
        let names: Vec<String> = default_chain(
            &Client::new(),
            &ProvidersConfig::default(),
            &SenderConfig::default(),
        )
        .iter()
        .map(|p| p.name().to_string())
        .collect();
        assert_eq!(names, vec!["sendgrid", "mailjet", "resend"]);
    }
}
